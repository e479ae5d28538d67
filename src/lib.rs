pub mod api;
pub mod config;
pub mod dashboard;
pub mod entry;
pub mod error;
pub mod fmt;
pub mod master;
pub mod pdf;
pub mod report;
pub mod sheet;
pub mod tabular;

pub use api::Gateway;
pub use config::{Config, Session};
pub use error::{DeskError, Result};
pub use master::EntityKind;
pub use report::{ReportQuery, ReportType};

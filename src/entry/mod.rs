mod purchase;
mod sales;

pub use purchase::{DcLine, PurchaseEntryForm};
pub use sales::{SalesEntryForm, SalesLine};

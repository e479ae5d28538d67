use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Config directory not found at {0}. Run 'poultrydesk init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("No session token stored. Run 'poultrydesk session set --token <token>' first.")]
    NotLoggedIn,

    #[error("Session token expired at {0}. Obtain a fresh token and run 'poultrydesk session set'.")]
    SessionExpired(String),

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Server returned HTTP {status} for {url}")]
    Api { status: u16, url: String },

    #[error("Server response could not be decoded: {0}")]
    BadResponse(String),

    #[error("Sub type '{sub}' is not valid for {report_type} reports")]
    InvalidSubType { report_type: String, sub: String },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("{0} is mandatory")]
    MissingField(String),

    #[error("No complete line items. Each line needs kilograms and rate.")]
    NoLines,

    #[error("Invalid line '{input}'. Expected '{expected}'.")]
    InvalidLine { input: String, expected: &'static str },

    #[error("Invalid number '{value}' for {field}")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid field assignment '{0}'. Expected 'key=value'.")]
    InvalidAssignment(String),

    #[error("Unknown column '{column}' for {context}")]
    UnknownColumn { column: String, context: String },

    #[error("Response row {row} violates the {context} schema: column '{column}' {reason}")]
    SchemaViolation {
        context: String,
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(PathBuf),

    #[error("Attachment {path} is {size_mb:.1} MB, over the {limit_mb} MB limit")]
    AttachmentTooLarge {
        path: PathBuf,
        size_mb: f64,
        limit_mb: u64,
    },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Failed to write spreadsheet: {0}")]
    SheetGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeskError>;

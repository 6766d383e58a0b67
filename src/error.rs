//! Error types shared by the store, classifiers and exporters

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed trade log: {0}")]
    Malformed(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid trade: {0}")]
    Validation(String),
    #[error("Export failed: {0}")]
    Export(String),
}

impl JournalError {
    /// True when the caller sent bad input, as opposed to the journal failing
    pub fn is_client_error(&self) -> bool {
        matches!(self, JournalError::Validation(_))
    }
}

impl From<rust_xlsxwriter::XlsxError> for JournalError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        JournalError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;

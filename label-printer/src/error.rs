//! Error types for the printer library

use std::path::PathBuf;

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Document root, document file or separator file is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// SKU cannot be mapped to a file name under the document root
    #[error("Invalid SKU: {0:?}")]
    InvalidSku(String),

    /// PDF could not be parsed, has no pages, or has no bounding box
    #[error("Invalid document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// No Ghostscript executable could be located
    #[error("Print driver not found: {0}")]
    DriverNotFound(String),

    /// IO error while reading a document or probing the driver
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Default printer could not be determined
    #[error("Printer discovery failed: {0}")]
    Printer(String),

    /// Windows-specific printing error
    #[cfg(windows)]
    #[error("Windows printer error: {0}")]
    WindowsPrinter(String),
}

impl PrintError {
    pub(crate) fn invalid_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;

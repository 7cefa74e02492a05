//! Structured error types for the note exporter.
//!
//! Per-item problems (a missing image, an unknown font family) never
//! surface here; they degrade in place and are logged. What remains are the
//! stage failures in [`Error`] and the single terminal [`ExportError`] that
//! the public export entry point returns.

use thiserror::Error;

/// Result type alias for exporter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A failure inside one stage of the export pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Export options failed to parse.
    #[error("Invalid export options: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading an image store or writing the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An image could not be loaded or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// Layout or PDF serialization failed.
    #[error("Render error: {0}")]
    Render(String),
}

/// The one error a caller of [`crate::export_to_pdf`] ever sees.
#[derive(Error, Debug)]
#[error("Failed to generate PDF: {source}")]
pub struct ExportError {
    #[source]
    pub source: Error,
}

impl From<Error> for ExportError {
    fn from(source: Error) -> Self {
        ExportError { source }
    }
}

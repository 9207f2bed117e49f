//! Serial Ingest Error Types

use thiserror::Error;

/// Errors that can occur while reading the UART
#[derive(Debug, Error)]
pub enum IngestError {
    /// Serial port open or I/O failure
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// Port configuration rejected before opening
    #[error("Invalid serial config: {0}")]
    InvalidConfig(String),

    /// Source has already reported end of stream
    #[error("Serial source closed")]
    Closed,
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::SerialError(err.to_string())
    }
}

impl From<tokio_serial::Error> for IngestError {
    fn from(err: tokio_serial::Error) -> Self {
        IngestError::SerialError(err.to_string())
    }
}

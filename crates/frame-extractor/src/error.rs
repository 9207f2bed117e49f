//! Frame Extraction Error Types

use thiserror::Error;

/// Errors building records or configuring the extractor
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// Frame does not fit in a record
    #[error("Frame of {len} bytes exceeds record width {max}")]
    FrameTooLong { len: usize, max: usize },

    /// Record text is not UTF-8
    #[error("Record is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Record text is not JSON
    #[error("Record is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Extractor configuration rejected
    #[error("Invalid extractor config: {0}")]
    InvalidConfig(String),
}

//! Pipeline Error Types

use frame_extractor::ExtractorError;
use serial_ingest::IngestError;
use telemetry_sync::SyncError;
use thiserror::Error;

/// Errors that stop the staging pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration sources could not be read or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration values rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Logging or metrics setup failed
    #[error("Observability setup failed: {0}")]
    Observability(String),
}

//! UART Telemetry Staging Pipeline
//!
//! Serial bytes flow through a byte ring, are cut into `{ ... }` frames by
//! the extractor, staged in a record ring and drained to a telemetry sink:
//! - Overwrite-on-overflow rings (lossy, newest data wins)
//! - Single-task cooperative scheduling, no locks
//! - Layered TOML + environment configuration
//! - Structured logging and Prometheus metrics

pub mod config;
mod error;
pub mod observability;
mod runner;
mod stage;

pub use config::{PipelineConfig, DEFAULT_CONFIG_FILE};
pub use error::PipelineError;
pub use observability::{init_logging, init_metrics};
pub use runner::{run, RunSummary};
pub use stage::{Stage, StageStats};

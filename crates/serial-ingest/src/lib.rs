//! UART Ingest
//!
//! Async serial byte source for the telemetry staging pipeline. Bytes are
//! delivered in whatever chunk sizes the transport produces; no framing is
//! assumed at this layer.

mod error;
mod source;

pub use error::IngestError;
pub use source::{SerialConfig, SerialSource};

/// Largest chunk read per readiness event
pub const DEFAULT_READ_CHUNK: usize = 256;

//! Logging and metrics setup

use crate::PipelineError;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub const BYTES_INGESTED: &str = "uart_bytes_ingested_total";
pub const BYTES_EVICTED: &str = "uart_bytes_evicted_total";
pub const BYTES_RESYNCED: &str = "uart_bytes_resynced_total";
pub const FRAMES_EXTRACTED: &str = "uart_frames_extracted_total";
pub const RECORDS_EVICTED: &str = "uart_records_evicted_total";
pub const RECORDS_SENT: &str = "uart_records_sent_total";
pub const RECORDS_FAILED: &str = "uart_records_failed_total";
pub const BYTE_RING_FILL: &str = "uart_byte_ring_fill_ratio";

/// Initialize logging
pub fn init_logging(level: Level, json: bool) -> Result<(), PipelineError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.map_err(|e| PipelineError::Observability(e.to_string()))
}

/// Install the Prometheus exporter when an address is configured
pub fn init_metrics(addr: Option<SocketAddr>) -> Result<(), PipelineError> {
    let Some(addr) = addr else {
        return Ok(());
    };

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| PipelineError::Observability(e.to_string()))?;

    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

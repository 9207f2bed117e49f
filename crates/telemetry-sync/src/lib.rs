//! Telemetry Synchronization Module
//!
//! Delivers extracted UART records to the cloud:
//! - JSON envelope with device id, message id and timestamp
//! - MQTT publishing with a background event loop
//! - Log-only sink for bench setups with uploads disabled

mod message;
mod sink;

pub use message::TelemetryMessage;
pub use sink::{LogSink, MqttSink};

use frame_extractor::Record;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Telemetry sync error types
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Telemetry sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// MQTT broker host
    pub broker_url: String,
    /// MQTT port
    pub broker_port: u16,
    /// Device ID
    pub device_id: String,
    /// Publish topic, defaults to `devices/{device_id}/telemetry`
    pub topic: Option<String>,
    /// MQTT keep-alive (seconds)
    pub keep_alive_secs: u64,
    /// Publish to the broker; when off records are only logged
    pub upload_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            broker_url: "localhost".to_string(),
            broker_port: 1883,
            device_id: "unknown".to_string(),
            topic: None,
            keep_alive_secs: 30,
            upload_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Resolved publish topic
    pub fn topic(&self) -> String {
        self.topic
            .clone()
            .unwrap_or_else(|| format!("devices/{}/telemetry", self.device_id))
    }
}

/// Destination for records drained from the record ring
#[allow(async_fn_in_trait)]
pub trait TelemetrySink {
    /// Deliver one record
    async fn send(&mut self, record: Record) -> Result<(), SyncError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

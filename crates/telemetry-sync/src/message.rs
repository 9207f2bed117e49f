//! Telemetry message envelope

use crate::SyncError;
use chrono::{DateTime, Utc};
use frame_extractor::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Telemetry message for the cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryMessage {
    pub message_type: String,
    pub message_id: Uuid,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl TelemetryMessage {
    /// Wrap a record.
    ///
    /// The record is expected to hold a JSON object but is not validated:
    /// anything that fails to parse is forwarded as a plain string.
    pub fn from_record(device_id: &str, record: &Record) -> Self {
        let payload = record
            .to_json()
            .unwrap_or_else(|_| Value::String(record.to_string()));

        Self {
            message_type: "telemetry".to_string(),
            message_id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Serialize for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>, SyncError> {
        serde_json::to_vec(self).map_err(|e| SyncError::Serialization(e.to_string()))
    }
}

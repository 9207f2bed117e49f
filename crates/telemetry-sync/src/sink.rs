//! Telemetry sinks

use crate::{SyncError, TelemetryConfig, TelemetryMessage, TelemetrySink};
use frame_extractor::Record;
use rumqttc::{AsyncClient, Event, MqttOptions, QoS};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Publishes records to an MQTT broker
pub struct MqttSink {
    config: TelemetryConfig,
    topic: String,
    client: AsyncClient,
    event_loop: JoinHandle<()>,
    published: u64,
}

impl MqttSink {
    /// Connect to the MQTT broker
    pub async fn connect(config: TelemetryConfig) -> Result<Self, SyncError> {
        if config.device_id.is_empty() {
            return Err(SyncError::Connection("device id is empty".to_string()));
        }

        let mut options = MqttOptions::new(
            format!("uart-{}", config.device_id),
            &config.broker_url,
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        // Spawn event loop handler
        let event_loop = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(incoming)) => {
                        debug!("MQTT incoming: {:?}", incoming);
                    }
                    Err(e) => {
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        let topic = config.topic();
        info!(
            "Connected to MQTT broker {}:{}, publishing to {}",
            config.broker_url, config.broker_port, topic
        );

        Ok(Self {
            config,
            topic,
            client,
            event_loop,
            published: 0,
        })
    }

    /// Records published so far
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl TelemetrySink for MqttSink {
    async fn send(&mut self, record: Record) -> Result<(), SyncError> {
        let message = TelemetryMessage::from_record(&self.config.device_id, &record);
        let payload = message.to_bytes()?;

        self.client
            .publish(&self.topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| SyncError::Publish(e.to_string()))?;

        self.published += 1;
        debug!("Published telemetry {} to {}", message.message_id, self.topic);
        Ok(())
    }

    fn name(&self) -> &str {
        "mqtt"
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

/// Logs records instead of uploading them
#[derive(Debug, Default)]
pub struct LogSink {
    logged: u64,
}

impl LogSink {
    /// Create a new log sink
    pub fn new() -> Self {
        info!("Telemetry upload disabled; records will only be logged");
        Self::default()
    }

    /// Records logged so far
    pub fn logged(&self) -> u64 {
        self.logged
    }
}

impl TelemetrySink for LogSink {
    async fn send(&mut self, record: Record) -> Result<(), SyncError> {
        self.logged += 1;
        info!("Telemetry record: {}", record);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_counts_records() {
        let mut sink = LogSink::new();
        let record = Record::from_frame(br#"{"a":1}"#).unwrap();

        sink.send(record).await.unwrap();
        sink.send(record).await.unwrap();

        assert_eq!(sink.logged(), 2);
        assert_eq!(sink.name(), "log");
    }

    #[tokio::test]
    async fn test_mqtt_sink_rejects_empty_device_id() {
        let config = TelemetryConfig {
            device_id: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            MqttSink::connect(config).await,
            Err(SyncError::Connection(_))
        ));
    }
}

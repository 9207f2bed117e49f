//! Pipeline configuration
//!
//! Layered from an optional TOML file and `UART_TELEMETRY__*` environment
//! variables (e.g. `UART_TELEMETRY__SERIAL__DEVICE=/dev/ttyS1`).

use crate::PipelineError;
use config::{Config, Environment, File, FileFormat};
use frame_extractor::ExtractorConfig;
use ring_buffer::{DEFAULT_BYTE_CAPACITY, DEFAULT_RECORD_CAPACITY};
use serde::{Deserialize, Serialize};
use serial_ingest::SerialConfig;
use std::net::SocketAddr;
use std::path::Path;
use telemetry_sync::TelemetryConfig;
use tracing::Level;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "uart-telemetry.toml";

const ENV_PREFIX: &str = "UART_TELEMETRY";

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Byte ring capacity; must hold at least one scan window
    pub byte_capacity: usize,
    /// Record ring capacity
    pub record_capacity: usize,
    /// Extraction tick period (milliseconds)
    pub extract_interval_ms: u64,
    /// Upload tick period (milliseconds), one record per tick
    pub upload_interval_ms: u64,
    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Prometheus exporter listen address
    pub metrics_addr: Option<SocketAddr>,

    pub serial: SerialConfig,
    pub extractor: ExtractorConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            byte_capacity: DEFAULT_BYTE_CAPACITY,
            record_capacity: DEFAULT_RECORD_CAPACITY,
            extract_interval_ms: 50,
            upload_interval_ms: 5000,
            log_level: "info".to_string(),
            log_json: false,
            metrics_addr: None,
            serial: SerialConfig::default(),
            extractor: ExtractorConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from `path` (or [`DEFAULT_CONFIG_FILE`] if present) plus environment
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, PipelineError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.byte_capacity == 0 || self.record_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "ring capacities must be > 0".to_string(),
            ));
        }
        if self.extract_interval_ms == 0 || self.upload_interval_ms == 0 {
            return Err(PipelineError::InvalidConfig(
                "tick intervals must be > 0".to_string(),
            ));
        }

        self.extractor.validate()?;
        if self.byte_capacity < self.extractor.window {
            return Err(PipelineError::InvalidConfig(format!(
                "byte capacity {} is smaller than the scan window {}",
                self.byte_capacity, self.extractor.window
            )));
        }

        self.serial.validate()?;
        if self.telemetry.upload_enabled && self.telemetry.device_id.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "telemetry.device_id is required when uploads are enabled".to_string(),
            ));
        }
        self.log_level()?;
        Ok(())
    }

    /// Parsed log level
    pub fn log_level(&self) -> Result<Level, PipelineError> {
        self.log_level
            .parse()
            .map_err(|_| PipelineError::InvalidConfig(format!("unknown log level {:?}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.byte_capacity, 1024);
        assert_eq!(config.record_capacity, 32);
        assert_eq!(config.upload_interval_ms, 5000);
        assert_eq!(config.extractor.min_fill, 80);
        assert_eq!(config.extractor.window, 100);
    }

    #[test]
    fn test_from_toml_overrides_nested_sections() {
        let config = PipelineConfig::from_toml_str(
            r#"
            byte_capacity = 512
            upload_interval_ms = 1000
            metrics_addr = "127.0.0.1:9000"

            [serial]
            device = "/dev/ttyS1"
            echo = true

            [extractor]
            min_fill = 40

            [telemetry]
            device_id = "asg210-lab"
            upload_enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.byte_capacity, 512);
        assert_eq!(config.record_capacity, 32);
        assert_eq!(config.serial.device, "/dev/ttyS1");
        assert_eq!(config.serial.baud_rate, 115200);
        assert!(config.serial.echo);
        assert_eq!(config.extractor.min_fill, 40);
        assert_eq!(config.extractor.window, 100);
        assert_eq!(config.telemetry.device_id, "asg210-lab");
        assert!(!config.telemetry.upload_enabled);
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9000".parse().unwrap()));
    }

    #[test]
    fn test_rejects_byte_ring_smaller_than_window() {
        let config = PipelineConfig {
            byte_capacity: 64,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_record_capacity() {
        let result = PipelineConfig::from_toml_str("record_capacity = 0");
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_window() {
        let result = PipelineConfig::from_toml_str("[extractor]\nwindow = 4096");
        assert!(matches!(result, Err(PipelineError::Extractor(_))));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let config = PipelineConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

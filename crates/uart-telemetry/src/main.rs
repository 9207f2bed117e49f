//! UART Telemetry - Main Entry Point

use anyhow::Context;
use serial_ingest::SerialSource;
use std::path::PathBuf;
use telemetry_sync::{LogSink, MqttSink};
use tracing::info;
use uart_telemetry::{init_logging, init_metrics, run, PipelineConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())
        .context("failed to load configuration")?;

    init_logging(config.log_level()?, config.log_json)?;
    init_metrics(config.metrics_addr)?;

    info!("=== UART Telemetry v{} ===", env!("CARGO_PKG_VERSION"));

    let mut source = SerialSource::open(&config.serial)
        .with_context(|| format!("failed to open {}", config.serial.device))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = if config.telemetry.upload_enabled {
        let mut sink = MqttSink::connect(config.telemetry.clone()).await?;
        run(&config, &mut source, &mut sink, shutdown).await?
    } else {
        let mut sink = LogSink::new();
        run(&config, &mut source, &mut sink, shutdown).await?
    };

    info!("Final statistics: {:?}", summary);
    Ok(())
}

//! Cooperative run loop
//!
//! Serial reads, extraction ticks and upload ticks are multiplexed on one
//! task, so the rings are never touched concurrently and need no lock.

use crate::config::PipelineConfig;
use crate::observability::{RECORDS_FAILED, RECORDS_SENT};
use crate::stage::{Stage, StageStats};
use crate::PipelineError;
use metrics::counter;
use serial_ingest::SerialSource;
use std::future::Future;
use std::time::Duration;
use telemetry_sync::TelemetrySink;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Totals reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stage: StageStats,
    pub records_sent: u64,
    pub records_failed: u64,
}

/// Run until the source reaches end of stream or `shutdown` resolves.
///
/// On exit the extractor is flushed and every staged record is handed to
/// the sink before returning.
pub async fn run<S, F>(
    config: &PipelineConfig,
    source: &mut SerialSource,
    sink: &mut S,
    shutdown: F,
) -> Result<RunSummary, PipelineError>
where
    S: TelemetrySink,
    F: Future<Output = ()>,
{
    let mut stage = Stage::new(config)?;
    let mut summary = RunSummary::default();
    let mut buf = vec![0u8; config.serial.read_chunk];

    let mut extract_tick = interval(Duration::from_millis(config.extract_interval_ms));
    extract_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut upload_tick = interval(Duration::from_millis(config.upload_interval_ms));
    upload_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);
    info!(
        "Pipeline running: serial={}, sink={}",
        source.device(),
        sink.name()
    );

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            read = source.read_chunk(&mut buf) => {
                let n = read?;
                if n == 0 {
                    break;
                }
                stage.ingest(&buf[..n]);
                if config.serial.echo {
                    source.write_all(&buf[..n]).await?;
                }
            }
            _ = extract_tick.tick() => {
                stage.extract();
            }
            _ = upload_tick.tick() => {
                if let Some(record) = stage.next_record() {
                    deliver(sink, record, &mut summary).await;
                }
            }
        }
    }

    let flushed = stage.flush();
    let pending = stage.pending_records();
    debug!("Flushed {} frames, draining {} records", flushed, pending);
    while let Some(record) = stage.next_record() {
        deliver(sink, record, &mut summary).await;
    }

    summary.stage = stage.stats();
    info!(
        "Pipeline stopped: {} frames extracted, {} sent, {} failed",
        summary.stage.frames_extracted, summary.records_sent, summary.records_failed
    );
    Ok(summary)
}

async fn deliver<S: TelemetrySink>(
    sink: &mut S,
    record: frame_extractor::Record,
    summary: &mut RunSummary,
) {
    match sink.send(record).await {
        Ok(()) => {
            summary.records_sent += 1;
            counter!(RECORDS_SENT).increment(1);
        }
        Err(e) => {
            // Lossy by policy: a failed upload is not retried
            warn!("Could not send telemetry via {}: {}", sink.name(), e);
            summary.records_failed += 1;
            counter!(RECORDS_FAILED).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_extractor::Record;
    use telemetry_sync::SyncError;

    const FRAMES: [&str; 3] = [
        r#"{"accel_amp_x": 0.0044, "accel_amp_y": 0.0023, "accel_amp_z": 0.0065, "temperature": 28.7593}"#,
        r#"{"accel_amp_x": 0.0051, "accel_amp_y": 0.0019, "accel_amp_z": 0.0071, "temperature": 28.7611}"#,
        r#"{"accel_amp_x": 0.0047, "accel_amp_y": 0.0025, "accel_amp_z": 0.0060, "temperature": 28.7634}"#,
    ];

    #[derive(Default)]
    struct RecordingSink {
        records: Vec<Record>,
        fail: bool,
    }

    impl TelemetrySink for RecordingSink {
        async fn send(&mut self, record: Record) -> Result<(), SyncError> {
            if self.fail {
                return Err(SyncError::Publish("broker unreachable".to_string()));
            }
            self.records.push(record);
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            extract_interval_ms: 50,
            upload_interval_ms: 100,
            ..Default::default()
        }
    }

    fn sensor_stream() -> SerialSource {
        // One frame per sensor period, each terminated by CRLF
        SerialSource::mock(FRAMES.iter().map(|f| format!("{f}\r\n").into_bytes()))
            .with_pace(Duration::from_millis(200))
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_reach_sink_in_order() {
        let config = test_config();
        let mut source = sensor_stream();
        let mut sink = RecordingSink::default();

        let summary = run(&config, &mut source, &mut sink, std::future::pending())
            .await
            .unwrap();

        let delivered: Vec<String> = sink.records.iter().map(|r| r.to_string()).collect();
        assert_eq!(delivered, FRAMES);
        assert_eq!(summary.records_sent, 3);
        assert_eq!(summary.stage.frames_extracted, 3);
        assert_eq!(summary.stage.bytes_resynced, 4);
        assert_eq!(summary.stage.bytes_evicted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_uploads_are_counted_and_dropped() {
        let config = test_config();
        let mut source = sensor_stream();
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };

        let summary = run(&config, &mut source, &mut sink, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.records_sent, 0);
        assert_eq!(summary.records_failed, 3);
        assert!(sink.records.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_staged_records() {
        let config = test_config();
        let frame = format!("{}\r\n", FRAMES[0]).into_bytes();
        // Second chunk arrives long after shutdown
        let mut source = SerialSource::mock([frame.clone(), frame]).with_pace(Duration::from_secs(1));
        let mut sink = RecordingSink::default();

        let shutdown = tokio::time::sleep(Duration::from_millis(1500));
        let summary = run(&config, &mut source, &mut sink, shutdown).await.unwrap();

        assert_eq!(summary.records_sent, 1);
        assert_eq!(sink.records[0].to_string(), FRAMES[0]);
        assert!(!source.is_closed());
    }

    #[tokio::test]
    async fn test_echo_writes_back_received_bytes() {
        let mut config = test_config();
        config.serial.echo = true;
        let mut source = SerialSource::mock([b"abc".to_vec(), b"def".to_vec()]);
        let mut sink = RecordingSink::default();

        run(&config, &mut source, &mut sink, std::future::pending())
            .await
            .unwrap();

        assert_eq!(source.mock_written(), Some(&b"abcdef"[..]));
    }
}

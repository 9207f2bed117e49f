//! Staging area between the UART and the uploader
//!
//! Owns the byte ring, the record ring and the extractor. Overflow is never
//! an error here: it is counted, logged and the oldest data is dropped.

use crate::config::PipelineConfig;
use crate::observability::{
    BYTES_EVICTED, BYTES_INGESTED, BYTES_RESYNCED, BYTE_RING_FILL, FRAMES_EXTRACTED,
    RECORDS_EVICTED,
};
use crate::PipelineError;
use frame_extractor::{Extraction, FrameExtractor, Record};
use metrics::{counter, gauge};
use ring_buffer::RingBuffer;
use tracing::{debug, info, warn};

/// Counters accumulated by a [`Stage`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    pub bytes_ingested: u64,
    pub bytes_evicted: u64,
    pub bytes_resynced: u64,
    pub frames_extracted: u64,
    pub records_evicted: u64,
}

/// Byte ring + record ring + extractor, driven by a single task
#[derive(Debug)]
pub struct Stage {
    bytes: RingBuffer<u8>,
    records: RingBuffer<Record>,
    extractor: FrameExtractor,
    stats: StageStats,
}

impl Stage {
    /// Build the rings described by `config`
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        info!(
            "Staging rings: {} bytes, {} records",
            config.byte_capacity, config.record_capacity
        );

        Ok(Self {
            bytes: RingBuffer::new(config.byte_capacity),
            records: RingBuffer::new(config.record_capacity),
            extractor: FrameExtractor::new(config.extractor)?,
            stats: StageStats::default(),
        })
    }

    /// Push a chunk from the UART, dropping the oldest bytes on overflow
    pub fn ingest(&mut self, chunk: &[u8]) -> usize {
        let evicted_before = self.bytes.total_evicted();
        let accepted = self.bytes.enqueue(chunk);
        let evicted = self.bytes.total_evicted() - evicted_before;

        self.stats.bytes_ingested += accepted as u64;
        counter!(BYTES_INGESTED).increment(accepted as u64);
        if evicted > 0 {
            warn!("Byte ring overflow: dropped {} oldest bytes", evicted);
            self.stats.bytes_evicted += evicted;
            counter!(BYTES_EVICTED).increment(evicted);
        }
        gauge!(BYTE_RING_FILL).set(self.bytes.fill_ratio());
        accepted
    }

    /// Run one extraction attempt
    pub fn extract(&mut self) -> Extraction {
        let evicted_before = self.records.total_evicted();
        let outcome = self.extractor.extract(&mut self.bytes, &mut self.records);

        match outcome {
            Extraction::Produced { len } => {
                debug!("Frame of {} bytes staged, {} pending", len, self.records.len());
                self.stats.frames_extracted += 1;
                counter!(FRAMES_EXTRACTED).increment(1);
            }
            Extraction::Resynced { discarded } => {
                self.stats.bytes_resynced += discarded as u64;
                counter!(BYTES_RESYNCED).increment(discarded as u64);
            }
            Extraction::Starved | Extraction::Incomplete => {}
        }

        let evicted = self.records.total_evicted() - evicted_before;
        if evicted > 0 {
            warn!("Record ring full: dropped {} oldest records", evicted);
            self.stats.records_evicted += evicted;
            counter!(RECORDS_EVICTED).increment(evicted);
        }
        gauge!(BYTE_RING_FILL).set(self.bytes.fill_ratio());
        outcome
    }

    /// Extract until no more progress is possible, returning frames produced
    pub fn flush(&mut self) -> usize {
        let mut produced = 0;
        loop {
            match self.extract() {
                Extraction::Produced { .. } => produced += 1,
                outcome if outcome.made_progress() => {}
                _ => return produced,
            }
        }
    }

    /// Take the oldest staged record
    pub fn next_record(&mut self) -> Option<Record> {
        self.records.pop()
    }

    /// Bytes waiting for extraction
    pub fn buffered_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Records waiting for upload
    pub fn pending_records(&self) -> usize {
        self.records.len()
    }

    /// Counters since construction
    pub fn stats(&self) -> StageStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_extractor::ExtractorConfig;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            byte_capacity: 128,
            record_capacity: 2,
            extractor: ExtractorConfig {
                min_fill: 1,
                window: 100,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_extract_and_take() {
        let mut stage = Stage::new(&small_config()).unwrap();
        stage.ingest(br#"noise{"a":1}tail"#);

        assert_eq!(stage.extract(), Extraction::Resynced { discarded: 5 });
        assert_eq!(stage.extract(), Extraction::Produced { len: 7 });
        assert_eq!(stage.buffered_bytes(), 4);
        assert_eq!(stage.next_record().unwrap().frame(), br#"{"a":1}"#);
        assert!(stage.next_record().is_none());

        let stats = stage.stats();
        assert_eq!(stats.bytes_ingested, 16);
        assert_eq!(stats.bytes_resynced, 5);
        assert_eq!(stats.frames_extracted, 1);
    }

    #[test]
    fn test_byte_overflow_is_counted() {
        let mut stage = Stage::new(&small_config()).unwrap();
        assert_eq!(stage.ingest(&[b'x'; 200]), 200);

        assert_eq!(stage.buffered_bytes(), 128);
        assert_eq!(stage.stats().bytes_evicted, 72);
    }

    #[test]
    fn test_record_overflow_keeps_newest() {
        let mut stage = Stage::new(&small_config()).unwrap();
        for frame in [br#"{"r":1}"#, br#"{"r":2}"#, br#"{"r":3}"#] {
            stage.ingest(frame);
            stage.extract();
        }

        assert_eq!(stage.pending_records(), 2);
        assert_eq!(stage.stats().records_evicted, 1);
        assert_eq!(stage.next_record().unwrap().frame(), br#"{"r":2}"#);
        assert_eq!(stage.next_record().unwrap().frame(), br#"{"r":3}"#);
    }

    #[test]
    fn test_flush_stops_on_incomplete() {
        let mut stage = Stage::new(&small_config()).unwrap();
        stage.ingest(br#"--{"a":1}{"b""#);

        // Last `{` starts the partial frame, so the complete one is skipped
        assert_eq!(stage.flush(), 0);
        assert_eq!(stage.buffered_bytes(), 4);
        assert_eq!(stage.stats().bytes_resynced, 9);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PipelineConfig {
            record_capacity: 0,
            ..Default::default()
        };
        assert!(Stage::new(&config).is_err());
    }
}

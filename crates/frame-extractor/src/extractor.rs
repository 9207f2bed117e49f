//! Brace-Delimited Frame Extractor

use crate::record::{Record, RECORD_LEN};
use crate::ExtractorError;
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

/// Bytes that must be buffered before a scan is attempted
pub const DEFAULT_MIN_FILL: usize = 80;

/// Bytes inspected per scan
pub const DEFAULT_WINDOW: usize = 100;

const FRAME_START: u8 = b'{';
const FRAME_END: u8 = b'}';

/// Extractor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Minimum buffered bytes before scanning (default: 80)
    pub min_fill: usize,
    /// Scan window in bytes (default: 100, at most [`RECORD_LEN`])
    pub window: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_fill: DEFAULT_MIN_FILL,
            window: DEFAULT_WINDOW,
        }
    }
}

impl ExtractorConfig {
    /// Check the window fits a record
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.window == 0 {
            return Err(ExtractorError::InvalidConfig(
                "window must be > 0".to_string(),
            ));
        }
        if self.window > RECORD_LEN {
            return Err(ExtractorError::InvalidConfig(format!(
                "window {} exceeds record width {}",
                self.window, RECORD_LEN
            )));
        }
        Ok(())
    }
}

/// Outcome of one extraction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Not enough bytes buffered to scan
    Starved,
    /// No closing brace yet; the byte ring is left untouched
    Incomplete,
    /// Leading garbage was dropped from the byte ring
    Resynced { discarded: usize },
    /// One record was pushed into the record ring
    Produced { len: usize },
}

impl Extraction {
    /// True when the byte ring changed
    pub fn made_progress(&self) -> bool {
        matches!(self, Self::Resynced { .. } | Self::Produced { .. })
    }
}

/// Scans the byte ring for `{ ... }` frames and promotes them to records.
///
/// Each call re-evaluates the ring from scratch; the scratch buffer is reused
/// only to avoid reallocating.
#[derive(Debug)]
pub struct FrameExtractor {
    config: ExtractorConfig,
    scratch: Vec<u8>,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        let config = ExtractorConfig::default();
        Self {
            scratch: vec![0; config.window],
            config,
        }
    }
}

impl FrameExtractor {
    /// Create an extractor with a validated config
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        Ok(Self {
            scratch: vec![0; config.window],
            config,
        })
    }

    /// Get the active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run one extraction attempt.
    ///
    /// The window is searched for the last `{` and the last `}`. Bytes before
    /// that `{` are discarded; when the window starts exactly at `{`, the span
    /// through the `}` becomes one record.
    pub fn extract(
        &mut self,
        bytes: &mut RingBuffer<u8>,
        records: &mut RingBuffer<Record>,
    ) -> Extraction {
        let buffered = bytes.len();
        if buffered < self.config.min_fill {
            return Extraction::Starved;
        }

        let window = &mut self.scratch[..buffered.min(self.config.window)];
        let scanned = bytes.peek(window);
        let window = &window[..scanned];

        let start = window.iter().rposition(|&b| b == FRAME_START);
        let Some(end) = window.iter().rposition(|&b| b == FRAME_END) else {
            trace!("No frame end in {} buffered bytes", buffered);
            return Extraction::Incomplete;
        };

        match start {
            Some(0) => {
                let mut record = Record::default();
                let len = (end + 1).min(RECORD_LEN);
                let copied = bytes.dequeue(&mut record.bytes_mut()[..len]);

                if records.is_full() {
                    debug!("Record ring full, dropping oldest record");
                }
                if let Err(e) = records.enqueue_one(record) {
                    error!("Record ring bookkeeping inconsistent: {}", e);
                }
                debug!("Extracted {}-byte frame", copied);
                Extraction::Produced { len: copied }
            }
            Some(start) => {
                let discarded = bytes.discard(start);
                debug!("Resync: discarded {} bytes before frame start", discarded);
                Extraction::Resynced { discarded }
            }
            None => {
                // A close with no open anywhere in view can never begin a frame
                let discarded = bytes.discard(end + 1);
                debug!("Resync: discarded {} bytes through orphan frame end", discarded);
                Extraction::Resynced { discarded }
            }
        }
    }
}

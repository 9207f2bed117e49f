//! Serial Byte Source
//!
//! Reads raw bytes from a UART (or a scripted mock) for the byte ring.

use crate::error::IngestError;
use crate::DEFAULT_READ_CHUNK;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, warn};

/// Serial port configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub device: String,
    /// Baud rate, 8N1 framing
    pub baud_rate: u32,
    /// Read buffer size per readiness event
    pub read_chunk: usize,
    /// Write every received chunk back to the port
    pub echo: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            read_chunk: DEFAULT_READ_CHUNK,
            echo: false,
        }
    }
}

impl SerialConfig {
    /// Validate before touching the port
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.device.is_empty() {
            return Err(IngestError::InvalidConfig("device path is empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(IngestError::InvalidConfig("baud rate must be > 0".to_string()));
        }
        if self.read_chunk == 0 {
            return Err(IngestError::InvalidConfig("read chunk must be > 0".to_string()));
        }
        Ok(())
    }
}

enum Transport {
    Port(SerialStream),
    /// Scripted chunks replayed in order, then end of stream
    Mock {
        chunks: VecDeque<Vec<u8>>,
        written: Vec<u8>,
        /// Delay before each chunk, emulating a slow sender
        pace: Option<Duration>,
        /// Pending delivery time; survives a cancelled read
        deadline: Option<Instant>,
    },
}

/// Async UART reader
pub struct SerialSource {
    /// Device path, "mock" for scripted sources
    device: String,
    transport: Transport,
    /// Set once end of stream was reported
    closed: bool,
    /// Total bytes read (for statistics)
    bytes_read: u64,
}

impl SerialSource {
    /// Open the serial port described by `config`
    pub fn open(config: &SerialConfig) -> Result<Self, IngestError> {
        config.validate()?;
        info!(
            "Opening serial source {} at {} baud",
            config.device, config.baud_rate
        );

        let stream = tokio_serial::new(&config.device, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(10))
            .open_native_async()?;

        Ok(Self {
            device: config.device.clone(),
            transport: Transport::Port(stream),
            closed: false,
            bytes_read: 0,
        })
    }

    /// Create a mock source that replays `chunks` (no hardware required)
    pub fn mock<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        let chunks: VecDeque<Vec<u8>> = chunks.into_iter().map(Into::into).collect();
        info!("Creating mock serial source with {} chunks", chunks.len());
        Self {
            device: "mock".to_string(),
            transport: Transport::Mock {
                chunks,
                written: Vec::new(),
                pace: None,
                deadline: None,
            },
            closed: false,
            bytes_read: 0,
        }
    }

    /// Delay each mock chunk by `pace`, counted from the first read waiting on it
    pub fn with_pace(mut self, pace: Duration) -> Self {
        if let Transport::Mock { pace: slot, .. } = &mut self.transport {
            *slot = Some(pace);
        }
        self
    }

    /// Read the next available chunk into `buf`.
    ///
    /// Returns `Ok(0)` once at end of stream; further reads fail with
    /// [`IngestError::Closed`]. Cancel safe: no bytes are lost if the future
    /// is dropped before completion.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, IngestError> {
        if self.closed {
            return Err(IngestError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let n = match &mut self.transport {
            Transport::Port(stream) => stream.read(buf).await?,
            Transport::Mock {
                chunks,
                pace,
                deadline,
                ..
            } => {
                if let (Some(pace), false) = (*pace, chunks.is_empty()) {
                    let due = *deadline.get_or_insert_with(|| Instant::now() + pace);
                    tokio::time::sleep_until(due).await;
                    *deadline = None;
                }
                match chunks.pop_front() {
                    Some(mut chunk) => {
                        let n = chunk.len().min(buf.len());
                        buf[..n].copy_from_slice(&chunk[..n]);
                        if n < chunk.len() {
                            chunks.push_front(chunk.split_off(n));
                        }
                        n
                    }
                    None => 0,
                }
            }
        };

        if n == 0 {
            info!("Serial source {} reached end of stream", self.device);
            self.closed = true;
        } else {
            debug!("Read {} bytes from {}", n, self.device);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }

    /// Write `data` back to the port
    pub async fn write_all(&mut self, data: &[u8]) -> Result<(), IngestError> {
        match &mut self.transport {
            Transport::Port(stream) => {
                if let Err(e) = stream.write_all(data).await {
                    warn!("Serial write to {} failed: {}", self.device, e);
                    return Err(e.into());
                }
            }
            Transport::Mock { written, .. } => written.extend_from_slice(data),
        }
        Ok(())
    }

    /// Bytes written back to a mock source
    pub fn mock_written(&self) -> Option<&[u8]> {
        match &self.transport {
            Transport::Mock { written, .. } => Some(written.as_slice()),
            Transport::Port(_) => None,
        }
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Check if end of stream was reached
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total bytes read since open
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

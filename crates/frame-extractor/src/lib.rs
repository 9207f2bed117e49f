//! Frame Extraction
//!
//! Turns the raw UART byte stream held in a [`ring_buffer::RingBuffer<u8>`]
//! into fixed-width [`Record`]s. Framing is a best-effort brace heuristic:
//! leading noise is dropped until the buffered stream starts with `{`, and a
//! frame is cut at the last `}` seen in the scan window.

mod error;
mod extractor;
mod record;

pub use error::ExtractorError;
pub use extractor::{
    Extraction, ExtractorConfig, FrameExtractor, DEFAULT_MIN_FILL, DEFAULT_WINDOW,
};
pub use record::{Record, RECORD_LEN};

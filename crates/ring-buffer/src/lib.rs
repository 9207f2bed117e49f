//! Overwrite Ring Buffer
//!
//! Fixed-capacity circular buffer with drop-oldest semantics. The same type
//! backs the raw UART byte stream (`RingBuffer<u8>`) and the queue of framed
//! records awaiting upload.

mod buffer;
mod error;

pub use buffer::RingBuffer;
pub use error::RingError;

/// Default byte ring capacity
pub const DEFAULT_BYTE_CAPACITY: usize = 1024;

/// Default record ring capacity
pub const DEFAULT_RECORD_CAPACITY: usize = 32;

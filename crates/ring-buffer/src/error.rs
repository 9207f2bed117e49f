//! Ring Buffer Error Types

use thiserror::Error;

/// Errors reported by ring buffer primitives.
///
/// Capacity exhaustion is deliberately absent: overflow evicts the oldest
/// elements instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// Indexed copy would read past the physical end of storage
    #[error("copy of {len} elements from slot {from} exceeds capacity {capacity}")]
    OutOfRange {
        from: usize,
        len: usize,
        capacity: usize,
    },

    /// Bulk write larger than the ring can hold in one pass
    #[error("chunk of {len} elements exceeds capacity {capacity}")]
    ChunkTooLarge { len: usize, capacity: usize },

    /// Eviction asked for more elements than are buffered
    #[error("cannot evict {requested} elements, only {available} buffered")]
    EvictionUnderflow { requested: usize, available: usize },

    /// Backing storage has no slots
    #[error("ring capacity must be non-zero")]
    ZeroCapacity,
}

//! Overwrite Ring Buffer Implementation

use crate::RingError;
use std::fmt;

/// Bounded circular buffer that evicts its oldest elements when full.
///
/// The ring tracks the read cursor and the used length; the write cursor is
/// derived from them, so full and empty never need a separate wrap counter.
/// Not synchronized: callers that share a ring across tasks must wrap it in a
/// lock.
pub struct RingBuffer<T> {
    /// Pre-allocated storage, length == capacity
    storage: Box<[T]>,
    /// Index of the oldest buffered element
    read: usize,
    /// Number of buffered elements
    len: usize,
    /// Total elements accepted (for statistics)
    total_enqueued: u64,
    /// Total elements dropped to make room (for statistics)
    total_evicted: u64,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring with `capacity` default-initialized slots
    ///
    /// # Panics
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring capacity must be > 0");
        Self::from_boxed(vec![T::default(); capacity].into_boxed_slice())
    }

    /// Build a ring over caller-supplied storage, resetting every slot
    pub fn from_storage(mut storage: Box<[T]>) -> Result<Self, RingError> {
        if storage.is_empty() {
            return Err(RingError::ZeroCapacity);
        }
        storage.fill(T::default());
        Ok(Self::from_boxed(storage))
    }

    fn from_boxed(storage: Box<[T]>) -> Self {
        Self {
            storage,
            read: 0,
            len: 0,
            total_enqueued: 0,
            total_evicted: 0,
        }
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the ring holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the next enqueue will evict
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Get the ring capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Free slots before eviction kicks in
    pub fn free(&self) -> usize {
        self.capacity() - self.len
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Index of the next slot to read
    pub fn read_cursor(&self) -> usize {
        self.read
    }

    /// Index of the next slot to write
    pub fn write_cursor(&self) -> usize {
        (self.read + self.len) % self.capacity()
    }

    /// True when the buffered span crosses the physical end of storage,
    /// i.e. the write cursor has lapped back behind (or onto) the read cursor.
    pub fn is_wrapped(&self) -> bool {
        self.len > 0 && self.read + self.len >= self.capacity()
    }

    /// Total elements accepted since construction
    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }

    /// Total elements evicted by overflow since construction
    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }

    /// Enqueue a single element, evicting the oldest one if the ring is full.
    ///
    /// An error here means the ring's bookkeeping is inconsistent; it is never
    /// caused by the ring being full.
    pub fn enqueue_one(&mut self, item: T) -> Result<(), RingError> {
        if self.is_full() {
            self.evict(1)?;
        }

        let write = self.write_cursor();
        self.storage[write] = item;
        self.len += 1;
        self.total_enqueued += 1;
        Ok(())
    }

    /// Enqueue up to `capacity` elements in a single pass.
    ///
    /// Evicts exactly `items.len() - free()` oldest elements when short on
    /// room, then writes in at most two contiguous segments.
    pub fn enqueue_bulk(&mut self, items: &[T]) -> Result<(), RingError> {
        let count = items.len();
        let capacity = self.capacity();
        if count == 0 {
            return Ok(());
        }
        if count > capacity {
            return Err(RingError::ChunkTooLarge {
                len: count,
                capacity,
            });
        }

        let free = self.free();
        if free < count {
            self.evict(count - free)?;
        }

        let write = self.write_cursor();
        let head = count.min(capacity - write);
        self.storage[write..write + head].copy_from_slice(&items[..head]);
        // Wrapped remainder, empty when the write fits before the end
        self.storage[..count - head].copy_from_slice(&items[head..]);

        self.len += count;
        self.total_enqueued += count as u64;
        Ok(())
    }

    /// Enqueue any number of elements, newest data winning on overflow.
    ///
    /// Inputs larger than the capacity are written in capacity-sized chunks,
    /// so only the final `capacity` elements survive. Returns the number of
    /// elements accepted, which is `items.len()` unless an internal
    /// inconsistency cut the write short.
    pub fn enqueue(&mut self, items: &[T]) -> usize {
        let capacity = self.capacity();

        match items.len() {
            0 => 0,
            1 => match self.enqueue_one(items[0]) {
                Ok(()) => 1,
                Err(_) => 0,
            },
            count if count > capacity => {
                let mut accepted = 0;
                for chunk in items.chunks(capacity) {
                    if self.enqueue_bulk(chunk).is_err() {
                        return accepted;
                    }
                    accepted += chunk.len();
                }
                accepted
            }
            count => match self.enqueue_bulk(items) {
                Ok(()) => count,
                Err(_) => 0,
            },
        }
    }

    /// Copy `out.len()` slots starting at physical index `from`.
    ///
    /// Single-segment primitive: a range that runs past the end of storage is
    /// rejected rather than wrapped.
    pub fn copy_from(&self, from: usize, out: &mut [T]) -> Result<(), RingError> {
        let capacity = self.capacity();
        if from + out.len() > capacity {
            return Err(RingError::OutOfRange {
                from,
                len: out.len(),
                capacity,
            });
        }
        out.copy_from_slice(&self.storage[from..from + out.len()]);
        Ok(())
    }

    /// Copy the oldest `min(out.len(), len())` elements without consuming them.
    ///
    /// Returns 0 for an empty `out` or an empty ring.
    pub fn peek(&self, out: &mut [T]) -> usize {
        let count = out.len().min(self.len);
        if count == 0 {
            return 0;
        }

        let head = count.min(self.capacity() - self.read);
        let (front, back) = out[..count].split_at_mut(head);
        let copied = self
            .copy_from(self.read, front)
            .and_then(|()| self.copy_from(0, back));

        match copied {
            Ok(()) => count,
            Err(_) => 0,
        }
    }

    /// Move the oldest `min(out.len(), len())` elements into `out`.
    ///
    /// Returns 0 without touching the cursors for an empty `out` or an empty
    /// ring.
    pub fn dequeue(&mut self, out: &mut [T]) -> usize {
        let count = self.peek(out);
        self.advance_read(count);
        count
    }

    /// Remove and return the oldest element
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.storage[self.read];
        self.advance_read(1);
        Some(item)
    }

    /// Drop the oldest element without reading it
    pub fn skip_one(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.advance_read(1);
        true
    }

    /// Drop up to `count` oldest elements, returning how many were dropped
    pub fn discard(&mut self, count: usize) -> usize {
        let count = count.min(self.len);
        self.advance_read(count);
        count
    }

    /// Buffered elements as up to two slices in oldest-to-newest order
    pub fn segments(&self) -> (&[T], &[T]) {
        let head = self.len.min(self.capacity() - self.read);
        (
            &self.storage[self.read..self.read + head],
            &self.storage[..self.len - head],
        )
    }

    /// Snapshot of the buffered elements, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        let (front, back) = self.segments();
        let mut items = Vec::with_capacity(self.len);
        items.extend_from_slice(front);
        items.extend_from_slice(back);
        items
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.read = self.write_cursor();
        self.len = 0;
    }

    fn evict(&mut self, count: usize) -> Result<(), RingError> {
        if count > self.len {
            return Err(RingError::EvictionUnderflow {
                requested: count,
                available: self.len,
            });
        }
        self.advance_read(count);
        self.total_evicted += count as u64;
        Ok(())
    }

    fn advance_read(&mut self, count: usize) {
        self.read = (self.read + count) % self.capacity();
        self.len -= count;
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.storage.len())
            .field("read", &self.read)
            .field("len", &self.len)
            .field("total_enqueued", &self.total_enqueued)
            .field("total_evicted", &self.total_evicted)
            .finish()
    }
}

//! Ring Buffer Implementation

/// Single-owner FIFO ring buffer with a fixed capacity
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Box<[Option<T>]>,
    /// Next write position
    head: usize,
    /// Number of occupied slots
    len: usize,
    /// Total items written (for statistics)
    total_written: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be > 0");
        let storage: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Self {
            storage: storage.into_boxed_slice(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        let evicted = self.storage[self.head].replace(item);
        self.head = (self.head + 1) % capacity;
        self.total_written += 1;

        if self.len < capacity {
            self.len += 1;
            None
        } else {
            evicted
        }
    }

    /// Number of items currently in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let capacity = self.capacity();
        let start = (self.head + capacity - self.len) % capacity;
        (0..self.len).filter_map(move |i| self.storage[(start + i) % capacity].as_ref())
    }

    /// Most recently pushed item
    pub fn latest(&self) -> Option<&T> {
        self.iter().next_back()
    }

    /// Oldest item still held
    pub fn oldest(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Get total items written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for slot in self.storage.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

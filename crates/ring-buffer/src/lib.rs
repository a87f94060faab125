//! Fixed-Capacity Ring Buffer
//!
//! Bounded FIFO history for per-frame samples. Pushing into a full buffer
//! evicts the oldest entry.

mod buffer;

pub use buffer::RingBuffer;

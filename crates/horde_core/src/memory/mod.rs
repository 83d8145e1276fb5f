//! # Memory Management
//!
//! Reusable buffers for per-frame scratch data.
//!
//! Spatial indices are cleared and rebuilt every frame. Recycling their
//! bucket vectors through a pool keeps the steady state free of heap
//! allocations once the first few frames have warmed it up.

mod pool;

pub use pool::BufferPool;

//! # Buffer Pool
//!
//! Free list of cleared `Vec<T>` buffers.

/// A pool of reusable vectors.
///
/// Buffers handed back with [`BufferPool::release`] are cleared but keep their
/// capacity, so the next [`BufferPool::acquire`] does not allocate.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per owner.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: BufferPool<EntityId> = BufferPool::with_capacity(64, 16);
///
/// let mut bucket = pool.acquire(); // no allocation
/// bucket.push(id);
/// pool.release(bucket);           // cleared, capacity kept
/// ```
#[derive(Debug)]
pub struct BufferPool<T> {
    /// Cleared buffers ready for reuse.
    free: Vec<Vec<T>>,
    /// Capacity given to freshly allocated buffers.
    buffer_capacity: usize,
}

impl<T> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BufferPool<T> {
    /// Creates an empty pool. Buffers are allocated lazily.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            free: Vec::new(),
            buffer_capacity: 0,
        }
    }

    /// Creates a pool pre-filled with `buffers` vectors of `buffer_capacity`.
    #[must_use]
    pub fn with_capacity(buffers: usize, buffer_capacity: usize) -> Self {
        let free = (0..buffers)
            .map(|_| Vec::with_capacity(buffer_capacity))
            .collect();
        Self {
            free,
            buffer_capacity,
        }
    }

    /// Takes an empty buffer from the pool, allocating one if none is free.
    #[inline]
    pub fn acquire(&mut self) -> Vec<T> {
        self.free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.buffer_capacity))
    }

    /// Returns a buffer to the pool. Its contents are dropped.
    #[inline]
    pub fn release(&mut self, mut buffer: Vec<T>) {
        buffer.clear();
        self.free.push(buffer);
    }

    /// Number of buffers ready for reuse.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_prefill() {
        let mut pool: BufferPool<u32> = BufferPool::with_capacity(4, 32);
        assert_eq!(pool.available(), 4);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 32);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn test_pool_release_clears_and_keeps_capacity() {
        let mut pool: BufferPool<u32> = BufferPool::new();
        let mut buf = pool.acquire();
        buf.extend(0..100);
        let cap = buf.capacity();

        pool.release(buf);
        assert_eq!(pool.available(), 1);

        let reused = pool.acquire();
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), cap);
    }

    #[test]
    fn test_pool_grows_on_demand() {
        let mut pool: BufferPool<u8> = BufferPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.available(), 2);
    }
}

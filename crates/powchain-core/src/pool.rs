//! Reusable serialization buffers.
//!
//! The buffered digest path encodes into a scratch buffer on every call.
//! [`BufferPool`] keeps a bounded free list of those buffers. Each
//! [`acquire`](BufferPool::acquire) hands out an exclusively owned buffer;
//! dropping the guard clears it and returns it, on every exit path.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// A bounded free list of byte buffers.
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
    max_buffer: usize,
}

impl BufferPool {
    /// Create a pool that retains at most `capacity` buffers, each of at
    /// most `max_buffer` bytes of capacity.
    pub fn new(capacity: usize, max_buffer: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            max_buffer,
        }
    }

    /// Take an empty buffer, reusing a pooled one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self.free.lock().pop().unwrap_or_default();
        PooledBuffer { pool: self, buf }
    }

    /// Number of buffers currently idle in the pool.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() == 0 || buf.capacity() > self.max_buffer {
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(buf);
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity)
            .field("max_buffer", &self.max_buffer)
            .finish()
    }
}

/// A buffer on loan from a [`BufferPool`].
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl PooledBuffer<'_> {
    /// Copy the contents into a caller-owned vector.
    pub fn to_owned_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_returned_and_cleared() {
        let pool = BufferPool::new(4, 1024);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"secret");
        }
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 6);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_concurrent_acquisitions_are_distinct() {
        let pool = BufferPool::new(4, 1024);
        let mut a = pool.acquire();
        let mut b = pool.acquire();
        a.push(1);
        b.push(2);
        assert_eq!(&a[..], &[1]);
        assert_eq!(&b[..], &[2]);
    }

    #[test]
    fn test_capacity_bound() {
        let pool = BufferPool::new(1, 1024);
        {
            let mut a = pool.acquire();
            let mut b = pool.acquire();
            a.push(1);
            b.push(1);
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_oversized_buffer_not_retained() {
        let pool = BufferPool::new(4, 16);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[0u8; 64]);
        }
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_returned_on_early_exit() {
        fn fails(pool: &BufferPool) -> Result<(), ()> {
            let mut buf = pool.acquire();
            buf.push(9);
            Err(())
        }

        let pool = BufferPool::new(2, 64);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.idle(), 1);
    }
}

//! Reusable output buffers.
//!
//! A [`BufferPool`] hands out [`PooledBuffer`]s, which return their
//! allocation to the pool when dropped, whether serialization finished or
//! failed. The pool is internally synchronized and can be shared by
//! serializers running on different threads.

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Default capacity of a freshly allocated buffer, in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// A pool of byte buffers for serializer output.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl BufferPool {
    /// Creates an empty pool whose new buffers start with `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Leases a cleared buffer, reusing an idle one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        #[cfg(feature = "tracing")]
        tracing::trace!(reused = reused.is_some(), "acquire output buffer");
        PooledBuffer {
            buf: reused.unwrap_or_else(|| Vec::with_capacity(self.capacity)),
            pool: Some(self),
        }
    }

    /// Number of buffers waiting to be reused.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        buf.clear();
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(buf);
    }
}

/// A buffer leased from a [`BufferPool`], or a plain one owned outright.
///
/// Dereferences to the underlying `Vec<u8>`.
#[derive(Debug)]
pub struct PooledBuffer<'p> {
    buf: Vec<u8>,
    pool: Option<&'p BufferPool>,
}

impl PooledBuffer<'static> {
    /// A buffer that belongs to no pool and is simply freed on drop.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            buf: Vec::new(),
            pool: None,
        }
    }
}

impl PooledBuffer<'_> {
    /// The last byte written, if any.
    #[must_use]
    pub fn last_byte(&self) -> Option<u8> {
        self.buf.last().copied()
    }

    /// Takes the bytes out. The allocation goes with them and is not
    /// returned to the pool.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        core::mem::take(&mut self.buf)
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
        if let Some(pool) = self.pool {
            if self.buf.capacity() > 0 {
                pool.release(core::mem::take(&mut self.buf));
            }
        }
    }
}

//! Fixed-capacity accumulation buffer.
//!
//! Raw bytes from the byte source are appended behind the valid region and
//! decoded frames (or resync bytes) are consumed from the front. Capacity
//! never grows: an append that does not fit is rejected and leaves the
//! valid prefix untouched.

use thiserror::Error;

/// Errors returned by [`AccumulationBuffer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("buffer overflow: need {needed} bytes, {available} available")]
    Overflow { needed: usize, available: usize },
}

/// Byte store with a valid prefix of `len() <= capacity()` bytes.
#[derive(Debug)]
pub struct AccumulationBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl AccumulationBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free space behind the valid region.
    pub fn available(&self) -> usize {
        self.capacity() - self.len
    }

    /// Valid bytes, read-only.
    pub fn peek(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copy `bytes` behind the valid region.
    ///
    /// # Errors
    /// Returns [`BufferError::Overflow`] when `bytes` does not fit; nothing
    /// is copied in that case.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.len() > self.available() {
            return Err(BufferError::Overflow {
                needed: bytes.len(),
                available: self.available(),
            });
        }
        let end = self.len + bytes.len();
        self.data[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    /// Remove the first `count` bytes and shift the remainder to the front.
    ///
    /// # Panics
    /// Panics if `count > len()`; callers only consume bytes they scanned.
    pub fn consume(&mut self, count: usize) {
        assert!(
            count <= self.len,
            "consume({count}) exceeds buffered length {}",
            self.len
        );
        self.data.copy_within(count..self.len, 0);
        self.len -= count;
    }

    /// Uninitialised tail for zero-copy reads; pair with [`commit`](Self::commit).
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Mark `count` bytes written through [`spare_mut`](Self::spare_mut) as valid.
    ///
    /// # Errors
    /// Returns [`BufferError::Overflow`] if `count` exceeds the spare space.
    pub fn commit(&mut self, count: usize) -> Result<(), BufferError> {
        if count > self.available() {
            return Err(BufferError::Overflow {
                needed: count,
                available: self.available(),
            });
        }
        self.len += count;
        Ok(())
    }
}

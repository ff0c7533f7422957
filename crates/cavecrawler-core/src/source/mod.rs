//! Byte sources feeding a decode session.
//!
//! A source is read without blocking: `Ok(0)` means nothing is available
//! right now and is not an error.

mod memory;
mod reader;

pub use memory::MemorySource;
pub use reader::ReadSource;

use thiserror::Error;

pub trait ByteSource {
    /// Read whatever is immediately available into `buf`.
    ///
    /// # Errors
    /// [`SourceError::Closed`] once the stream has ended, [`SourceError::Io`]
    /// for any other read failure.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        (**self).read_available(buf)
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("byte source closed")]
    Closed,
}

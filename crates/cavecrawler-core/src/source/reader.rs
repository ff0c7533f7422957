use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::{ByteSource, SourceError};

/// Adapts a [`Read`] implementation, typically a serial port opened in
/// non-blocking mode or a capture file.
///
/// `WouldBlock`, `TimedOut` and `Interrupted` read as "nothing available";
/// a zero-length read is end of stream.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl ReadSource<File> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.inner.read(buf) {
            Ok(0) => Err(SourceError::Closed),
            Ok(n) => Ok(n),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(err) => Err(SourceError::Io(err)),
        }
    }
}

use std::collections::VecDeque;

use super::{ByteSource, SourceError};

/// In-memory source replaying queued chunks, one chunk (or the part that
/// fits) per read.
///
/// Once drained it reports "nothing available" until [`MemorySource::close`]
/// is called, after which it reports [`SourceError::Closed`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    chunks: VecDeque<Vec<u8>>,
    closed: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A closed source that yields `data` in chunks of at most `chunk_size`.
    pub fn chunked(data: &[u8], chunk_size: usize) -> Self {
        let mut source = Self::new();
        for chunk in data.chunks(chunk_size.max(1)) {
            source.push(chunk);
        }
        source.close();
        source
    }

    pub fn push(&mut self, chunk: &[u8]) {
        if !chunk.is_empty() {
            self.chunks.push_back(chunk.to_vec());
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn pending(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }
}

impl ByteSource for MemorySource {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return if self.closed {
                Err(SourceError::Closed)
            } else {
                Ok(0)
            };
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            chunk.drain(..n);
            self.chunks.push_front(chunk);
        }
        Ok(n)
    }
}

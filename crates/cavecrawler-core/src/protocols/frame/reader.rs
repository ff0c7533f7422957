use super::error::FrameError;
use super::layout;
use crate::protocols::common::reader::xor_checksum;

/// Bounds-checked little-endian access to one complete frame.
pub struct FrameReader<'a> {
    frame: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(frame: &'a [u8]) -> Self {
        Self { frame }
    }

    /// Check length, end delimiter and checksum of the envelope.
    ///
    /// # Errors
    /// Returns the first envelope check that fails.
    pub fn verify_envelope(&self, expected_len: usize) -> Result<(), FrameError> {
        if self.frame.len() != expected_len {
            return Err(FrameError::LengthMismatch {
                expected: expected_len,
                actual: self.frame.len(),
            });
        }
        let end = self.read_u8(layout::end_offset(expected_len))?;
        if end != layout::END_DELIMITER {
            return Err(FrameError::EndDelimiter { value: end });
        }
        let checksum_offset = layout::checksum_offset(expected_len);
        let expected = self.read_u8(checksum_offset)?;
        let actual = xor_checksum(self.read_slice(layout::SIZE_OFFSET..checksum_offset)?);
        if expected != actual {
            return Err(FrameError::Checksum { expected, actual });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FrameError> {
        self.frame
            .get(offset)
            .copied()
            .ok_or(FrameError::TooShort {
                needed: offset + 1,
                actual: self.frame.len(),
            })
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Result<u16, FrameError> {
        Ok(u16::from_le_bytes(self.read_array(range)?))
    }

    pub fn read_u32_le(&self, range: std::ops::Range<usize>) -> Result<u32, FrameError> {
        Ok(u32::from_le_bytes(self.read_array(range)?))
    }

    pub fn read_i32_le(&self, range: std::ops::Range<usize>) -> Result<i32, FrameError> {
        Ok(i32::from_le_bytes(self.read_array(range)?))
    }

    pub fn read_f32_le(&self, range: std::ops::Range<usize>) -> Result<f32, FrameError> {
        Ok(f32::from_le_bytes(self.read_array(range)?))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], FrameError> {
        self.frame.get(range.clone()).ok_or(FrameError::TooShort {
            needed: range.end,
            actual: self.frame.len(),
        })
    }

    fn read_array<const N: usize>(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<[u8; N], FrameError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| FrameError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }
}

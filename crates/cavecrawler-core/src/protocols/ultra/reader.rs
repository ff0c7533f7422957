//! Capsule byte access and cabin bit unpacking.

use super::error::UltraError;
use super::layout;
use crate::protocols::common::reader::{sign_extend, xor_checksum};
use crate::protocols::frame::FrameError;

/// Read-only view over a verbatim ultra capsule.
pub struct CapsuleReader<'a> {
    capsule: &'a [u8],
}

impl<'a> CapsuleReader<'a> {
    /// # Errors
    /// Returns [`UltraError`] when the capsule is shorter than its header or
    /// its cabin area is not a multiple of the cabin size.
    pub fn new(capsule: &'a [u8]) -> Result<Self, UltraError> {
        if capsule.len() < layout::CABINS_OFFSET {
            return Err(UltraError::Frame(FrameError::TooShort {
                needed: layout::CABINS_OFFSET,
                actual: capsule.len(),
            }));
        }
        if (capsule.len() - layout::CABINS_OFFSET) % layout::CABIN_LEN != 0 {
            return Err(UltraError::CabinAlignment {
                length: capsule.len(),
            });
        }
        Ok(Self { capsule })
    }

    pub fn cabin_count(&self) -> usize {
        (self.capsule.len() - layout::CABINS_OFFSET) / layout::CABIN_LEN
    }

    pub fn checksum_bytes(&self) -> (u8, u8) {
        (
            self.capsule[layout::CHECKSUM_1_OFFSET],
            self.capsule[layout::CHECKSUM_2_OFFSET],
        )
    }

    /// Validate sync nibbles and the two-part checksum.
    ///
    /// # Errors
    /// Returns [`UltraError::CapsuleSync`] or [`UltraError::CapsuleChecksum`].
    pub fn verify(&self) -> Result<(), UltraError> {
        let (first, second) = self.checksum_bytes();
        if sync_nibble(first) != layout::EXP_SYNC_1 || sync_nibble(second) != layout::EXP_SYNC_2 {
            return Err(UltraError::CapsuleSync {
                first: sync_nibble(first),
                second: sync_nibble(second),
            });
        }
        let expected = combined_checksum(first, second);
        let actual = xor_checksum(&self.capsule[layout::CHECKSUM_COVERAGE_OFFSET..]);
        if expected != actual {
            return Err(UltraError::CapsuleChecksum { expected, actual });
        }
        Ok(())
    }

    pub fn start_angle_raw(&self) -> u16 {
        u16::from_le_bytes([
            self.capsule[layout::START_ANGLE_RANGE.start],
            self.capsule[layout::START_ANGLE_RANGE.start + 1],
        ])
    }

    pub fn cabins(&self) -> impl Iterator<Item = u32> + 'a {
        let capsule: &'a [u8] = self.capsule;
        capsule[layout::CABINS_OFFSET..]
            .chunks_exact(layout::CABIN_LEN)
            .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
    }
}

pub fn sync_nibble(byte: u8) -> u8 {
    byte >> 4
}

/// Low nibble from the first byte, high nibble from the second.
pub fn combined_checksum(first: u8, second: u8) -> u8 {
    (first & 0x0F) | ((second & 0x0F) << 4)
}

pub fn start_angle_q6(raw: u16) -> u16 {
    raw & layout::START_ANGLE_MASK
}

pub fn start_sync(raw: u16) -> bool {
    raw & layout::START_SYNC_BIT != 0
}

pub fn major_distance(cabin: u32) -> u32 {
    cabin & layout::MAJOR_DISTANCE_MASK
}

pub fn predict1(cabin: u32) -> i32 {
    sign_extend(
        (cabin >> layout::PREDICT1_SHIFT) & layout::PREDICT_MASK,
        layout::PREDICT_WIDTH,
    )
}

pub fn predict2(cabin: u32) -> i32 {
    sign_extend(
        (cabin >> layout::PREDICT2_SHIFT) & layout::PREDICT_MASK,
        layout::PREDICT_WIDTH,
    )
}

pub fn is_no_sample(predict: i32) -> bool {
    predict == layout::PREDICT_NO_SAMPLE_POS || predict == layout::PREDICT_NO_SAMPLE_NEG
}

/// Expand a variable-bit-scale distance; returns `(distance, scale_level)`.
pub fn varbit_decode(scaled: u32) -> (u32, u32) {
    for (scaled_base, level, target_base) in layout::VARBIT_SCALE {
        if scaled >= scaled_base {
            return (target_base + ((scaled - scaled_base) << level), level);
        }
    }
    (0, 0)
}

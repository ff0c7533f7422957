use super::error::UltraError;
use super::layout;
use super::reader::{self, CapsuleReader};
use crate::protocols::frame::layout::{checksum_offset, ultra_frame_len};
use crate::protocols::frame::reader::FrameReader;
use crate::records::{CapsuleChecksum, UltraCabin, UltraCapsule};

/// Ultra frame fields before continuation decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct UltraFrame {
    pub sequence: u8,
    pub timestamp_us: u32,
    pub capsule: UltraCapsule,
}

/// Decode a complete ultra frame carrying `cabins` cabins.
///
/// The cabin count comes from the matched signature, so both capsule
/// revisions share this parser.
///
/// # Errors
/// Returns [`UltraError`] when the envelope, the capsule sync nibbles or the
/// capsule checksum do not validate.
pub fn parse_ultra_capsule(frame: &[u8], cabins: usize) -> Result<UltraFrame, UltraError> {
    let reader = FrameReader::new(frame);
    let frame_len = ultra_frame_len(cabins);
    reader.verify_envelope(frame_len)?;

    let capsule_bytes = reader.read_slice(layout::CAPSULE_OFFSET..checksum_offset(frame_len))?;
    let capsule = CapsuleReader::new(capsule_bytes)?;
    capsule.verify()?;

    let (low, high) = capsule.checksum_bytes();
    let start_angle = capsule.start_angle_raw();

    Ok(UltraFrame {
        sequence: reader.read_u8(layout::SEQUENCE_OFFSET)?,
        timestamp_us: reader.read_u32_le(layout::TIMESTAMP_RANGE)?,
        capsule: UltraCapsule {
            start_angle_q6: reader::start_angle_q6(start_angle),
            start_sync: reader::start_sync(start_angle),
            checksum: CapsuleChecksum { low, high },
            cabins: capsule.cabins().map(UltraCabin).collect(),
        },
    })
}

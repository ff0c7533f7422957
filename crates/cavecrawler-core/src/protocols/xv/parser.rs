use super::error::XvError;
use super::layout;
use crate::protocols::frame::layout::XV_LIDAR_FRAME_LEN;
use crate::protocols::frame::reader::FrameReader;
use crate::records::XvLidarRecord;

/// Decode a complete XV-lidar frame.
///
/// # Errors
/// Returns [`XvError`] when the envelope does not validate or the angle
/// quad is out of range.
pub fn parse_xv_lidar(frame: &[u8]) -> Result<XvLidarRecord, XvError> {
    let reader = FrameReader::new(frame);
    reader.verify_envelope(XV_LIDAR_FRAME_LEN)?;

    let angle_quad = reader.read_u8(layout::ANGLE_QUAD_OFFSET)?;
    if angle_quad > layout::MAX_ANGLE_QUAD {
        return Err(XvError::InvalidAngleQuad { value: angle_quad });
    }

    let mut distances = [0u16; layout::DISTANCE_COUNT];
    for (index, distance) in distances.iter_mut().enumerate() {
        *distance = reader.read_u16_le(layout::distance_range(index))?;
    }

    Ok(XvLidarRecord {
        timestamp_us: reader.read_u32_le(layout::TIMESTAMP_RANGE)?,
        angle_quad,
        speed64: reader.read_u16_le(layout::SPEED_RANGE)?,
        distances,
    })
}

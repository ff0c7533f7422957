use super::error::OdometryError;
use super::layout;
use crate::protocols::frame::layout::ODOMETRY_FRAME_LEN;
use crate::protocols::frame::reader::FrameReader;
use crate::records::{OdometryRecord, Quaternion};

/// Decode a complete odometry frame.
///
/// # Errors
/// Returns [`OdometryError::Frame`] when the envelope does not validate.
pub fn parse_odometry(frame: &[u8]) -> Result<OdometryRecord, OdometryError> {
    let reader = FrameReader::new(frame);
    reader.verify_envelope(ODOMETRY_FRAME_LEN)?;

    Ok(OdometryRecord {
        timestamp_us: reader.read_u32_le(layout::TIMESTAMP_RANGE)?,
        left_encoder_counts: reader.read_i32_le(layout::LEFT_ENCODER_RANGE)?,
        right_encoder_counts: reader.read_i32_le(layout::RIGHT_ENCODER_RANGE)?,
        orientation: Quaternion {
            w: reader.read_f32_le(layout::QW_RANGE)?,
            x: reader.read_f32_le(layout::QX_RANGE)?,
            y: reader.read_f32_le(layout::QY_RANGE)?,
            z: reader.read_f32_le(layout::QZ_RANGE)?,
        },
    })
}

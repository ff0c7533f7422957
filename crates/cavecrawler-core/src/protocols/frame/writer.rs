//! Frame encoders for replay tools and fixtures.
//!
//! Encoders always emit well-formed frames: size byte, XOR checksum, end
//! delimiter and, for ultra frames, the capsule sync nibbles and checksum
//! are computed here.

use super::layout;
use crate::protocols::common::reader::xor_checksum;
use crate::protocols::ultra::layout as ultra_layout;
use crate::records::{OdometryRecord, UltraCapsule, XvLidarRecord};

/// Wrap `payload` in the envelope.
///
/// # Panics
/// Panics if the frame would exceed the one-byte size field.
pub fn seal_frame(frame_type: u8, payload: &[u8]) -> Vec<u8> {
    let len = payload.len() + layout::ENVELOPE_LEN;
    assert!(len <= u8::MAX as usize, "frame of {len} bytes exceeds size field");

    let mut frame = Vec::with_capacity(len);
    frame.push(layout::START_DELIMITER);
    frame.push(len as u8);
    frame.push(frame_type);
    frame.extend_from_slice(payload);
    frame.push(xor_checksum(&frame[layout::SIZE_OFFSET..]));
    frame.push(layout::END_DELIMITER);
    frame
}

pub fn encode_odometry(record: &OdometryRecord) -> Vec<u8> {
    let mut payload = Vec::with_capacity(layout::ODOMETRY_PAYLOAD_LEN);
    payload.extend_from_slice(&record.timestamp_us.to_le_bytes());
    payload.extend_from_slice(&record.left_encoder_counts.to_le_bytes());
    payload.extend_from_slice(&record.right_encoder_counts.to_le_bytes());
    let q = record.orientation;
    for component in [q.w, q.x, q.y, q.z] {
        payload.extend_from_slice(&component.to_le_bytes());
    }
    seal_frame(layout::TYPE_ODOMETRY, &payload)
}

pub fn encode_xv_lidar(record: &XvLidarRecord) -> Vec<u8> {
    let mut payload = Vec::with_capacity(layout::XV_LIDAR_PAYLOAD_LEN);
    payload.extend_from_slice(&record.timestamp_us.to_le_bytes());
    payload.push(record.angle_quad);
    payload.extend_from_slice(&record.speed64.to_le_bytes());
    for distance in record.distances {
        payload.extend_from_slice(&distance.to_le_bytes());
    }
    seal_frame(layout::TYPE_XV_LIDAR, &payload)
}

/// Encode an ultra frame. The capsule checksum stored in `capsule` is
/// ignored and recomputed from its contents.
pub fn encode_ultra(sequence: u8, timestamp_us: u32, capsule: &UltraCapsule) -> Vec<u8> {
    let mut body = Vec::with_capacity(ultra_layout::capsule_len(capsule.cabins.len()));
    let mut start_angle = capsule.start_angle_q6 & ultra_layout::START_ANGLE_MASK;
    if capsule.start_sync {
        start_angle |= ultra_layout::START_SYNC_BIT;
    }
    body.extend_from_slice(&start_angle.to_le_bytes());
    for cabin in &capsule.cabins {
        body.extend_from_slice(&cabin.0.to_le_bytes());
    }
    let checksum = xor_checksum(&body);

    let mut payload = Vec::with_capacity(layout::ULTRA_FIXED_PAYLOAD_LEN + body.len());
    payload.extend_from_slice(&timestamp_us.to_le_bytes());
    payload.push(sequence);
    payload.push((ultra_layout::EXP_SYNC_1 << 4) | (checksum & 0x0F));
    payload.push((ultra_layout::EXP_SYNC_2 << 4) | (checksum >> 4));
    payload.extend_from_slice(&body);
    seal_frame(layout::TYPE_ULTRA_LIDAR, &payload)
}

/// Zeroed frame of `len` bytes whose fields `fill` writes at their absolute
/// offsets, sealed with [`seal_frame`].
#[cfg(test)]
pub(crate) fn sealed_with(frame_type: u8, len: usize, fill: impl FnOnce(&mut [u8])) -> Vec<u8> {
    let mut frame = vec![0u8; len];
    fill(&mut frame);
    seal_frame(
        frame_type,
        &frame[layout::PAYLOAD_OFFSET..layout::checksum_offset(len)],
    )
}

/// Recompute the envelope of an edited frame so only inner checks can fail.
#[cfg(test)]
pub(crate) fn reseal(frame: &mut Vec<u8>) {
    let len = frame.len();
    *frame = seal_frame(
        frame[layout::TYPE_OFFSET],
        &frame[layout::PAYLOAD_OFFSET..layout::checksum_offset(len)],
    );
}

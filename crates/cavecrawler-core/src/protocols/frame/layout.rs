pub const START_DELIMITER: u8 = 0xFB;
pub const END_DELIMITER: u8 = 0xFC;

pub const SIZE_OFFSET: usize = 1;
pub const TYPE_OFFSET: usize = 2;
pub const PAYLOAD_OFFSET: usize = 3;
pub const HEADER_LEN: usize = PAYLOAD_OFFSET;
/// Checksum byte plus end delimiter.
pub const TRAILER_LEN: usize = 2;
pub const ENVELOPE_LEN: usize = HEADER_LEN + TRAILER_LEN;

pub const TYPE_ODOMETRY: u8 = 0x01;
pub const TYPE_XV_LIDAR: u8 = 0x02;
pub const TYPE_ULTRA_LIDAR: u8 = 0x03;

pub const ODOMETRY_PAYLOAD_LEN: usize = 28;
pub const XV_LIDAR_PAYLOAD_LEN: usize = 15;
/// Timestamp, sequence and capsule header before the cabins.
pub const ULTRA_FIXED_PAYLOAD_LEN: usize = 4 + 1 + 4;
pub const ULTRA_CABIN_LEN: usize = 4;
pub const ULTRA_FULL_CABINS: usize = 32;
pub const ULTRA_REDUCED_CABINS: usize = 16;

pub const ODOMETRY_FRAME_LEN: usize = ENVELOPE_LEN + ODOMETRY_PAYLOAD_LEN;
pub const XV_LIDAR_FRAME_LEN: usize = ENVELOPE_LEN + XV_LIDAR_PAYLOAD_LEN;
pub const ULTRA_FULL_FRAME_LEN: usize = ultra_frame_len(ULTRA_FULL_CABINS);
pub const ULTRA_REDUCED_FRAME_LEN: usize = ultra_frame_len(ULTRA_REDUCED_CABINS);

pub const MAX_FRAME_LEN: usize = ULTRA_FULL_FRAME_LEN;

pub const fn ultra_frame_len(cabins: usize) -> usize {
    ENVELOPE_LEN + ULTRA_FIXED_PAYLOAD_LEN + cabins * ULTRA_CABIN_LEN
}

/// Byte offset of the checksum for a frame of `frame_len` bytes.
pub const fn checksum_offset(frame_len: usize) -> usize {
    frame_len - TRAILER_LEN
}

pub const fn end_offset(frame_len: usize) -> usize {
    frame_len - 1
}

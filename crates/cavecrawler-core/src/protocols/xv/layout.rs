use crate::protocols::frame::layout::PAYLOAD_OFFSET;

pub const TIMESTAMP_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET..PAYLOAD_OFFSET + 4;
pub const ANGLE_QUAD_OFFSET: usize = PAYLOAD_OFFSET + 4;
pub const SPEED_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 5..PAYLOAD_OFFSET + 7;
pub const DISTANCES_OFFSET: usize = PAYLOAD_OFFSET + 7;
pub const DISTANCE_COUNT: usize = 4;
pub const DISTANCE_LEN: usize = 2;

/// Packets cover 360 degrees in quarters of four readings.
pub const MAX_ANGLE_QUAD: u8 = 89;

pub const DISTANCE_MASK: u16 = 0x3FFF;
pub const STRENGTH_WARNING_BIT: u16 = 1 << 14;
pub const INVALID_DATA_BIT: u16 = 1 << 15;

pub const fn distance_range(index: usize) -> std::ops::Range<usize> {
    let start = DISTANCES_OFFSET + index * DISTANCE_LEN;
    start..start + DISTANCE_LEN
}

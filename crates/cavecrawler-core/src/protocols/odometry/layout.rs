use crate::protocols::frame::layout::PAYLOAD_OFFSET;

pub const TIMESTAMP_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET..PAYLOAD_OFFSET + 4;
pub const LEFT_ENCODER_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 4..PAYLOAD_OFFSET + 8;
pub const RIGHT_ENCODER_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 8..PAYLOAD_OFFSET + 12;
pub const QW_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 12..PAYLOAD_OFFSET + 16;
pub const QX_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 16..PAYLOAD_OFFSET + 20;
pub const QY_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 20..PAYLOAD_OFFSET + 24;
pub const QZ_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET + 24..PAYLOAD_OFFSET + 28;

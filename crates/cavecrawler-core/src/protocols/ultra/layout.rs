use crate::protocols::frame::layout::PAYLOAD_OFFSET;

pub const TIMESTAMP_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET..PAYLOAD_OFFSET + 4;
pub const SEQUENCE_OFFSET: usize = PAYLOAD_OFFSET + 4;
/// The sensor's capsule is forwarded verbatim from here up to the trailer.
pub const CAPSULE_OFFSET: usize = PAYLOAD_OFFSET + 5;

// Offsets inside the capsule.
pub const CHECKSUM_1_OFFSET: usize = 0;
pub const CHECKSUM_2_OFFSET: usize = 1;
pub const START_ANGLE_RANGE: std::ops::Range<usize> = 2..4;
pub const CABINS_OFFSET: usize = 4;
pub const CABIN_LEN: usize = 4;
/// Checksum covers the capsule from the start angle on.
pub const CHECKSUM_COVERAGE_OFFSET: usize = START_ANGLE_RANGE.start;

pub const EXP_SYNC_1: u8 = 0xA;
pub const EXP_SYNC_2: u8 = 0x5;
pub const START_SYNC_BIT: u16 = 1 << 15;
pub const START_ANGLE_MASK: u16 = 0x7FFF;

// Cabin word: 12-bit major distance, then two signed 10-bit deltas.
pub const MAJOR_DISTANCE_MASK: u32 = 0xFFF;
pub const PREDICT1_SHIFT: u32 = 12;
pub const PREDICT2_SHIFT: u32 = 22;
pub const PREDICT_WIDTH: u32 = 10;
pub const PREDICT_MASK: u32 = (1 << PREDICT_WIDTH) - 1;
/// Delta values marking a sample without a return.
pub const PREDICT_NO_SAMPLE_POS: i32 = 0x1FF;
pub const PREDICT_NO_SAMPLE_NEG: i32 = -512;
pub const SAMPLES_PER_CABIN: usize = 3;

/// Variable bit scale table: (scaled base, scale level, target base).
pub const VARBIT_SCALE: [(u32, u32, u32); 5] = [
    (3328, 4, 1 << 14),
    (1792, 3, 1 << 12),
    (1280, 2, 1 << 11),
    (512, 1, 1 << 9),
    (0, 0, 0),
];

pub const fn capsule_len(cabins: usize) -> usize {
    CABINS_OFFSET + cabins * CABIN_LEN
}

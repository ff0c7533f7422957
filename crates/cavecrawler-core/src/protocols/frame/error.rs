use thiserror::Error;

/// Envelope validation failures shared by all frame kinds.
///
/// Any of these means the bytes at the scan position are not a frame; the
/// session advances one byte and keeps scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("frame length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid end delimiter: {value:#04x}")]
    EndDelimiter { value: u8 },
    #[error("checksum mismatch: expected {expected:#04x}, computed {actual:#04x}")]
    Checksum { expected: u8, actual: u8 },
}

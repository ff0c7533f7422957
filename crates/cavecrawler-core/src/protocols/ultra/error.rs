use thiserror::Error;

use crate::protocols::frame::FrameError;

/// Errors returned by ultra capsule parsing.
///
/// # Examples
/// ```text
/// use cavecrawler_core::protocols::ultra::error::UltraError;
///
/// let err = UltraError::CapsuleSync { first: 0x0, second: 0x5 };
/// assert!(err.to_string().contains("capsule sync"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UltraError {
    #[error("ultra frame rejected: {0}")]
    Frame(#[from] FrameError),
    #[error("invalid capsule sync nibbles: {first:#x}, {second:#x}")]
    CapsuleSync { first: u8, second: u8 },
    #[error("capsule checksum mismatch: expected {expected:#04x}, computed {actual:#04x}")]
    CapsuleChecksum { expected: u8, actual: u8 },
    #[error("capsule length {length} is not a whole number of cabins")]
    CabinAlignment { length: usize },
}

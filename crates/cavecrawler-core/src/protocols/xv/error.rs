use thiserror::Error;

use crate::protocols::frame::FrameError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XvError {
    #[error("XV-lidar frame rejected: {0}")]
    Frame(#[from] FrameError),
    #[error("invalid angle quad: {value}")]
    InvalidAngleQuad { value: u8 },
}

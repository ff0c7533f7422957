use thiserror::Error;

use crate::protocols::frame::FrameError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OdometryError {
    #[error("odometry frame rejected: {0}")]
    Frame(#[from] FrameError),
}

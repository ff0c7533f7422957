//! Shared frame envelope.
//!
//! Every frame is `[0xFB, size, type, payload.., xor, 0xFC]`. The scanner
//! matches the three-byte signature against the known kinds; the reader
//! validates the trailer before a protocol parser touches the payload.

pub mod error;
pub mod layout;
pub mod reader;
pub mod scanner;
pub mod writer;

pub use error::FrameError;
pub use scanner::{FrameKind, Scan, scan};

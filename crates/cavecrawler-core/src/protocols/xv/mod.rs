//! XV-lidar frames.
//!
//! The raw XV11 packet is forwarded without its own checksum and signal
//! strengths: angle quad, rotor speed in 1/64 rpm and four distance words.
//! Angle quads above 89 are rejected like a checksum failure.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::parse_xv_lidar;

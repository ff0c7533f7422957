//! Odometry frames: wheel encoder counts and IMU orientation.
//!
//! Layout after the envelope header: timestamp (u32), left and right encoder
//! counts (i32), then the orientation quaternion `w, x, y, z` (f32).

pub mod error;
pub mod layout;
pub mod parser;

pub use parser::parse_odometry;

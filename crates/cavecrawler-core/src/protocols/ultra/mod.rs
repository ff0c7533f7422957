//! Ultra-capsule lidar frames.
//!
//! Payload: timestamp (u32), frame sequence (u8), then the sensor's ultra
//! capsule verbatim. The capsule has its own sync nibbles and two-part XOR
//! checksum, both validated on top of the envelope checksum. Two capsule
//! revisions exist on the wire, with 32 and 16 cabins.

pub mod error;
pub mod layout;
pub mod nodes;
pub mod parser;
pub mod reader;

pub use nodes::capsule_to_nodes;
pub use parser::{UltraFrame, parse_ultra_capsule};

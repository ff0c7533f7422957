//! Decoded sensor records.
//!
//! Records are only built from frames whose checksums validated. They are
//! plain owned values; a [`Batch`](crate::Batch) hands them to the caller.

use serde::{Deserialize, Serialize};

use crate::protocols::ultra::reader as cabin;
use crate::protocols::xv::reader as xv_word;

/// Sensor kind carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Odometry,
    UltraLidar,
    XvLidar,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Odometry => "odometry",
            SensorKind::UltraLidar => "ultra_lidar",
            SensorKind::XvLidar => "xv_lidar",
        }
    }
}

/// One decoded record, in stream arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Odometry(OdometryRecord),
    UltraLidar(UltraLidarRecord),
    XvLidar(XvLidarRecord),
}

impl Record {
    pub fn kind(&self) -> SensorKind {
        match self {
            Record::Odometry(_) => SensorKind::Odometry,
            Record::UltraLidar(_) => SensorKind::UltraLidar,
            Record::XvLidar(_) => SensorKind::XvLidar,
        }
    }

    pub fn timestamp_us(&self) -> u32 {
        match self {
            Record::Odometry(r) => r.timestamp_us,
            Record::UltraLidar(r) => r.timestamp_us,
            Record::XvLidar(r) => r.timestamp_us,
        }
    }
}

/// Orientation quaternion as sent by the IMU; not normalised here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Wheel encoders and IMU orientation.
///
/// # Examples
/// ```
/// use cavecrawler_core::{OdometryRecord, Quaternion};
///
/// let record = OdometryRecord {
///     timestamp_us: 1000,
///     left_encoder_counts: 50,
///     right_encoder_counts: 52,
///     orientation: Quaternion { w: 1.0, x: 0.0, y: 0.0, z: 0.0 },
/// };
/// assert_eq!(record.right_encoder_counts - record.left_encoder_counts, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdometryRecord {
    pub timestamp_us: u32,
    /// Raw tick count; wraps, so consumers should difference with `wrapping_sub`.
    pub left_encoder_counts: i32,
    pub right_encoder_counts: i32,
    pub orientation: Quaternion,
}

/// One XV-lidar packet: four consecutive one-degree readings.
///
/// # Examples
/// ```
/// use cavecrawler_core::XvLidarRecord;
///
/// let record = XvLidarRecord {
///     timestamp_us: 10,
///     angle_quad: 2,
///     speed64: 300 * 64,
///     distances: [1000, 0x8000 | 0x21, 0x4000 | 250, 0],
/// };
/// assert_eq!(record.rpm(), 300.0);
/// assert_eq!(record.first_angle_deg(), 8);
/// let readings = record.readings();
/// assert_eq!(readings[0].distance_mm(), Some(1000));
/// assert!(readings[1].invalid);
/// assert!(readings[2].strength_warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XvLidarRecord {
    pub timestamp_us: u32,
    /// Quarter index 0..=89; reading `i` is at `4 * angle_quad + i` degrees.
    pub angle_quad: u8,
    /// Rotor speed in 1/64 rpm.
    pub speed64: u16,
    /// Raw distance words with flag bits.
    pub distances: [u16; 4],
}

impl XvLidarRecord {
    pub fn rpm(&self) -> f32 {
        self.speed64 as f32 / 64.0
    }

    pub fn first_angle_deg(&self) -> u16 {
        self.angle_quad as u16 * 4
    }

    pub fn readings(&self) -> [XvReading; 4] {
        self.distances.map(XvReading::from_word)
    }
}

/// Unpacked XV-lidar distance word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XvReading {
    /// Distance in mm, or the error code when `invalid` is set.
    pub value: u16,
    pub strength_warning: bool,
    pub invalid: bool,
}

impl XvReading {
    pub fn from_word(word: u16) -> Self {
        Self {
            value: xv_word::distance_value(word),
            strength_warning: xv_word::strength_warning(word),
            invalid: xv_word::invalid_data(word),
        }
    }

    pub fn distance_mm(&self) -> Option<u16> {
        if self.invalid { None } else { Some(self.value) }
    }
}

/// Ultra capsule frame plus the measurement nodes it completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraLidarRecord {
    pub device_id: u8,
    /// Frame sequence number, wraps at 256.
    pub sequence: u8,
    pub timestamp_us: u32,
    pub capsule: UltraCapsule,
    /// Nodes decoded from the previous capsule of the same chain; empty when
    /// this capsule starts a chain.
    pub nodes: Vec<MeasurementNode>,
}

/// Two-part capsule checksum as transmitted (low and high nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleChecksum {
    pub low: u8,
    pub high: u8,
}

/// Ultra capsule with its raw cabins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraCapsule {
    /// Start angle in 1/64 degree.
    pub start_angle_q6: u16,
    /// Set on the first capsule after the sensor (re)started scanning.
    pub start_sync: bool,
    pub checksum: CapsuleChecksum,
    pub cabins: Vec<UltraCabin>,
}

impl UltraCapsule {
    pub fn start_angle_deg(&self) -> f32 {
        self.start_angle_q6 as f32 / 64.0
    }
}

/// Three compressed samples packed into one 32-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UltraCabin(pub u32);

impl UltraCabin {
    /// Variable-bit-scale encoded major distance (12 bits).
    pub fn major_distance(&self) -> u32 {
        cabin::major_distance(self.0)
    }

    /// Signed delta of the second sample.
    pub fn predict1(&self) -> i32 {
        cabin::predict1(self.0)
    }

    /// Signed delta of the third sample.
    pub fn predict2(&self) -> i32 {
        cabin::predict2(self.0)
    }
}

/// Measurement node in the sensor vendor's HQ node format.
///
/// # Examples
/// ```
/// use cavecrawler_core::MeasurementNode;
///
/// let node = MeasurementNode {
///     angle_z_q14: 8192,
///     dist_mm_q2: 4000,
///     quality: 188,
///     sync: false,
/// };
/// assert_eq!(node.angle_degrees(), 45.0);
/// assert_eq!(node.distance_mm(), 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementNode {
    /// Angle, 90 degrees = 16384.
    pub angle_z_q14: u16,
    /// Distance in 1/4 mm; zero means no return.
    pub dist_mm_q2: u32,
    pub quality: u8,
    /// First node of a new rotation.
    pub sync: bool,
}

impl MeasurementNode {
    pub fn angle_degrees(&self) -> f32 {
        self.angle_z_q14 as f32 * 90.0 / 16384.0
    }

    pub fn distance_mm(&self) -> f32 {
        self.dist_mm_q2 as f32 / 4.0
    }
}

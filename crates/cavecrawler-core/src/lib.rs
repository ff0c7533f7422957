//! Cave Crawler core library: decoder for the robot's mixed serial stream.
//!
//! One byte pipe multiplexes three sensors: wheel odometry with IMU
//! orientation, an ultra-capsule spinning lidar and an XV11-style lidar.
//! Bytes arrive in arbitrary chunks; a [`Session`] accumulates them in a
//! fixed-capacity buffer, recognises frames by their three-byte signature,
//! validates checksums and hands back a [`Batch`] of records per call.
//! Protocol decoders follow a layout/reader/parser split and are free of
//! I/O; byte sources live in `source`, capture replay in `capture`.
//!
//! Invariants:
//! - A record is only produced from a frame whose checks all passed.
//! - Rejected frames and unsynchronised bytes advance the stream by exactly
//!   one byte.
//! - Reports are deterministic for a given input and configuration.
//!
//! # Examples
//! ```
//! use cavecrawler_core::protocols::frame::writer::encode_xv_lidar;
//! use cavecrawler_core::{DecodeStatus, Session, SessionConfig, XvLidarRecord};
//!
//! let record = XvLidarRecord {
//!     timestamp_us: 42,
//!     angle_quad: 10,
//!     speed64: 19_200,
//!     distances: [1200, 1210, 0x8000, 1190],
//! };
//! let frame = encode_xv_lidar(&record);
//!
//! let mut session = Session::new(SessionConfig::default())?;
//! session.feed(&frame[..7])?;
//! assert_eq!(session.decode()?.status, DecodeStatus::Pending);
//! session.feed(&frame[7..])?;
//! let decoded = session.decode()?;
//! assert_eq!(decoded.status, DecodeStatus::Ok);
//! assert_eq!(decoded.batch.xv_lidar().next(), Some(&record));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod buffer;
mod capture;
mod config;
mod decode;
pub mod protocols;
mod records;
mod source;

pub use buffer::{AccumulationBuffer, BufferError};
pub use capture::{CaptureError, decode_capture_file, decode_source};
pub use config::{ConfigError, SensorKinds, SessionConfig};
pub use decode::{
    Batch, DecodeStats, DecodeStatus, Decoded, RecordCounts, Session, SessionError, StreamDecoder,
};
pub use records::{
    CapsuleChecksum, MeasurementNode, OdometryRecord, Quaternion, Record, SensorKind,
    UltraCabin, UltraCapsule, UltraLidarRecord, XvLidarRecord, XvReading,
};
pub use source::{ByteSource, MemorySource, ReadSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the caller does not stamp the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded capture with diagnostics.
///
/// # Examples
/// ```
/// use cavecrawler_core::make_stub_report;
///
/// let report = make_stub_report("capture.bin", 123);
/// assert_eq!(report.report_version, cavecrawler_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_summary: Option<StreamSummary>,
    /// Per-kind summaries, in fixed kind order.
    pub sensors: Vec<SensorSummary>,
    pub diagnostics: DecodeStats,
    /// Records in stream arrival order.
    pub records: Vec<Record>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use cavecrawler_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "cavecrawler".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "cavecrawler");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    pub bytes: u64,
}

/// Whole-stream totals.
///
/// # Examples
/// ```
/// use cavecrawler_core::StreamSummary;
///
/// let summary = StreamSummary {
///     frames_total: 3,
///     records_total: 2,
///     trailing_bytes: 0,
///     final_status: "ok".to_string(),
/// };
/// assert!(summary.records_total <= summary.frames_total);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Validated frames, filtered kinds included.
    pub frames_total: u64,
    pub records_total: u64,
    /// Bytes left in the buffer when the source closed.
    pub trailing_bytes: u64,
    /// Status of the last successful decode call (`ok` or `pending`).
    pub final_status: String,
}

/// Per-kind totals. Timestamps are the first and last seen, not min/max,
/// since device timestamps wrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSummary {
    pub kind: SensorKind,
    pub frames: u64,
    pub records: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp_us: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp_us: Option<u32>,
    /// Measurement nodes decoded (ultra lidar only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u64>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use cavecrawler_core::make_stub_report;
///
/// let report = make_stub_report("capture.bin", 123);
/// assert!(report.records.is_empty());
/// assert!(report.stream_summary.is_none());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "cavecrawler".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        stream_summary: None,
        sensors: vec![],
        diagnostics: DecodeStats::default(),
        records: vec![],
    }
}

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::config::SessionConfig;
use crate::decode::{DecodeStatus, SessionError, StreamDecoder};
use crate::source::{ByteSource, ReadSource, SourceError};
use crate::{Report, StreamSummary, make_stub_report};

mod summary;

use summary::SensorTally;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Decode error: {0}")]
    Session(#[from] SessionError),
}

/// Decode a recorded byte stream from disk.
pub fn decode_capture_file(path: &Path, config: &SessionConfig) -> Result<Report, CaptureError> {
    let source = ReadSource::open(path)?;
    decode_source(&path.display().to_string(), source, config)
}

/// Drain `source` until it reports [`SourceError::Closed`] and build a report.
///
/// The source must eventually close; one that keeps reporting "nothing
/// available" is polled indefinitely.
pub fn decode_source<S: ByteSource>(
    input_path: &str,
    source: S,
    config: &SessionConfig,
) -> Result<Report, CaptureError> {
    let mut decoder = StreamDecoder::open(source, config.clone())?;
    let mut tally = SensorTally::default();
    let mut records = Vec::new();
    let mut last_status = DecodeStatus::Ok;

    loop {
        match decoder.decode_once() {
            Ok(decoded) => {
                last_status = decoded.status;
                for record in decoded.batch {
                    tally.add(&record);
                    records.push(record);
                }
            }
            Err(SessionError::Source(SourceError::Closed)) => break,
            Err(err) => return Err(err.into()),
        }
    }

    let diagnostics = *decoder.stats();
    let trailing_bytes = decoder.session().buffered() as u64;
    decoder.shutdown();
    debug!(
        input = input_path,
        bytes = diagnostics.bytes_received,
        records = records.len(),
        "capture decoded"
    );

    let mut report = make_stub_report(input_path, diagnostics.bytes_received);
    report.stream_summary = Some(StreamSummary {
        frames_total: diagnostics.frames_total(),
        records_total: records.len() as u64,
        trailing_bytes,
        final_status: last_status.as_str().to_string(),
    });
    report.sensors = tally.build(&diagnostics);
    report.diagnostics = diagnostics;
    report.records = records;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::decode_source;
    use crate::config::{SensorKinds, SessionConfig};
    use crate::protocols::frame::writer::encode_odometry;
    use crate::records::{OdometryRecord, Quaternion, SensorKind};
    use crate::source::MemorySource;

    fn odometry_frame() -> Vec<u8> {
        encode_odometry(&OdometryRecord {
            timestamp_us: 1000,
            left_encoder_counts: 50,
            right_encoder_counts: 52,
            orientation: Quaternion {
                w: 1.0,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        })
    }

    #[test]
    fn report_counts_and_trailing_bytes() {
        let mut bytes = odometry_frame();
        bytes.extend_from_slice(&[0xFB, 33, 0x01, 0x00]);
        let source = MemorySource::chunked(&bytes, 5);
        let report = decode_source("memory", source, &SessionConfig::default()).unwrap();

        let summary = report.stream_summary.as_ref().unwrap();
        assert_eq!(summary.frames_total, 1);
        assert_eq!(summary.records_total, 1);
        assert_eq!(summary.trailing_bytes, 4);
        assert_eq!(summary.final_status, "pending");
        assert_eq!(report.input.bytes, bytes.len() as u64);
        assert_eq!(report.sensors.len(), 1);
        assert_eq!(report.sensors[0].kind, SensorKind::Odometry);
        assert_eq!(report.sensors[0].first_timestamp_us, Some(1000));
    }

    #[test]
    fn filtered_records_are_counted_not_reported() {
        let source = MemorySource::chunked(&odometry_frame(), 64);
        let config = SessionConfig {
            kinds: SensorKinds::only(&[SensorKind::XvLidar]),
            ..SessionConfig::default()
        };
        let report = decode_source("memory", source, &config).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.diagnostics.filtered_frames, 1);
        assert_eq!(report.sensors[0].frames, 1);
        assert_eq!(report.sensors[0].records, 0);
    }
}

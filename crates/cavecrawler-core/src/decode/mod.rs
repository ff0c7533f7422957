//! Decode loop over the accumulation buffer.
//!
//! [`Session`] owns the buffer, the ultra capsule chain and the running
//! [`DecodeStats`]; it has no notion of where bytes come from. Bytes are
//! either pushed with [`Session::feed`] or pulled from a [`ByteSource`] with
//! [`Session::decode_from`]. [`StreamDecoder`] bundles a session with its
//! source.
//!
//! Each call drains every complete frame at the front of the buffer:
//! - a frame that validates is consumed whole and its record is batched;
//! - a matched frame that fails validation, or a byte where no signature
//!   starts, is dropped one byte at a time;
//! - the loop stops at a partial frame ([`DecodeStatus::Pending`]) or when
//!   fewer bytes than a frame header remain that cannot start a frame
//!   ([`DecodeStatus::Ok`]).
//!
//! Corruption only shows up in [`DecodeStats`]. Buffer overflow and source
//! failures are fatal: the session then answers every call with
//! [`SessionError::Failed`].

mod batch;
mod stats;
mod ultra_track;

pub use batch::{Batch, RecordCounts};
pub use stats::DecodeStats;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::buffer::{AccumulationBuffer, BufferError};
use crate::config::{ConfigError, SessionConfig};
use crate::protocols::frame::{FrameKind, Scan, scan};
use crate::protocols::odometry::{error::OdometryError, parse_odometry};
use crate::protocols::ultra::{error::UltraError, parse_ultra_capsule};
use crate::protocols::xv::{error::XvError, parse_xv_lidar};
use crate::records::{Record, UltraLidarRecord};
use crate::source::{ByteSource, SourceError};
use ultra_track::UltraTracker;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}; the caller is not draining the session fast enough")]
    Overflow(#[from] BufferError),
    #[error("byte source failed: {0}")]
    Source(#[from] SourceError),
    #[error("session failed earlier and must be discarded")]
    Failed,
}

/// Status of one decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// No complete frame is left; any remaining bytes are shorter than a
    /// frame header and do not begin one.
    Ok,
    /// A partial frame is retained awaiting more bytes.
    Pending,
}

impl DecodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeStatus::Ok => "ok",
            DecodeStatus::Pending => "pending",
        }
    }
}

/// Result of one decode call.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub status: DecodeStatus,
    pub batch: Batch,
}

/// Validation failure of a matched frame.
#[derive(Debug, Error)]
enum FrameRejection {
    #[error(transparent)]
    Odometry(#[from] OdometryError),
    #[error(transparent)]
    Xv(#[from] XvError),
    #[error(transparent)]
    Ultra(#[from] UltraError),
}

/// Transport-agnostic parser state.
///
/// # Examples
/// ```
/// use cavecrawler_core::{DecodeStatus, Session, SessionConfig};
///
/// let mut session = Session::new(SessionConfig::default()).unwrap();
/// session.feed(&[0x00, 0x11, 0x22, 0xFB]).unwrap();
/// let decoded = session.decode().unwrap();
/// assert_eq!(decoded.status, DecodeStatus::Ok);
/// assert!(decoded.batch.is_empty());
/// assert_eq!(session.stats().desync_bytes, 2);
/// assert_eq!(session.buffered(), 2);
/// ```
#[derive(Debug)]
pub struct Session {
    buffer: AccumulationBuffer,
    ultra: UltraTracker,
    config: SessionConfig,
    stats: DecodeStats,
    /// Source error hit after records were already produced in the same
    /// call; reported by the next call.
    deferred: Option<SourceError>,
    failed: bool,
}

impl Session {
    /// # Errors
    /// Returns [`SessionError::Config`] when `config` does not validate.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            buffer: AccumulationBuffer::with_capacity(config.buffer_capacity),
            ultra: UltraTracker::default(),
            config,
            stats: DecodeStats::default(),
            deferred: None,
            failed: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Bytes retained for the next call.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Append raw bytes without decoding them.
    ///
    /// # Errors
    /// [`SessionError::Overflow`] when the bytes do not fit; the buffered
    /// prefix is left intact but the session is failed from then on.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.ensure_usable()?;
        if let Err(err) = self.buffer.append(bytes) {
            warn!(
                error = %err,
                buffered = self.buffer.len(),
                capacity = self.buffer.capacity(),
                "accumulation buffer overflow"
            );
            self.failed = true;
            return Err(err.into());
        }
        self.stats.bytes_received += bytes.len() as u64;
        Ok(())
    }

    /// Decode everything that is buffered.
    pub fn decode(&mut self) -> Result<Decoded, SessionError> {
        self.ensure_usable()?;
        let mut batch = Batch::new();
        let status = self.drain(&mut batch);
        Ok(Decoded { status, batch })
    }

    /// Read from `source` without blocking and decode.
    ///
    /// Performs at most `reads_per_call` reads straight into the buffer's
    /// spare capacity and drains after each, so a full buffer never forces
    /// an overflow. Stops early when the source has nothing available.
    ///
    /// # Errors
    /// Source failures are fatal. When records were already decoded in this
    /// call they are returned first and the failure is reported by the next
    /// call.
    pub fn decode_from<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Decoded, SessionError> {
        self.ensure_usable()?;
        let mut batch = Batch::new();
        let mut status = self.drain(&mut batch);

        for _ in 0..self.config.reads_per_call {
            let spare = self.buffer.spare_mut();
            if spare.is_empty() {
                break;
            }
            match source.read_available(spare) {
                Ok(0) => break,
                Ok(n) => {
                    self.buffer.commit(n).map_err(|err| self.fail(err))?;
                    self.stats.bytes_received += n as u64;
                    status = self.drain(&mut batch);
                }
                Err(err) if batch.is_empty() => return Err(self.fail(err)),
                Err(err) => {
                    debug!(error = %err, records = batch.len(), "deferring source error");
                    self.deferred = Some(err);
                    break;
                }
            }
        }
        Ok(Decoded { status, batch })
    }

    /// Release the buffer; returns the final counters.
    pub fn shutdown(self) -> DecodeStats {
        debug!(
            discarded = self.buffer.len(),
            frames = self.stats.frames_total(),
            "session shut down"
        );
        self.stats
    }

    fn ensure_usable(&mut self) -> Result<(), SessionError> {
        if self.failed {
            return Err(SessionError::Failed);
        }
        if let Some(err) = self.deferred.take() {
            return Err(self.fail(err));
        }
        Ok(())
    }

    fn fail(&mut self, err: impl Into<SessionError>) -> SessionError {
        self.failed = true;
        err.into()
    }

    fn drain(&mut self, batch: &mut Batch) -> DecodeStatus {
        loop {
            match scan(self.buffer.peek()) {
                Scan::Incomplete {
                    partial_frame: false,
                } => return DecodeStatus::Ok,
                Scan::Incomplete {
                    partial_frame: true,
                } => return DecodeStatus::Pending,
                Scan::Desync => {
                    trace!(byte = self.buffer.peek()[0], "resync: discarding byte");
                    self.stats.desync_bytes += 1;
                    self.buffer.consume(1);
                }
                Scan::Frame(kind) => {
                    let len = kind.frame_len();
                    let frame = &self.buffer.peek()[..len];
                    match decode_frame(kind, frame, &self.config, &mut self.ultra, &mut self.stats)
                    {
                        Ok(record) => {
                            self.stats.add_frame(kind.sensor());
                            match record {
                                Some(record) => batch.push(record),
                                None => self.stats.filtered_frames += 1,
                            }
                            self.buffer.consume(len);
                        }
                        Err(err) => {
                            debug!(kind = kind.sensor().as_str(), error = %err, "frame rejected");
                            self.stats.checksum_failures += 1;
                            self.buffer.consume(1);
                        }
                    }
                }
            }
        }
    }
}

/// Validate and decode one complete frame. `Ok(None)` for disabled kinds.
fn decode_frame(
    kind: FrameKind,
    frame: &[u8],
    config: &SessionConfig,
    ultra: &mut UltraTracker,
    stats: &mut DecodeStats,
) -> Result<Option<Record>, FrameRejection> {
    let enabled = config.kinds.enabled(kind.sensor());
    let record = match kind {
        FrameKind::Odometry => {
            let record = parse_odometry(frame)?;
            enabled.then_some(Record::Odometry(record))
        }
        FrameKind::XvLidar => {
            let record = parse_xv_lidar(frame)?;
            enabled.then_some(Record::XvLidar(record))
        }
        FrameKind::UltraLidar { cabins } => {
            let parsed = parse_ultra_capsule(frame, cabins)?;
            if enabled {
                let nodes = ultra.advance(parsed.sequence, &parsed.capsule, stats);
                Some(Record::UltraLidar(UltraLidarRecord {
                    device_id: config.device_id,
                    sequence: parsed.sequence,
                    timestamp_us: parsed.timestamp_us,
                    capsule: parsed.capsule,
                    nodes,
                }))
            } else {
                None
            }
        }
    };
    Ok(record)
}

/// A session bound to its byte source.
///
/// The source is only read, never configured; [`StreamDecoder::shutdown`]
/// hands it back untouched so the owner can restore and close it.
#[derive(Debug)]
pub struct StreamDecoder<S> {
    source: S,
    session: Session,
}

impl<S: ByteSource> StreamDecoder<S> {
    /// # Errors
    /// Returns [`SessionError::Config`] when `config` does not validate.
    pub fn open(source: S, config: SessionConfig) -> Result<Self, SessionError> {
        Ok(Self {
            source,
            session: Session::new(config)?,
        })
    }

    /// One non-blocking read-and-decode step.
    pub fn decode_once(&mut self) -> Result<Decoded, SessionError> {
        self.session.decode_from(&mut self.source)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> &DecodeStats {
        self.session.stats()
    }

    pub fn shutdown(self) -> S {
        self.session.shutdown();
        self.source
    }
}

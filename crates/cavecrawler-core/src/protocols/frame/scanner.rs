use super::layout;
use crate::records::SensorKind;

/// Frame kind recognised from a sync signature, with its fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Odometry,
    XvLidar,
    UltraLidar { cabins: usize },
}

impl FrameKind {
    pub fn frame_len(&self) -> usize {
        match self {
            FrameKind::Odometry => layout::ODOMETRY_FRAME_LEN,
            FrameKind::XvLidar => layout::XV_LIDAR_FRAME_LEN,
            FrameKind::UltraLidar { cabins } => layout::ultra_frame_len(*cabins),
        }
    }

    pub fn sensor(&self) -> SensorKind {
        match self {
            FrameKind::Odometry => SensorKind::Odometry,
            FrameKind::XvLidar => SensorKind::XvLidar,
            FrameKind::UltraLidar { .. } => SensorKind::UltraLidar,
        }
    }
}

/// Known `[start, size, type]` signatures.
const SIGNATURES: [([u8; layout::HEADER_LEN], FrameKind); 4] = [
    (
        signature(layout::ODOMETRY_FRAME_LEN, layout::TYPE_ODOMETRY),
        FrameKind::Odometry,
    ),
    (
        signature(layout::XV_LIDAR_FRAME_LEN, layout::TYPE_XV_LIDAR),
        FrameKind::XvLidar,
    ),
    (
        signature(layout::ULTRA_FULL_FRAME_LEN, layout::TYPE_ULTRA_LIDAR),
        FrameKind::UltraLidar {
            cabins: layout::ULTRA_FULL_CABINS,
        },
    ),
    (
        signature(layout::ULTRA_REDUCED_FRAME_LEN, layout::TYPE_ULTRA_LIDAR),
        FrameKind::UltraLidar {
            cabins: layout::ULTRA_REDUCED_CABINS,
        },
    ),
];

const fn signature(frame_len: usize, frame_type: u8) -> [u8; layout::HEADER_LEN] {
    [layout::START_DELIMITER, frame_len as u8, frame_type]
}

/// Outcome of inspecting the front of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// A signature matched and the whole frame is buffered.
    Frame(FrameKind),
    /// More bytes are needed. `partial_frame` is set when the buffered bytes
    /// begin a known frame (a full signature or a prefix of one).
    Incomplete { partial_frame: bool },
    /// No signature starts here; drop one byte and retry.
    Desync,
}

/// Classify the bytes at the front of the buffer. Never consumes anything.
pub fn scan(bytes: &[u8]) -> Scan {
    if bytes.len() < layout::HEADER_LEN {
        let partial_frame =
            !bytes.is_empty() && SIGNATURES.iter().any(|(sig, _)| sig.starts_with(bytes));
        return Scan::Incomplete { partial_frame };
    }
    let header = &bytes[..layout::HEADER_LEN];
    match SIGNATURES.iter().find(|(sig, _)| sig == header) {
        Some((_, kind)) if bytes.len() >= kind.frame_len() => Scan::Frame(*kind),
        Some(_) => Scan::Incomplete {
            partial_frame: true,
        },
        None => Scan::Desync,
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameKind, Scan, scan};
    use crate::protocols::frame::layout;

    #[test]
    fn short_input_is_incomplete() {
        assert_eq!(
            scan(&[]),
            Scan::Incomplete {
                partial_frame: false
            }
        );
        assert_eq!(
            scan(&[0x00, 0x01]),
            Scan::Incomplete {
                partial_frame: false
            }
        );
        assert_eq!(
            scan(&[layout::START_DELIMITER, 0x00]),
            Scan::Incomplete {
                partial_frame: false
            }
        );
    }

    #[test]
    fn signature_prefix_is_partial_frame() {
        assert_eq!(
            scan(&[layout::START_DELIMITER]),
            Scan::Incomplete {
                partial_frame: true
            }
        );
        assert_eq!(
            scan(&[layout::START_DELIMITER, layout::XV_LIDAR_FRAME_LEN as u8]),
            Scan::Incomplete {
                partial_frame: true
            }
        );
    }

    #[test]
    fn garbage_is_desync() {
        assert_eq!(scan(&[0x00, 0x01, 0x02]), Scan::Desync);
        assert_eq!(scan(&[layout::START_DELIMITER, 0x21, 0x02]), Scan::Desync);
        assert_eq!(scan(&[layout::START_DELIMITER, 0x21, 0x09]), Scan::Desync);
    }

    #[test]
    fn header_without_body_is_pending() {
        let header = [
            layout::START_DELIMITER,
            layout::ODOMETRY_FRAME_LEN as u8,
            layout::TYPE_ODOMETRY,
        ];
        assert_eq!(
            scan(&header),
            Scan::Incomplete {
                partial_frame: true
            }
        );
    }

    #[test]
    fn full_length_is_frame() {
        let mut bytes = vec![0u8; layout::ULTRA_REDUCED_FRAME_LEN];
        bytes[0] = layout::START_DELIMITER;
        bytes[1] = layout::ULTRA_REDUCED_FRAME_LEN as u8;
        bytes[2] = layout::TYPE_ULTRA_LIDAR;
        assert_eq!(scan(&bytes), Scan::Frame(FrameKind::UltraLidar { cabins: 16 }));

        bytes.truncate(layout::ULTRA_REDUCED_FRAME_LEN - 1);
        assert_eq!(
            scan(&bytes),
            Scan::Incomplete {
                partial_frame: true
            }
        );
    }

    #[test]
    fn frame_lengths() {
        assert_eq!(FrameKind::Odometry.frame_len(), 33);
        assert_eq!(FrameKind::XvLidar.frame_len(), 20);
        assert_eq!(FrameKind::UltraLidar { cabins: 32 }.frame_len(), 142);
        assert_eq!(FrameKind::UltraLidar { cabins: 16 }.frame_len(), 78);
    }
}

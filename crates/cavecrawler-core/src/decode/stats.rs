use serde::{Deserialize, Serialize};

use crate::records::SensorKind;

/// Running diagnostics of a session. Corruption is counted here and never
/// surfaced as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Bytes accepted into the buffer.
    pub bytes_received: u64,
    /// Validated frames per kind, including filtered ones.
    pub odometry_frames: u64,
    pub ultra_lidar_frames: u64,
    pub xv_lidar_frames: u64,
    /// Validated frames of a disabled kind.
    pub filtered_frames: u64,
    /// Frames whose signature matched but which failed validation.
    pub checksum_failures: u64,
    /// Bytes discarded because no signature started at them.
    pub desync_bytes: u64,
    pub ultra_sequence_gaps: u64,
    pub ultra_lost_capsules: u64,
    pub ultra_chain_resets: u64,
}

impl DecodeStats {
    pub fn frames(&self, kind: SensorKind) -> u64 {
        match kind {
            SensorKind::Odometry => self.odometry_frames,
            SensorKind::UltraLidar => self.ultra_lidar_frames,
            SensorKind::XvLidar => self.xv_lidar_frames,
        }
    }

    pub fn frames_total(&self) -> u64 {
        self.odometry_frames + self.ultra_lidar_frames + self.xv_lidar_frames
    }

    /// True when any byte was discarded.
    pub fn saw_corruption(&self) -> bool {
        self.checksum_failures > 0 || self.desync_bytes > 0
    }

    pub(crate) fn add_frame(&mut self, kind: SensorKind) {
        match kind {
            SensorKind::Odometry => self.odometry_frames += 1,
            SensorKind::UltraLidar => self.ultra_lidar_frames += 1,
            SensorKind::XvLidar => self.xv_lidar_frames += 1,
        }
    }
}

//! Session configuration.
//!
//! Loaded from JSON; every field has a default so an empty object is a
//! valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocols::frame::layout::MAX_FRAME_LEN;
use crate::records::SensorKind;

pub const DEFAULT_BUFFER_CAPACITY: usize = 2048;
pub const DEFAULT_READS_PER_CALL: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Fixed capacity of the accumulation buffer in bytes.
    pub buffer_capacity: usize,
    /// Identifier stamped on ultra-lidar records.
    pub device_id: u8,
    /// Upper bound on source reads per `decode_from` call.
    pub reads_per_call: usize,
    pub kinds: SensorKinds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            device_id: 0,
            reads_per_call: DEFAULT_READS_PER_CALL,
            kinds: SensorKinds::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the limits the session relies on.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity < MAX_FRAME_LEN {
            return Err(ConfigError::Invalid {
                field: "buffer_capacity",
                message: format!(
                    "must hold the largest frame ({MAX_FRAME_LEN} bytes), got {}",
                    self.buffer_capacity
                ),
            });
        }
        if self.reads_per_call == 0 {
            return Err(ConfigError::Invalid {
                field: "reads_per_call",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Sensor kinds emitted by a session. Frames of disabled kinds are still
/// validated and consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorKinds {
    pub odometry: bool,
    pub ultra_lidar: bool,
    pub xv_lidar: bool,
}

impl Default for SensorKinds {
    fn default() -> Self {
        Self::all()
    }
}

impl SensorKinds {
    pub fn all() -> Self {
        Self {
            odometry: true,
            ultra_lidar: true,
            xv_lidar: true,
        }
    }

    pub fn none() -> Self {
        Self {
            odometry: false,
            ultra_lidar: false,
            xv_lidar: false,
        }
    }

    pub fn only(kinds: &[SensorKind]) -> Self {
        let mut selected = Self::none();
        for kind in kinds {
            selected.set(*kind, true);
        }
        selected
    }

    pub fn enabled(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Odometry => self.odometry,
            SensorKind::UltraLidar => self.ultra_lidar,
            SensorKind::XvLidar => self.xv_lidar,
        }
    }

    pub fn set(&mut self, kind: SensorKind, enabled: bool) {
        match kind {
            SensorKind::Odometry => self.odometry = enabled,
            SensorKind::UltraLidar => self.ultra_lidar = enabled,
            SensorKind::XvLidar => self.xv_lidar = enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SensorKinds, SessionConfig};
    use crate::records::SensorKind;

    #[test]
    fn empty_object_is_default() {
        let config = SessionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.buffer_capacity, 2048);
        assert_eq!(config.reads_per_call, 4);
        assert_eq!(config.kinds, SensorKinds::all());
    }

    #[test]
    fn partial_kinds_keep_defaults() {
        let config =
            SessionConfig::from_json_str(r#"{"device_id": 3, "kinds": {"xv_lidar": false}}"#)
                .unwrap();
        assert_eq!(config.device_id, 3);
        assert!(config.kinds.odometry);
        assert!(config.kinds.ultra_lidar);
        assert!(!config.kinds.xv_lidar);
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = SessionConfig::from_json_str(r#"{"baud_rate": 115200}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn small_capacity_rejected() {
        let err = SessionConfig::from_json_str(r#"{"buffer_capacity": 64}"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "buffer_capacity"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_reads_rejected() {
        let err = SessionConfig::from_json_str(r#"{"reads_per_call": 0}"#).unwrap_err();
        assert!(err.to_string().starts_with("reads_per_call:"));
    }

    #[test]
    fn only_selects_kinds() {
        let kinds = SensorKinds::only(&[SensorKind::UltraLidar]);
        assert!(kinds.enabled(SensorKind::UltraLidar));
        assert!(!kinds.enabled(SensorKind::Odometry));
        assert!(!kinds.enabled(SensorKind::XvLidar));
    }
}

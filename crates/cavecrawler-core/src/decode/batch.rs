use serde::{Deserialize, Serialize};

use crate::records::{OdometryRecord, Record, SensorKind, UltraLidarRecord, XvLidarRecord};

/// Records produced per kind by one decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub odometry: usize,
    pub ultra_lidar: usize,
    pub xv_lidar: usize,
}

impl RecordCounts {
    pub fn get(&self, kind: SensorKind) -> usize {
        match kind {
            SensorKind::Odometry => self.odometry,
            SensorKind::UltraLidar => self.ultra_lidar,
            SensorKind::XvLidar => self.xv_lidar,
        }
    }

    pub fn total(&self) -> usize {
        self.odometry + self.ultra_lidar + self.xv_lidar
    }

    fn increment(&mut self, kind: SensorKind) {
        match kind {
            SensorKind::Odometry => self.odometry += 1,
            SensorKind::UltraLidar => self.ultra_lidar += 1,
            SensorKind::XvLidar => self.xv_lidar += 1,
        }
    }
}

/// Records of one decode call in arrival order, across all kinds.
///
/// A fresh batch is returned by every call; the caller owns it.
///
/// # Examples
/// ```
/// use cavecrawler_core::{Batch, OdometryRecord, Quaternion, Record, SensorKind};
///
/// let mut batch = Batch::new();
/// batch.push(Record::Odometry(OdometryRecord {
///     timestamp_us: 1,
///     left_encoder_counts: 0,
///     right_encoder_counts: 0,
///     orientation: Quaternion { w: 1.0, x: 0.0, y: 0.0, z: 0.0 },
/// }));
/// assert_eq!(batch.counts().get(SensorKind::Odometry), 1);
/// assert_eq!(batch.odometry().count(), 1);
/// assert_eq!(batch.xv_lidar().count(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    records: Vec<Record>,
    counts: RecordCounts,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.counts.increment(record.kind());
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn counts(&self) -> RecordCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn odometry(&self) -> impl Iterator<Item = &OdometryRecord> {
        self.records.iter().filter_map(|record| match record {
            Record::Odometry(r) => Some(r),
            _ => None,
        })
    }

    pub fn ultra_lidar(&self) -> impl Iterator<Item = &UltraLidarRecord> {
        self.records.iter().filter_map(|record| match record {
            Record::UltraLidar(r) => Some(r),
            _ => None,
        })
    }

    pub fn xv_lidar(&self) -> impl Iterator<Item = &XvLidarRecord> {
        self.records.iter().filter_map(|record| match record {
            Record::XvLidar(r) => Some(r),
            _ => None,
        })
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

use crate::records::{Record, SensorKind};
use crate::{DecodeStats, SensorSummary};

const KINDS: [SensorKind; 3] = [
    SensorKind::Odometry,
    SensorKind::UltraLidar,
    SensorKind::XvLidar,
];

#[derive(Debug, Default, Clone, Copy)]
struct KindStats {
    records: u64,
    first_ts: Option<u32>,
    last_ts: Option<u32>,
    nodes: u64,
}

/// Per-kind record counts and timestamp bounds in arrival order.
#[derive(Debug, Default)]
pub(crate) struct SensorTally {
    kinds: [KindStats; 3],
}

impl SensorTally {
    pub(crate) fn add(&mut self, record: &Record) {
        let stats = &mut self.kinds[index(record.kind())];
        stats.records += 1;
        let ts = record.timestamp_us();
        if stats.first_ts.is_none() {
            stats.first_ts = Some(ts);
        }
        stats.last_ts = Some(ts);
        if let Record::UltraLidar(ultra) = record {
            stats.nodes += ultra.nodes.len() as u64;
        }
    }

    /// One summary per kind in stable order; kinds never seen are omitted.
    pub(crate) fn build(&self, diagnostics: &DecodeStats) -> Vec<SensorSummary> {
        KINDS
            .iter()
            .filter_map(|kind| {
                let stats = self.kinds[index(*kind)];
                let frames = diagnostics.frames(*kind);
                if frames == 0 && stats.records == 0 {
                    return None;
                }
                Some(SensorSummary {
                    kind: *kind,
                    frames,
                    records: stats.records,
                    first_timestamp_us: stats.first_ts,
                    last_timestamp_us: stats.last_ts,
                    nodes: (*kind == SensorKind::UltraLidar).then_some(stats.nodes),
                })
            })
            .collect()
    }
}

fn index(kind: SensorKind) -> usize {
    match kind {
        SensorKind::Odometry => 0,
        SensorKind::UltraLidar => 1,
        SensorKind::XvLidar => 2,
    }
}

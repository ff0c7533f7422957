use tracing::debug;

use super::stats::DecodeStats;
use crate::protocols::ultra::capsule_to_nodes;
use crate::records::{MeasurementNode, UltraCapsule};

/// Gaps at or above this are treated as reordering rather than loss.
const MAX_LOSS_GAP: u8 = 128;

/// Previous capsule of the current chain, kept across decode calls.
#[derive(Debug, Default)]
pub(crate) struct UltraTracker {
    previous: Option<UltraCapsule>,
    last_sequence: Option<u8>,
}

impl UltraTracker {
    /// Feed the next validated capsule and return the nodes it completes.
    pub(crate) fn advance(
        &mut self,
        sequence: u8,
        capsule: &UltraCapsule,
        stats: &mut DecodeStats,
    ) -> Vec<MeasurementNode> {
        let gap = self
            .last_sequence
            .map(|last| sequence.wrapping_sub(last.wrapping_add(1)))
            .unwrap_or(0);
        self.last_sequence = Some(sequence);

        if gap > 0 {
            stats.ultra_sequence_gaps += 1;
            if gap < MAX_LOSS_GAP {
                stats.ultra_lost_capsules += gap as u64;
            }
        }

        let previous = self.previous.replace(capsule.clone());
        let Some(previous) = previous else {
            return Vec::new();
        };
        if capsule.start_sync {
            debug!(sequence, "ultra scan restarted");
            return Vec::new();
        }
        if gap > 0 || previous.cabins.len() != capsule.cabins.len() {
            stats.ultra_chain_resets += 1;
            debug!(
                sequence,
                gap,
                cabins = capsule.cabins.len(),
                previous_cabins = previous.cabins.len(),
                "ultra capsule chain reset"
            );
            return Vec::new();
        }
        capsule_to_nodes(&previous, capsule)
    }
}

//! Conversion of capsule pairs into measurement nodes.
//!
//! A capsule only carries its own start angle, so its samples are spread
//! across the arc up to the start angle of the next capsule. Nodes for a
//! capsule therefore become available when its successor arrives.

use super::layout;
use super::reader::{is_no_sample, major_distance, predict1, predict2, varbit_decode};
use crate::records::{MeasurementNode, UltraCapsule};

const FULL_CIRCLE_Q8: i32 = 360 << 8;
const FULL_CIRCLE_Q16: i32 = 360 << 16;
const FULL_CIRCLE_Q6: i32 = 360 << 6;
/// Mean angular offset (7.5 degrees, radians in q16) for short or empty returns.
const OFFSET_MEAN_Q16: i32 = 8578;
/// 8 degrees in radians, q16.
const OFFSET_BASE_Q16: i32 = 9150;
const OFFSET_K1: i32 = 98361;
const OFFSET_CUBE_DIVISOR: i32 = 98304;
/// Below 50 mm the distance-dependent correction is not applied.
const OFFSET_MIN_DIST_Q2: i32 = 50 * 4;
const PI_APPROX: f64 = 3.14159265;
const NODE_QUALITY: u8 = 0x2F << 2;

/// Decode the samples of `previous`, using `current` for the end angle and
/// the distance base of the last cabin.
///
/// Returns three nodes per cabin of `previous`.
pub fn capsule_to_nodes(previous: &UltraCapsule, current: &UltraCapsule) -> Vec<MeasurementNode> {
    let cabins = previous.cabins.len();
    if cabins == 0 {
        return Vec::new();
    }

    let prev_q8 = (previous.start_angle_q6 as i32) << 2;
    let current_q8 = (current.start_angle_q6 as i32) << 2;
    let mut diff_q8 = current_q8 - prev_q8;
    if prev_q8 > current_q8 {
        diff_q8 += FULL_CIRCLE_Q8;
    }
    let angle_inc_q16 = (diff_q8 << 8) / (cabins * layout::SAMPLES_PER_CABIN) as i32;
    let mut angle_q16 = prev_q8 << 8;

    let mut nodes = Vec::with_capacity(cabins * layout::SAMPLES_PER_CABIN);
    for (pos, cabin) in previous.cabins.iter().enumerate() {
        let next_major = match previous.cabins.get(pos + 1) {
            Some(next) => next.major_distance(),
            None => current.cabins.first().map_or(0, |c| major_distance(c.0)),
        };
        for dist_q2 in cabin_distances(cabin.0, next_major) {
            let sync = (angle_q16 + angle_inc_q16) % FULL_CIRCLE_Q16 < angle_inc_q16;
            let angle_q6 = corrected_angle_q6(angle_q16, dist_q2);
            angle_q16 += angle_inc_q16;

            nodes.push(MeasurementNode {
                angle_z_q14: ((angle_q6 << 8) / 90) as u16,
                dist_mm_q2: dist_q2 as u32,
                quality: if dist_q2 != 0 { NODE_QUALITY } else { 0 },
                sync,
            });
        }
    }
    nodes
}

/// Distances in q2 of the three samples of one cabin. `next_major` is the
/// raw major distance of the following cabin, the base of the third sample.
fn cabin_distances(cabin: u32, next_major: u32) -> [i32; 3] {
    let (major, mut level1) = varbit_decode(major_distance(cabin));
    let (major2, level2) = varbit_decode(next_major);
    let (major, major2) = (major as i32, major2 as i32);

    let mut base1 = major;
    if major == 0 && major2 != 0 {
        base1 = major2;
        level1 = level2;
    }

    let predicted = |delta: i32, level: u32, base: i32| {
        if is_no_sample(delta) {
            0
        } else {
            ((delta << level) + base) << 2
        }
    };

    [
        major << 2,
        predicted(predict1(cabin), level1, base1),
        predicted(predict2(cabin), level2, major2),
    ]
    .map(|dist| dist.max(0))
}

/// Apply the optical offset for a sample and wrap to `[0, 360)` in q6.
fn corrected_angle_q6(angle_q16: i32, dist_q2: i32) -> i32 {
    let offset_q16 = if dist_q2 >= OFFSET_MIN_DIST_Q2 {
        let k2 = OFFSET_K1 / dist_q2;
        OFFSET_BASE_Q16 - (k2 << 6) - (k2 * k2 * k2) / OFFSET_CUBE_DIVISOR
    } else {
        OFFSET_MEAN_Q16
    };
    let compensation = (offset_q16 as f64 * 180.0 / PI_APPROX) as i32;

    let mut angle_q6 = (angle_q16 - compensation) >> 10;
    if angle_q6 < 0 {
        angle_q6 += FULL_CIRCLE_Q6;
    }
    if angle_q6 >= FULL_CIRCLE_Q6 {
        angle_q6 -= FULL_CIRCLE_Q6;
    }
    angle_q6
}

#[cfg(test)]
mod tests {
    use super::{capsule_to_nodes, cabin_distances};
    use crate::records::{CapsuleChecksum, UltraCabin, UltraCapsule};

    fn capsule(start_angle_q6: u16, cabins: Vec<u32>) -> UltraCapsule {
        UltraCapsule {
            start_angle_q6,
            start_sync: false,
            checksum: CapsuleChecksum { low: 0xA0, high: 0x50 },
            cabins: cabins.into_iter().map(UltraCabin).collect(),
        }
    }

    fn cabin(major: u32, predict1: i32, predict2: i32) -> u32 {
        ((predict2 as u32 & 0x3FF) << 22) | ((predict1 as u32 & 0x3FF) << 12) | major
    }

    #[test]
    fn uniform_capsule_nodes() {
        let previous = capsule(0, vec![1000; 32]);
        let current = capsule(384, vec![1000; 32]);
        let nodes = capsule_to_nodes(&previous, &current);

        assert_eq!(nodes.len(), 96);
        assert!(nodes.iter().all(|n| n.dist_mm_q2 == 5952 && n.quality == 188));
        assert!(nodes.iter().all(|n| !n.sync));
        assert_eq!(nodes[0].angle_z_q14, 64241);
        assert_eq!(nodes[1].angle_z_q14, 64253);
        assert_eq!(nodes[2].angle_z_q14, 64264);
        assert_eq!(nodes[95].angle_z_q14, 65322);
    }

    #[test]
    fn reduced_capsule_nodes() {
        let previous = capsule(0, vec![1000; 16]);
        let current = capsule(384, vec![1000; 16]);
        let nodes = capsule_to_nodes(&previous, &current);

        assert_eq!(nodes.len(), 48);
        assert_eq!(nodes[0].angle_z_q14, 64241);
        assert_eq!(nodes[47].angle_z_q14, 65311);
    }

    #[test]
    fn sync_on_wrap_around() {
        // 359 degrees to 5 degrees crosses zero after one sixth of the arc.
        let previous = capsule(359 * 64, vec![1000; 32]);
        let current = capsule(5 * 64, vec![1000; 32]);
        let nodes = capsule_to_nodes(&previous, &current);

        let synced: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.sync)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(synced, vec![15]);
        assert_eq!(nodes[0].angle_z_q14, 64059);
        assert_eq!(nodes[95].angle_z_q14, 65140);
    }

    #[test]
    fn no_sample_and_empty_major() {
        let mut cabins = vec![cabin(0, -512, 0x1FF)];
        cabins.extend(std::iter::repeat_n(600, 31));
        let previous = capsule(0, cabins);
        let current = capsule(384, vec![600; 32]);
        let nodes = capsule_to_nodes(&previous, &current);

        for node in &nodes[..3] {
            assert_eq!(node.dist_mm_q2, 0);
            assert_eq!(node.quality, 0);
        }
        assert_eq!(nodes[0].angle_z_q14, 64170);
        assert_eq!(nodes[3].dist_mm_q2, 2752);
        assert_eq!(nodes[3].angle_z_q14, 64469);
    }

    #[test]
    fn signed_deltas() {
        // 600 decodes to 688 at scale level 1.
        let distances = cabin_distances(cabin(600, -5, 3), 600);
        assert_eq!(distances, [2752, 2712, 2776]);
    }

    #[test]
    fn zero_major_borrows_next_base() {
        let distances = cabin_distances(cabin(0, 2, 0), 600);
        assert_eq!(distances, [0, (688 + 4) * 4, 688 * 4]);
    }

    #[test]
    fn negative_distances_clamp_to_zero() {
        let distances = cabin_distances(cabin(3, -100, -100), 3);
        assert_eq!(distances, [12, 0, 0]);
    }

    #[test]
    fn empty_previous_yields_nothing() {
        let nodes = capsule_to_nodes(&capsule(0, Vec::new()), &capsule(64, vec![1; 16]));
        assert!(nodes.is_empty());
    }
}

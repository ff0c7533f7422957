use std::fs;
use std::path::{Path, PathBuf};

use cavecrawler_core::protocols::frame::writer::{encode_odometry, encode_ultra, encode_xv_lidar};
use cavecrawler_core::{
    CapsuleChecksum, OdometryRecord, Quaternion, UltraCabin, UltraCapsule, XvLidarRecord,
};

const XV_SPEED64: u16 = 300 * 64;
const XV_STRENGTH_WARNING: u16 = 0x4000;
const XV_INVALID: u16 = 0x8000;
const ULTRA_REDUCED_CABINS: usize = 16;
/// Cabin index carrying no returns in every generated capsule.
const ULTRA_EMPTY_CABIN: usize = 5;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_fixture(&root, "odometry_basic", &odometry_basic())?;
    write_fixture(&root, "mixed_resync", &mixed_resync())?;
    write_fixture(&root, "ultra_chain", &ultra_chain())?;
    Ok(())
}

fn write_fixture(root: &Path, name: &str, bytes: &[u8]) -> Result<(), String> {
    let dir = root.join(name);
    fs::create_dir_all(&dir)
        .map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let path = dir.join("input.bin");
    fs::write(&path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn odometry(timestamp_us: u32, left: i32, right: i32, q: [f32; 4]) -> Vec<u8> {
    encode_odometry(&OdometryRecord {
        timestamp_us,
        left_encoder_counts: left,
        right_encoder_counts: right,
        orientation: Quaternion {
            w: q[0],
            x: q[1],
            y: q[2],
            z: q[3],
        },
    })
}

fn xv(timestamp_us: u32, angle_quad: u8, distances: [u16; 4]) -> Vec<u8> {
    encode_xv_lidar(&XvLidarRecord {
        timestamp_us,
        angle_quad,
        speed64: XV_SPEED64,
        distances,
    })
}

fn odometry_basic() -> Vec<u8> {
    let mut bytes = odometry(1000, 50, 52, [1.0, 0.0, 0.0, 0.0]);
    bytes.extend(odometry(2000, 60, 63, [0.5, 0.5, 0.5, 0.5]));
    bytes.extend(odometry(3000, -70, 74, [0.0, 0.0, 0.0, 1.0]));
    bytes
}

/// Garbage, a valid XV frame, a corrupted odometry frame, another XV frame
/// and a dangling header.
fn mixed_resync() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x13, 0x37];
    bytes.extend(xv(
        10,
        0,
        [1000, XV_STRENGTH_WARNING | 1500, XV_INVALID | 0x21, 2500],
    ));
    let mut corrupted = odometry(20, -5, 5, [1.0, 0.0, 0.0, 0.0]);
    corrupted[10] ^= 0x04;
    bytes.extend(corrupted);
    bytes.extend(xv(30, 1, [1010, 1020, 1030, 1040]));
    bytes.extend([0xFB, 0x14, 0x02, 0x00]);
    bytes
}

fn cabin(major: u32, predict1: i32, predict2: i32) -> UltraCabin {
    UltraCabin(((predict2 as u32 & 0x3FF) << 22) | ((predict1 as u32 & 0x3FF) << 12) | major)
}

fn ultra_cabins(seed: u32) -> Vec<UltraCabin> {
    (0..ULTRA_REDUCED_CABINS)
        .map(|j| {
            if j == ULTRA_EMPTY_CABIN {
                return cabin(0, -512, 0x1FF);
            }
            let j = j as i32;
            let major = (400 + 37 * j as u32 + seed * 11) & 0xFFF;
            cabin(major, j * 5 - 20, 7 - j * 3)
        })
        .collect()
}

/// Reduced capsules with a scan start and a sequence gap before the last.
fn ultra_chain() -> Vec<u8> {
    let mut bytes = Vec::new();
    for (sequence, start_angle_q6, start_sync) in
        [(0u8, 0u16, true), (1, 384, false), (2, 768, false), (5, 1152, false)]
    {
        let capsule = UltraCapsule {
            start_angle_q6,
            start_sync,
            checksum: CapsuleChecksum { low: 0, high: 0 },
            cabins: ultra_cabins(sequence as u32),
        };
        bytes.extend(encode_ultra(sequence, sequence as u32 * 500, &capsule));
    }
    bytes
}

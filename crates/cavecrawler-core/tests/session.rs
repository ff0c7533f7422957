use cavecrawler_core::protocols::frame::writer::{encode_odometry, encode_ultra, encode_xv_lidar};
use cavecrawler_core::{
    CapsuleChecksum, DecodeStatus, MemorySource, OdometryRecord, Quaternion, Record, SensorKind,
    SensorKinds, Session, SessionConfig, SessionError, StreamDecoder, UltraCabin, UltraCapsule,
    XvLidarRecord,
};

fn odometry_record() -> OdometryRecord {
    OdometryRecord {
        timestamp_us: 1000,
        left_encoder_counts: 50,
        right_encoder_counts: 52,
        orientation: Quaternion {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
    }
}

fn xv_record(timestamp_us: u32, angle_quad: u8) -> XvLidarRecord {
    XvLidarRecord {
        timestamp_us,
        angle_quad,
        speed64: 300 * 64,
        distances: [1000, 0x4000 | 1500, 0x8000 | 0x21, 2500],
    }
}

fn ultra_capsule(start_angle_q6: u16, cabins: usize) -> UltraCapsule {
    UltraCapsule {
        start_angle_q6,
        start_sync: false,
        checksum: CapsuleChecksum { low: 0, high: 0 },
        cabins: vec![UltraCabin(1000); cabins],
    }
}

fn session() -> Session {
    Session::new(SessionConfig::default()).expect("default config")
}

#[test]
fn odometry_scenario() {
    let mut session = session();
    session.feed(&encode_odometry(&odometry_record())).unwrap();
    let decoded = session.decode().unwrap();

    assert_eq!(decoded.status, DecodeStatus::Ok);
    assert_eq!(decoded.batch.counts().get(SensorKind::Odometry), 1);
    assert_eq!(decoded.batch.counts().total(), 1);
    let record = decoded.batch.odometry().next().expect("odometry record");
    assert_eq!(record.timestamp_us, 1000);
    assert_eq!(record.left_encoder_counts, 50);
    assert_eq!(record.right_encoder_counts, 52);
    assert_eq!(
        record.orientation,
        Quaternion {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0
        }
    );
    assert_eq!(session.buffered(), 0);
}

#[test]
fn two_xv_frames_in_one_append() {
    let mut bytes = encode_xv_lidar(&xv_record(10, 0));
    bytes.extend(encode_xv_lidar(&xv_record(20, 1)));

    let mut session = session();
    session.feed(&bytes).unwrap();
    let decoded = session.decode().unwrap();

    assert_eq!(decoded.status, DecodeStatus::Ok);
    let records: Vec<&XvLidarRecord> = decoded.batch.xv_lidar().collect();
    assert_eq!(records, vec![&xv_record(10, 0), &xv_record(20, 1)]);
    let readings = records[0].readings();
    assert_eq!(readings[0].distance_mm(), Some(1000));
    assert!(readings[1].strength_warning);
    assert_eq!(readings[2].distance_mm(), None);
}

#[test]
fn resync_consumes_garbage_one_byte_at_a_time() {
    let frame = encode_odometry(&odometry_record());
    for garbage_len in 0..12usize {
        let mut bytes: Vec<u8> = (0..garbage_len).map(|i| 0x10 + i as u8).collect();
        bytes.extend_from_slice(&frame);

        let mut session = session();
        session.feed(&bytes).unwrap();
        let decoded = session.decode().unwrap();

        assert_eq!(decoded.status, DecodeStatus::Ok);
        assert_eq!(decoded.batch.len(), 1, "garbage_len {garbage_len}");
        assert_eq!(session.stats().desync_bytes, garbage_len as u64);
        assert_eq!(session.stats().checksum_failures, 0);
    }
}

#[test]
fn single_bit_flip_rejects_frame_and_advances_one_byte() {
    let frames = [
        ("odometry", encode_odometry(&odometry_record())),
        ("xv_lidar", encode_xv_lidar(&xv_record(7, 3))),
        ("ultra_full", encode_ultra(1, 2, &ultra_capsule(384, 32))),
        ("ultra_reduced", encode_ultra(1, 2, &ultra_capsule(384, 16))),
    ];
    for (name, frame) in frames {
        let payload_and_checksum = 3..frame.len() - 1;
        for index in payload_and_checksum {
            for bit in 0..8 {
                let mut corrupted = frame.clone();
                corrupted[index] ^= 1 << bit;

                let mut session = session();
                session.feed(&corrupted).unwrap();
                let decoded = session.decode().unwrap();

                assert!(decoded.batch.is_empty(), "{name} byte {index} bit {bit}");
                assert_eq!(decoded.status, DecodeStatus::Ok, "{name} byte {index} bit {bit}");
                let stats = session.stats();
                assert_eq!(stats.checksum_failures, 1, "{name} byte {index} bit {bit}");
                // One byte for the rejection, then byte-wise resync down to a
                // two-byte tail.
                assert_eq!(stats.desync_bytes, frame.len() as u64 - 3, "{name}");
                assert_eq!(session.buffered(), 2, "{name}");
            }
        }
    }
}

#[test]
fn firmware_frame_without_checksum_is_not_decoded() {
    // Checksum-less framing: size 32, no XOR byte before the end delimiter.
    let record = odometry_record();
    let mut frame = vec![0xFB, 32, 0x01];
    frame.extend_from_slice(&record.timestamp_us.to_le_bytes());
    frame.extend_from_slice(&record.left_encoder_counts.to_le_bytes());
    frame.extend_from_slice(&record.right_encoder_counts.to_le_bytes());
    for component in [1.0f32, 0.0, 0.0, 0.0] {
        frame.extend_from_slice(&component.to_le_bytes());
    }
    frame.push(0xFC);
    assert_eq!(frame.len(), 32);

    let mut session = session();
    session.feed(&frame).unwrap();
    let decoded = session.decode().unwrap();

    assert_eq!(decoded.status, DecodeStatus::Ok);
    assert!(decoded.batch.is_empty());
    assert_eq!(session.stats().desync_bytes, 30);
    assert_eq!(session.stats().checksum_failures, 0);
}

#[test]
fn frame_hidden_behind_false_signature_is_recovered() {
    let frame = encode_odometry(&odometry_record());
    let mut bytes = frame[..3].to_vec();
    bytes.extend_from_slice(&frame);

    let mut session = session();
    session.feed(&bytes).unwrap();
    let decoded = session.decode().unwrap();

    assert_eq!(decoded.batch.len(), 1);
    assert_eq!(session.stats().checksum_failures, 1);
    assert_eq!(session.stats().desync_bytes, 2);
}

#[test]
fn split_frame_at_every_offset() {
    let frames = [
        encode_odometry(&odometry_record()),
        encode_xv_lidar(&xv_record(5, 7)),
        encode_ultra(3, 99, &ultra_capsule(64, 32)),
        encode_ultra(3, 99, &ultra_capsule(64, 16)),
    ];
    for frame in &frames {
        let mut whole = session();
        whole.feed(frame).unwrap();
        let expected = whole.decode().unwrap();
        assert_eq!(expected.batch.len(), 1);

        for split in 1..frame.len() {
            let mut session = session();
            session.feed(&frame[..split]).unwrap();
            let first = session.decode().unwrap();
            assert_eq!(first.status, DecodeStatus::Pending, "split at {split}");
            assert!(first.batch.is_empty());

            session.feed(&frame[split..]).unwrap();
            let second = session.decode().unwrap();
            assert_eq!(second.status, DecodeStatus::Ok);
            assert_eq!(second.batch, expected.batch, "split at {split}");
        }
    }
}

#[test]
fn draining_is_idempotent() {
    let mut session = session();
    session.feed(&encode_xv_lidar(&xv_record(1, 0))).unwrap();
    assert_eq!(session.decode().unwrap().batch.len(), 1);
    for _ in 0..3 {
        let again = session.decode().unwrap();
        assert_eq!(again.status, DecodeStatus::Ok);
        assert!(again.batch.is_empty());
    }

    let frame = encode_odometry(&odometry_record());
    session.feed(&frame[..10]).unwrap();
    for _ in 0..3 {
        let again = session.decode().unwrap();
        assert_eq!(again.status, DecodeStatus::Pending);
        assert!(again.batch.is_empty());
        assert_eq!(session.buffered(), 10);
    }
}

#[test]
fn overflow_is_fatal_and_keeps_prefix() {
    let config = SessionConfig {
        buffer_capacity: 160,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config).unwrap();
    let frame = encode_odometry(&odometry_record());
    session.feed(&frame[..20]).unwrap();

    let err = session.feed(&[0u8; 141]).unwrap_err();
    assert!(matches!(err, SessionError::Overflow(_)));
    assert!(err.to_string().contains("buffer overflow"));
    assert_eq!(session.buffered(), 20);
    assert!(session.is_failed());
    assert!(matches!(session.decode(), Err(SessionError::Failed)));
    assert!(matches!(session.feed(&[]), Err(SessionError::Failed)));
}

#[test]
fn buffer_never_exceeds_capacity() {
    let mut stream = Vec::new();
    for i in 0..40u32 {
        stream.extend(encode_xv_lidar(&xv_record(i, (i % 90) as u8)));
        stream.extend(encode_odometry(&odometry_record()));
        stream.extend([0x00, 0xFB, 0x21]);
    }

    // Small deterministic LCG for chunk sizes.
    let mut state = 0x2545_F491u32;
    let mut offset = 0;
    let mut session = session();
    let capacity = session.config().buffer_capacity;
    let mut records = 0;
    while offset < stream.len() {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let chunk = 1 + (state >> 16) as usize % 64;
        let end = (offset + chunk).min(stream.len());
        session.feed(&stream[offset..end]).unwrap();
        assert!(session.buffered() <= capacity);
        records += session.decode().unwrap().batch.len();
        assert!(session.buffered() <= capacity);
        offset = end;
    }
    assert_eq!(records, 80);
}

#[test]
fn ultra_chain_produces_nodes() {
    let mut session = Session::new(SessionConfig {
        device_id: 7,
        ..SessionConfig::default()
    })
    .unwrap();
    session
        .feed(&encode_ultra(0, 100, &ultra_capsule(0, 32)))
        .unwrap();
    session
        .feed(&encode_ultra(1, 200, &ultra_capsule(384, 32)))
        .unwrap();
    let decoded = session.decode().unwrap();

    let records: Vec<_> = decoded.batch.ultra_lidar().collect();
    assert_eq!(records.len(), 2);
    assert!(records[0].nodes.is_empty());
    assert_eq!(records[1].device_id, 7);
    assert_eq!(records[1].sequence, 1);
    assert_eq!(records[1].nodes.len(), 96);
    assert_eq!(records[1].nodes[0].angle_z_q14, 64241);
    assert_eq!(records[1].nodes[0].dist_mm_q2, 5952);
    assert_eq!(records[1].nodes[0].quality, 188);
}

#[test]
fn ultra_sequence_gap_is_counted() {
    let mut session = session();
    for (sequence, angle) in [(0u8, 0u16), (1, 384), (4, 768), (5, 1152)] {
        session
            .feed(&encode_ultra(sequence, 0, &ultra_capsule(angle, 16)))
            .unwrap();
    }
    let decoded = session.decode().unwrap();
    let node_counts: Vec<usize> = decoded.batch.ultra_lidar().map(|r| r.nodes.len()).collect();
    assert_eq!(node_counts, vec![0, 48, 0, 48]);

    let stats = session.stats();
    assert_eq!(stats.ultra_sequence_gaps, 1);
    assert_eq!(stats.ultra_lost_capsules, 2);
    assert_eq!(stats.ultra_chain_resets, 1);
}

#[test]
fn corrupted_capsule_is_rejected() {
    let mut frame = encode_ultra(0, 0, &ultra_capsule(64, 16));
    // Flip a cabin bit and re-seal the envelope so only the capsule check
    // can catch it.
    frame[20] ^= 0x01;
    let len = frame.len();
    frame[len - 2] = frame[1..len - 2].iter().fold(0u8, |acc, b| acc ^ b);

    let mut session = session();
    session.feed(&frame).unwrap();
    let decoded = session.decode().unwrap();
    assert!(decoded.batch.is_empty());
    assert_eq!(session.stats().checksum_failures, 1);
}

#[test]
fn disabled_kinds_are_consumed_silently() {
    let config = SessionConfig {
        kinds: SensorKinds::only(&[SensorKind::XvLidar]),
        ..SessionConfig::default()
    };
    let mut session = Session::new(config).unwrap();
    let mut bytes = encode_odometry(&odometry_record());
    bytes.extend(encode_xv_lidar(&xv_record(3, 2)));
    bytes.extend(encode_ultra(0, 0, &ultra_capsule(0, 32)));
    session.feed(&bytes).unwrap();

    let decoded = session.decode().unwrap();
    assert_eq!(decoded.status, DecodeStatus::Ok);
    assert_eq!(decoded.batch.len(), 1);
    assert!(matches!(decoded.batch.records()[0], Record::XvLidar(_)));
    assert_eq!(session.stats().filtered_frames, 2);
    assert_eq!(session.stats().frames_total(), 3);
    assert_eq!(session.buffered(), 0);
}

#[test]
fn mixed_stream_keeps_arrival_order() {
    let mut bytes = encode_xv_lidar(&xv_record(1, 0));
    bytes.extend(encode_odometry(&odometry_record()));
    bytes.extend(encode_xv_lidar(&xv_record(2, 1)));

    let mut session = session();
    session.feed(&bytes).unwrap();
    let kinds: Vec<SensorKind> = session
        .decode()
        .unwrap()
        .batch
        .records()
        .iter()
        .map(Record::kind)
        .collect();
    assert_eq!(
        kinds,
        vec![SensorKind::XvLidar, SensorKind::Odometry, SensorKind::XvLidar]
    );
}

#[test]
fn stream_decoder_reports_closed_source() {
    let mut bytes = encode_odometry(&odometry_record());
    bytes.extend(encode_xv_lidar(&xv_record(4, 4)));
    let source = MemorySource::chunked(&bytes, 3);
    let mut decoder = StreamDecoder::open(source, SessionConfig::default()).unwrap();

    let mut records = 0;
    let err = loop {
        match decoder.decode_once() {
            Ok(decoded) => records += decoded.batch.len(),
            Err(err) => break err,
        }
    };
    assert_eq!(records, 2);
    assert!(err.to_string().contains("closed"));
    assert!(matches!(decoder.decode_once(), Err(SessionError::Failed)));
}

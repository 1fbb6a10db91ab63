use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use surveyor_io::{ByteReader, DecodeError};
use surveyor_zone::{CHUNK_DIM, ChunkPos, ZoneChunkRecord, ZonePlan, ZonePlanRecord};

#[test]
fn unset_grid_reads_false() {
    let plan = ZonePlan::new();
    assert!(!plan.get(0, 0));
    assert!(!plan.get(-1, 123_456));
    assert!(plan.is_empty());
}

#[test]
fn clearing_on_absent_chunk_allocates_nothing() {
    let mut plan = ZonePlan::new();
    plan.set(40, -40, false);
    assert!(plan.is_empty());
}

#[test]
fn negative_coordinates_land_in_floored_chunk() {
    let mut plan = ZonePlan::new();
    plan.set(-1, -1, true);
    assert!(plan.chunk(ChunkPos::new(-1, -1)).is_some());
    assert!(plan.get(-1, -1));
    assert!(!plan.get(15, 15));
    assert!(!plan.get(-17, -1));
}

#[test]
fn emptied_chunk_is_dropped() {
    let mut plan = ZonePlan::new();
    plan.fill_rect(32, 48, 47, 63, true);
    assert_eq!(plan.len(), 1);
    assert!(plan.chunk(ChunkPos::new(2, 3)).unwrap().is_full());
    assert_eq!(plan.area(), CHUNK_DIM * CHUNK_DIM);

    for z in 48..64 {
        for x in 32..48 {
            plan.set(x, z, false);
        }
    }
    assert!(plan.is_empty());
    assert_eq!(plan.chunk(ChunkPos::new(2, 3)), None);
}

#[test]
fn distance_uses_nearest_chunk_middle() {
    let mut plan = ZonePlan::new();
    assert_eq!(plan.distance_squared(0, 0), f64::INFINITY);
    assert_eq!(plan.distance(0, 0), f64::INFINITY);

    plan.set(3, 3, true); // chunk (0, 0), middle (8, 8)
    plan.set(100, 0, true); // chunk (6, 0), middle (104, 8)
    assert_eq!(plan.distance_squared(8, 8), 0.0);
    assert_eq!(plan.distance_squared(0, 8), 64.0);
    assert_eq!(plan.distance_squared(104, 12), 16.0);
    assert_eq!(plan.distance(11, 12), 5.0);
}

#[test]
fn contains_point_floors() {
    let mut plan = ZonePlan::new();
    plan.set(-1, 2, true);
    assert!(plan.contains_point(-0.25, 2.9));
    assert!(!plan.contains_point(0.0, 2.5));
    assert!(!plan.contains_point(-1.01, 2.0));
}

#[test]
fn random_position_single_bit() {
    let mut plan = ZonePlan::new();
    assert_eq!(plan.random_set_position(&mut StdRng::seed_from_u64(1)), None);

    plan.set(-37, 1_000, true);
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        assert_eq!(plan.random_set_position(&mut rng), Some((-37, 1_000)));
    }
}

#[test]
fn random_position_uniform_over_chunks() {
    let mut plan = ZonePlan::new();
    // Dense chunk with 256 set columns and a sparse one with a single column.
    plan.fill_rect(0, 0, 15, 15, true);
    plan.set(500, 500, true);
    let mut rng = StdRng::seed_from_u64(7);
    let mut sparse_hits = 0;
    let n = 4_000;
    for _ in 0..n {
        let (x, z) = plan.random_set_position(&mut rng).unwrap();
        assert!(plan.get(x, z));
        if (x, z) == (500, 500) {
            sparse_hits += 1;
        }
    }
    // Half the samples go to the sparse chunk, not 1/257 of them.
    assert!(sparse_hits > n * 2 / 5 && sparse_hits < n * 3 / 5, "{sparse_hits}");
}

#[test]
fn listener_fires_after_effective_writes() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut plan = ZonePlan::new();
    let sink = Rc::clone(&log);
    plan.set_listener(move |x, z| sink.borrow_mut().push((x, z)));

    plan.set(1, 2, true);
    plan.set(1, 2, true);
    plan.set(9, 9, false);
    plan.set(1, 2, false);
    assert_eq!(*log.borrow(), vec![(1, 2), (1, 2)]);
}

#[test]
fn wire_layout() {
    let mut plan = ZonePlan::new();
    plan.set(16, -16, true);
    let bytes = plan.to_bytes();
    assert_eq!(
        bytes,
        vec![
            0, 0, 0, 1, // chunk count
            0, 0, 0, 1, // cx
            0xFF, 0xFF, 0xFF, 0xFF, // cz
            0x02, 0x00, 0x01, 0x01, // bitset of one byte
        ]
    );
}

#[test]
fn round_trip_preserves_boundary_columns() {
    let mut plan = ZonePlan::new();
    for &(cx, cz) in &[(0, 0), (5, -3), (-100, 40)] {
        let (ox, oz) = (cx * 16, cz * 16);
        for i in 0..16 {
            plan.set(ox + i, oz + (i * 7) % 16, true);
            plan.set(ox, oz + i, i % 3 == 0);
            plan.set(ox + 15, oz + 15 - i, i % 2 == 1);
        }
    }
    let decoded = ZonePlan::from_bytes(&plan.to_bytes()).unwrap();
    assert_eq!(decoded, plan);

    let mut edges: Vec<i32> = Vec::new();
    for c in (-2000..=2000).step_by(16) {
        edges.extend([c - 1, c, c + 15, c + 16]);
    }
    for &x in &edges {
        for &z in &edges {
            assert_eq!(decoded.get(x, z), plan.get(x, z), "mismatch at ({x}, {z})");
        }
    }
}

#[test]
fn decode_rejects_impossible_count() {
    let bytes = [0x7F, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];
    let err = ZonePlan::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidCount { .. }));

    let bytes = [0xFF, 0xFF, 0xFF, 0xFF];
    assert!(matches!(
        ZonePlan::from_bytes(&bytes),
        Err(DecodeError::InvalidCount { count: -1, .. })
    ));
}

#[test]
fn failed_decode_into_leaves_plan_empty() {
    let mut plan = ZonePlan::new();
    plan.set(0, 0, true);
    let mut r = ByteReader::new(&[0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0x09]);
    assert_eq!(plan.decode_into(&mut r), Err(DecodeError::BadFlags(0x09)));
    assert!(plan.is_empty());
}

#[test]
fn record_round_trip_through_toml() {
    let mut plan = ZonePlan::new();
    plan.fill_rect(-16, -16, -1, -1, true);
    plan.set(3, 70, true);
    let record = plan.to_record();
    assert!(record.chunks.iter().any(|c| c.full && c.bits.is_empty()));

    let text = toml::to_string(&record).unwrap();
    let back: ZonePlanRecord = toml::from_str(&text).unwrap();
    assert_eq!(ZonePlan::from_record(&back).unwrap(), plan);
}

#[test]
fn decode_rejects_unreachable_chunks() {
    // One full chunk at cx = 2^27, one past the largest reachable chunk.
    let bytes = [0, 0, 0, 1, 0x08, 0, 0, 0, 0, 0, 0, 3, 0x01];
    assert_eq!(
        ZonePlan::from_bytes(&bytes),
        Err(DecodeError::ChunkOutOfRange { cx: 1 << 27, cz: 3 })
    );
    let below = (ChunkPos::MIN_COORD - 1).to_be_bytes();
    let mut bytes = vec![0, 0, 0, 1, 0, 0, 0, 0];
    bytes.extend_from_slice(&below);
    bytes.push(0x01);
    assert!(matches!(
        ZonePlan::from_bytes(&bytes),
        Err(DecodeError::ChunkOutOfRange { .. })
    ));

    let record = ZonePlanRecord {
        chunks: vec![ZoneChunkRecord {
            chunk_x: i32::MAX,
            chunk_z: 0,
            full: true,
            bits: Vec::new(),
        }],
    };
    assert!(matches!(
        ZonePlan::from_record(&record),
        Err(DecodeError::ChunkOutOfRange { cx: i32::MAX, cz: 0 })
    ));
}

#[test]
fn extreme_reachable_chunks_sample_set_columns() {
    let mut plan = ZonePlan::new();
    plan.set(i32::MAX, i32::MIN, true);
    plan.set(i32::MIN, i32::MAX, true);
    let decoded = ZonePlan::from_bytes(&plan.to_bytes()).unwrap();
    assert_eq!(decoded, plan);
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let (x, z) = decoded.random_set_position(&mut rng).unwrap();
        assert!(decoded.get(x, z), "sampled ({x}, {z}) reads unset");
    }
}

use surveyor_geom::{Aabb, Axis, BlockBox, BlockPos, Segment, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn axis_index_roundtrip() {
    for axis in Axis::ALL {
        assert_eq!(Axis::from_index(axis.index()), axis);
    }
}

#[test]
#[should_panic]
fn axis_index_out_of_range_panics() {
    let _ = Axis::from_index(3);
}

#[test]
fn block_pos_offset_along_axis() {
    let p = BlockPos::new(1, 2, 3);
    assert_eq!(p.offset(Axis::X, 4), BlockPos::new(5, 2, 3));
    assert_eq!(p.offset(Axis::Y, -2), BlockPos::new(1, 0, 3));
    assert_eq!(p.offset(Axis::Z, 0), p);
    assert_eq!(p.with(Axis::Z, 9).get(Axis::Z), 9);
}

#[test]
fn block_pos_center_is_half_offset() {
    let c = BlockPos::new(-1, 0, 2).center();
    assert!(vec3_approx_eq(c, Vec3::new(-0.5, 0.5, 2.5), 1e-6));
}

#[test]
fn block_box_spanning_orders_corners() {
    let b = BlockBox::spanning(BlockPos::new(5, -1, 0), BlockPos::new(0, 3, -7));
    assert_eq!(b.min, BlockPos::new(0, -1, -7));
    assert_eq!(b.max, BlockPos::new(5, 3, 0));
}

#[test]
fn block_box_contains_and_distance() {
    let b = BlockBox::spanning(BlockPos::new(0, 0, 0), BlockPos::new(4, 0, 4));
    assert!(b.contains(BlockPos::new(2, 0, 2)));
    assert!(b.contains(BlockPos::new(4, 0, 0)));
    assert!(!b.contains(BlockPos::new(5, 0, 0)));

    assert_eq!(b.distance_sq(BlockPos::new(2, 0, 2)), 0);
    assert_eq!(b.distance_sq(BlockPos::new(5, 0, 2)), 1);
    assert_eq!(b.distance_sq(BlockPos::new(2, 1, 2)), 1);
    // Diagonal neighbours of a corner are two away.
    assert_eq!(b.distance_sq(BlockPos::new(5, 1, 2)), 2);
    assert_eq!(b.distance_sq(BlockPos::new(-3, 0, 8)), 9 + 16);
}

#[test]
fn block_box_distance_does_not_overflow_at_extremes() {
    let b = BlockBox::single(BlockPos::new(i32::MAX, 0, 0));
    assert_eq!(b.distance_sq(BlockPos::new(0, 0, 0)), (i32::MAX as i64) * (i32::MAX as i64));
    assert_eq!(b.distance_sq(BlockPos::new(i32::MIN, 0, 0)), i64::MAX);
}

#[test]
fn aabb_edges_cover_all_corners() {
    let aabb = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(3.5, 1.5, 2.5));
    let edges = aabb.edges();
    assert_eq!(edges.len(), 12);
    let total: f32 = edges.iter().map(Segment::length).sum();
    // Four edges along each axis.
    assert!(approx_eq(total, 4.0 * (3.0 + 1.0 + 2.0), 1e-5));
    for e in edges {
        let d = e.tail - e.head;
        let nonzero = [d.x, d.y, d.z].iter().filter(|v| v.abs() > 0.0).count();
        assert_eq!(nonzero, 1, "edge {e:?} is not axis-aligned");
    }
}

#[test]
fn center_aabb_offsets_box_by_half() {
    let b = BlockBox::spanning(BlockPos::new(0, 0, 0), BlockPos::new(2, 0, 0));
    let a = b.center_aabb();
    assert!(vec3_approx_eq(a.min, Vec3::new(0.5, 0.5, 0.5), 1e-6));
    assert!(vec3_approx_eq(a.max, Vec3::new(2.5, 0.5, 0.5), 1e-6));
}

#[test]
fn vec3_unit_and_scale() {
    let v = Vec3::unit(Axis::Y) * 3.0;
    assert!(vec3_approx_eq(v, Vec3::new(0.0, 3.0, 0.0), 1e-6));
    assert!(approx_eq(v.length(), 3.0, 1e-6));
    assert!(vec3_approx_eq(v - v, Vec3::ZERO, 1e-6));
    assert!(vec3_approx_eq(v + Vec3::unit(Axis::X), Vec3::new(1.0, 3.0, 0.0), 1e-6));
}

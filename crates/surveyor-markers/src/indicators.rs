//! Beam geometry the host draws for markers: search signals and the group outline.

use surveyor_geom::{Axis, Segment, Vec3};

use crate::AnchorId;
use crate::field::MarkerField;

impl MarkerField {
    /// Search beams of a powered anchor, two per axis that can still link.
    ///
    /// The positive beam reaches `range - 1` blocks from the block center and
    /// the negative one `range + 1`, so together they cover the probe window.
    pub fn signals(&self, id: AnchorId) -> Vec<Segment> {
        let Some(anchor) = self.anchor(id) else {
            return Vec::new();
        };
        if !anchor.powered {
            return Vec::new();
        }
        let center = anchor.pos.center();
        let reach_pos = (self.range() - 1) as f32;
        let reach_neg = (self.range() + 1) as f32;
        let mut beams = Vec::with_capacity(6);
        for axis in Axis::ALL {
            if !self.axis_open(id, axis) {
                continue;
            }
            let dir = Vec3::unit(axis);
            beams.push(Segment::new(center, center + dir * reach_pos));
            beams.push(Segment::new(center - dir * reach_neg, center));
        }
        beams
    }

    /// Outline of the group box, drawn through block centers. Only the origin carries it.
    pub fn box_edges(&self, id: AnchorId) -> Option<[Segment; 12]> {
        let group = self.group_of(id)?;
        if group.origin().id != id {
            return None;
        }
        Some(group.bounds().center_aabb().edges())
    }
}

#[cfg(test)]
mod tests {
    use surveyor_geom::BlockPos;

    use super::*;

    #[test]
    fn unpowered_anchor_has_no_signals() {
        let mut field = MarkerField::new(64);
        let a = field.add_anchor(BlockPos::ORIGIN);
        assert!(field.signals(a).is_empty());
        field.set_powered(a, true);
        assert_eq!(field.signals(a).len(), 6);
    }

    #[test]
    fn signal_reach_matches_range() {
        let mut field = MarkerField::new(10);
        let a = field.add_anchor(BlockPos::new(0, 5, 0));
        field.set_powered(a, true);
        let beams = field.signals(a);
        assert_eq!(beams[0].head, Vec3::new(0.5, 5.5, 0.5));
        assert_eq!(beams[0].tail, Vec3::new(9.5, 5.5, 0.5));
        assert_eq!(beams[1].head, Vec3::new(-10.5, 5.5, 0.5));
        assert_eq!(beams[1].tail, Vec3::new(0.5, 5.5, 0.5));
    }

    #[test]
    fn linked_axis_drops_its_signals() {
        let mut field = MarkerField::new(10);
        let a = field.add_anchor(BlockPos::ORIGIN);
        let b = field.add_anchor(BlockPos::new(0, 3, 0));
        assert!(field.link(a, b, Axis::Y));
        field.set_powered(a, true);
        field.set_powered(b, true);
        for id in [a, b] {
            let beams = field.signals(id);
            assert_eq!(beams.len(), 4);
            assert!(beams.iter().all(|s| s.head.y == s.tail.y));
        }
    }

    #[test]
    fn only_origin_carries_outline() {
        let mut field = MarkerField::new(10);
        let a = field.add_anchor(BlockPos::ORIGIN);
        let b = field.add_anchor(BlockPos::new(4, 0, 0));
        assert!(field.box_edges(a).is_none());
        assert!(field.link(a, b, Axis::X));
        let edges = field.box_edges(a).unwrap();
        assert!(field.box_edges(b).is_none());
        let along_x = edges.iter().filter(|s| s.head.x != s.tail.x).count();
        assert_eq!(along_x, 4);
        assert!(edges.iter().all(|s| s.length() == 0.0 || s.length() == 4.0));
    }
}

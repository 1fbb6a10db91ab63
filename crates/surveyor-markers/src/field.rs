use std::fmt;

use surveyor_geom::{Axis, BlockBox, BlockPos};

use crate::event::MarkerEvent;
use crate::group::{Group, Member};
use crate::lookup::AnchorLookup;
use crate::{AnchorId, DEFAULT_MARKER_RANGE, GroupId};

pub type MarkerListener = Box<dyn FnMut(&MarkerEvent)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub pos: BlockPos,
    pub group: Option<GroupId>,
    pub powered: bool,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerFieldStats {
    pub anchors: usize,
    pub groups: usize,
    pub free_anchor_slots: usize,
    pub free_group_slots: usize,
}

/// Arena of marker anchors and the groups they share.
///
/// Anchors refer to groups by index; every anchor in a group points at the same
/// arena slot, so a link made through one member is seen by all of them. A
/// group slot is freed as soon as no anchor refers to it.
pub struct MarkerField {
    anchors: Vec<Option<Anchor>>,
    groups: Vec<Option<Group>>,
    free_anchors: Vec<u32>,
    free_groups: Vec<u32>,
    range: i32,
    listener: Option<MarkerListener>,
}

impl Default for MarkerField {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_RANGE)
    }
}

impl fmt::Debug for MarkerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerField")
            .field("stats", &self.stats())
            .field("range", &self.range)
            .finish()
    }
}

impl MarkerField {
    pub fn new(range: i32) -> Self {
        assert!(range > 0, "marker range must be positive, got {range}");
        Self {
            anchors: Vec::new(),
            groups: Vec::new(),
            free_anchors: Vec::new(),
            free_groups: Vec::new(),
            range,
            listener: None,
        }
    }

    #[inline]
    pub fn range(&self) -> i32 {
        self.range
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&MarkerEvent) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn stats(&self) -> MarkerFieldStats {
        MarkerFieldStats {
            anchors: self.anchors.iter().flatten().count(),
            groups: self.groups.iter().flatten().count(),
            free_anchor_slots: self.free_anchors.len(),
            free_group_slots: self.free_groups.len(),
        }
    }

    fn notify(&mut self, event: MarkerEvent) {
        log::trace!(target: "markers", "{}", event);
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
    }

    // --- anchors ---

    /// Registers a new, unlinked anchor.
    pub fn add_anchor(&mut self, pos: BlockPos) -> AnchorId {
        let anchor = Anchor {
            pos,
            group: None,
            powered: false,
        };
        let id = match self.free_anchors.pop() {
            Some(slot) => {
                self.anchors[slot as usize] = Some(anchor);
                slot
            }
            None => {
                self.anchors.push(Some(anchor));
                (self.anchors.len() - 1) as u32
            }
        };
        AnchorId(id)
    }

    /// Destroys an anchor, disbanding any group it belonged to.
    ///
    /// Returns the former position, or `None` if the id was not live.
    pub fn remove_anchor(&mut self, id: AnchorId) -> Option<BlockPos> {
        self.anchor(id)?;
        self.unlink(id);
        let anchor = self.anchors[id.0 as usize].take()?;
        self.free_anchors.push(id.0);
        log::debug!(target: "markers", "anchor {} removed", id.0);
        Some(anchor.pos)
    }

    #[inline]
    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(id.0 as usize).and_then(Option::as_ref)
    }

    #[inline]
    fn anchor_mut(&mut self, id: AnchorId) -> Option<&mut Anchor> {
        self.anchors.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn anchors(&self) -> impl Iterator<Item = (AnchorId, &Anchor)> {
        self.anchors
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_ref().map(|a| (AnchorId(i as u32), a)))
    }

    // --- groups ---

    #[inline]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0 as usize).and_then(Option::as_ref)
    }

    #[inline]
    fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn group_of(&self, id: AnchorId) -> Option<&Group> {
        self.anchor(id)?.group.and_then(|g| self.group(g))
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.as_ref().map(|g| (GroupId(i as u32), g)))
    }

    fn alloc_group(&mut self, group: Group) -> GroupId {
        match self.free_groups.pop() {
            Some(slot) => {
                self.groups[slot as usize] = Some(group);
                GroupId(slot)
            }
            None => {
                self.groups.push(Some(group));
                GroupId((self.groups.len() - 1) as u32)
            }
        }
    }

    fn free_group(&mut self, id: GroupId) -> Option<Group> {
        let group = self.groups.get_mut(id.0 as usize)?.take()?;
        self.free_groups.push(id.0);
        Some(group)
    }

    /// Box of the group, `None` when the slot is not live.
    pub fn bounding_box(&self, id: GroupId) -> Option<BlockBox> {
        self.group(id).map(Group::bounds)
    }

    /// The anchor's group box, or the single block it occupies when unlinked.
    pub fn anchor_box(&self, id: AnchorId) -> Option<BlockBox> {
        let anchor = self.anchor(id)?;
        Some(
            self.group_of(id)
                .map(Group::bounds)
                .unwrap_or_else(|| BlockBox::single(anchor.pos)),
        )
    }

    pub fn anchor_min(&self, id: AnchorId) -> Option<BlockPos> {
        self.anchor_box(id).map(|b| b.min)
    }

    pub fn anchor_max(&self, id: AnchorId) -> Option<BlockPos> {
        self.anchor_box(id).map(|b| b.max)
    }

    /// Whether a block at `pos` could extend the anchor's box: outside it, sharing a face.
    pub fn is_valid_from_location(&self, id: AnchorId, pos: BlockPos) -> bool {
        match self.anchor_box(id) {
            Some(b) => !b.contains(pos) && b.distance_sq(pos) == 1,
            None => false,
        }
    }

    /// Whether the anchor still has a free slot on `axis` to probe along.
    pub fn axis_open(&self, id: AnchorId, axis: Axis) -> bool {
        match self.group_of(id) {
            Some(g) => g.link(axis).is_none(),
            None => self.anchor(id).is_some(),
        }
    }

    // --- linking ---

    /// Joins `a` and `b` on `axis`.
    ///
    /// Two grouped anchors never merge. When neither is grouped, `a` founds a
    /// new group as origin with `b` in the axis slot. When exactly one is
    /// grouped, the other takes that group's free slot on `axis`; an occupied
    /// slot refuses the link.
    pub fn link(&mut self, a: AnchorId, b: AnchorId, axis: Axis) -> bool {
        if a == b {
            return false;
        }
        let (Some(anchor_a), Some(anchor_b)) = (self.anchor(a), self.anchor(b)) else {
            return false;
        };
        let (pos_a, pos_b) = (anchor_a.pos, anchor_b.pos);
        let (gid, joiner) = match (anchor_a.group, anchor_b.group) {
            (Some(_), Some(_)) => return false,
            (None, None) => {
                let mut group = Group::founded_by(Member { id: a, pos: pos_a });
                group.set_link(axis, Member { id: b, pos: pos_b });
                let gid = self.alloc_group(group);
                if let Some(anchor) = self.anchor_mut(a) {
                    anchor.group = Some(gid);
                }
                (gid, Member { id: b, pos: pos_b })
            }
            (Some(gid), None) => (gid, Member { id: b, pos: pos_b }),
            (None, Some(gid)) => (gid, Member { id: a, pos: pos_a }),
        };

        let Some(group) = self.group_mut(gid) else {
            return false;
        };
        if group.origin.id != joiner.id && !group.contains(joiner.id) {
            if group.link(axis).is_some() {
                return false;
            }
            group.set_link(axis, joiner);
        }
        let origin = group.origin.id;
        if let Some(anchor) = self.anchor_mut(joiner.id) {
            anchor.group = Some(gid);
        }

        log::debug!(
            target: "markers",
            "linked anchor {} into group {} on {:?} (origin {})",
            joiner.id.0, gid.0, axis, origin.0
        );
        self.notify(MarkerEvent::Linked {
            group: gid,
            origin,
            member: joiner.id,
            axis,
        });
        self.notify(MarkerEvent::SignalsChanged { anchor: a, pos: pos_a });
        self.notify(MarkerEvent::SignalsChanged { anchor: b, pos: pos_b });
        true
    }

    /// Scans along `axis` for a peer to link with: `+d` then `-d` for `d` in `1..range`.
    ///
    /// The first candidate that accepts the link ends the scan, so nearer
    /// markers win and the positive side wins ties.
    pub fn probe<L: AnchorLookup + ?Sized>(
        &mut self,
        id: AnchorId,
        axis: Axis,
        range: i32,
        lookup: &L,
    ) -> bool {
        let Some(origin) = self.anchor(id).map(|a| a.pos) else {
            return false;
        };
        if !self.axis_open(id, axis) {
            return false;
        }
        for d in 1..range {
            for step in [d, -d] {
                let at = origin.offset(axis, step);
                let Some(peer) = lookup.anchor_at(at) else {
                    continue;
                };
                if self.anchor(peer).map(|a| a.pos) != Some(at) {
                    log::warn!(
                        target: "markers",
                        "lookup returned anchor {} for ({}, {}, {}) but it is not registered there",
                        peer.0, at.x, at.y, at.z
                    );
                    continue;
                }
                log::trace!(target: "markers", "probe {} {:?}{:+} found {}", id.0, axis, step, peer.0);
                if self.link(id, peer, axis) {
                    return true;
                }
            }
        }
        false
    }

    /// Probes every axis the anchor has free, using the field's configured range.
    pub fn try_connection<L: AnchorLookup + ?Sized>(&mut self, id: AnchorId, lookup: &L) -> bool {
        let mut linked = false;
        for axis in Axis::ALL {
            if self.axis_open(id, axis) {
                linked |= self.probe(id, axis, self.range, lookup);
            }
        }
        linked
    }

    /// Disbands the anchor's group: every member, this one included, ends up unlinked.
    ///
    /// Removing any member breaks up the whole set rather than detaching one
    /// anchor. Returns the affected anchors, origin first.
    pub fn unlink(&mut self, id: AnchorId) -> Vec<AnchorId> {
        let Some(gid) = self.anchor(id).and_then(|a| a.group) else {
            return Vec::new();
        };
        let Some(group) = self.free_group(gid) else {
            if let Some(anchor) = self.anchor_mut(id) {
                anchor.group = None;
            }
            return Vec::new();
        };
        let members: Vec<AnchorId> = group.members().map(|m| m.id).collect();
        for &m in &members {
            if let Some(anchor) = self.anchor_mut(m) {
                anchor.group = None;
            }
        }
        if let Some(anchor) = self.anchor_mut(id) {
            anchor.group = None;
        }
        log::debug!(
            target: "markers",
            "group {} disbanded by anchor {} ({} member(s))",
            gid.0, id.0, members.len()
        );
        for &m in &members {
            if let Some(pos) = self.anchor(m).map(|a| a.pos) {
                self.notify(MarkerEvent::SignalsChanged { anchor: m, pos });
            }
        }
        self.notify(MarkerEvent::Disbanded {
            group: gid,
            members: members.clone(),
        });
        members
    }

    /// Positions the host clears when the whole marked set is taken down: links, then origin.
    pub fn removal_targets(&self, id: AnchorId) -> Vec<BlockPos> {
        match self.group_of(id) {
            Some(g) => g
                .links()
                .iter()
                .flatten()
                .map(|m| m.pos)
                .chain(std::iter::once(g.origin().pos))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn set_powered(&mut self, id: AnchorId, powered: bool) {
        let Some(anchor) = self.anchor_mut(id) else {
            return;
        };
        if anchor.powered == powered {
            return;
        }
        anchor.powered = powered;
        let pos = anchor.pos;
        self.notify(MarkerEvent::SignalsChanged { anchor: id, pos });
    }

    /// Makes `id` the origin of a fresh group and relinks the given axis peers.
    ///
    /// Used when loading a saved origin. Peers the lookup cannot find, or that
    /// are already grouped, are skipped; if none link, the anchor stays unlinked.
    pub(crate) fn relink_as_origin<L: AnchorLookup + ?Sized>(
        &mut self,
        id: AnchorId,
        peers: [Option<BlockPos>; 3],
        lookup: &L,
    ) -> usize {
        let Some(pos) = self.anchor(id).map(|a| a.pos) else {
            return 0;
        };
        if self.anchor(id).and_then(|a| a.group).is_some() {
            return 0;
        }
        let mut linked = 0;
        for axis in Axis::ALL {
            let Some(peer_pos) = peers[axis.index()] else {
                continue;
            };
            let Some(peer) = lookup.anchor_at(peer_pos) else {
                log::debug!(
                    target: "markers",
                    "saved {:?} link of ({}, {}, {}) not present",
                    axis, pos.x, pos.y, pos.z
                );
                continue;
            };
            match self.anchor(peer) {
                Some(a) if a.pos != peer_pos => {
                    log::warn!(
                        target: "markers",
                        "lookup returned anchor {} for saved link ({}, {}, {}) but it is not registered there",
                        peer.0, peer_pos.x, peer_pos.y, peer_pos.z
                    );
                    continue;
                }
                Some(a) if a.group.is_none() => {}
                _ => continue,
            }
            if self.link(id, peer, axis) {
                linked += 1;
            }
        }
        linked
    }
}

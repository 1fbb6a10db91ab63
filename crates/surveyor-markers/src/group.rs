use surveyor_geom::{Axis, BlockBox, BlockPos};

use crate::AnchorId;

/// An anchor as referenced from a group: identity plus the position it had when linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Member {
    pub id: AnchorId,
    pub pos: BlockPos,
}

/// Shared link state for up to four anchors: an origin and one link per axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub(crate) origin: Member,
    pub(crate) links: [Option<Member>; 3],
    pub(crate) bounds: BlockBox,
}

impl Group {
    pub(crate) fn founded_by(origin: Member) -> Self {
        Self {
            origin,
            links: [None; 3],
            bounds: BlockBox::single(origin.pos),
        }
    }

    #[inline]
    pub fn origin(&self) -> Member {
        self.origin
    }

    #[inline]
    pub fn link(&self, axis: Axis) -> Option<Member> {
        self.links[axis.index()]
    }

    #[inline]
    pub fn links(&self) -> &[Option<Member>; 3] {
        &self.links
    }

    #[inline]
    pub fn bounds(&self) -> BlockBox {
        self.bounds
    }

    /// Origin first, then the occupied axis slots in X, Y, Z order.
    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        std::iter::once(self.origin).chain(self.links.iter().flatten().copied())
    }

    pub fn contains(&self, id: AnchorId) -> bool {
        self.members().any(|m| m.id == id)
    }

    pub(crate) fn set_link(&mut self, axis: Axis, member: Member) {
        self.links[axis.index()] = Some(member);
        self.recompute_bounds();
    }

    pub(crate) fn recompute_bounds(&mut self) {
        self.bounds = span(self.origin.pos, &self.links.map(|m| m.map(|m| m.pos)));
    }
}

/// Box spanned per axis by the origin and that axis' link.
///
/// An axis without a link collapses to the origin's coordinate; links are not
/// consulted on axes other than their own.
pub fn span(origin: BlockPos, links: &[Option<BlockPos>; 3]) -> BlockBox {
    let mut min = origin;
    let mut max = origin;
    for axis in Axis::ALL {
        if let Some(link) = links[axis.index()] {
            let (o, l) = (origin.get(axis), link.get(axis));
            min = min.with(axis, o.min(l));
            max = max.with(axis, o.max(l));
        }
    }
    BlockBox { min, max }
}

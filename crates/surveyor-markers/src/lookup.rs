use hashbrown::HashMap;
use surveyor_geom::BlockPos;

use crate::AnchorId;

/// Host-side answer to "is there a marker at this position, and which one".
pub trait AnchorLookup {
    fn anchor_at(&self, pos: BlockPos) -> Option<AnchorId>;
}

impl<F> AnchorLookup for F
where
    F: Fn(BlockPos) -> Option<AnchorId>,
{
    #[inline]
    fn anchor_at(&self, pos: BlockPos) -> Option<AnchorId> {
        self(pos)
    }
}

/// Plain position map for hosts without a spatial index of their own.
#[derive(Default, Debug, Clone)]
pub struct PositionIndex {
    by_pos: HashMap<BlockPos, AnchorId>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the anchor previously registered at `pos`, if any.
    pub fn insert(&mut self, pos: BlockPos, id: AnchorId) -> Option<AnchorId> {
        self.by_pos.insert(pos, id)
    }

    pub fn remove(&mut self, pos: BlockPos) -> Option<AnchorId> {
        self.by_pos.remove(&pos)
    }

    pub fn len(&self) -> usize {
        self.by_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pos.is_empty()
    }
}

impl AnchorLookup for PositionIndex {
    #[inline]
    fn anchor_at(&self, pos: BlockPos) -> Option<AnchorId> {
        self.by_pos.get(&pos).copied()
    }
}

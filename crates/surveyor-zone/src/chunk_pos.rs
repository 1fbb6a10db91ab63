use serde::{Deserialize, Serialize};
use surveyor_io::DecodeError;

use crate::{CHUNK_DIM, CHUNK_SHIFT};

/// Column coordinate of a 16×16 zone chunk. Ordered x-major so map iteration is stable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkPos {
    /// Lowest chunk coordinate any `i32` world column maps to.
    pub const MIN_COORD: i32 = i32::MIN >> CHUNK_SHIFT;
    /// Highest chunk coordinate any `i32` world column maps to.
    pub const MAX_COORD: i32 = i32::MAX >> CHUNK_SHIFT;

    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Whether both coordinates can come from `containing` on some world column.
    #[inline]
    pub const fn is_reachable(self) -> bool {
        Self::MIN_COORD <= self.cx
            && self.cx <= Self::MAX_COORD
            && Self::MIN_COORD <= self.cz
            && self.cz <= Self::MAX_COORD
    }

    /// Rejects chunks no world column can reach; their origin would wrap.
    pub fn checked(cx: i32, cz: i32) -> Result<Self, DecodeError> {
        let pos = Self::new(cx, cz);
        if pos.is_reachable() {
            Ok(pos)
        } else {
            Err(DecodeError::ChunkOutOfRange { cx, cz })
        }
    }

    /// Arithmetic shift, so negative coordinates round toward negative infinity.
    #[inline]
    pub const fn containing(x: i32, z: i32) -> Self {
        Self {
            cx: x >> CHUNK_SHIFT,
            cz: z >> CHUNK_SHIFT,
        }
    }

    /// World coordinate of local (0, 0).
    #[inline]
    pub const fn origin(self) -> (i32, i32) {
        (self.cx << CHUNK_SHIFT, self.cz << CHUNK_SHIFT)
    }

    /// Point used for coarse distance queries: the chunk's middle column.
    #[inline]
    pub fn reference_point(self) -> (f64, f64) {
        let (ox, oz) = self.origin();
        let half = (CHUNK_DIM / 2) as f64;
        (f64::from(ox) + half, f64::from(oz) + half)
    }

    #[inline]
    pub fn distance_sq_to(self, x: i32, z: i32) -> f64 {
        let (rx, rz) = self.reference_point();
        let dx = rx - f64::from(x);
        let dz = rz - f64::from(z);
        dx * dx + dz * dz
    }
}

impl From<(i32, i32)> for ChunkPos {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkPos> for (i32, i32) {
    fn from(value: ChunkPos) -> Self {
        (value.cx, value.cz)
    }
}

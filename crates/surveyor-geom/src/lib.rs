//! Integer block positions, axis-aligned boxes, and the float types used for indicator beams.
#![forbid(unsafe_code)]

use core::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// One of the three world axes. The discriminant doubles as the axis-slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Panics on anything outside `0..3`; an axis index is never user input.
    #[inline]
    pub fn from_index(i: usize) -> Axis {
        match i {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("axis index out of range: {i}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    #[inline]
    pub fn with(self, axis: Axis, v: i32) -> Self {
        match axis {
            Axis::X => Self { x: v, ..self },
            Axis::Y => Self { y: v, ..self },
            Axis::Z => Self { z: v, ..self },
        }
    }

    /// Step `d` blocks along `axis`, wrapping at the i32 boundary like the host's positions do.
    #[inline]
    pub fn offset(self, axis: Axis, d: i32) -> Self {
        self.with(axis, self.get(axis).wrapping_add(d))
    }

    #[inline]
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<BlockPos> for (i32, i32, i32) {
    fn from(value: BlockPos) -> Self {
        (value.x, value.y, value.z)
    }
}

/// Inclusive integer box over block positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BlockBox {
    /// Orders each coordinate so that `min <= max` on every axis.
    pub fn spanning(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    #[inline]
    pub fn single(p: BlockPos) -> Self {
        Self { min: p, max: p }
    }

    #[inline]
    pub fn contains(&self, p: BlockPos) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| p.get(a) >= self.min.get(a) && p.get(a) <= self.max.get(a))
    }

    /// Squared Euclidean distance from `p` to the nearest point inside the box.
    /// Saturates instead of overflowing for boxes spanning most of the i32 range.
    pub fn distance_sq(&self, p: BlockPos) -> i64 {
        Axis::ALL
            .iter()
            .map(|&a| {
                let v = i64::from(p.get(a));
                let lo = i64::from(self.min.get(a));
                let hi = i64::from(self.max.get(a));
                let d = if v < lo {
                    lo - v
                } else if v > hi {
                    v - hi
                } else {
                    0
                };
                d.saturating_mul(d)
            })
            .fold(0, i64::saturating_add)
    }

    /// Box through block centers, as drawn by the host.
    pub fn center_aabb(&self) -> Aabb {
        Aabb::new(self.min.center(), self.max.center())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn unit(axis: Axis) -> Vec3 {
        match axis {
            Axis::X => Vec3::new(1.0, 0.0, 0.0),
            Axis::Y => Vec3::new(0.0, 1.0, 0.0),
            Axis::Z => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The twelve edges: four along X, four along Y, four along Z.
    pub fn edges(&self) -> [Segment; 12] {
        let (a, b) = (self.min, self.max);
        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        [
            Segment::new(c(a.x, a.y, a.z), c(b.x, a.y, a.z)),
            Segment::new(c(a.x, b.y, a.z), c(b.x, b.y, a.z)),
            Segment::new(c(a.x, a.y, b.z), c(b.x, a.y, b.z)),
            Segment::new(c(a.x, b.y, b.z), c(b.x, b.y, b.z)),
            Segment::new(c(a.x, a.y, a.z), c(a.x, b.y, a.z)),
            Segment::new(c(b.x, a.y, a.z), c(b.x, b.y, a.z)),
            Segment::new(c(a.x, a.y, b.z), c(a.x, b.y, b.z)),
            Segment::new(c(b.x, a.y, b.z), c(b.x, b.y, b.z)),
            Segment::new(c(a.x, a.y, a.z), c(a.x, a.y, b.z)),
            Segment::new(c(b.x, a.y, a.z), c(b.x, a.y, b.z)),
            Segment::new(c(a.x, b.y, a.z), c(a.x, b.y, b.z)),
            Segment::new(c(b.x, b.y, a.z), c(b.x, b.y, b.z)),
        ]
    }
}

/// A straight beam between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
    pub head: Vec3,
    pub tail: Vec3,
}

impl Segment {
    #[inline]
    pub const fn new(head: Vec3, tail: Vec3) -> Self {
        Self { head, tail }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.tail - self.head).length()
    }
}

//! Axis-linked markers: probing for peers, shared groups, and the boxes they span.
#![forbid(unsafe_code)]

pub mod event;
pub mod field;
pub mod group;
pub mod indicators;
pub mod lookup;
pub mod persist;

use serde::{Deserialize, Serialize};

pub use event::MarkerEvent;
pub use field::{Anchor, MarkerField, MarkerFieldStats, MarkerListener};
pub use group::{Group, Member, span};
pub use lookup::{AnchorLookup, PositionIndex};
pub use persist::{MarkerPacket, MarkerRecord};

/// How far a marker searches along each axis.
pub const DEFAULT_MARKER_RANGE: i32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

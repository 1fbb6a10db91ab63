use std::fmt;

use surveyor_geom::{Axis, BlockPos};

use crate::{AnchorId, GroupId};

/// Notifications delivered to the host after a marker mutation has completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerEvent {
    // Membership
    Linked {
        group: GroupId,
        origin: AnchorId,
        member: AnchorId,
        axis: Axis,
    },
    Disbanded {
        group: GroupId,
        members: Vec<AnchorId>,
    },

    // Per-anchor indicator state (signal beams, box outline) needs a refresh.
    SignalsChanged { anchor: AnchorId, pos: BlockPos },
}

impl fmt::Display for MarkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerEvent::Linked {
                group,
                origin,
                member,
                axis,
            } => write!(
                f,
                "Linked group={} origin={} member={} axis={:?}",
                group.0, origin.0, member.0, axis
            ),
            MarkerEvent::Disbanded { group, members } => {
                write!(f, "Disbanded group={} members={}", group.0, members.len())
            }
            MarkerEvent::SignalsChanged { anchor, pos } => write!(
                f,
                "SignalsChanged anchor={} at ({}, {}, {})",
                anchor.0, pos.x, pos.y, pos.z
            ),
        }
    }
}

//! Save records and the network packet for marker groups.

use serde::{Deserialize, Serialize};
use surveyor_geom::{Axis, BlockBox, BlockPos};
use surveyor_io::{ByteReader, ByteWriter, DecodeError};

use crate::AnchorId;
use crate::field::MarkerField;
use crate::group::span;
use crate::lookup::AnchorLookup;

/// What an origin anchor saves about its group. Other members save nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub origin: BlockPos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_x: Option<BlockPos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_y: Option<BlockPos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_z: Option<BlockPos>,
}

impl MarkerRecord {
    pub fn links(&self) -> [Option<BlockPos>; 3] {
        [self.link_x, self.link_y, self.link_z]
    }
}

/// Group state as it travels to clients: member positions, box corners, and the power flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerPacket {
    pub origin: Option<BlockPos>,
    pub links: [Option<BlockPos>; 3],
    pub wire_box: (BlockPos, BlockPos),
    pub powered: bool,
}

impl MarkerPacket {
    #[inline]
    pub fn is_set(&self) -> bool {
        self.origin.is_some()
    }

    /// Box rebuilt from the member positions; the transmitted corners are not trusted.
    pub fn bounds(&self) -> Option<BlockBox> {
        self.origin.map(|o| span(o, &self.links))
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.write_opt_pos(self.origin);
        for link in &self.links {
            w.write_opt_pos(*link);
        }
        let (min, max) = self.wire_box;
        w.write_i32(min.x);
        w.write_short_y(min.y);
        w.write_i32(min.z);
        w.write_i32(max.x);
        w.write_short_y(max.y);
        w.write_i32(max.z);
        w.write_bool(self.powered);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let origin = r.read_opt_pos()?;
        let links = [r.read_opt_pos()?, r.read_opt_pos()?, r.read_opt_pos()?];
        let min = BlockPos::new(r.read_i32()?, i32::from(r.read_i16()?), r.read_i32()?);
        let max = BlockPos::new(r.read_i32()?, i32::from(r.read_i16()?), r.read_i32()?);
        let powered = r.read_bool()?;
        Ok(Self {
            origin,
            links,
            wire_box: (min, max),
            powered,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);
        let packet = Self::decode(&mut r)?;
        r.finish()?;
        Ok(packet)
    }
}

impl MarkerField {
    /// Save record for `id`, present only when it is the origin of a group.
    pub fn to_record(&self, id: AnchorId) -> Option<MarkerRecord> {
        let group = self.group_of(id)?;
        if group.origin().id != id {
            return None;
        }
        let pos_of = |axis: Axis| group.link(axis).map(|m| m.pos);
        Some(MarkerRecord {
            origin: group.origin().pos,
            link_x: pos_of(Axis::X),
            link_y: pos_of(Axis::Y),
            link_z: pos_of(Axis::Z),
        })
    }

    /// Rebuilds a saved group around `id` once its peers are loaded. Returns the links restored.
    pub fn restore<L: AnchorLookup + ?Sized>(
        &mut self,
        id: AnchorId,
        record: &MarkerRecord,
        lookup: &L,
    ) -> usize {
        if self.anchor(id).map(|a| a.pos) != Some(record.origin) {
            log::warn!(
                target: "markers",
                "record origin ({}, {}, {}) does not match anchor {}",
                record.origin.x, record.origin.y, record.origin.z, id.0
            );
            return 0;
        }
        self.relink_as_origin(id, record.links(), lookup)
    }

    pub fn packet(&self, id: AnchorId) -> Option<MarkerPacket> {
        let anchor = self.anchor(id)?;
        let packet = match self.group_of(id) {
            Some(g) => {
                let b = g.bounds();
                MarkerPacket {
                    origin: Some(g.origin().pos),
                    links: g.links().map(|m| m.map(|m| m.pos)),
                    wire_box: (b.min, b.max),
                    powered: anchor.powered,
                }
            }
            None => MarkerPacket {
                powered: anchor.powered,
                ..MarkerPacket::default()
            },
        };
        Some(packet)
    }
}

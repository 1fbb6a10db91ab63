use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use surveyor_io::DecodeError;

use crate::chunk_pos::ChunkPos;
use crate::plan::ZonePlan;
use crate::zone_chunk::ZoneChunk;

/// Structured save form of a zone plan, one entry per occupied chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePlanRecord {
    #[serde(default)]
    pub chunks: Vec<ZoneChunkRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneChunkRecord {
    pub chunk_x: i32,
    pub chunk_z: i32,
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub bits: Vec<u8>,
}

impl ZonePlan {
    pub fn to_record(&self) -> ZonePlanRecord {
        let chunks = self
            .chunks()
            .map(|(key, chunk)| {
                let full = chunk.is_full();
                ZoneChunkRecord {
                    chunk_x: key.cx,
                    chunk_z: key.cz,
                    full,
                    bits: if full { Vec::new() } else { chunk.to_bytes() },
                }
            })
            .collect();
        ZonePlanRecord { chunks }
    }

    pub fn from_record(record: &ZonePlanRecord) -> Result<Self, DecodeError> {
        let mut chunks = BTreeMap::new();
        for entry in &record.chunks {
            let key = ChunkPos::checked(entry.chunk_x, entry.chunk_z)?;
            let chunk = if entry.full {
                ZoneChunk::full()
            } else {
                ZoneChunk::from_bytes(&entry.bits)?
            };
            if !chunk.is_empty() {
                chunks.insert(key, chunk);
            }
        }
        Ok(ZonePlan::from_chunks(chunks))
    }
}

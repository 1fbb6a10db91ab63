//! Chunk-partitioned sparse boolean plans over world columns.
#![forbid(unsafe_code)]

mod chunk_pos;
mod plan;
mod record;
mod zone_chunk;

pub use chunk_pos::ChunkPos;
pub use plan::{ZoneListener, ZonePlan};
pub use record::{ZoneChunkRecord, ZonePlanRecord};
pub use zone_chunk::{BITSET_BYTES, ZoneChunk};

pub const CHUNK_SHIFT: u32 = 4;
pub const CHUNK_DIM: usize = 1 << CHUNK_SHIFT;
pub const CHUNK_AREA: usize = CHUNK_DIM * CHUNK_DIM;
pub const CHUNK_MASK: i32 = (CHUNK_DIM as i32) - 1;

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use surveyor_io::{ByteReader, ByteWriter, DecodeError};

use crate::chunk_pos::ChunkPos;
use crate::zone_chunk::ZoneChunk;
use crate::CHUNK_MASK;

/// Smallest encoded chunk: two coordinates and a flag byte.
const MIN_CHUNK_BYTES: usize = 4 + 4 + 1;

/// Called with the world column after every effective `set`.
pub type ZoneListener = Box<dyn FnMut(i32, i32)>;

/// Sparse boolean plan over world columns, stored per 16×16 chunk.
///
/// Only chunks with at least one set column are kept, so memory follows the
/// painted area rather than the extent of the world.
#[derive(Default)]
pub struct ZonePlan {
    chunks: BTreeMap<ChunkPos, ZoneChunk>,
    listener: Option<ZoneListener>,
}

impl fmt::Debug for ZonePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZonePlan")
            .field("chunks", &self.chunks)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl PartialEq for ZonePlan {
    fn eq(&self, other: &Self) -> bool {
        self.chunks == other.chunks
    }
}

impl ZonePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listener(&mut self, listener: impl FnMut(i32, i32) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Number of non-empty chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkPos, &ZoneChunk)> {
        self.chunks.iter().map(|(k, v)| (*k, v))
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&ZoneChunk> {
        self.chunks.get(&pos)
    }

    /// Total set columns across all chunks.
    pub fn area(&self) -> usize {
        self.chunks.values().map(ZoneChunk::count).sum()
    }

    pub fn get(&self, x: i32, z: i32) -> bool {
        match self.chunks.get(&ChunkPos::containing(x, z)) {
            Some(chunk) => chunk.get((x & CHUNK_MASK) as usize, (z & CHUNK_MASK) as usize),
            None => false,
        }
    }

    pub fn set(&mut self, x: i32, z: i32, value: bool) {
        let key = ChunkPos::containing(x, z);
        let (lx, lz) = ((x & CHUNK_MASK) as usize, (z & CHUNK_MASK) as usize);
        let changed = match self.chunks.get_mut(&key) {
            Some(chunk) => {
                let changed = chunk.set(lx, lz, value);
                if chunk.is_empty() {
                    self.chunks.remove(&key);
                    log::trace!(target: "zone", "zone chunk ({}, {}) emptied and dropped", key.cx, key.cz);
                }
                changed
            }
            None if value => {
                let mut chunk = ZoneChunk::new();
                chunk.set(lx, lz, true);
                self.chunks.insert(key, chunk);
                log::trace!(target: "zone", "zone chunk ({}, {}) allocated", key.cx, key.cz);
                true
            }
            None => false,
        };
        if changed {
            if let Some(listener) = self.listener.as_mut() {
                listener(x, z);
            }
        }
    }

    /// Paints the inclusive rectangle spanned by the two corners.
    pub fn fill_rect(&mut self, x0: i32, z0: i32, x1: i32, z1: i32, value: bool) {
        let (xa, xb) = (x0.min(x1), x0.max(x1));
        let (za, zb) = (z0.min(z1), z0.max(z1));
        for z in za..=zb {
            for x in xa..=xb {
                self.set(x, z, value);
            }
        }
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Squared distance to the middle of the nearest occupied chunk.
    ///
    /// Coarse: the nearest set column may be up to half a chunk further away.
    /// Returns `f64::INFINITY` when nothing is set.
    pub fn distance_squared(&self, x: i32, z: i32) -> f64 {
        self.chunks
            .keys()
            .map(|k| k.distance_sq_to(x, z))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance(&self, x: i32, z: i32) -> f64 {
        self.distance_squared(x, z).sqrt()
    }

    pub fn contains_point(&self, px: f64, pz: f64) -> bool {
        self.get(px.floor() as i32, pz.floor() as i32)
    }

    /// Picks a chunk uniformly, then a set column uniformly inside it.
    ///
    /// Columns in sparsely painted chunks are therefore more likely than
    /// columns in dense ones.
    pub fn random_set_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(i32, i32)> {
        if self.chunks.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..self.chunks.len());
        let (key, chunk) = self.chunks.iter().nth(pick)?;
        let (lx, lz) = chunk.random_set_position(rng)?;
        let (ox, oz) = key.origin();
        Some((ox + lx as i32, oz + lz as i32))
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.write_i32(self.chunks.len() as i32);
        for (key, chunk) in &self.chunks {
            w.write_i32(key.cx);
            w.write_i32(key.cz);
            chunk.encode(w);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    /// Replaces the contents with the decoded plan. On error the plan is left empty.
    pub fn decode_into(&mut self, r: &mut ByteReader<'_>) -> Result<(), DecodeError> {
        self.chunks.clear();
        self.chunks = Self::decode_chunks(r)?;
        Ok(())
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            chunks: Self::decode_chunks(r)?,
            listener: None,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);
        let plan = Self::decode(&mut r)?;
        r.finish()?;
        Ok(plan)
    }

    fn decode_chunks(r: &mut ByteReader<'_>) -> Result<BTreeMap<ChunkPos, ZoneChunk>, DecodeError> {
        let count = r.read_i32()?;
        if count < 0 || count as usize > r.remaining() / MIN_CHUNK_BYTES {
            return Err(DecodeError::InvalidCount {
                what: "zone chunk",
                count: i64::from(count),
            });
        }
        let mut chunks = BTreeMap::new();
        for _ in 0..count {
            let key = ChunkPos::checked(r.read_i32()?, r.read_i32()?)?;
            let chunk = ZoneChunk::decode(r)?;
            if chunk.is_empty() {
                continue;
            }
            chunks.insert(key, chunk);
        }
        log::debug!(target: "zone", "decoded zone plan with {} chunk(s)", chunks.len());
        Ok(chunks)
    }

    pub(crate) fn from_chunks(chunks: BTreeMap<ChunkPos, ZoneChunk>) -> Self {
        Self {
            chunks,
            listener: None,
        }
    }
}

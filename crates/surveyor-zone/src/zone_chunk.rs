use rand::Rng;
use surveyor_io::{ByteReader, ByteWriter, DecodeError};

use crate::{CHUNK_AREA, CHUNK_DIM};

const WORDS: usize = CHUNK_AREA / 64;

/// Largest encoded bitset: one bit per column.
pub const BITSET_BYTES: usize = CHUNK_AREA / 8;

const FLAG_FULL: u8 = 0x01;
const FLAG_BITS: u8 = 0x02;

/// 16×16 occupancy bitmap for one zone chunk.
///
/// Bit `x + z * 16` holds column (x, z). The population count is kept in step
/// with every write so emptiness checks never scan the words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneChunk {
    words: [u64; WORDS],
    count: u16,
}

#[inline]
fn bit_index(x: usize, z: usize) -> usize {
    assert!(
        x < CHUNK_DIM && z < CHUNK_DIM,
        "local column ({x}, {z}) outside chunk"
    );
    x + z * CHUNK_DIM
}

impl ZoneChunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            words: [u64::MAX; WORDS],
            count: CHUNK_AREA as u16,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> bool {
        let i = bit_index(x, z);
        self.words[i / 64] & (1u64 << (i % 64)) != 0
    }

    /// Returns whether the bit actually changed.
    pub fn set(&mut self, x: usize, z: usize, value: bool) -> bool {
        let i = bit_index(x, z);
        let mask = 1u64 << (i % 64);
        let word = &mut self.words[i / 64];
        let was = *word & mask != 0;
        if was == value {
            return false;
        }
        if value {
            *word |= mask;
            self.count += 1;
        } else {
            *word &= !mask;
            self.count -= 1;
        }
        true
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        usize::from(self.count) == CHUNK_AREA
    }

    #[inline]
    pub fn count(&self) -> usize {
        usize::from(self.count)
    }

    /// Local columns currently set, in bit order.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &w)| {
            let mut rest = w;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let b = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                let i = wi * 64 + b;
                Some((i % CHUNK_DIM, i / CHUNK_DIM))
            })
        })
    }

    /// Uniform over the set columns of this chunk.
    pub fn random_set_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let mut rank = rng.gen_range(0..u32::from(self.count));
        for (wi, &w) in self.words.iter().enumerate() {
            let pop = w.count_ones();
            if rank >= pop {
                rank -= pop;
                continue;
            }
            let mut rest = w;
            for _ in 0..rank {
                rest &= rest - 1;
            }
            let i = wi * 64 + rest.trailing_zeros() as usize;
            return Some((i % CHUNK_DIM, i / CHUNK_DIM));
        }
        unreachable!("population count out of sync with bitmap")
    }

    /// Little-endian byte image with trailing zero bytes dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self
            .words
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        while out.last() == Some(&0) {
            out.pop();
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() > BITSET_BYTES {
            return Err(DecodeError::BitsetTooLong {
                len: bytes.len(),
                max: BITSET_BYTES,
            });
        }
        let mut words = [0u64; WORDS];
        for (i, &b) in bytes.iter().enumerate() {
            words[i / 8] |= u64::from(b) << (8 * (i % 8));
        }
        let count = words.iter().map(|w| w.count_ones() as u16).sum();
        Ok(Self { words, count })
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        if self.is_full() {
            w.write_u8(FLAG_FULL);
            return;
        }
        if self.is_empty() {
            w.write_u8(0);
            return;
        }
        let bytes = self.to_bytes();
        w.write_u8(FLAG_BITS);
        w.write_u16(bytes.len() as u16);
        w.write_bytes(&bytes);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        match r.read_u8()? {
            0 => Ok(Self::new()),
            FLAG_FULL => Ok(Self::full()),
            FLAG_BITS => {
                let len = usize::from(r.read_u16()?);
                if len > BITSET_BYTES {
                    return Err(DecodeError::BitsetTooLong {
                        len,
                        max: BITSET_BYTES,
                    });
                }
                Self::from_bytes(r.read_bytes(len)?)
            }
            other => Err(DecodeError::BadFlags(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn set_tracks_population() {
        let mut c = ZoneChunk::new();
        assert!(c.is_empty());
        assert!(c.set(3, 4, true));
        assert!(!c.set(3, 4, true));
        assert!(c.get(3, 4));
        assert!(!c.get(4, 3));
        assert_eq!(c.count(), 1);
        assert!(c.set(3, 4, false));
        assert!(c.is_empty());
    }

    #[test]
    fn full_chunk_clears_every_bit() {
        let mut c = ZoneChunk::full();
        assert!(c.is_full());
        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                assert!(c.get(x, z));
                c.set(x, z, false);
            }
        }
        // The last column is cleared too.
        assert!(c.is_empty());
    }

    #[test]
    #[should_panic]
    fn out_of_range_local_coordinate_panics() {
        ZoneChunk::new().get(16, 0);
    }

    #[test]
    fn sampler_hits_every_set_bit() {
        let mut c = ZoneChunk::new();
        let set = [(0, 0), (15, 0), (7, 9), (15, 15)];
        for &(x, z) in &set {
            c.set(x, z, true);
        }
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [0usize; 4];
        for _ in 0..2_000 {
            let p = c.random_set_position(&mut rng).unwrap();
            let i = set.iter().position(|s| *s == p).expect("sampled an unset column");
            seen[i] += 1;
        }
        assert!(seen.iter().all(|&n| n > 350), "skewed sampling: {seen:?}");
    }

    #[test]
    fn iter_set_matches_get() {
        let mut c = ZoneChunk::new();
        c.set(1, 0, true);
        c.set(0, 5, true);
        c.set(12, 15, true);
        let got: Vec<_> = c.iter_set().collect();
        assert_eq!(got, vec![(1, 0), (0, 5), (12, 15)]);
    }

    #[test]
    fn bytes_trim_trailing_zeros() {
        let mut c = ZoneChunk::new();
        c.set(9, 0, true);
        assert_eq!(c.to_bytes(), vec![0x00, 0x02]);
        assert_eq!(ZoneChunk::from_bytes(&[0x00, 0x02]).unwrap(), c);
    }

    #[test]
    fn encoding_forms() {
        let mut w = ByteWriter::new();
        ZoneChunk::full().encode(&mut w);
        assert_eq!(w.into_bytes(), vec![FLAG_FULL]);

        let mut c = ZoneChunk::new();
        c.set(0, 0, true);
        let mut w = ByteWriter::new();
        c.encode(&mut w);
        assert_eq!(w.into_bytes(), vec![FLAG_BITS, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn decode_rejects_bad_input() {
        let mut r = ByteReader::new(&[0x04]);
        assert_eq!(ZoneChunk::decode(&mut r), Err(DecodeError::BadFlags(0x04)));

        let mut r = ByteReader::new(&[FLAG_BITS, 0x00, 0x21]);
        assert!(matches!(
            ZoneChunk::decode(&mut r),
            Err(DecodeError::BitsetTooLong { len: 33, .. })
        ));

        let mut r = ByteReader::new(&[FLAG_BITS, 0x00, 0x02, 0xFF]);
        assert!(matches!(
            ZoneChunk::decode(&mut r),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }
}

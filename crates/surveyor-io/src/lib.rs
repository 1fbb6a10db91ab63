//! Big-endian stream framing shared by the marker and zone codecs.
//!
//! The layout matches the host's network buffers: signed integers in network
//! byte order, booleans as a single byte, unsigned shorts for length prefixes.
#![forbid(unsafe_code)]

use surveyor_geom::BlockPos;
use thiserror::Error;

/// Sentinel X coordinate written for an absent position.
pub const UNSET_COORD: i32 = i32::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} byte(s) at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("invalid {what} count: {count}")]
    InvalidCount { what: &'static str, count: i64 },
    #[error("bitset of {len} byte(s) exceeds the {max}-byte chunk bitmap")]
    BitsetTooLong { len: usize, max: usize },
    #[error("unknown flag bits {0:#04x}")]
    BadFlags(u8),
    #[error("{0} trailing byte(s) after payload")]
    TrailingBytes(usize),
    #[error("chunk ({cx}, {cz}) lies outside the world column range")]
    ChunkOutOfRange { cx: i32, cz: i32 },
}

#[derive(Default, Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    #[inline]
    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    #[inline]
    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Height is narrowed to 16 bits on the wire. Callers keep Y within `i16`.
    #[inline]
    pub fn write_short_y(&mut self, y: i32) {
        debug_assert!(
            i16::try_from(y).is_ok(),
            "y = {y} does not fit the 16-bit wire height"
        );
        self.write_i16(y as i16);
    }

    /// `x` alone marks presence, so an absent position costs four bytes.
    pub fn write_opt_pos(&mut self, pos: Option<BlockPos>) {
        match pos {
            Some(p) => {
                self.write_i32(p.x);
                self.write_short_y(p.y);
                self.write_i32(p.z);
            }
            None => self.write_i32(UNSET_COORD),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n,
            });
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.take()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.take()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.take()?))
    }

    pub fn read_opt_pos(&mut self) -> Result<Option<BlockPos>, DecodeError> {
        let x = self.read_i32()?;
        if x == UNSET_COORD {
            return Ok(None);
        }
        let y = i32::from(self.read_i16()?);
        let z = self.read_i32()?;
        Ok(Some(BlockPos::new(x, y, z)))
    }

    /// Fails if anything is left over; used at the top level of a decode.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

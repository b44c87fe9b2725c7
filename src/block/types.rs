//! LZ4 block-format constants, the block error type, and the byte-level
//! helpers shared by the fast encoder, the HC encoder and the decoder.
//!
//! Block layout reminder (doc/lz4_Block_format.md):
//!
//! ```text
//! token | [literal length bytes] | literals | offset (LE u16) | [match length bytes]
//! ```
//!
//! The final sequence carries literals only.

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum match length encoded in an LZ4 block.
pub const MINMATCH: usize = 4;

/// Last N bytes of the input are always emitted as literals.
pub const LASTLITERALS: usize = 5;

/// A match may not start within the last `MFLIMIT` bytes of the input.
pub const MFLIMIT: usize = 12;

/// Inputs shorter than this are stored as a single literal run.
pub const LZ4_MIN_LENGTH: usize = MFLIMIT + 1;

/// Maximum back-reference distance supported by the format.
pub const LZ4_DISTANCE_MAX: usize = 65_535;

/// Largest input a single block call accepts (`LZ4_MAX_INPUT_SIZE`).
pub const LZ4_MAX_INPUT_SIZE: usize = 0x7E00_0000;

pub const ML_BITS: u32 = 4;
pub const ML_MASK: usize = (1 << ML_BITS) - 1;
pub const RUN_MASK: usize = (1 << (8 - ML_BITS)) - 1;

pub const KB: usize = 1 << 10;

pub const LZ4_ACCELERATION_DEFAULT: i32 = 1;
pub const LZ4_ACCELERATION_MAX: i32 = 65_537;

/// Higher → faster on incompressible data at the cost of ratio.
pub const LZ4_SKIP_TRIGGER: u32 = 6;

/// Hash log of the fast encoder's table (16 KiB of `u32`).
pub const LZ4_HASHLOG: u32 = 12;
pub const LZ4_HASH_SIZE_U32: usize = 1 << LZ4_HASHLOG;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure of a one-shot block operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockError {
    /// The destination cannot hold the encoded or decoded block.
    #[error("destination buffer too small")]
    OutputTooSmall,
    /// The source exceeds [`LZ4_MAX_INPUT_SIZE`].
    #[error("input larger than {LZ4_MAX_INPUT_SIZE} bytes")]
    InputTooLarge,
    /// The compressed stream is corrupt; `offset` is the source position
    /// where decoding gave up.
    #[error("malformed compressed block (source offset {offset})")]
    Malformed { offset: usize },
}

/// Worst-case compressed size for `input_size` bytes (`LZ4_COMPRESSBOUND`).
///
/// Returns `None` when `input_size` exceeds [`LZ4_MAX_INPUT_SIZE`].
#[inline]
pub fn compress_bound(input_size: usize) -> Option<usize> {
    if input_size > LZ4_MAX_INPUT_SIZE {
        None
    } else {
        Some(input_size + input_size / 255 + 16)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Little-endian reads
// ─────────────────────────────────────────────────────────────────────────────

#[inline(always)]
pub fn read_u16_le(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([buf[pos], buf[pos + 1]])
}

#[inline(always)]
pub fn read_u32_le(buf: &[u8], pos: usize) -> u32 {
    let b = &buf[pos..pos + 4];
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline(always)]
pub fn read_u64_le(buf: &[u8], pos: usize) -> u64 {
    let b = &buf[pos..pos + 8];
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Length of the common run between `buf[cur..]` and `buf[reference..]`,
/// stopping at `limit` (exclusive). `reference` must precede `cur`.
#[inline]
pub fn count_match(buf: &[u8], mut cur: usize, mut reference: usize, limit: usize) -> usize {
    let start = cur;
    while cur + 8 <= limit {
        let diff = read_u64_le(buf, cur) ^ read_u64_le(buf, reference);
        if diff != 0 {
            return cur - start + (diff.trailing_zeros() / 8) as usize;
        }
        cur += 8;
        reference += 8;
    }
    while cur < limit && buf[cur] == buf[reference] {
        cur += 1;
        reference += 1;
    }
    cur - start
}

/// Number of extra length bytes needed once a length field saturates at 15.
#[inline(always)]
fn extra_length_bytes(len: usize) -> usize {
    if len >= ML_MASK {
        (len - ML_MASK) / 255 + 1
    } else {
        0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence writer
// ─────────────────────────────────────────────────────────────────────────────

/// Appends encoded sequences to a destination slice, refusing any sequence
/// that would not fit in full.
pub struct SequenceWriter<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> SequenceWriter<'a> {
    pub fn new(dst: &'a mut [u8]) -> Self {
        SequenceWriter { dst, pos: 0 }
    }

    /// Bytes emitted so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.pos
    }

    /// Emits `literals` followed by a back-reference of `match_len` bytes
    /// at distance `offset`.
    pub fn sequence(&mut self, literals: &[u8], offset: usize, match_len: usize) -> Result<(), BlockError> {
        debug_assert!(match_len >= MINMATCH);
        debug_assert!(offset > 0 && offset <= LZ4_DISTANCE_MAX);
        let lit_len = literals.len();
        let ml = match_len - MINMATCH;
        let needed = 1 + extra_length_bytes(lit_len) + lit_len + 2 + extra_length_bytes(ml);
        if self.dst.len() - self.pos < needed {
            return Err(BlockError::OutputTooSmall);
        }
        self.put_token(lit_len, ml);
        if lit_len >= RUN_MASK {
            self.put_length(lit_len - RUN_MASK);
        }
        self.put_bytes(literals);
        self.put_bytes(&(offset as u16).to_le_bytes());
        if ml >= ML_MASK {
            self.put_length(ml - ML_MASK);
        }
        Ok(())
    }

    /// Emits the trailing literal-only sequence.
    pub fn last_literals(&mut self, literals: &[u8]) -> Result<(), BlockError> {
        let lit_len = literals.len();
        let needed = 1 + extra_length_bytes(lit_len) + lit_len;
        if self.dst.len() - self.pos < needed {
            return Err(BlockError::OutputTooSmall);
        }
        self.put_token(lit_len, 0);
        if lit_len >= RUN_MASK {
            self.put_length(lit_len - RUN_MASK);
        }
        self.put_bytes(literals);
        Ok(())
    }

    #[inline(always)]
    fn put_token(&mut self, lit_len: usize, ml: usize) {
        let hi = lit_len.min(RUN_MASK) as u8;
        let lo = ml.min(ML_MASK) as u8;
        self.dst[self.pos] = (hi << ML_BITS) | lo;
        self.pos += 1;
    }

    #[inline(always)]
    fn put_length(&mut self, mut len: usize) {
        while len >= 255 {
            self.dst[self.pos] = 255;
            self.pos += 1;
            len -= 255;
        }
        self.dst[self.pos] = len as u8;
        self.pos += 1;
    }

    #[inline(always)]
    fn put_bytes(&mut self, bytes: &[u8]) {
        self.dst[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

//! Bounds-checked LZ4 block decoder.
//!
//! One loop serves both decoding modes:
//! - [`DecodeMode::SourceBounded`]: decode until the compressed input is
//!   exhausted, never writing past the destination (`LZ4_decompress_safe`).
//! - [`DecodeMode::OutputBounded`]: decode until the destination is exactly
//!   full and report how much input that took (`LZ4_decompress_fast`). Unlike
//!   the C function this never reads past the input slice.

use super::types::{read_u16_le, BlockError, MINMATCH, ML_MASK, RUN_MASK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeMode {
    SourceBounded,
    OutputBounded,
}

/// Result of one decode: `(source bytes consumed, bytes written)`.
type Decoded = (usize, usize);

#[inline]
fn read_length_ext(src: &[u8], ip: &mut usize, mut len: usize) -> Result<usize, BlockError> {
    loop {
        let b = *src.get(*ip).ok_or(BlockError::Malformed { offset: *ip })?;
        *ip += 1;
        len = len
            .checked_add(b as usize)
            .ok_or(BlockError::Malformed { offset: *ip })?;
        if b != 255 {
            return Ok(len);
        }
    }
}

/// Copies `len` bytes from `op - offset` to `op`, handling overlap the way
/// the format defines it (a repeating pattern).
#[inline]
fn copy_match(out: &mut [u8], op: usize, offset: usize, len: usize) {
    let from = op - offset;
    if offset >= len {
        out.copy_within(from..from + len, op);
    } else {
        for i in 0..len {
            out[op + i] = out[from + i];
        }
    }
}

fn decode(src: &[u8], out: &mut [u8], prefix_len: usize, mode: DecodeMode) -> Result<Decoded, BlockError> {
    let oend = out.len();
    let mut ip = 0usize;
    let mut op = prefix_len;

    loop {
        let token = *src.get(ip).ok_or(BlockError::Malformed { offset: ip })? as usize;
        ip += 1;

        // literals
        let mut lit_len = token >> 4;
        if lit_len == RUN_MASK {
            lit_len = read_length_ext(src, &mut ip, lit_len)?;
        }
        if lit_len > src.len() - ip || lit_len > oend - op {
            return Err(BlockError::Malformed { offset: ip });
        }
        out[op..op + lit_len].copy_from_slice(&src[ip..ip + lit_len]);
        ip += lit_len;
        op += lit_len;

        let finished = match mode {
            DecodeMode::SourceBounded => ip == src.len(),
            DecodeMode::OutputBounded => op == oend,
        };
        if finished {
            return Ok((ip, op - prefix_len));
        }

        // match
        if src.len() - ip < 2 {
            return Err(BlockError::Malformed { offset: ip });
        }
        let offset = read_u16_le(src, ip) as usize;
        if offset == 0 || offset > op {
            return Err(BlockError::Malformed { offset: ip });
        }
        ip += 2;
        let mut match_len = token & ML_MASK;
        if match_len == ML_MASK {
            match_len = read_length_ext(src, &mut ip, match_len)?;
        }
        match_len += MINMATCH;
        if match_len > oend - op {
            return Err(BlockError::Malformed { offset: ip });
        }
        copy_match(out, op, offset, match_len);
        op += match_len;
    }
}

/// Decodes a complete block into `dst`, returning the decoded length.
///
/// Corrupt or truncated input, or output that would exceed `dst`, is
/// reported as [`BlockError::Malformed`]; nothing is written past `dst`.
pub fn decompress_safe(src: &[u8], dst: &mut [u8]) -> Result<usize, BlockError> {
    decode(src, dst, 0, DecodeMode::SourceBounded).map(|(_, written)| written)
}

/// Decodes a block whose matches may reach into `out[..prefix_len]`.
///
/// Output starts at `out[prefix_len]`; the returned count excludes the
/// prefix. Used for linked frame blocks.
pub fn decompress_with_prefix(src: &[u8], out: &mut [u8], prefix_len: usize) -> Result<usize, BlockError> {
    decode(src, out, prefix_len, DecodeMode::SourceBounded).map(|(_, written)| written)
}

/// Decodes exactly `dst.len()` bytes and returns the number of source bytes
/// read. The caller asserts the original size; a wrong size surfaces as
/// [`BlockError::Malformed`] rather than an out-of-bounds access.
pub fn decompress_known_size(src: &[u8], dst: &mut [u8]) -> Result<usize, BlockError> {
    decode(src, dst, 0, DecodeMode::OutputBounded).map(|(consumed, _)| consumed)
}

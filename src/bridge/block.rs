//! One-shot block operations over logical buffers.

use tracing::trace;

use super::traced;
use crate::block::types::{compress_bound as bound, BlockError, LZ4_MAX_INPUT_SIZE};
use crate::block::{compress_fast, decompress_known_size, decompress_safe};
use crate::buffer::{with_source_and_destination, with_source_tail_and_destination, LogicalBuffer};
use crate::error::{BridgeError, Result};
use crate::hc::compress_hc;

/// Size of the original-length prefix used by the `*_with_length` pair.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Worst-case compressed size of `src_len` bytes; 0 when `src_len` is
/// negative or above the block input limit (`LZ4_compressBound`).
pub fn compress_bound(src_len: i32) -> i32 {
    usize::try_from(src_len)
        .ok()
        .and_then(bound)
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(0)
}

fn compress_error(e: BlockError, src_len: usize, available: usize) -> BridgeError {
    match e {
        BlockError::OutputTooSmall => BridgeError::CapacityExceeded {
            needed: bound(src_len).unwrap_or(usize::MAX),
            available,
        },
        other => other.into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn compress_with(
    op: &'static str,
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
    encode: impl FnOnce(&[u8], &mut [u8]) -> std::result::Result<usize, BlockError>,
) -> Result<usize> {
    let result = with_source_and_destination(src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
        encode(s, d).map_err(|e| compress_error(e, s.len(), d.len()))
    });
    if let Ok(n) = &result {
        trace!(op, src_len, compressed = n, "block compressed");
    }
    traced(op, result)
}

/// Compresses `src[src_off..src_off + src_len]` into
/// `dst[dst_off..dst_off + dst_cap]`. Fails with
/// [`BridgeError::CapacityExceeded`] rather than writing a partial block.
pub fn block_compress(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    block_compress_fast(src, src_off, src_len, dst, dst_off, dst_cap, 1)
}

/// [`block_compress`] with an acceleration factor (clamped to `1..=65537`).
pub fn block_compress_fast(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
    acceleration: i32,
) -> Result<usize> {
    compress_with("block_compress", src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
        compress_fast(s, d, acceleration)
    })
}

/// HC compression at `level`; out-of-range levels clamp like `LZ4_compress_HC`.
pub fn block_compress_hc(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
    level: i32,
) -> Result<usize> {
    compress_with("block_compress_hc", src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
        compress_hc(s, d, level)
    })
}

/// Decodes exactly `dst_len` bytes from the block starting at `src_off`
/// and returns the number of source bytes it occupied.
///
/// The caller asserts the original length. A wrong length is reported as
/// [`BridgeError::MalformedInput`]; reads stay inside the source buffer.
pub fn block_decompress_known_size(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_len: usize,
) -> Result<usize> {
    let result = with_source_tail_and_destination(src, src_off, dst, dst_off, dst_len, |s, d| {
        Ok(decompress_known_size(s, d)?)
    });
    traced("block_decompress_known_size", result)
}

/// Decodes a whole block of `src_len` bytes into at most `dst_cap` bytes
/// and returns the decoded length.
pub fn block_decompress_safe(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = with_source_and_destination(src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
        Ok(decompress_safe(s, d)?)
    });
    traced("block_decompress_safe", result)
}

/// Compresses with a 4-byte little-endian original-length prefix, so the
/// block can later be decoded without out-of-band size information.
/// Needs `compress_bound(src_len) + 4` bytes in the worst case.
pub fn block_compress_with_length(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = with_source_and_destination(src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
        if s.len() > LZ4_MAX_INPUT_SIZE {
            return Err(BlockError::InputTooLarge.into());
        }
        let needed_min = LENGTH_PREFIX_SIZE + 1;
        if d.len() < needed_min {
            return Err(BridgeError::CapacityExceeded {
                needed: bound(s.len()).unwrap_or(0) + LENGTH_PREFIX_SIZE,
                available: d.len(),
            });
        }
        let (prefix, body) = d.split_at_mut(LENGTH_PREFIX_SIZE);
        let n = compress_fast(s, body, 1).map_err(|e| {
            let mut err = compress_error(e, s.len(), body.len());
            if let BridgeError::CapacityExceeded { needed, available } = &mut err {
                *needed += LENGTH_PREFIX_SIZE;
                *available += LENGTH_PREFIX_SIZE;
            }
            err
        })?;
        prefix.copy_from_slice(&(s.len() as u32).to_le_bytes());
        Ok(LENGTH_PREFIX_SIZE + n)
    });
    traced("block_compress_with_length", result)
}

/// Decodes a block written by [`block_compress_with_length`]; returns the
/// decoded length.
pub fn block_decompress_with_length(
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = with_source_and_destination(src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
        if s.len() < LENGTH_PREFIX_SIZE {
            return Err(BridgeError::MalformedInput("missing length prefix".into()));
        }
        let (prefix, body) = s.split_at(LENGTH_PREFIX_SIZE);
        let original = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        if original > d.len() {
            return Err(BridgeError::CapacityExceeded { needed: original, available: d.len() });
        }
        let n = decompress_safe(body, &mut d[..original])?;
        if n != original {
            return Err(BridgeError::MalformedInput(format!(
                "length prefix says {original} bytes, block holds {n}"
            )));
        }
        Ok(n)
    });
    traced("block_decompress_with_length", result)
}

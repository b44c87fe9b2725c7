//! Fast LZ4 block encoder (single hash table, skip-accelerated search).
//!
//! The encoder keeps one 4096-entry table of `u32` positions. Candidates are
//! verified by content, so stale or zeroed slots are harmless.

use super::types::{
    compress_bound, count_match, read_u32_le, BlockError, SequenceWriter, KB, LASTLITERALS,
    LZ4_ACCELERATION_DEFAULT, LZ4_ACCELERATION_MAX, LZ4_DISTANCE_MAX, LZ4_HASHLOG,
    LZ4_HASH_SIZE_U32, LZ4_MAX_INPUT_SIZE, LZ4_MIN_LENGTH, LZ4_SKIP_TRIGGER, MFLIMIT, MINMATCH,
};

#[inline(always)]
fn hash4(sequence: u32) -> usize {
    (sequence.wrapping_mul(2_654_435_761) >> (32 - LZ4_HASHLOG)) as usize
}

/// Compresses `src` into `dst` with the default acceleration.
///
/// Equivalent to `LZ4_compress_default`.
pub fn compress_default(src: &[u8], dst: &mut [u8]) -> Result<usize, BlockError> {
    compress_fast(src, dst, LZ4_ACCELERATION_DEFAULT)
}

/// Compresses `src` into `dst`; `acceleration` trades ratio for speed and is
/// clamped to `1..=65537`.
pub fn compress_fast(src: &[u8], dst: &mut [u8], acceleration: i32) -> Result<usize, BlockError> {
    compress_with_prefix(src, 0, dst, acceleration)
}

/// Compresses `input[start..]`, allowing back-references into the last
/// 64 KiB of `input[..start]`.
///
/// The decoder must be given the same prefix (see
/// [`decompress_with_prefix`](super::decompress::decompress_with_prefix)).
pub fn compress_with_prefix(
    input: &[u8],
    start: usize,
    dst: &mut [u8],
    acceleration: i32,
) -> Result<usize, BlockError> {
    let src_len = input.len() - start;
    if src_len > LZ4_MAX_INPUT_SIZE {
        return Err(BlockError::InputTooLarge);
    }
    let accel = acceleration.clamp(LZ4_ACCELERATION_DEFAULT, LZ4_ACCELERATION_MAX) as u32;
    let mut out = SequenceWriter::new(dst);

    if src_len < LZ4_MIN_LENGTH {
        out.last_literals(&input[start..])?;
        return Ok(out.written());
    }

    let mut table = vec![0u32; LZ4_HASH_SIZE_U32];
    let dict_start = start.saturating_sub(64 * KB);
    for pos in dict_start..start.saturating_sub(MINMATCH - 1) {
        table[hash4(read_u32_le(input, pos))] = pos as u32;
    }

    let end = input.len();
    let mflimit = end - MFLIMIT;
    let match_limit = end - LASTLITERALS;
    let mut anchor = start;
    let mut ip = start;

    'sequences: loop {
        // Search with a step that grows the longer nothing matches.
        let mut search_nb = accel << LZ4_SKIP_TRIGGER;
        let mut next = ip;
        let (found, mut candidate) = loop {
            let cur = next;
            if cur > mflimit {
                break 'sequences;
            }
            next = cur + (search_nb >> LZ4_SKIP_TRIGGER) as usize;
            search_nb += 1;

            let seq = read_u32_le(input, cur);
            let h = hash4(seq);
            let cand = table[h] as usize;
            table[h] = cur as u32;
            if cand < cur && cur - cand <= LZ4_DISTANCE_MAX && read_u32_le(input, cand) == seq {
                break (cur, cand);
            }
        };
        ip = found;

        // Extend backwards over literals that also match.
        while ip > anchor && candidate > 0 && input[ip - 1] == input[candidate - 1] {
            ip -= 1;
            candidate -= 1;
        }

        let match_len = MINMATCH + count_match(input, ip + MINMATCH, candidate + MINMATCH, match_limit);
        out.sequence(&input[anchor..ip], ip - candidate, match_len)?;
        ip += match_len;
        anchor = ip;

        if ip > mflimit {
            break;
        }
        table[hash4(read_u32_le(input, ip - 2))] = (ip - 2) as u32;
    }

    out.last_literals(&input[anchor..])?;
    Ok(out.written())
}

/// Allocating convenience: compresses `src` into a fresh vector sized by
/// [`compress_bound`].
pub fn compress_to_vec(src: &[u8], acceleration: i32) -> Result<Vec<u8>, BlockError> {
    let bound = compress_bound(src.len()).ok_or(BlockError::InputTooLarge)?;
    let mut dst = vec![0u8; bound];
    let n = compress_fast(src, &mut dst, acceleration)?;
    dst.truncate(n);
    Ok(dst)
}

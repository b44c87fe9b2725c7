//! LZ4-HC block encoder: hash-chain search with one-step lazy evaluation.
//!
//! Produces ordinary LZ4 blocks; any LZ4 decoder reads them.

use super::search::{HashChain, Match};
use super::types::level_params;
use crate::block::types::{
    BlockError, SequenceWriter, KB, LASTLITERALS, LZ4_MAX_INPUT_SIZE, LZ4_MIN_LENGTH, MFLIMIT,
    MINMATCH,
};

/// Compresses `src` into `dst` at HC `level` (clamped, see
/// [`normalize_level`](super::types::normalize_level)).
///
/// Equivalent to `LZ4_compress_HC`.
pub fn compress_hc(src: &[u8], dst: &mut [u8], level: i32) -> Result<usize, BlockError> {
    compress_hc_with_prefix(src, 0, dst, level)
}

/// HC counterpart of
/// [`compress_with_prefix`](crate::block::compress::compress_with_prefix).
pub fn compress_hc_with_prefix(
    input: &[u8],
    start: usize,
    dst: &mut [u8],
    level: i32,
) -> Result<usize, BlockError> {
    let src_len = input.len() - start;
    if src_len > LZ4_MAX_INPUT_SIZE {
        return Err(BlockError::InputTooLarge);
    }
    let mut out = SequenceWriter::new(dst);
    if src_len < LZ4_MIN_LENGTH {
        out.last_literals(&input[start..])?;
        return Ok(out.written());
    }

    let mut chain = HashChain::new(level_params(level), start.saturating_sub(64 * KB));
    let end = input.len();
    let mflimit = end - MFLIMIT;
    let match_limit = end - LASTLITERALS;
    let mut anchor = start;
    let mut ip = start;

    while ip <= mflimit {
        let Some(mut best) = chain.find_longest(input, ip, match_limit, MINMATCH - 1) else {
            ip += 1;
            continue;
        };
        let mut match_ip = ip;

        // Defer by one position while that keeps producing a longer match.
        while match_ip < mflimit {
            match chain.find_longest(input, match_ip + 1, match_limit, best.len) {
                Some(longer) => {
                    match_ip += 1;
                    best = longer;
                }
                None => break,
            }
        }

        let Match { pos: mut reference, mut len } = best;
        while match_ip > anchor && reference > 0 && input[match_ip - 1] == input[reference - 1] {
            match_ip -= 1;
            reference -= 1;
            len += 1;
        }

        out.sequence(&input[anchor..match_ip], match_ip - reference, len)?;
        ip = match_ip + len;
        anchor = ip;
    }

    out.last_literals(&input[anchor..])?;
    Ok(out.written())
}

//! Hash-chain match finder.
//!
//! `head` maps a 4-byte hash to the most recent position with that hash;
//! `chain[pos & MAXD_MASK]` stores the distance back to the previous
//! position with the same hash (0 = none within the window).

use super::types::{LevelParams, LZ4HC_HASHTABLESIZE, LZ4HC_HASH_LOG, LZ4HC_MAXD, LZ4HC_MAXD_MASK, NO_POSITION};
use crate::block::types::{count_match, read_u32_le, LZ4_DISTANCE_MAX, MINMATCH};

#[inline(always)]
fn hc_hash(sequence: u32) -> usize {
    (sequence.wrapping_mul(2_654_435_761) >> (32 - LZ4HC_HASH_LOG)) as usize
}

/// A candidate back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub pos: usize,
    pub len: usize,
}

pub struct HashChain {
    head: Vec<u32>,
    chain: Vec<u16>,
    next_to_update: usize,
    params: LevelParams,
}

impl HashChain {
    pub fn new(params: LevelParams, first_position: usize) -> Self {
        HashChain {
            head: vec![NO_POSITION; LZ4HC_HASHTABLESIZE],
            chain: vec![0; LZ4HC_MAXD],
            next_to_update: first_position,
            params,
        }
    }

    /// Inserts every position in `next_to_update..target` into the chains.
    pub fn insert_up_to(&mut self, input: &[u8], target: usize) {
        while self.next_to_update < target {
            let pos = self.next_to_update;
            let h = hc_hash(read_u32_le(input, pos));
            let prev = self.head[h];
            let delta = if prev == NO_POSITION {
                0
            } else {
                let d = pos - prev as usize;
                if d > LZ4_DISTANCE_MAX { 0 } else { d as u16 }
            };
            self.chain[pos & LZ4HC_MAXD_MASK] = delta;
            self.head[h] = pos as u32;
            self.next_to_update += 1;
        }
    }

    /// Longest match for `input[ip..]` ending no later than `limit`, or
    /// `None` if nothing beats `min_len`.
    pub fn find_longest(&mut self, input: &[u8], ip: usize, limit: usize, min_len: usize) -> Option<Match> {
        self.insert_up_to(input, ip);
        let seq = read_u32_le(input, ip);
        let head = self.head[hc_hash(seq)];
        if head == NO_POSITION {
            return None;
        }
        let mut cand = head as usize;
        let mut best: Option<Match> = None;
        let mut best_len = min_len;
        let mut attempts = self.params.nb_searches;

        while attempts > 0 && ip - cand <= LZ4_DISTANCE_MAX {
            attempts -= 1;
            // Cheap reject: the byte that would extend the best match.
            let probe = ip + best_len;
            let worth_it = probe >= limit || input[cand + best_len] == input[probe];
            if worth_it && read_u32_le(input, cand) == seq {
                let len = MINMATCH + count_match(input, ip + MINMATCH, cand + MINMATCH, limit);
                if len > best_len {
                    best_len = len;
                    best = Some(Match { pos: cand, len });
                    if len >= self.params.target_length {
                        break;
                    }
                }
            }
            let delta = self.chain[cand & LZ4HC_MAXD_MASK] as usize;
            if delta == 0 || delta > cand {
                break;
            }
            cand -= delta;
        }
        best
    }
}

//! Streaming LZ4 frame compressor.
//!
//! Stream lifecycle: `Idle → Open (begin) → Open (update/flush)* → Closed (end)`.
//! A closed or idle context may begin a new frame; everything else out of
//! order fails with [`FrameError::StageMismatch`] and leaves the context
//! untouched.
//!
//! Every call checks its worst-case output size before doing any work, so
//! a [`FrameError::DstMaxSizeTooSmall`] never leaves a half-written block
//! behind.

use super::header::{header_size_for, write_header};
use super::types::{
    BlockMode, FrameError, Preferences, BF_SIZE, BH_SIZE, CONTENT_CHECKSUM_SIZE,
    LINKED_HISTORY, LZ4F_BLOCKUNCOMPRESSED_FLAG, MAX_FH_SIZE,
};
use crate::block::compress::compress_with_prefix;
use crate::block::types::compress_bound as block_compress_bound;
use crate::hc::compress_hc::compress_hc_with_prefix;
use crate::hc::types::LZ4HC_CLEVEL_MIN;
use crate::xxhash::{StreamingHash, StreamingXxh32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Open,
    Closed,
}

/// Per-block overhead: header plus optional block checksum.
#[inline]
fn block_overhead(prefs: &Preferences) -> usize {
    BH_SIZE + if prefs.frame_info.block_checksum { BF_SIZE } else { 0 }
}

/// End-of-frame overhead: end mark plus optional content checksum.
#[inline]
fn end_overhead(prefs: &Preferences) -> usize {
    BH_SIZE
        + if prefs.frame_info.content_checksum { CONTENT_CHECKSUM_SIZE } else { 0 }
}

/// Worst-case output of any single `update`/`flush`/`end` call that feeds
/// `src_size` bytes, assuming up to one block minus one byte is already
/// buffered. Equivalent to `LZ4F_compressBound`.
pub fn compress_bound(src_size: usize, prefs: Option<&Preferences>) -> usize {
    let prefs = prefs.copied().unwrap_or_else(worst_case_preferences);
    let block_size = prefs.frame_info.block_size_id.bytes();
    let buffered_max = block_size - 1;
    let total = src_size + buffered_max;
    let blocks = total / block_size + 1;
    total + blocks * block_overhead(&prefs) + end_overhead(&prefs)
}

/// Worst-case size of a complete frame holding `src_size` bytes, header
/// included. Equivalent to `LZ4F_compressFrameBound`.
pub fn compress_frame_bound(src_size: usize, prefs: Option<&Preferences>) -> usize {
    let prefs = prefs.copied().unwrap_or_else(worst_case_preferences);
    let block_size = prefs.frame_info.block_size_id.bytes();
    let blocks = src_size.div_ceil(block_size);
    MAX_FH_SIZE + src_size + blocks * block_overhead(&prefs) + end_overhead(&prefs)
}

/// Default preferences with every optional checksum turned on; the bound
/// helpers use these when no preferences are supplied.
fn worst_case_preferences() -> Preferences {
    let mut prefs = Preferences::default();
    prefs.frame_info.block_checksum = true;
    prefs.frame_info.content_checksum = true;
    prefs
}

/// Streaming frame compression context (`LZ4F_cctx`).
pub struct FrameCompressor {
    stage: Stage,
    prefs: Preferences,
    block_size: usize,
    /// `[history | pending input]`; history is empty for independent blocks.
    window: Vec<u8>,
    history_len: usize,
    scratch: Vec<u8>,
    total_in: u64,
    content_hash: StreamingXxh32,
}

impl Default for FrameCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCompressor {
    pub fn new() -> Self {
        FrameCompressor {
            stage: Stage::Idle,
            prefs: Preferences::default(),
            block_size: 0,
            window: Vec::new(),
            history_len: 0,
            scratch: Vec::new(),
            total_in: 0,
            content_hash: StreamingXxh32::with_seed(0),
        }
    }

    /// `true` between a successful `begin` and the matching `end`.
    pub fn is_open(&self) -> bool {
        self.stage == Stage::Open
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    #[inline]
    fn pending_len(&self) -> usize {
        self.window.len() - self.history_len
    }

    /// Writes the frame header and fixes `prefs` for the rest of the frame.
    pub fn begin(&mut self, dst: &mut [u8], prefs: &Preferences) -> Result<usize, FrameError> {
        if self.stage == Stage::Open {
            return Err(FrameError::StageMismatch("begin called while a frame is open"));
        }
        let needed = header_size_for(&prefs.frame_info);
        if dst.len() < needed {
            return Err(FrameError::DstMaxSizeTooSmall { needed, available: dst.len() });
        }
        let written = write_header(&prefs.frame_info, dst)?;

        self.prefs = *prefs;
        self.block_size = prefs.frame_info.block_size_id.bytes();
        self.window.clear();
        self.window.reserve(self.block_size + LINKED_HISTORY);
        self.history_len = 0;
        self.scratch.resize(block_compress_bound(self.block_size).unwrap_or(0), 0);
        self.total_in = 0;
        self.content_hash.reset();
        self.stage = Stage::Open;
        Ok(written)
    }

    /// Worst-case bytes `update` writes when fed `src_len` more bytes.
    pub fn update_bound(&self, src_len: usize) -> usize {
        let total = self.pending_len() + src_len;
        let full = total / self.block_size.max(1);
        let mut bound = full * (self.block_size + block_overhead(&self.prefs));
        let rest = total - full * self.block_size;
        if self.prefs.auto_flush && rest > 0 {
            bound += rest + block_overhead(&self.prefs);
        }
        bound
    }

    /// Worst-case bytes `flush` writes.
    pub fn flush_bound(&self) -> usize {
        match self.pending_len() {
            0 => 0,
            n => n + block_overhead(&self.prefs),
        }
    }

    /// Worst-case bytes `end` writes.
    pub fn end_bound(&self) -> usize {
        self.flush_bound() + end_overhead(&self.prefs)
    }

    fn require_open(&self, op: &'static str) -> Result<(), FrameError> {
        if self.stage == Stage::Open {
            Ok(())
        } else {
            Err(FrameError::StageMismatch(op))
        }
    }

    fn require_capacity(needed: usize, dst: &[u8]) -> Result<(), FrameError> {
        if dst.len() < needed {
            Err(FrameError::DstMaxSizeTooSmall { needed, available: dst.len() })
        } else {
            Ok(())
        }
    }

    /// Feeds `src` into the frame. Whole blocks are emitted as they fill;
    /// the remainder stays buffered (unless auto-flush is on).
    pub fn update(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, FrameError> {
        self.require_open("update requires an open frame")?;
        Self::require_capacity(self.update_bound(src.len()), dst)?;

        if self.prefs.frame_info.content_checksum {
            self.content_hash.update(src);
        }
        self.total_in += src.len() as u64;

        let mut written = 0;
        let mut rest = src;
        while !rest.is_empty() {
            let take = (self.block_size - self.pending_len()).min(rest.len());
            self.window.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending_len() == self.block_size {
                written += self.emit_block(&mut dst[written..]);
            }
        }
        if self.prefs.auto_flush && self.pending_len() > 0 {
            written += self.emit_block(&mut dst[written..]);
        }
        Ok(written)
    }

    /// Emits any buffered input as a block; the frame stays open.
    pub fn flush(&mut self, dst: &mut [u8]) -> Result<usize, FrameError> {
        self.require_open("flush requires an open frame")?;
        Self::require_capacity(self.flush_bound(), dst)?;
        if self.pending_len() == 0 {
            return Ok(0);
        }
        Ok(self.emit_block(dst))
    }

    /// Flushes, writes the end mark and optional content checksum, and
    /// closes the frame.
    pub fn end(&mut self, dst: &mut [u8]) -> Result<usize, FrameError> {
        self.require_open("end requires an open frame")?;
        let declared = self.prefs.frame_info.content_size;
        if declared != 0 && declared != self.total_in {
            return Err(FrameError::ContentSizeMismatch { declared, actual: self.total_in });
        }
        Self::require_capacity(self.end_bound(), dst)?;

        let mut written = 0;
        if self.pending_len() > 0 {
            written += self.emit_block(dst);
        }
        dst[written..written + BH_SIZE].copy_from_slice(&0u32.to_le_bytes());
        written += BH_SIZE;
        if self.prefs.frame_info.content_checksum {
            let digest = self.content_hash.digest();
            dst[written..written + CONTENT_CHECKSUM_SIZE].copy_from_slice(&digest.to_le_bytes());
            written += CONTENT_CHECKSUM_SIZE;
        }

        self.window.clear();
        self.history_len = 0;
        self.stage = Stage::Closed;
        Ok(written)
    }

    /// Compresses the pending bytes into one block. Capacity was checked by
    /// the caller, so this cannot fail: blocks that do not shrink are stored
    /// raw.
    fn emit_block(&mut self, dst: &mut [u8]) -> usize {
        let raw_len = self.pending_len();
        let level = self.prefs.compression_level;
        // A compressed block only pays off if it is strictly smaller.
        let limit = raw_len.saturating_sub(1);
        let packed = if raw_len == 0 {
            None
        } else if level < LZ4HC_CLEVEL_MIN {
            let acceleration = if level < 0 { -level + 1 } else { 1 };
            compress_with_prefix(&self.window, self.history_len, &mut self.scratch[..limit], acceleration).ok()
        } else {
            compress_hc_with_prefix(&self.window, self.history_len, &mut self.scratch[..limit], level).ok()
        };

        let (header, body): (u32, &[u8]) = match packed {
            Some(n) => (n as u32, &self.scratch[..n]),
            None => (raw_len as u32 | LZ4F_BLOCKUNCOMPRESSED_FLAG, &self.window[self.history_len..]),
        };
        let mut pos = 0;
        dst[..BH_SIZE].copy_from_slice(&header.to_le_bytes());
        pos += BH_SIZE;
        dst[pos..pos + body.len()].copy_from_slice(body);
        pos += body.len();
        if self.prefs.frame_info.block_checksum {
            let sum = crate::xxhash::xxh32_oneshot(body, 0);
            dst[pos..pos + BF_SIZE].copy_from_slice(&sum.to_le_bytes());
            pos += BF_SIZE;
        }

        match self.prefs.frame_info.block_mode {
            BlockMode::Independent => self.window.clear(),
            BlockMode::Linked => {
                if self.window.len() > LINKED_HISTORY {
                    let excess = self.window.len() - LINKED_HISTORY;
                    self.window.drain(..excess);
                }
            }
        }
        self.history_len = self.window.len();
        pos
    }
}

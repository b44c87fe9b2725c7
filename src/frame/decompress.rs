//! Streaming LZ4 frame decompressor.
//!
//! Input may arrive in arbitrary pieces and output may be drained through
//! arbitrarily small destinations. Partial headers, block headers and
//! blocks are collected in a staging buffer; decoded blocks land in a window
//! that doubles as the 64 KiB history for linked blocks and is drained into
//! the caller's destination before the next block is decoded.
//!
//! Concatenated frames and skippable frames are handled transparently.

use super::header::{header_size, is_skippable_magic, read_header};
use super::types::{
    BlockMode, FrameError, FrameInfo, BF_SIZE, BH_SIZE, CONTENT_CHECKSUM_SIZE, FH_SIZE_PROBE,
    LINKED_HISTORY, LZ4F_BLOCKUNCOMPRESSED_FLAG,
};
use crate::block::decompress::decompress_with_prefix;
use crate::block::types::read_u32_le;
use crate::xxhash::{xxh32_oneshot, StreamingHash, StreamingXxh32};

/// Skippable frame preamble: magic + 4-byte length.
const SKIPPABLE_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    BlockHeader,
    BlockData { size: usize, raw: bool },
    ContentChecksum,
    Skip { remaining: usize },
}

/// Tops `staging` up to `target` bytes from `src[*ip..]`; `true` once it
/// holds all of them.
fn gather(staging: &mut Vec<u8>, target: usize, src: &[u8], ip: &mut usize) -> bool {
    if staging.len() < target {
        let take = (target - staging.len()).min(src.len() - *ip);
        staging.extend_from_slice(&src[*ip..*ip + take]);
        *ip += take;
    }
    staging.len() >= target
}

/// Streaming frame decompression context (`LZ4F_dctx`).
pub struct FrameDecompressor {
    stage: Stage,
    info: FrameInfo,
    block_max: usize,
    staging: Vec<u8>,
    /// `[history | undelivered output]`.
    window: Vec<u8>,
    out_pos: usize,
    total_out: u64,
    content_hash: StreamingXxh32,
}

impl Default for FrameDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecompressor {
    pub fn new() -> Self {
        FrameDecompressor {
            stage: Stage::Header,
            info: FrameInfo::default(),
            block_max: 0,
            staging: Vec::new(),
            window: Vec::new(),
            out_pos: 0,
            total_out: 0,
            content_hash: StreamingXxh32::with_seed(0),
        }
    }

    /// Drops any partially decoded frame; the context expects a new frame.
    pub fn reset(&mut self) {
        self.stage = Stage::Header;
        self.staging.clear();
        self.window.clear();
        self.out_pos = 0;
        self.total_out = 0;
    }

    /// Decoded bytes waiting for destination space.
    pub fn has_pending_output(&self) -> bool {
        self.out_pos < self.window.len()
    }

    /// `true` between frames with nothing buffered: stopping here loses
    /// nothing.
    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Header && self.staging.is_empty() && !self.has_pending_output()
    }

    /// Header of the frame being decoded, once it has been read.
    pub fn frame_info(&self) -> Option<&FrameInfo> {
        match self.stage {
            Stage::Header | Stage::Skip { .. } => None,
            _ => Some(&self.info),
        }
    }

    /// Consumes as much of `src` as possible while producing into `dst`.
    ///
    /// Returns `(consumed, written)`. Stops early only when `dst` is full and
    /// decoded output is still pending. On error the context is reset.
    pub fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(usize, usize), FrameError> {
        let result = self.run(src, dst);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn run(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(usize, usize), FrameError> {
        let mut ip = 0;
        let mut op = 0;

        loop {
            if self.has_pending_output() {
                let n = (self.window.len() - self.out_pos).min(dst.len() - op);
                dst[op..op + n].copy_from_slice(&self.window[self.out_pos..self.out_pos + n]);
                op += n;
                self.out_pos += n;
                if self.has_pending_output() {
                    break;
                }
                self.retire_output();
            }

            match self.stage {
                Stage::Header => {
                    if !gather(&mut self.staging, FH_SIZE_PROBE, src, &mut ip) {
                        break;
                    }
                    if is_skippable_magic(read_u32_le(&self.staging, 0)) {
                        if !gather(&mut self.staging, SKIPPABLE_HEADER_SIZE, src, &mut ip) {
                            break;
                        }
                        let remaining = read_u32_le(&self.staging, 4) as usize;
                        self.staging.clear();
                        self.stage = Stage::Skip { remaining };
                        continue;
                    }
                    let size = header_size(&self.staging)?;
                    if !gather(&mut self.staging, size, src, &mut ip) {
                        break;
                    }
                    let info = read_header(&self.staging)?;
                    self.staging.clear();
                    self.start_frame(info);
                }
                Stage::BlockHeader => {
                    if !gather(&mut self.staging, BH_SIZE, src, &mut ip) {
                        break;
                    }
                    let word = read_u32_le(&self.staging, 0);
                    self.staging.clear();
                    if word == 0 {
                        if self.info.content_checksum {
                            self.stage = Stage::ContentChecksum;
                        } else {
                            self.finish_frame()?;
                        }
                        continue;
                    }
                    let size = (word & !LZ4F_BLOCKUNCOMPRESSED_FLAG) as usize;
                    if size > self.block_max {
                        return Err(FrameError::BlockSizeTooLarge(size));
                    }
                    let raw = word & LZ4F_BLOCKUNCOMPRESSED_FLAG != 0;
                    self.stage = Stage::BlockData { size, raw };
                }
                Stage::BlockData { size, raw } => {
                    let total = size + if self.info.block_checksum { BF_SIZE } else { 0 };
                    let mut staged = Vec::new();
                    let block: &[u8] = if self.staging.is_empty() && src.len() - ip >= total {
                        let direct = &src[ip..ip + total];
                        ip += total;
                        direct
                    } else {
                        if !gather(&mut self.staging, total, src, &mut ip) {
                            break;
                        }
                        staged = std::mem::take(&mut self.staging);
                        &staged
                    };
                    self.decode_block(block, size, raw)?;
                    staged.clear();
                    self.staging = staged;
                }
                Stage::ContentChecksum => {
                    if !gather(&mut self.staging, CONTENT_CHECKSUM_SIZE, src, &mut ip) {
                        break;
                    }
                    let expected = read_u32_le(&self.staging, 0);
                    self.staging.clear();
                    if self.content_hash.digest() != expected {
                        return Err(FrameError::ContentChecksumInvalid);
                    }
                    self.finish_frame()?;
                }
                Stage::Skip { remaining } => {
                    let n = remaining.min(src.len() - ip);
                    ip += n;
                    if n < remaining {
                        self.stage = Stage::Skip { remaining: remaining - n };
                        break;
                    }
                    self.stage = Stage::Header;
                }
            }
        }
        Ok((ip, op))
    }

    fn start_frame(&mut self, info: FrameInfo) {
        self.info = info;
        self.block_max = info.block_size_id.bytes();
        self.content_hash.reset();
        self.total_out = 0;
        self.window.clear();
        self.out_pos = 0;
        self.stage = Stage::BlockHeader;
    }

    fn finish_frame(&mut self) -> Result<(), FrameError> {
        let declared = self.info.content_size;
        if declared != 0 && declared != self.total_out {
            return Err(FrameError::FrameSizeWrong { declared, actual: self.total_out });
        }
        self.window.clear();
        self.out_pos = 0;
        self.stage = Stage::Header;
        Ok(())
    }

    /// Verifies and decodes one block (plus optional checksum) into the
    /// window.
    fn decode_block(&mut self, block: &[u8], size: usize, raw: bool) -> Result<(), FrameError> {
        let (data, checksum) = block.split_at(size);
        if self.info.block_checksum && xxh32_oneshot(data, 0) != read_u32_le(checksum, 0) {
            return Err(FrameError::BlockChecksumInvalid);
        }

        let start = self.window.len();
        if raw {
            self.window.extend_from_slice(data);
        } else {
            self.window.resize(start + self.block_max, 0);
            match decompress_with_prefix(data, &mut self.window, start) {
                Ok(n) => self.window.truncate(start + n),
                Err(_) => {
                    self.window.truncate(start);
                    return Err(FrameError::DecompressionFailed);
                }
            }
        }

        let produced = &self.window[start..];
        if self.info.content_checksum {
            self.content_hash.update(produced);
        }
        self.total_out += produced.len() as u64;
        self.out_pos = start;
        self.stage = Stage::BlockHeader;
        Ok(())
    }

    /// Called once every decoded byte has been delivered.
    fn retire_output(&mut self) {
        match self.info.block_mode {
            BlockMode::Independent => self.window.clear(),
            BlockMode::Linked => {
                if self.window.len() > LINKED_HISTORY {
                    let excess = self.window.len() - LINKED_HISTORY;
                    self.window.drain(..excess);
                }
            }
        }
        self.out_pos = self.window.len();
    }
}

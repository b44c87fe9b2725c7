//! lz4-java block streams (`LZ4BlockOutputStream` / `LZ4BlockInputStream`).
//!
//! The stream is a sequence of independent blocks, each behind a 21-byte
//! header:
//!
//! ```text
//! "LZ4Block" | token | compressed len (LE32) | original len (LE32) | check (LE32)
//! ```
//!
//! The token's high nibble is the method (`0x10` raw, `0x20` LZ4); its low
//! nibble is `ceil(log2(block_size)) - 10`. `check` is XXH32 of the original
//! bytes with seed `0x9747B28C`, truncated to 28 bits the way lz4-java's
//! `Checksum` view reports it. A block with both lengths zero ends the
//! stream.

use std::io::{self, Read, Write};

use tracing::trace;

use crate::block::{compress_bound, compress_fast, decompress_known_size};
use crate::error::BridgeError;
use crate::xxhash::{StreamingHash, StreamingXxh32};

pub const MAGIC: &[u8; 8] = b"LZ4Block";
pub const HEADER_LENGTH: usize = MAGIC.len() + 1 + 4 + 4 + 4;

const COMPRESSION_LEVEL_BASE: u32 = 10;
pub const MIN_BLOCK_SIZE: usize = 64;
pub const MAX_BLOCK_SIZE: usize = 1 << (COMPRESSION_LEVEL_BASE + 0x0F);
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

pub const METHOD_RAW: u8 = 0x10;
pub const METHOD_LZ4: u8 = 0x20;

pub const DEFAULT_SEED: u32 = 0x9747_B28C;
const CHECKSUM_MASK: u32 = 0x0FFF_FFFF;

/// Checksum stored in a block header for `data`.
fn block_checksum(hash: &mut StreamingXxh32, data: &[u8]) -> u32 {
    hash.reset();
    hash.update(data);
    hash.digest() & CHECKSUM_MASK
}

/// Low nibble of the token for `block_size`.
fn level_bits(block_size: usize) -> io::Result<u8> {
    if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
        return Err(BridgeError::InvalidArgument(format!(
            "block size {block_size} outside {MIN_BLOCK_SIZE}..={MAX_BLOCK_SIZE}"
        ))
        .into());
    }
    let ceil_log2 = usize::BITS - (block_size - 1).leading_zeros();
    Ok(ceil_log2.saturating_sub(COMPRESSION_LEVEL_BASE) as u8)
}

fn corrupted(what: &str) -> io::Error {
    BridgeError::MalformedInput(format!("corrupt LZ4Block stream: {what}")).into()
}

fn put_header(dst: &mut [u8], token: u8, compressed: usize, original: usize, check: u32) {
    dst[..MAGIC.len()].copy_from_slice(MAGIC);
    dst[8] = token;
    dst[9..13].copy_from_slice(&(compressed as u32).to_le_bytes());
    dst[13..17].copy_from_slice(&(original as u32).to_le_bytes());
    dst[17..21].copy_from_slice(&check.to_le_bytes());
}

fn le32(src: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]])
}

// ─────────────────────────────────────────────────────────────────────────────
// BlockWriter
// ─────────────────────────────────────────────────────────────────────────────

/// Compressing writer producing an `LZ4Block` stream.
///
/// Input is buffered until a block is full. [`finish`](BlockWriter::finish)
/// writes the last block and the end marker; dropping the writer without it
/// leaves a stream that readers reject as truncated.
pub struct BlockWriter<W: Write> {
    inner: W,
    block_size: usize,
    level_bits: u8,
    acceleration: i32,
    sync_flush: bool,
    pending: Vec<u8>,
    packed: Vec<u8>,
    checksum: StreamingXxh32,
}

impl<W: Write> BlockWriter<W> {
    /// 64 KiB blocks, fast encoder.
    pub fn new(inner: W) -> io::Result<Self> {
        Self::with_block_size(inner, DEFAULT_BLOCK_SIZE)
    }

    /// `block_size` must lie in `64..=32 MiB`.
    pub fn with_block_size(inner: W, block_size: usize) -> io::Result<Self> {
        let level_bits = level_bits(block_size)?;
        let bound = compress_bound(block_size)
            .ok_or_else(|| io::Error::from(BridgeError::InvalidArgument("block size too large".into())))?;
        Ok(BlockWriter {
            inner,
            block_size,
            level_bits,
            acceleration: 1,
            sync_flush: false,
            pending: Vec::with_capacity(block_size),
            packed: vec![0u8; HEADER_LENGTH + bound],
            checksum: StreamingXxh32::with_seed(DEFAULT_SEED),
        })
    }

    /// Acceleration of the fast encoder (clamped like `block_compress_fast`).
    pub fn acceleration(mut self, acceleration: i32) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// When set, [`flush`](Write::flush) also emits the partial block.
    pub fn sync_flush(mut self, on: bool) -> Self {
        self.sync_flush = on;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    fn emit_block(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let original = self.pending.len();
        let check = block_checksum(&mut self.checksum, &self.pending);
        let n = compress_fast(&self.pending, &mut self.packed[HEADER_LENGTH..], self.acceleration)
            .map_err(BridgeError::from)?;
        let (method, stored) = if n >= original {
            self.packed[HEADER_LENGTH..HEADER_LENGTH + original].copy_from_slice(&self.pending);
            (METHOD_RAW, original)
        } else {
            (METHOD_LZ4, n)
        };
        put_header(&mut self.packed, method | self.level_bits, stored, original, check);
        self.inner.write_all(&self.packed[..HEADER_LENGTH + stored])?;
        trace!(original, stored, raw = method == METHOD_RAW, "LZ4Block written");
        self.pending.clear();
        Ok(())
    }

    /// Writes the pending block and the end marker, then returns the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.emit_block()?;
        let mut end = [0u8; HEADER_LENGTH];
        put_header(&mut end, METHOD_RAW | self.level_bits, 0, 0, 0);
        self.inner.write_all(&end)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for BlockWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.block_size - self.pending.len();
        let take = room.min(buf.len());
        self.pending.extend_from_slice(&buf[..take]);
        if self.pending.len() == self.block_size {
            self.emit_block()?;
        }
        Ok(take)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.sync_flush {
            self.emit_block()?;
        }
        self.inner.flush()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BlockReader
// ─────────────────────────────────────────────────────────────────────────────

/// Decompressing reader for `LZ4Block` streams.
///
/// By default the end marker ends the stream and input that stops before it
/// is an [`io::ErrorKind::UnexpectedEof`] error. With
/// [`stop_on_empty_block(false)`](BlockReader::stop_on_empty_block),
/// concatenated streams are read through and a clean end of input between
/// blocks ends the stream.
pub struct BlockReader<R: Read> {
    inner: R,
    stop_on_empty_block: bool,
    block: Vec<u8>,
    pos: usize,
    packed: Vec<u8>,
    checksum: StreamingXxh32,
    finished: bool,
}

impl<R: Read> BlockReader<R> {
    pub fn new(inner: R) -> Self {
        BlockReader {
            inner,
            stop_on_empty_block: true,
            block: Vec::new(),
            pos: 0,
            packed: Vec::new(),
            checksum: StreamingXxh32::with_seed(DEFAULT_SEED),
            finished: false,
        }
    }

    pub fn stop_on_empty_block(mut self, on: bool) -> Self {
        self.stop_on_empty_block = on;
        self
    }

    /// Reads a header; `false` on end of input before its first byte.
    fn read_header(&mut self, header: &mut [u8; HEADER_LENGTH]) -> io::Result<bool> {
        let mut got = 0;
        while got < HEADER_LENGTH {
            match self.inner.read(&mut header[got..]) {
                Ok(0) if got == 0 => return Ok(false),
                Ok(0) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "LZ4Block header cut short")),
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// Loads the next non-empty block, or marks the stream finished.
    fn refill(&mut self) -> io::Result<()> {
        loop {
            let mut header = [0u8; HEADER_LENGTH];
            if !self.read_header(&mut header)? {
                if self.stop_on_empty_block {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "LZ4Block stream ended prematurely"));
                }
                self.finished = true;
                return Ok(());
            }
            if &header[..MAGIC.len()] != MAGIC {
                return Err(corrupted("bad magic"));
            }
            let token = header[8];
            let method = token & 0xF0;
            let max_original = 1usize << (COMPRESSION_LEVEL_BASE + u32::from(token & 0x0F));
            if method != METHOD_RAW && method != METHOD_LZ4 {
                return Err(corrupted("unknown compression method"));
            }
            let compressed = le32(&header, 9) as usize;
            let original = le32(&header, 13) as usize;
            let check = le32(&header, 17);
            if original > max_original
                || original > i32::MAX as usize
                || compressed > i32::MAX as usize
                || (original == 0) != (compressed == 0)
                || (method == METHOD_RAW && original != compressed)
                || compressed > compress_bound(original).unwrap_or(0)
            {
                return Err(corrupted("inconsistent block lengths"));
            }

            if original == 0 {
                if check != 0 {
                    return Err(corrupted("non-zero checksum on end marker"));
                }
                if self.stop_on_empty_block {
                    self.finished = true;
                    return Ok(());
                }
                continue;
            }

            self.block.resize(original, 0);
            if method == METHOD_RAW {
                self.inner.read_exact(&mut self.block)?;
            } else {
                self.packed.resize(compressed, 0);
                self.inner.read_exact(&mut self.packed)?;
                let used = decompress_known_size(&self.packed, &mut self.block)
                    .map_err(|e| corrupted(&e.to_string()))?;
                if used != compressed {
                    return Err(corrupted("compressed length mismatch"));
                }
            }
            if block_checksum(&mut self.checksum, &self.block) != check {
                return Err(corrupted("checksum mismatch"));
            }
            trace!(original, compressed, "LZ4Block read");
            self.pos = 0;
            return Ok(());
        }
    }
}

impl<R: Read> Read for BlockReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() || self.finished {
            return Ok(0);
        }
        if self.pos == self.block.len() {
            self.refill()?;
            if self.finished {
                return Ok(0);
            }
        }
        let n = out.len().min(self.block.len() - self.pos);
        out[..n].copy_from_slice(&self.block[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

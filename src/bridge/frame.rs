//! Frame streaming engine: compression and decompression contexts behind
//! handles.
//!
//! Compression: `create → begin → update* / flush* → end → free`; a new
//! `begin` may follow `end`. Decompression: `create → decompress* → free`,
//! where each `decompress` call either consumes all of its source
//! ([`Progress::Written`]) or stops because the destination is full
//! ([`Progress::NeedMoreOutput`]).

use tracing::{debug, trace};

use super::{traced, Progress};
use crate::buffer::{with_destination, with_source_and_destination, LogicalBuffer};
use crate::error::{BridgeError, Result};
use crate::frame::{self, FrameCompressor, FrameDecompressor, Preferences};
use crate::handle::{Handle, Registry, Resource};

static COMPRESSION_CONTEXTS: Registry<FrameCompressor> = Registry::new();
static DECOMPRESSION_CONTEXTS: Registry<FrameDecompressor> = Registry::new();

impl Resource for FrameCompressor {
    const KIND: u8 = 0x03;
    const NAME: &'static str = "frame compression context";

    fn registry() -> &'static Registry<Self> {
        &COMPRESSION_CONTEXTS
    }
}

impl Resource for FrameDecompressor {
    const KIND: u8 = 0x04;
    const NAME: &'static str = "frame decompression context";

    fn registry() -> &'static Registry<Self> {
        &DECOMPRESSION_CONTEXTS
    }
}

pub type CompressionHandle = Handle<FrameCompressor>;
pub type DecompressionHandle = Handle<FrameDecompressor>;

// ─────────────────────────────────────────────────────────────────────────────
// Compression
// ─────────────────────────────────────────────────────────────────────────────

pub fn frame_create_compression_context() -> Result<CompressionHandle> {
    let handle = traced("frame_create_compression_context", COMPRESSION_CONTEXTS.insert(FrameCompressor::new()))?;
    debug!(?handle, "compression context created");
    Ok(handle)
}

/// Starts a frame with default settings at compression `level`.
pub fn frame_compress_begin(
    handle: CompressionHandle,
    level: i32,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    frame_compress_begin_with(handle, &Preferences::with_level(level), dst, dst_off, dst_cap)
}

/// Starts a frame with explicit preferences and writes its header.
pub fn frame_compress_begin_with(
    handle: CompressionHandle,
    prefs: &Preferences,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = COMPRESSION_CONTEXTS.checkout(handle).and_then(|mut cctx| {
        with_destination(dst, dst_off, dst_cap, |d| Ok(cctx.begin(d, prefs)?))
    });
    if result.is_ok() {
        debug!(?handle, level = prefs.compression_level, "frame begun");
    }
    traced("frame_compress_begin", result)
}

/// Feeds `src[src_off..src_off + src_len]`; returns bytes written, which is
/// legitimately 0 while input is only being buffered.
pub fn frame_compress_update(
    handle: CompressionHandle,
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = COMPRESSION_CONTEXTS.checkout(handle).and_then(|mut cctx| {
        with_source_and_destination(src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
            Ok(cctx.update(s, d)?)
        })
    });
    if let Ok(written) = &result {
        trace!(?handle, src_len, written, "frame update");
    }
    traced("frame_compress_update", result)
}

pub fn frame_compress_flush(
    handle: CompressionHandle,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = COMPRESSION_CONTEXTS
        .checkout(handle)
        .and_then(|mut cctx| with_destination(dst, dst_off, dst_cap, |d| Ok(cctx.flush(d)?)));
    traced("frame_compress_flush", result)
}

pub fn frame_compress_end(
    handle: CompressionHandle,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<usize> {
    let result = COMPRESSION_CONTEXTS
        .checkout(handle)
        .and_then(|mut cctx| with_destination(dst, dst_off, dst_cap, |d| Ok(cctx.end(d)?)));
    if result.is_ok() {
        debug!(?handle, "frame ended");
    }
    traced("frame_compress_end", result)
}

/// Worst-case size of a whole frame for `src_size` bytes. Without
/// preferences, assumes 64 KiB blocks with every checksum enabled.
pub fn frame_compress_bound(src_size: usize, prefs: Option<&Preferences>) -> usize {
    frame::compress_frame_bound(src_size, prefs)
}

/// Releases the context. Freeing mid-frame is allowed; the frame on the
/// wire is then simply incomplete.
pub fn frame_free_compression_context(handle: CompressionHandle) -> Result<()> {
    let cctx = traced("frame_free_compression_context", COMPRESSION_CONTEXTS.remove(handle))?;
    debug!(?handle, open = cctx.is_open(), "compression context released");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Decompression
// ─────────────────────────────────────────────────────────────────────────────

pub fn frame_create_decompression_context() -> Result<DecompressionHandle> {
    let handle = traced(
        "frame_create_decompression_context",
        DECOMPRESSION_CONTEXTS.insert(FrameDecompressor::new()),
    )?;
    debug!(?handle, "decompression context created");
    Ok(handle)
}

/// Decodes from `src[src_off..src_off + src_len]` into
/// `dst[dst_off..dst_off + dst_cap]`.
///
/// Keeps feeding the decoder while destination space remains. Returns
/// [`Progress::Written`] once the whole source is consumed and nothing
/// decoded is left undelivered, or [`Progress::NeedMoreOutput`] when the
/// destination fills first.
pub fn frame_decompress(
    handle: DecompressionHandle,
    src: &LogicalBuffer<'_>,
    src_off: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_off: usize,
    dst_cap: usize,
) -> Result<Progress> {
    let result = DECOMPRESSION_CONTEXTS.checkout(handle).and_then(|mut dctx| {
        with_source_and_destination(src, src_off, src_len, dst, dst_off, dst_cap, |s, d| {
            drive_decoder(&mut dctx, s, d)
        })
    });
    if let Ok(progress) = &result {
        trace!(?handle, src_len, ?progress, "frame decompress");
    }
    traced("frame_decompress", result)
}

fn drive_decoder(dctx: &mut FrameDecompressor, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
    let mut consumed = 0;
    let mut written = 0;
    loop {
        let (c, w) = dctx.decompress(&src[consumed..], &mut dst[written..])?;
        consumed += c;
        written += w;
        if consumed == src.len() && !dctx.has_pending_output() {
            return Ok(Progress::Written(written));
        }
        if written == dst.len() {
            return Ok(Progress::NeedMoreOutput { consumed, written });
        }
        if c == 0 && w == 0 {
            return Err(BridgeError::invalid_state("frame decoder made no progress"));
        }
    }
}

/// `true` when the context sits between frames with nothing buffered.
pub fn frame_decompress_is_idle(handle: DecompressionHandle) -> Result<bool> {
    traced(
        "frame_decompress_is_idle",
        DECOMPRESSION_CONTEXTS.checkout(handle).map(|dctx| dctx.is_idle()),
    )
}

pub fn frame_free_decompression_context(handle: DecompressionHandle) -> Result<()> {
    traced("frame_free_decompression_context", DECOMPRESSION_CONTEXTS.remove(handle))?;
    debug!(?handle, "decompression context released");
    Ok(())
}

//! C-ABI exports of the boundary: `lz4b_*` symbols.
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! Buffers are described by [`Lz4bBuffer`]: either a host array reached
//! through pin/unpin callbacks (owned region), or a raw address plus
//! capacity (foreign-mapped region). Handles are positive `int64_t` values;
//! 0 means creation failed. Every call that can fail in more than one way
//! takes a nullable `Lz4bErrorResult*`, written only on failure.
//!
//! Return conventions:
//! - block compression: bytes written, 0 on failure
//! - block decompression: bytes, negative on failure
//! - frame compression calls: bytes written (possibly 0), -1 on failure
//! - frame decompression: `n >= 0` bytes written with all source consumed;
//!   `-(consumed) - 1` when the destination filled first; `INT_MIN` on failure
//! - hash updates / frees: 0, or -1 on failure

use libc::{c_char, c_int, c_void, size_t};
use std::ptr::NonNull;

use crate::bridge::{self, Progress};
use crate::buffer::{LogicalBuffer, MappedRegion, PinnableArray};
use crate::config::ERROR_MESSAGE_CAPACITY;
use crate::error::{BridgeError, Result};
use crate::frame::{BlockMode, BlockSizeId, FrameInfo, Preferences};
use crate::handle::Handle;

// ─── types ───────────────────────────────────────────────────────────────────

/// Error carrier filled on failure: a category code and a NUL-terminated
/// message.
#[repr(C)]
pub struct Lz4bErrorResult {
    pub code: c_int,
    pub message: [c_char; ERROR_MESSAGE_CAPACITY],
}

/// Host-managed array that must be pinned for raw access.
#[repr(C)]
pub struct Lz4bHostArray {
    pub ctx: *mut c_void,
    /// Returns the array base and stores its length in `*len`; null if the
    /// array cannot be pinned.
    pub pin: Option<unsafe extern "C" fn(ctx: *mut c_void, len: *mut size_t) -> *mut u8>,
    pub unpin: Option<unsafe extern "C" fn(ctx: *mut c_void, base: *mut u8)>,
}

// SAFETY: the host promises the pin/unpin contract of `PinnableArray` when
// it registers the callbacks.
unsafe impl PinnableArray for Lz4bHostArray {
    fn pin(&self) -> Option<(NonNull<u8>, usize)> {
        let pin = self.pin?;
        let mut len: size_t = 0;
        // SAFETY: host callback, called with the host's own context.
        let base = unsafe { pin(self.ctx, &mut len) };
        NonNull::new(base).map(|b| (b, len))
    }

    fn unpin(&self, base: NonNull<u8>) {
        if let Some(unpin) = self.unpin {
            // SAFETY: `base` came from the matching `pin`.
            unsafe { unpin(self.ctx, base.as_ptr()) }
        }
    }
}

/// Buffer descriptor: `array` non-null selects the owned region, otherwise
/// `address`/`capacity` describe a foreign-mapped region.
#[repr(C)]
pub struct Lz4bBuffer {
    pub array: *const Lz4bHostArray,
    pub address: *mut u8,
    pub capacity: size_t,
    pub read_only: u8,
}

// ─── helpers ─────────────────────────────────────────────────────────────────

unsafe fn report(err: *mut Lz4bErrorResult, e: &BridgeError) {
    let Some(err) = err.as_mut() else { return };
    err.code = e.kind() as c_int;
    let text = e.to_string();
    let n = text.len().min(ERROR_MESSAGE_CAPACITY - 1);
    for (slot, &b) in err.message.iter_mut().zip(&text.as_bytes()[..n]) {
        *slot = b as c_char;
    }
    err.message[n] = 0;
}

unsafe fn capture<T>(err: *mut Lz4bErrorResult, result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            report(err, &e);
            None
        }
    }
}

unsafe fn logical<'a>(buf: *const Lz4bBuffer) -> Result<LogicalBuffer<'a>> {
    let buf = buf
        .as_ref()
        .ok_or_else(|| BridgeError::InvalidArgument("null buffer descriptor".into()))?;
    match buf.array.as_ref() {
        Some(array) => Ok(LogicalBuffer::Owned(array)),
        None => Ok(LogicalBuffer::Mapped(MappedRegion::from_raw_parts(
            buf.address,
            buf.capacity,
            buf.read_only == 0,
        )?)),
    }
}

fn length(v: c_int, what: &str) -> Result<usize> {
    usize::try_from(v).map_err(|_| BridgeError::InvalidArgument(format!("negative {what}: {v}")))
}

fn count(n: usize) -> Result<c_int> {
    c_int::try_from(n).map_err(|_| BridgeError::InvalidArgument(format!("result {n} exceeds int range")))
}

// ─── block ───────────────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn lz4b_compress_bound(src_len: c_int) -> c_int {
    bridge::compress_bound(src_len)
}

type BlockOp = fn(&LogicalBuffer<'_>, usize, usize, &LogicalBuffer<'_>, usize, usize) -> Result<usize>;

unsafe fn block_call(
    op: BlockOp,
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
) -> Result<c_int> {
    let (s, d) = (logical(src)?, logical(dst)?);
    let n = op(
        &s,
        length(src_off, "source offset")?,
        length(src_len, "source length")?,
        &d,
        length(dst_off, "destination offset")?,
        length(dst_cap, "destination capacity")?,
    )?;
    count(n)
}

/// Returns compressed size, or 0 on failure.
#[no_mangle]
pub unsafe extern "C" fn lz4b_block_compress(
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
) -> c_int {
    block_call(bridge::block_compress, src, src_off, src_len, dst, dst_off, dst_cap).unwrap_or(0)
}

/// Returns compressed size, or 0 on failure.
#[no_mangle]
pub unsafe extern "C" fn lz4b_block_compress_fast(
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    acceleration: c_int,
) -> c_int {
    let run = || -> Result<c_int> {
        let (s, d) = (logical(src)?, logical(dst)?);
        count(bridge::block_compress_fast(
            &s,
            length(src_off, "source offset")?,
            length(src_len, "source length")?,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
            acceleration,
        )?)
    };
    run().unwrap_or(0)
}

/// Returns compressed size, or 0 on failure.
#[no_mangle]
pub unsafe extern "C" fn lz4b_block_compress_hc(
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    level: c_int,
) -> c_int {
    let run = || -> Result<c_int> {
        let (s, d) = (logical(src)?, logical(dst)?);
        count(bridge::block_compress_hc(
            &s,
            length(src_off, "source offset")?,
            length(src_len, "source length")?,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
            level,
        )?)
    };
    run().unwrap_or(0)
}

/// Returns the number of source bytes read, or a negative value on failure.
#[no_mangle]
pub unsafe extern "C" fn lz4b_block_decompress_known_size(
    src: *const Lz4bBuffer,
    src_off: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_len: c_int,
) -> c_int {
    let run = || -> Result<c_int> {
        let (s, d) = (logical(src)?, logical(dst)?);
        count(bridge::block_decompress_known_size(
            &s,
            length(src_off, "source offset")?,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_len, "destination length")?,
        )?)
    };
    run().unwrap_or(-1)
}

/// Returns the decoded size, or a negative value on failure.
#[no_mangle]
pub unsafe extern "C" fn lz4b_block_decompress_safe(
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
) -> c_int {
    block_call(bridge::block_decompress_safe, src, src_off, src_len, dst, dst_off, dst_cap).unwrap_or(-1)
}

// ─── frame compression ───────────────────────────────────────────────────────

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_create_compression_context(err: *mut Lz4bErrorResult) -> i64 {
    capture(err, bridge::frame_create_compression_context()).map_or(0, Handle::into_raw)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_compress_begin(
    handle: i64,
    level: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<c_int> {
        let d = logical(dst)?;
        count(bridge::frame_compress_begin(
            Handle::from_raw(handle)?,
            level,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
        )?)
    };
    capture(err, run()).unwrap_or(-1)
}

/// Like `lz4b_frame_compress_begin`, with block size id (4..=7), block
/// independence and checksum switches.
#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_compress_begin_ex(
    handle: i64,
    level: c_int,
    block_size_id: c_int,
    independent_blocks: c_int,
    content_checksum: c_int,
    block_checksum: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<c_int> {
        let block_size_id = u8::try_from(block_size_id)
            .ok()
            .and_then(BlockSizeId::from_code)
            .ok_or_else(|| BridgeError::InvalidArgument(format!("block size id {block_size_id}")))?;
        let prefs = Preferences {
            frame_info: FrameInfo {
                block_size_id,
                block_mode: if independent_blocks != 0 {
                    BlockMode::Independent
                } else {
                    BlockMode::Linked
                },
                content_checksum: content_checksum != 0,
                block_checksum: block_checksum != 0,
                ..FrameInfo::default()
            },
            compression_level: level,
            auto_flush: false,
        };
        let d = logical(dst)?;
        count(bridge::frame_compress_begin_with(
            Handle::from_raw(handle)?,
            &prefs,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
        )?)
    };
    capture(err, run()).unwrap_or(-1)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_compress_update(
    handle: i64,
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<c_int> {
        let (s, d) = (logical(src)?, logical(dst)?);
        count(bridge::frame_compress_update(
            Handle::from_raw(handle)?,
            &s,
            length(src_off, "source offset")?,
            length(src_len, "source length")?,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
        )?)
    };
    capture(err, run()).unwrap_or(-1)
}

type FrameDstOp = fn(bridge::CompressionHandle, &LogicalBuffer<'_>, usize, usize) -> Result<usize>;

unsafe fn frame_dst_call(
    op: FrameDstOp,
    handle: i64,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<c_int> {
        let d = logical(dst)?;
        count(op(
            Handle::from_raw(handle)?,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
        )?)
    };
    capture(err, run()).unwrap_or(-1)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_compress_flush(
    handle: i64,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    frame_dst_call(bridge::frame_compress_flush, handle, dst, dst_off, dst_cap, err)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_compress_end(
    handle: i64,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    frame_dst_call(bridge::frame_compress_end, handle, dst, dst_off, dst_cap, err)
}

/// Worst-case frame size for `src_size` bytes under any settings accepted
/// by `lz4b_frame_compress_begin`; 0 if it does not fit in an int.
#[no_mangle]
pub extern "C" fn lz4b_frame_compress_bound(src_size: c_int) -> c_int {
    usize::try_from(src_size)
        .ok()
        .map(|n| bridge::frame_compress_bound(n, None))
        .and_then(|n| c_int::try_from(n).ok())
        .unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_free_compression_context(handle: i64, err: *mut Lz4bErrorResult) {
    let run = || bridge::frame_free_compression_context(Handle::from_raw(handle)?);
    capture(err, run());
}

// ─── frame decompression ─────────────────────────────────────────────────────

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_create_decompression_context(err: *mut Lz4bErrorResult) -> i64 {
    capture(err, bridge::frame_create_decompression_context()).map_or(0, Handle::into_raw)
}

/// Returns the bytes written once the source is drained, `-(consumed) - 1`
/// when the destination fills first, or `INT_MIN` on error. A source length
/// of `INT_MAX` is rejected since its backpressure code would equal `INT_MIN`.
#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_decompress(
    handle: i64,
    src: *const Lz4bBuffer,
    src_off: c_int,
    src_len: c_int,
    dst: *const Lz4bBuffer,
    dst_off: c_int,
    dst_cap: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<c_int> {
        if src_len == c_int::MAX {
            return Err(BridgeError::invalid_argument("source length must be below INT_MAX"));
        }
        let (s, d) = (logical(src)?, logical(dst)?);
        let progress = bridge::frame_decompress(
            Handle::from_raw(handle)?,
            &s,
            length(src_off, "source offset")?,
            length(src_len, "source length")?,
            &d,
            length(dst_off, "destination offset")?,
            length(dst_cap, "destination capacity")?,
        )?;
        match progress {
            Progress::Written(n) => count(n),
            Progress::NeedMoreOutput { consumed, .. } => Ok(-count(consumed)? - 1),
        }
    };
    capture(err, run()).unwrap_or(c_int::MIN)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_frame_free_decompression_context(handle: i64, err: *mut Lz4bErrorResult) {
    let run = || bridge::frame_free_decompression_context(Handle::from_raw(handle)?);
    capture(err, run());
}

// ─── hashing ─────────────────────────────────────────────────────────────────

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash32_init(seed: u32, err: *mut Lz4bErrorResult) -> i64 {
    capture(err, bridge::hash32_init(seed)).map_or(0, Handle::into_raw)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash32_update(
    handle: i64,
    buf: *const Lz4bBuffer,
    off: c_int,
    len: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<()> {
        let b = logical(buf)?;
        bridge::hash32_update(Handle::from_raw(handle)?, &b, length(off, "offset")?, length(len, "length")?)
    };
    capture(err, run()).map_or(-1, |()| 0)
}

/// Digest so far; 0 with `err` set on failure.
#[no_mangle]
pub unsafe extern "C" fn lz4b_hash32_digest(handle: i64, err: *mut Lz4bErrorResult) -> u32 {
    let run = || bridge::hash32_digest(Handle::from_raw(handle)?);
    capture(err, run()).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash32_reset(handle: i64, err: *mut Lz4bErrorResult) -> c_int {
    let run = || bridge::hash32_reset(Handle::from_raw(handle)?);
    capture(err, run()).map_or(-1, |()| 0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash32_free(handle: i64, err: *mut Lz4bErrorResult) -> c_int {
    let run = || bridge::hash32_free(Handle::from_raw(handle)?);
    capture(err, run()).map_or(-1, |()| 0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash32(
    buf: *const Lz4bBuffer,
    off: c_int,
    len: c_int,
    seed: u32,
    err: *mut Lz4bErrorResult,
) -> u32 {
    let run = || -> Result<u32> {
        let b = logical(buf)?;
        bridge::hash32(&b, length(off, "offset")?, length(len, "length")?, seed)
    };
    capture(err, run()).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash64_init(seed: u64, err: *mut Lz4bErrorResult) -> i64 {
    capture(err, bridge::hash64_init(seed)).map_or(0, Handle::into_raw)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash64_update(
    handle: i64,
    buf: *const Lz4bBuffer,
    off: c_int,
    len: c_int,
    err: *mut Lz4bErrorResult,
) -> c_int {
    let run = || -> Result<()> {
        let b = logical(buf)?;
        bridge::hash64_update(Handle::from_raw(handle)?, &b, length(off, "offset")?, length(len, "length")?)
    };
    capture(err, run()).map_or(-1, |()| 0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash64_digest(handle: i64, err: *mut Lz4bErrorResult) -> u64 {
    let run = || bridge::hash64_digest(Handle::from_raw(handle)?);
    capture(err, run()).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash64_reset(handle: i64, err: *mut Lz4bErrorResult) -> c_int {
    let run = || bridge::hash64_reset(Handle::from_raw(handle)?);
    capture(err, run()).map_or(-1, |()| 0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash64_free(handle: i64, err: *mut Lz4bErrorResult) -> c_int {
    let run = || bridge::hash64_free(Handle::from_raw(handle)?);
    capture(err, run()).map_or(-1, |()| 0)
}

#[no_mangle]
pub unsafe extern "C" fn lz4b_hash64(
    buf: *const Lz4bBuffer,
    off: c_int,
    len: c_int,
    seed: u64,
    err: *mut Lz4bErrorResult,
) -> u64 {
    let run = || -> Result<u64> {
        let b = logical(buf)?;
        bridge::hash64(&b, length(off, "offset")?, length(len, "length")?, seed)
    };
    capture(err, run()).unwrap_or(0)
}

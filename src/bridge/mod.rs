//! The boundary: every operation a managed-runtime caller can invoke.
//!
//! Operations take [`LogicalBuffer`](crate::buffer::LogicalBuffer)s plus
//! offsets and lengths, resolve them through the buffer adapter, and name
//! stateful objects by [`Handle`](crate::handle::Handle)s. All failures come
//! back as [`BridgeError`](crate::error::BridgeError); backpressure from
//! frame decompression is a [`Progress`] value, not an error.

pub mod block;
pub mod frame;
pub mod hash;

use tracing::warn;

use crate::error::Result;

pub use block::{
    block_compress, block_compress_fast, block_compress_hc, block_compress_with_length,
    block_decompress_known_size, block_decompress_safe, block_decompress_with_length,
    compress_bound,
};
pub use frame::{
    frame_compress_begin, frame_compress_begin_with, frame_compress_bound, frame_compress_end,
    frame_compress_flush, frame_compress_update, frame_create_compression_context,
    frame_create_decompression_context, frame_decompress, frame_decompress_is_idle,
    frame_free_compression_context, frame_free_decompression_context, CompressionHandle,
    DecompressionHandle,
};
pub use hash::{
    hash32, hash32_digest, hash32_free, hash32_init, hash32_reset, hash32_update, hash64,
    hash64_digest, hash64_free, hash64_init, hash64_reset, hash64_update, Hash32Handle,
    Hash64Handle,
};

/// Outcome of one `frame_decompress` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// All source bytes were consumed and every decoded byte delivered.
    Written(usize),
    /// The destination filled up first. Call again with the source from
    /// `consumed` onwards and a fresh destination; `written` bytes (the whole
    /// destination) are valid.
    NeedMoreOutput { consumed: usize, written: usize },
}

impl Progress {
    /// Bytes delivered into the destination by this call.
    pub fn written(&self) -> usize {
        match *self {
            Progress::Written(n) => n,
            Progress::NeedMoreOutput { written, .. } => written,
        }
    }
}

/// Logs a failed boundary call before handing the result back.
fn traced<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!(op, kind = %e.kind(), "{e}");
    }
    result
}

// lz4bridge: LZ4 / LZ4-HC / LZ4F codecs and XXH32 / XXH64 hashing behind a
// narrow, buffer-oriented, handle-based boundary.

pub mod block;
pub mod bridge;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod handle;
pub mod hc;
pub mod stream;
pub mod xxhash;

#[cfg(feature = "c-abi")]
pub mod abi;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use bridge::Progress;
pub use buffer::{ByteArray, LogicalBuffer, MappedRegion, PinnableArray};
pub use error::{BridgeError, ErrorKind, ErrorResult};
pub use frame::{BlockMode, BlockSizeId, FrameInfo, Preferences};
pub use handle::Handle;
pub use stream::{BlockReader, BlockWriter, FrameReader, FrameWriter};

/// Crate version string.
pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

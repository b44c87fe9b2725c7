//! LZ4 block compression and decompression.
//!
//! Safe, slice-based encoder and decoder for the LZ4 block format. The HC
//! encoder in [`crate::hc`] shares [`types::SequenceWriter`] and the match
//! counting helpers defined here.

pub mod compress;
pub mod decompress;
pub mod types;

pub use compress::{compress_default, compress_fast, compress_to_vec, compress_with_prefix};
pub use decompress::{decompress_known_size, decompress_safe, decompress_with_prefix};
pub use types::{compress_bound, BlockError, LZ4_ACCELERATION_MAX, LZ4_DISTANCE_MAX, LZ4_MAX_INPUT_SIZE};

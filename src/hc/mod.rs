//! LZ4-HC: slower, higher-ratio encoder producing standard LZ4 blocks.

pub mod compress_hc;
pub mod search;
pub mod types;

pub use compress_hc::{compress_hc, compress_hc_with_prefix};
pub use types::{normalize_level, LZ4HC_CLEVEL_DEFAULT, LZ4HC_CLEVEL_MAX, LZ4HC_CLEVEL_MIN};

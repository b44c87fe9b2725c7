//! `std::io` adapters over the two stream formats.
//!
//! | Submodule | Format |
//! |-----------|--------|
//! | [`frame`] | LZ4 frames, driven through frame-context handles |
//! | [`block`] | lz4-java `LZ4Block` streams: independent blocks with an XXH32 check each |

pub mod block;
pub mod frame;

pub use block::{BlockReader, BlockWriter};
pub use frame::{FrameReader, FrameWriter};

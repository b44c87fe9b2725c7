//! LZ4 frame format constants, parameter types, and the frame error enum.

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Frame format constants (doc/lz4_Frame_format.md)
// ─────────────────────────────────────────────────────────────────────────────

/// Magic number opening every LZ4 frame.
pub const LZ4F_MAGICNUMBER: u32 = 0x184D_2204;

/// Skippable frames use `0x184D2A50..=0x184D2A5F`.
pub const LZ4F_MAGIC_SKIPPABLE_START: u32 = 0x184D_2A50;
pub const LZ4F_MAGIC_SKIPPABLE_MASK: u32 = 0xFFFF_FFF0;

/// High bit of a block header: block data is stored uncompressed.
pub const LZ4F_BLOCKUNCOMPRESSED_FLAG: u32 = 0x8000_0000;

/// Block header size (data length + uncompressed flag).
pub const BH_SIZE: usize = 4;
/// Block checksum size, present when block checksums are enabled.
pub const BF_SIZE: usize = 4;
/// Content checksum size, appended after the end mark when enabled.
pub const CONTENT_CHECKSUM_SIZE: usize = 4;

/// Smallest header: magic + FLG + BD + HC.
pub const MIN_FH_SIZE: usize = 7;
/// Largest header: adds an 8-byte content size and a 4-byte dictionary id.
pub const MAX_FH_SIZE: usize = 19;
/// Bytes needed before the full header size is known (magic + FLG).
pub const FH_SIZE_PROBE: usize = 5;

/// Back-reference window kept between linked blocks.
pub const LINKED_HISTORY: usize = 64 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Frame parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum uncompressed size of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BlockSizeId {
    #[default]
    Max64Kb = 4,
    Max256Kb = 5,
    Max1Mb = 6,
    Max4Mb = 7,
}

impl BlockSizeId {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(BlockSizeId::Max64Kb),
            5 => Some(BlockSizeId::Max256Kb),
            6 => Some(BlockSizeId::Max1Mb),
            7 => Some(BlockSizeId::Max4Mb),
            _ => None,
        }
    }

    /// Block size in bytes: `1 << (2 * id + 8)`.
    pub fn bytes(self) -> usize {
        1 << (2 * self as usize + 8)
    }
}

/// Linked blocks may reference the previous 64 KiB of output; independent
/// blocks decode on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    #[default]
    Linked,
    Independent,
}

/// Parameters recorded in (or read from) a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub block_size_id: BlockSizeId,
    pub block_mode: BlockMode,
    /// XXH32 of the whole content after the end mark.
    pub content_checksum: bool,
    /// XXH32 of each block's stored bytes after the block.
    pub block_checksum: bool,
    /// Declared uncompressed size. Zero means "not declared": the header
    /// omits the field, so an empty frame cannot declare its size, and a
    /// header carrying an explicit zero is read as undeclared.
    pub content_size: u64,
    /// Dictionary id hint; 0 = none.
    pub dict_id: u32,
}

/// Settings for a compression stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub frame_info: FrameInfo,
    /// `< 2` selects the fast encoder (negative values raise acceleration);
    /// `>= 2` selects HC at that level.
    pub compression_level: i32,
    /// Emit a block at the end of every update instead of buffering.
    pub auto_flush: bool,
}

impl Preferences {
    /// Default frame settings with the given compression level.
    pub fn with_level(compression_level: i32) -> Self {
        Preferences { compression_level, ..Preferences::default() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("destination too small: need {needed} bytes, have {available}")]
    DstMaxSizeTooSmall { needed: usize, available: usize },
    #[error("operation not allowed in the current stream state: {0}")]
    StageMismatch(&'static str),
    #[error("unknown frame magic number {0:#010x}")]
    FrameTypeUnknown(u32),
    #[error("unsupported frame version {0}")]
    HeaderVersionWrong(u8),
    #[error("reserved frame descriptor bit set")]
    ReservedFlagSet,
    #[error("invalid block size id {0}")]
    MaxBlockSizeInvalid(u8),
    #[error("frame header checksum mismatch")]
    HeaderChecksumInvalid,
    #[error("block of {0} bytes exceeds the frame's maximum block size")]
    BlockSizeTooLarge(usize),
    #[error("block checksum mismatch")]
    BlockChecksumInvalid,
    #[error("content checksum mismatch")]
    ContentChecksumInvalid,
    #[error("frame content size mismatch: header says {declared}, decoded {actual}")]
    FrameSizeWrong { declared: u64, actual: u64 },
    #[error("stream ended after {actual} bytes but {declared} were declared")]
    ContentSizeMismatch { declared: u64, actual: u64 },
    #[error("corrupt block data")]
    DecompressionFailed,
}

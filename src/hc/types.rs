//! HC compression levels and search parameters.

// ─────────────────────────────────────────────────────────────────────────────
// Compression-level constants (lz4hc.h)
// ─────────────────────────────────────────────────────────────────────────────

pub const LZ4HC_CLEVEL_MIN: i32 = 2;
pub const LZ4HC_CLEVEL_DEFAULT: i32 = 9;
pub const LZ4HC_CLEVEL_OPT_MIN: i32 = 10;
pub const LZ4HC_CLEVEL_MAX: i32 = 12;

// ─────────────────────────────────────────────────────────────────────────────
// Table sizing
// ─────────────────────────────────────────────────────────────────────────────

pub const LZ4HC_DICTIONARY_LOGSIZE: u32 = 16;
/// Chain table length: one entry per slot in the 64 KB window.
pub const LZ4HC_MAXD: usize = 1 << LZ4HC_DICTIONARY_LOGSIZE;
pub const LZ4HC_MAXD_MASK: usize = LZ4HC_MAXD - 1;

pub const LZ4HC_HASH_LOG: u32 = 15;
pub const LZ4HC_HASHTABLESIZE: usize = 1 << LZ4HC_HASH_LOG;

/// Marks an empty head slot.
pub const NO_POSITION: u32 = u32::MAX;

// ─────────────────────────────────────────────────────────────────────────────
// Level table
// ─────────────────────────────────────────────────────────────────────────────

/// Search parameters derived from a compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    /// Maximum candidates examined per position.
    pub nb_searches: u32,
    /// A match at least this long ends the search early.
    pub target_length: usize,
}

const fn lp(nb_searches: u32, target_length: usize) -> LevelParams {
    LevelParams { nb_searches, target_length }
}

/// Indexed by level 0..=12; levels 0 and 1 are never looked up directly.
const LEVEL_TABLE: [LevelParams; 13] = [
    lp(2, 16),
    lp(2, 16),
    lp(2, 16),
    lp(4, 16),
    lp(8, 16),
    lp(16, 16),
    lp(32, 16),
    lp(64, 16),
    lp(128, 16),
    lp(256, 16),
    lp(96, 64),
    lp(512, 128),
    lp(16384, 4096),
];

/// Normalises a caller-supplied level the way `LZ4_compress_HC` does:
/// anything below 1 means the default, anything above the max is clamped.
#[inline]
pub fn normalize_level(level: i32) -> i32 {
    if level < 1 {
        LZ4HC_CLEVEL_DEFAULT
    } else {
        level.min(LZ4HC_CLEVEL_MAX)
    }
}

/// Search parameters for `level` after normalisation.
#[inline]
pub fn level_params(level: i32) -> LevelParams {
    LEVEL_TABLE[normalize_level(level) as usize]
}

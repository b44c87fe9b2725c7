//! XXH32 / XXH64 over the `xxhash-rust` crate: one-shot functions plus the
//! seeded streaming states owned by hash handles.
//!
//! Streaming states remember their seed so they can be reset in place, and
//! their digest is non-destructive: more input may follow a digest.

use xxhash_rust::xxh32::Xxh32;
use xxhash_rust::xxh64::Xxh64;

/// One-shot XXH32, equivalent to the C `XXH32(data, len, seed)`.
///
/// # Parity vectors
/// * `xxh32_oneshot(b"", 0)` == `0x02CC5D05`
/// * `xxh32_oneshot(b"abc", 0)` == `0x32D153FF`
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}

/// One-shot XXH64, equivalent to the C `XXH64(data, len, seed)`.
///
/// # Parity vectors
/// * `xxh64_oneshot(b"", 0)` == `0xEF46DB3751D8E999`
/// * `xxh64_oneshot(b"abc", 0)` == `0x44BC2CF5AD770999`
#[inline]
pub fn xxh64_oneshot(data: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh64::xxh64(data, seed)
}

/// Common surface of the 32- and 64-bit streaming states.
pub trait StreamingHash {
    type Seed: Copy;
    type Digest: Copy;

    fn with_seed(seed: Self::Seed) -> Self;
    fn seed(&self) -> Self::Seed;
    fn update(&mut self, data: &[u8]);
    /// Hash of everything fed so far; the state is left unchanged.
    fn digest(&self) -> Self::Digest;
    /// Returns to the freshly-seeded state.
    fn reset(&mut self);
}

/// Incremental XXH32 with its seed.
#[derive(Clone)]
pub struct StreamingXxh32 {
    seed: u32,
    state: Xxh32,
}

impl StreamingHash for StreamingXxh32 {
    type Seed = u32;
    type Digest = u32;

    fn with_seed(seed: u32) -> Self {
        StreamingXxh32 { seed, state: Xxh32::new(seed) }
    }

    fn seed(&self) -> u32 {
        self.seed
    }

    fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    fn digest(&self) -> u32 {
        self.state.digest()
    }

    fn reset(&mut self) {
        self.state.reset(self.seed);
    }
}

/// Incremental XXH64 with its seed.
#[derive(Clone)]
pub struct StreamingXxh64 {
    seed: u64,
    state: Xxh64,
}

impl StreamingHash for StreamingXxh64 {
    type Seed = u64;
    type Digest = u64;

    fn with_seed(seed: u64) -> Self {
        StreamingXxh64 { seed, state: Xxh64::new(seed) }
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    fn digest(&self) -> u64 {
        self.state.digest()
    }

    fn reset(&mut self) {
        self.state.reset(self.seed);
    }
}

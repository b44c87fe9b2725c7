//! XXH32 / XXH64 hash state engine.
//!
//! `init(seed) → update* → digest (any number of times, interleaved with
//! more updates) → free`. `reset` returns a state to its seeded start.
//! Using a handle after `free` is reported as `InvalidState`.

use tracing::{debug, trace};

use super::traced;
use crate::buffer::{with_source, LogicalBuffer};
use crate::error::Result;
use crate::handle::{Handle, Registry, Resource};
use crate::xxhash::{xxh32_oneshot, xxh64_oneshot, StreamingHash, StreamingXxh32, StreamingXxh64};

static HASH32_STATES: Registry<StreamingXxh32> = Registry::new();
static HASH64_STATES: Registry<StreamingXxh64> = Registry::new();

impl Resource for StreamingXxh32 {
    const KIND: u8 = 0x01;
    const NAME: &'static str = "hash32";

    fn registry() -> &'static Registry<Self> {
        &HASH32_STATES
    }
}

impl Resource for StreamingXxh64 {
    const KIND: u8 = 0x02;
    const NAME: &'static str = "hash64";

    fn registry() -> &'static Registry<Self> {
        &HASH64_STATES
    }
}

pub type Hash32Handle = Handle<StreamingXxh32>;
pub type Hash64Handle = Handle<StreamingXxh64>;

// ─────────────────────────────────────────────────────────────────────────────
// Shared lifecycle
// ─────────────────────────────────────────────────────────────────────────────

fn init<H: StreamingHash + Resource>(seed: H::Seed) -> Result<Handle<H>> {
    let handle = traced("hash_init", H::registry().insert(H::with_seed(seed)))?;
    debug!(kind = H::NAME, ?handle, "hash state created");
    Ok(handle)
}

fn update<H: StreamingHash + Resource>(
    handle: Handle<H>,
    buf: &LogicalBuffer<'_>,
    off: usize,
    len: usize,
) -> Result<()> {
    let result = H::registry().checkout(handle).and_then(|mut state| {
        with_source(buf, off, len, |bytes| {
            state.update(bytes);
            Ok(())
        })
    });
    trace!(kind = H::NAME, len, "hash update");
    traced("hash_update", result)
}

fn digest<H: StreamingHash + Resource>(handle: Handle<H>) -> Result<H::Digest> {
    traced("hash_digest", H::registry().checkout(handle).map(|state| state.digest()))
}

fn reset<H: StreamingHash + Resource>(handle: Handle<H>) -> Result<()> {
    traced("hash_reset", H::registry().checkout(handle).map(|mut state| state.reset()))
}

fn free<H: StreamingHash + Resource>(handle: Handle<H>) -> Result<()> {
    traced("hash_free", H::registry().remove(handle))?;
    debug!(kind = H::NAME, ?handle, "hash state released");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// 32-bit
// ─────────────────────────────────────────────────────────────────────────────

pub fn hash32_init(seed: u32) -> Result<Hash32Handle> {
    init(seed)
}

pub fn hash32_update(handle: Hash32Handle, buf: &LogicalBuffer<'_>, off: usize, len: usize) -> Result<()> {
    update(handle, buf, off, len)
}

pub fn hash32_digest(handle: Hash32Handle) -> Result<u32> {
    digest(handle)
}

pub fn hash32_reset(handle: Hash32Handle) -> Result<()> {
    reset(handle)
}

pub fn hash32_free(handle: Hash32Handle) -> Result<()> {
    free(handle)
}

/// Stateless XXH32 of `buf[off..off + len]`.
pub fn hash32(buf: &LogicalBuffer<'_>, off: usize, len: usize, seed: u32) -> Result<u32> {
    traced("hash32", with_source(buf, off, len, |bytes| Ok(xxh32_oneshot(bytes, seed))))
}

// ─────────────────────────────────────────────────────────────────────────────
// 64-bit
// ─────────────────────────────────────────────────────────────────────────────

pub fn hash64_init(seed: u64) -> Result<Hash64Handle> {
    init(seed)
}

pub fn hash64_update(handle: Hash64Handle, buf: &LogicalBuffer<'_>, off: usize, len: usize) -> Result<()> {
    update(handle, buf, off, len)
}

pub fn hash64_digest(handle: Hash64Handle) -> Result<u64> {
    digest(handle)
}

pub fn hash64_reset(handle: Hash64Handle) -> Result<()> {
    reset(handle)
}

pub fn hash64_free(handle: Hash64Handle) -> Result<()> {
    free(handle)
}

/// Stateless XXH64 of `buf[off..off + len]`.
pub fn hash64(buf: &LogicalBuffer<'_>, off: usize, len: usize, seed: u64) -> Result<u64> {
    traced("hash64", with_source(buf, off, len, |bytes| Ok(xxh64_oneshot(bytes, seed))))
}

//! Buffer Access Adapter.
//!
//! Callers hand the boundary a [`LogicalBuffer`]: either an owned region of
//! a caller-managed array that must be pinned for raw access, or a
//! foreign-mapped region (a raw address whose memory outlives the call).
//! Both resolve, without copying, to a slice that lives exactly as long as a
//! [`Pinned`] guard; dropping the guard releases the pin on every exit path.
//!
//! When a call needs a source and a destination, the source is pinned
//! first. If the destination then fails, the source guard is dropped before
//! the error is returned, so no pin ever leaks.

use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::warn;

use crate::error::{BridgeError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Owned regions
// ─────────────────────────────────────────────────────────────────────────────

/// A caller-owned contiguous byte container whose storage must be held in
/// place ("pinned") while raw pointers to it are outstanding.
///
/// # Safety
///
/// A pointer returned by `pin` must stay valid for reads and writes of the
/// returned length, and the storage must not move, until `unpin` is called
/// with that pointer. Every successful `pin` receives exactly one `unpin`.
pub unsafe trait PinnableArray {
    /// Pins the storage; `None` means the runtime could not provide it.
    fn pin(&self) -> Option<(NonNull<u8>, usize)>;
    fn unpin(&self, base: NonNull<u8>);
}

/// Heap byte array with a pin counter; the Rust-side owned region.
///
/// The storage is taken apart into a base pointer and a length once, at
/// construction, and every pinned view is derived from that pointer. Safe
/// reads of the whole array ([`to_vec`](ByteArray::to_vec)) are refused
/// while any pin is outstanding.
pub struct ByteArray {
    base: NonNull<u8>,
    len: usize,
    pins: Cell<usize>,
    _owns: PhantomData<Box<[u8]>>,
}

// SAFETY: the array exclusively owns its allocation; `Cell` keeps it !Sync.
unsafe impl Send for ByteArray {}

impl ByteArray {
    pub fn zeroed(len: usize) -> Self {
        Self::from(vec![0u8; len])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pins currently outstanding.
    pub fn pin_count(&self) -> usize {
        self.pins.get()
    }

    /// Exclusive access; no guard can be alive while `self` is borrowed
    /// mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: `base` owns `len` initialised bytes and `&mut self` rules
        // out every other view for the returned lifetime.
        unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr(), self.len) }
    }

    /// Copies the contents out. Fails with [`BridgeError::InvalidState`]
    /// while a pin is outstanding.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        if self.pins.get() != 0 {
            return Err(BridgeError::invalid_state("array is pinned"));
        }
        // SAFETY: no pin is outstanding, so no slice derived from `base` is
        // alive and the bytes may be read.
        Ok(unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }.to_vec())
    }

    pub fn into_vec(self) -> Vec<u8> {
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: `base`/`len` came from `Box::into_raw` and ownership moves
        // back into the box exactly once; `Drop` is suppressed.
        unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(this.base.as_ptr(), this.len)) }.into_vec()
    }
}

impl Drop for ByteArray {
    fn drop(&mut self) {
        // SAFETY: as in `into_vec`.
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.len)) });
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(v: Vec<u8>) -> Self {
        let len = v.len();
        let raw: *mut [u8] = Box::into_raw(v.into_boxed_slice());
        // `Box::into_raw` never returns null, even for an empty slice.
        let base = NonNull::new(raw.cast::<u8>()).unwrap_or(NonNull::dangling());
        ByteArray { base, len, pins: Cell::new(0), _owns: PhantomData }
    }
}

impl From<&[u8]> for ByteArray {
    fn from(v: &[u8]) -> Self {
        Self::from(v.to_vec())
    }
}

// SAFETY: the allocation never moves while `ByteArray` is alive, and pinned
// pointers are copies of `base`, so pinning the same array twice hands out
// two raw pointers with the same provenance and no intermediate reference.
unsafe impl PinnableArray for ByteArray {
    fn pin(&self) -> Option<(NonNull<u8>, usize)> {
        self.pins.set(self.pins.get() + 1);
        Some((self.base, self.len))
    }

    fn unpin(&self, _base: NonNull<u8>) {
        self.pins.set(self.pins.get() - 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Foreign-mapped regions
// ─────────────────────────────────────────────────────────────────────────────

/// Memory owned elsewhere that stays valid and in place for `'a`.
pub struct MappedRegion<'a> {
    base: NonNull<u8>,
    len: usize,
    writable: bool,
    _lifetime: PhantomData<&'a mut [u8]>,
}

impl<'a> MappedRegion<'a> {
    pub fn readonly(bytes: &'a [u8]) -> Self {
        MappedRegion {
            base: NonNull::from(bytes).cast(),
            len: bytes.len(),
            writable: false,
            _lifetime: PhantomData,
        }
    }

    pub fn writable(bytes: &'a mut [u8]) -> Self {
        let len = bytes.len();
        MappedRegion {
            base: NonNull::from(bytes).cast(),
            len,
            writable: true,
            _lifetime: PhantomData,
        }
    }

    /// Wraps a raw address. A null address means the mapping is not
    /// available and yields [`BridgeError::OutOfMemory`].
    ///
    /// # Safety
    ///
    /// A non-null `addr` must be valid for reads (and writes, if
    /// `writable`) of `len` bytes for `'a`, and not be accessed through any
    /// other path during calls that use this region.
    pub unsafe fn from_raw_parts(addr: *mut u8, len: usize, writable: bool) -> Result<Self> {
        let base = NonNull::new(addr)
            .ok_or_else(|| BridgeError::OutOfMemory("mapped region address unavailable".into()))?;
        Ok(MappedRegion { base, len, writable, _lifetime: PhantomData })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LogicalBuffer and guards
// ─────────────────────────────────────────────────────────────────────────────

/// One of the two buffer representations accepted at the boundary.
pub enum LogicalBuffer<'a> {
    Owned(&'a dyn PinnableArray),
    Mapped(MappedRegion<'a>),
}

impl<'a> From<&'a ByteArray> for LogicalBuffer<'a> {
    fn from(a: &'a ByteArray) -> Self {
        LogicalBuffer::Owned(a)
    }
}

impl<'a> From<&'a [u8]> for LogicalBuffer<'a> {
    fn from(b: &'a [u8]) -> Self {
        LogicalBuffer::Mapped(MappedRegion::readonly(b))
    }
}

impl<'a> From<&'a mut [u8]> for LogicalBuffer<'a> {
    fn from(b: &'a mut [u8]) -> Self {
        LogicalBuffer::Mapped(MappedRegion::writable(b))
    }
}

impl<'a> From<MappedRegion<'a>> for LogicalBuffer<'a> {
    fn from(r: MappedRegion<'a>) -> Self {
        LogicalBuffer::Mapped(r)
    }
}

/// An active resolution of a [`LogicalBuffer`]. Releases the pin on drop.
pub struct Pinned<'a> {
    base: NonNull<u8>,
    len: usize,
    writable: bool,
    owner: Option<&'a dyn PinnableArray>,
}

impl Drop for Pinned<'_> {
    fn drop(&mut self) {
        if let Some(owner) = self.owner {
            owner.unpin(self.base);
        }
    }
}

impl Pinned<'_> {
    /// Address range `offset..offset + len`, bounds-checked.
    fn range(&self, offset: usize, len: usize, what: &str) -> Result<(*mut u8, usize)> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => {
                // SAFETY: offset <= self.len, inside the pinned allocation.
                Ok((unsafe { self.base.as_ptr().add(offset) }, len))
            }
            _ => Err(BridgeError::invalid_argument(format!(
                "{what} range {offset}+{len} outside buffer of {} bytes",
                self.len
            ))),
        }
    }
}

impl LogicalBuffer<'_> {
    /// Resolves the buffer for the duration of the returned guard.
    pub fn pin(&self) -> Result<Pinned<'_>> {
        match self {
            LogicalBuffer::Owned(array) => match array.pin() {
                Some((base, len)) => Ok(Pinned { base, len, writable: true, owner: Some(*array) }),
                None => {
                    warn!("owned region could not be pinned");
                    Err(BridgeError::OutOfMemory("owned region could not be pinned".into()))
                }
            },
            LogicalBuffer::Mapped(region) => Ok(Pinned {
                base: region.base,
                len: region.len,
                writable: region.writable,
                owner: None,
            }),
        }
    }
}

fn disjoint(a: (*mut u8, usize), b: (*mut u8, usize)) -> bool {
    let (a0, b0) = (a.0 as usize, b.0 as usize);
    a.1 == 0 || b.1 == 0 || a0 + a.1 <= b0 || b0 + b.1 <= a0
}

/// Runs `f` over `src[offset..offset + len]`.
pub fn with_source<R>(
    src: &LogicalBuffer<'_>,
    offset: usize,
    len: usize,
    f: impl FnOnce(&[u8]) -> Result<R>,
) -> Result<R> {
    let pinned = src.pin()?;
    let (ptr, len) = pinned.range(offset, len, "source")?;
    // SAFETY: the range is inside memory held in place by `pinned`, which
    // outlives the slice.
    let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
    f(bytes)
}

/// Runs `f` over `dst[offset..offset + capacity]`.
pub fn with_destination<R>(
    dst: &LogicalBuffer<'_>,
    offset: usize,
    capacity: usize,
    f: impl FnOnce(&mut [u8]) -> Result<R>,
) -> Result<R> {
    let pinned = dst.pin()?;
    if !pinned.writable {
        return Err(BridgeError::invalid_argument("destination region is read-only"));
    }
    let (ptr, len) = pinned.range(offset, capacity, "destination")?;
    // SAFETY: as in `with_source`; the region is writable and exclusively
    // ours for the call.
    let bytes = unsafe { std::slice::from_raw_parts_mut(ptr, len) };
    f(bytes)
}

/// Pins `src` then `dst` and runs `f` over both ranges. The ranges must not
/// overlap.
pub fn with_source_and_destination<R>(
    src: &LogicalBuffer<'_>,
    src_offset: usize,
    src_len: usize,
    dst: &LogicalBuffer<'_>,
    dst_offset: usize,
    dst_capacity: usize,
    f: impl FnOnce(&[u8], &mut [u8]) -> Result<R>,
) -> Result<R> {
    pin_pair(src, src_offset, Some(src_len), dst, dst_offset, dst_capacity, f)
}

/// Like [`with_source_and_destination`], with the source running from
/// `src_offset` to the end of its buffer.
pub fn with_source_tail_and_destination<R>(
    src: &LogicalBuffer<'_>,
    src_offset: usize,
    dst: &LogicalBuffer<'_>,
    dst_offset: usize,
    dst_capacity: usize,
    f: impl FnOnce(&[u8], &mut [u8]) -> Result<R>,
) -> Result<R> {
    pin_pair(src, src_offset, None, dst, dst_offset, dst_capacity, f)
}

fn pin_pair<R>(
    src: &LogicalBuffer<'_>,
    src_offset: usize,
    src_len: Option<usize>,
    dst: &LogicalBuffer<'_>,
    dst_offset: usize,
    dst_capacity: usize,
    f: impl FnOnce(&[u8], &mut [u8]) -> Result<R>,
) -> Result<R> {
    let src_pin = src.pin()?;
    let dst_pin = dst.pin()?;
    if !dst_pin.writable {
        return Err(BridgeError::invalid_argument("destination region is read-only"));
    }
    let src_len = src_len.unwrap_or_else(|| src_pin.len.saturating_sub(src_offset));
    let s = src_pin.range(src_offset, src_len, "source")?;
    let d = dst_pin.range(dst_offset, dst_capacity, "destination")?;
    if !disjoint(s, d) {
        return Err(BridgeError::invalid_argument("source and destination overlap"));
    }
    // SAFETY: both ranges are pinned for the rest of this function and do
    // not overlap, so the shared and exclusive slices never alias.
    let (src_bytes, dst_bytes) = unsafe {
        (std::slice::from_raw_parts(s.0, s.1), std::slice::from_raw_parts_mut(d.0, d.1))
    };
    f(src_bytes, dst_bytes)
}

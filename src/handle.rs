//! Generation-checked handle arena.
//!
//! Contexts and hash states never cross the boundary as pointers. Each
//! lives in a per-type [`Registry`] slot and is named by a [`Handle`]: a
//! non-zero 64-bit value packing a resource-kind tag, the slot's generation
//! and the slot index.
//!
//! ```text
//! bit 63      : 0 (handles are positive as i64)
//! bits 56..62 : kind tag
//! bits 32..55 : generation (1..=0xFF_FFFF)
//! bits  0..31 : slot index
//! ```
//!
//! Freeing a slot bumps its generation, so stale copies of a handle are
//! rejected with [`BridgeError::InvalidState`] instead of reaching reused
//! memory. Operations lease the value out of its slot for the duration of
//! a call; a second concurrent lease of the same handle is refused.

use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{BridgeError, Result};

const INDEX_BITS: u32 = 32;
const GENERATION_BITS: u32 = 24;
const GENERATION_MASK: u32 = (1 << GENERATION_BITS) - 1;
const KIND_SHIFT: u32 = INDEX_BITS + GENERATION_BITS;

/// A type that lives behind handles.
pub trait Resource: Sized + Send + 'static {
    /// Tag stored in the handle; unique per resource type, `1..=0x7F`.
    const KIND: u8;
    /// Name used in error messages.
    const NAME: &'static str;

    fn registry() -> &'static Registry<Self>;
}

/// Typed reference to a live `T` in its registry.
pub struct Handle<T> {
    raw: NonZeroU64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T: Resource> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({}@{})", T::NAME, self.index(), self.generation())
    }
}

impl<T: Resource> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        let raw = (u64::from(T::KIND) << KIND_SHIFT)
            | (u64::from(generation & GENERATION_MASK) << INDEX_BITS)
            | u64::from(index);
        // kind and generation are never zero, so neither is `raw`.
        let raw = NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN);
        Handle { raw, _kind: PhantomData }
    }

    fn index(&self) -> u32 {
        self.raw.get() as u32
    }

    fn generation(&self) -> u32 {
        (self.raw.get() >> INDEX_BITS) as u32 & GENERATION_MASK
    }

    /// Integer form handed across the boundary.
    pub fn into_raw(self) -> i64 {
        self.raw.get() as i64
    }

    /// Validates the integer form's shape (non-zero, right kind). Liveness
    /// is checked when the handle is used.
    pub fn from_raw(raw: i64) -> Result<Self> {
        let bits = NonZeroU64::new(raw as u64)
            .ok_or_else(|| BridgeError::invalid_state(format!("null {} handle", T::NAME)))?;
        if (bits.get() >> KIND_SHIFT) as u8 != T::KIND {
            return Err(BridgeError::invalid_state(format!(
                "handle {raw:#x} is not a {} handle",
                T::NAME
            )));
        }
        Ok(Handle { raw: bits, _kind: PhantomData })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

enum Slot<T> {
    Vacant { generation: u32 },
    Occupied { generation: u32, value: Box<T> },
    Leased { generation: u32 },
}

impl<T> Slot<T> {
    fn generation(&self) -> u32 {
        match self {
            Slot::Vacant { generation }
            | Slot::Occupied { generation, .. }
            | Slot::Leased { generation } => *generation,
        }
    }
}

struct Table<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

/// Arena of live `T` values addressed by [`Handle<T>`].
pub struct Registry<T> {
    table: Mutex<Table<T>>,
}

impl<T: Resource> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> Registry<T> {
    pub const fn new() -> Self {
        Registry { table: Mutex::new(Table { slots: Vec::new(), free: Vec::new(), live: 0 }) }
    }

    fn lock(&self) -> MutexGuard<'_, Table<T>> {
        // A panic while the lock was held cannot leave a slot half-updated.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` and returns its handle.
    pub fn insert(&self, value: T) -> Result<Handle<T>> {
        let mut table = self.lock();
        let index = match table.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(table.slots.len())
                    .map_err(|_| BridgeError::OutOfMemory(format!("{} table full", T::NAME)))?;
                table.slots.try_reserve(1).map_err(|_| {
                    BridgeError::OutOfMemory(format!("cannot grow {} table", T::NAME))
                })?;
                table.slots.push(Slot::Vacant { generation: 0 });
                index
            }
        };
        let slot = &mut table.slots[index as usize];
        let generation = slot.generation() % GENERATION_MASK + 1;
        *slot = Slot::Occupied { generation, value: Box::new(value) };
        table.live += 1;
        Ok(Handle::new(index, generation))
    }

    /// Takes exclusive use of the value until the lease is dropped.
    pub fn checkout(&self, handle: Handle<T>) -> Result<Lease<'_, T>> {
        let mut table = self.lock();
        let index = handle.index();
        let generation = handle.generation();
        let slot = table
            .slots
            .get_mut(index as usize)
            .filter(|s| s.generation() == generation)
            .ok_or_else(|| stale::<T>(handle))?;
        match std::mem::replace(slot, Slot::Leased { generation }) {
            Slot::Occupied { value, .. } => Ok(Lease { registry: self, index, generation, value: Some(value) }),
            other => {
                let busy = matches!(other, Slot::Leased { .. });
                *slot = other;
                Err(if busy { busy_err::<T>(handle) } else { stale::<T>(handle) })
            }
        }
    }

    /// Removes the value; the handle and all its copies become stale.
    pub fn remove(&self, handle: Handle<T>) -> Result<T> {
        let mut guard = self.lock();
        let Table { slots, free, live } = &mut *guard;
        let index = handle.index();
        let generation = handle.generation();
        let slot = slots
            .get_mut(index as usize)
            .filter(|s| s.generation() == generation)
            .ok_or_else(|| stale::<T>(handle))?;
        match std::mem::replace(slot, Slot::Vacant { generation }) {
            Slot::Occupied { value, .. } => {
                free.push(index);
                *live -= 1;
                Ok(*value)
            }
            other => {
                let busy = matches!(other, Slot::Leased { .. });
                *slot = other;
                Err(if busy { busy_err::<T>(handle) } else { stale::<T>(handle) })
            }
        }
    }

    /// Number of live values.
    pub fn live(&self) -> usize {
        self.lock().live
    }

    fn give_back(&self, index: u32, generation: u32, value: Box<T>) {
        let mut table = self.lock();
        if let Some(slot) = table.slots.get_mut(index as usize) {
            if matches!(slot, Slot::Leased { generation: g } if *g == generation) {
                *slot = Slot::Occupied { generation, value };
            }
        }
    }
}

fn stale<T: Resource>(handle: Handle<T>) -> BridgeError {
    BridgeError::invalid_state(format!("{handle:?} is stale or was never issued"))
}

fn busy_err<T: Resource>(handle: Handle<T>) -> BridgeError {
    BridgeError::invalid_state(format!("{handle:?} is in use by another call"))
}

/// Exclusive access to a registry value; returns it to its slot on drop.
pub struct Lease<'r, T: Resource> {
    registry: &'r Registry<T>,
    index: u32,
    generation: u32,
    value: Option<Box<T>>,
}

impl<T: Resource> Deref for Lease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(v) => v,
            None => unreachable!("lease value is present until drop"),
        }
    }
}

impl<T: Resource> DerefMut for Lease<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(v) => v,
            None => unreachable!("lease value is present until drop"),
        }
    }
}

impl<T: Resource> Drop for Lease<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.registry.give_back(self.index, self.generation, value);
        }
    }
}

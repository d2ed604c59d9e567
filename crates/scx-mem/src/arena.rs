//! Fixed-capacity arena with manual reference counting.
//!
//! The arena models a single byte region of at most [`MAX_CAPACITY`] bytes,
//! logically divided into three parts:
//!
//! - **AST region**: reserved once per parse, growing upward from offset 0.
//!   It is accounted for here but stored by the parser; it is never reclaimed
//!   during evaluation.
//! - **Object region**: starts after the AST. Every object costs a
//!   [`HEADER_SIZE`] header (`{size, refcount}`) plus its payload size.
//! - **Free-list table**: grows downward from the top of the region, one
//!   [`FREE_SLOT_SIZE`] entry per bump allocation. Entries are never compacted
//!   away, so usable capacity only shrinks until the next [`Arena::reset`].
//!
//! # Allocation
//!
//! [`Arena::alloc`] first scans the table for a freed object whose stored size
//! is at least the requested size (first fit, no splitting, no coalescing).
//! On a miss it bump-allocates past the high-water mark and appends an empty
//! table entry. A request that would make the object region collide with the
//! table is fatal: the arena logs the condition and terminates according to
//! its [`Exhaustion`] policy. There is no way to retry.
//!
//! # Reference counting
//!
//! Objects start with a count of one. [`Arena::retain`] adds an alias,
//! [`Arena::release`] drops one and hands the payload back once the count
//! reaches zero, so that the owner can release whatever the payload itself
//! owns. The arena knows nothing about payload structure and never detects
//! cycles.
//!
//! # Examples
//!
//! ```
//! use scx_mem::Arena;
//!
//! let mut arena: Arena<String> = Arena::new(1024).unwrap();
//!
//! let greeting = arena.alloc(6, String::from("hello"));
//! assert_eq!(arena.get(greeting).map(String::as_str), Some("hello"));
//!
//! arena.retain(greeting).unwrap();
//! assert_eq!(arena.release(greeting).unwrap(), None);
//! assert_eq!(arena.release(greeting).unwrap(), Some(String::from("hello")));
//!
//! // The freed slot is reused and the high-water mark stays put.
//! let used = arena.stats().used;
//! let again = arena.alloc(4, String::from("bye"));
//! assert_eq!(again.slot(), greeting.slot());
//! assert_eq!(arena.stats().used, used);
//! ```

use std::fmt;

/// Largest capacity an arena may be configured with (16-bit address space).
pub const MAX_CAPACITY: usize = u16::MAX as usize;

/// Bytes charged for the `{size, refcount}` header preceding every object.
pub const HEADER_SIZE: usize = 4;

/// Bytes charged for each entry of the free-list table.
pub const FREE_SLOT_SIZE: usize = 2;

/// Generation-checked reference to an arena object.
///
/// A handle stays valid until the object it names is freed. Freeing bumps
/// the slot's generation, so a stale handle is rejected even after the slot
/// has been reused for a different object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: u16,
    generation: u16,
}

impl Handle {
    /// Index of the object slot.
    #[must_use]
    pub const fn slot(self) -> u16 {
        self.slot
    }

    /// Generation the handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u16 {
        self.generation
    }
}

/// What happens when an allocation does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exhaustion {
    /// Terminate the process immediately.
    #[default]
    Abort,
    /// Panic, for hosts that isolate the failure by unwinding (tests, worker
    /// threads). The arena must not be used for allocation afterwards.
    Panic,
}

/// Errors reported by the arena for recoverable misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    /// The handle names an object that has been freed (or never existed in
    /// this epoch of the arena).
    StaleHandle {
        /// Slot index carried by the handle.
        slot: u16,
        /// Generation carried by the handle.
        generation: u16,
    },

    /// The AST region does not fit in the remaining space.
    AstOverflow {
        /// Bytes requested for the AST.
        requested: usize,
        /// Bytes still available.
        available: usize,
    },

    /// The configured capacity exceeds [`MAX_CAPACITY`].
    CapacityTooLarge {
        /// The requested capacity.
        requested: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::StaleHandle { slot, generation } => {
                write!(f, "stale handle: slot {slot}, generation {generation}")
            }
            ArenaError::AstOverflow { requested, available } => write!(
                f,
                "program too large: {requested} bytes of AST, {available} bytes available"
            ),
            ArenaError::CapacityTooLarge { requested } => write!(
                f,
                "arena capacity {requested} exceeds the maximum of {MAX_CAPACITY} bytes"
            ),
        }
    }
}

impl std::error::Error for ArenaError {}

/// Usage snapshot of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Configured capacity in bytes.
    pub capacity: usize,
    /// Bytes reserved for the AST region.
    pub ast_bytes: usize,
    /// High-water mark of the object region (headers included).
    pub object_bytes: usize,
    /// Bytes consumed by the free-list table.
    pub table_bytes: usize,
    /// Total bytes in use: AST + objects + table.
    pub used: usize,
    /// Bytes left between the object region and the table.
    pub available: usize,
    /// Objects with a non-zero reference count.
    pub live_objects: usize,
    /// Freed objects waiting for reuse.
    pub free_slots: usize,
    /// Bump allocations since the last reset.
    pub allocations: usize,
    /// Allocations served from the free-list table since the last reset.
    pub reuses: usize,
}

struct Slot<T> {
    /// Offset of the header within the object region.
    offset: u16,
    /// Payload size recorded at bump time; reuse never changes it.
    size: u16,
    refcount: u32,
    generation: u16,
    value: Option<T>,
}

/// Fixed-capacity, refcounting object arena.
///
/// See the [module documentation](self) for the memory model.
pub struct Arena<T> {
    capacity: usize,
    ast_bytes: usize,
    object_top: usize,
    slots: Vec<Slot<T>>,
    /// One entry per bump allocation; `Some(slot)` marks a reclaimable object.
    free_table: Vec<Option<u16>>,
    exhaustion: Exhaustion,
    /// Generation given to slots created in the current epoch.
    epoch: u16,
    allocations: usize,
    reuses: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::CapacityTooLarge`] if `capacity` exceeds
    /// [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        if capacity > MAX_CAPACITY {
            return Err(ArenaError::CapacityTooLarge { requested: capacity });
        }

        Ok(Self::bounded(capacity))
    }

    /// Creates an empty arena, clamping `capacity` to [`MAX_CAPACITY`].
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Arena {
            capacity: capacity.min(MAX_CAPACITY),
            ast_bytes: 0,
            object_top: 0,
            slots: Vec::new(),
            free_table: Vec::new(),
            exhaustion: Exhaustion::default(),
            epoch: 0,
            allocations: 0,
            reuses: 0,
        }
    }

    /// Sets the exhaustion policy.
    #[must_use]
    pub fn with_exhaustion(mut self, exhaustion: Exhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    /// Returns the configured capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the exhaustion policy.
    #[must_use]
    pub fn exhaustion(&self) -> Exhaustion {
        self.exhaustion
    }

    fn table_bytes(&self) -> usize {
        self.free_table.len() * FREE_SLOT_SIZE
    }

    /// Bytes left between the top of the object region and the table.
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity
            .saturating_sub(self.ast_bytes + self.object_top + self.table_bytes())
    }

    /// Reserves `bytes` for the AST region and returns the offset at which
    /// the reservation starts.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::AstOverflow`] if the reservation does not fit.
    /// Nothing is reserved in that case.
    pub fn reserve_ast(&mut self, bytes: usize) -> Result<usize, ArenaError> {
        let available = self.available();
        if bytes > available {
            return Err(ArenaError::AstOverflow { requested: bytes, available });
        }

        let offset = self.ast_bytes;
        self.ast_bytes += bytes;
        scx_log::debug!(
            "reserved {} AST bytes at offset {} ({} available)",
            bytes,
            offset,
            self.available()
        );
        Ok(offset)
    }

    /// Shrinks the AST region back to `bytes`, undoing later reservations.
    pub fn truncate_ast(&mut self, bytes: usize) {
        self.ast_bytes = self.ast_bytes.min(bytes);
    }

    /// Allocates an object with a payload of `size` bytes and a reference
    /// count of one.
    ///
    /// Never returns if the arena is exhausted; see [`Exhaustion`].
    pub fn alloc(&mut self, size: usize, value: T) -> Handle {
        if let Some(handle) = self.reuse(size) {
            let slot = &mut self.slots[handle.slot as usize];
            slot.refcount = 1;
            slot.value = Some(value);
            self.reuses += 1;
            scx_log::trace!(
                "reused slot {} ({} bytes) for a {} byte request",
                handle.slot,
                slot.size,
                size
            );
            return handle;
        }

        let needed = HEADER_SIZE + size;
        if needed + FREE_SLOT_SIZE > self.available() {
            self.exhausted(size);
        }

        let (Ok(index), Ok(offset), Ok(stored)) = (
            u16::try_from(self.slots.len()),
            u16::try_from(self.object_top),
            u16::try_from(size),
        ) else {
            self.exhausted(size);
        };

        self.slots.push(Slot {
            offset,
            size: stored,
            refcount: 1,
            generation: self.epoch,
            value: Some(value),
        });
        self.free_table.push(None);
        self.object_top += needed;
        self.allocations += 1;

        Handle { slot: index, generation: self.epoch }
    }

    /// First-fit scan of the free-list table.
    fn reuse(&mut self, size: usize) -> Option<Handle> {
        let slots = &self.slots;
        let position = self.free_table.iter().position(|entry| {
            entry.is_some_and(|index| slots[index as usize].size as usize >= size)
        })?;

        let index = self.free_table[position].take()?;
        let generation = self.slots[index as usize].generation;
        Some(Handle { slot: index, generation })
    }

    #[cold]
    fn exhausted(&self, requested: usize) -> ! {
        let stats = self.stats();
        scx_log::error!(
            "arena exhausted: {} byte object requested, {} of {} bytes available ({} live objects, {} table entries)",
            requested,
            stats.available,
            stats.capacity,
            stats.live_objects,
            self.free_table.len()
        );

        #[cfg(feature = "arena_backtrace")]
        scx_log::error!("allocation backtrace:\n{:?}", backtrace::Backtrace::new());

        match self.exhaustion {
            Exhaustion::Abort => std::process::abort(),
            Exhaustion::Panic => panic!(
                "arena exhausted: {requested} byte object requested, {} bytes available",
                stats.available
            ),
        }
    }

    fn slot(&self, handle: Handle) -> Result<&Slot<T>, ArenaError> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
            .ok_or(ArenaError::StaleHandle {
                slot: handle.slot,
                generation: handle.generation,
            })
    }

    fn slot_mut(&mut self, handle: Handle) -> Result<&mut Slot<T>, ArenaError> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
            .ok_or(ArenaError::StaleHandle {
                slot: handle.slot,
                generation: handle.generation,
            })
    }

    /// Adds an alias to a live object and returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::StaleHandle`] if the object is not live.
    ///
    /// # Panics
    ///
    /// Panics if the reference count overflows.
    pub fn retain(&mut self, handle: Handle) -> Result<u32, ArenaError> {
        let slot = self.slot_mut(handle)?;
        slot.refcount = slot
            .refcount
            .checked_add(1)
            .unwrap_or_else(|| panic!("reference count overflow in slot {}", handle.slot));
        Ok(slot.refcount)
    }

    /// Drops an alias. When the count reaches zero the payload is returned,
    /// the slot's generation is bumped and the slot is recorded in the first
    /// empty entry of the free-list table.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::StaleHandle`] if the object is not live.
    pub fn release(&mut self, handle: Handle) -> Result<Option<T>, ArenaError> {
        let slot = self.slot_mut(handle)?;
        slot.refcount -= 1;
        if slot.refcount > 0 {
            return Ok(None);
        }

        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);

        // Every live object owns a table entry, so an empty one always exists.
        let entry = self.free_table.iter_mut().find(|entry| entry.is_none());
        debug_assert!(entry.is_some(), "free-list table has no empty entry");
        if let Some(entry) = entry {
            *entry = Some(handle.slot);
        }

        Ok(value)
    }

    /// Borrows a live object's payload.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slot(handle).ok()?.value.as_ref()
    }

    /// Mutably borrows a live object's payload.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slot_mut(handle).ok()?.value.as_mut()
    }

    /// Returns a live object's reference count.
    #[must_use]
    pub fn refcount(&self, handle: Handle) -> Option<u32> {
        self.slot(handle).ok().map(|slot| slot.refcount)
    }

    /// Returns the offset of a live object's header within the object region.
    #[must_use]
    pub fn offset(&self, handle: Handle) -> Option<usize> {
        self.slot(handle).ok().map(|slot| slot.offset as usize)
    }

    /// Whether `handle` names a live object.
    #[must_use]
    pub fn is_live(&self, handle: Handle) -> bool {
        self.slot(handle).is_ok()
    }

    /// Discards every object and the AST reservation.
    ///
    /// Payloads that were still live are returned so the owner can finalize
    /// them. Handles issued before the reset are stale afterwards.
    pub fn reset(&mut self) -> Vec<T> {
        let next_epoch = self
            .slots
            .iter()
            .map(|slot| slot.generation)
            .max()
            .unwrap_or(self.epoch)
            .max(self.epoch);
        self.epoch = next_epoch.wrapping_add(1);

        let live: Vec<T> = self.slots.drain(..).filter_map(|slot| slot.value).collect();
        scx_log::debug!(
            "arena reset: {} live objects discarded, {} bytes of capacity",
            live.len(),
            self.capacity
        );

        self.free_table.clear();
        self.ast_bytes = 0;
        self.object_top = 0;
        self.allocations = 0;
        self.reuses = 0;
        live
    }

    /// Returns a usage snapshot.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let table_bytes = self.table_bytes();
        let free_slots = self.free_table.iter().filter(|entry| entry.is_some()).count();

        ArenaStats {
            capacity: self.capacity,
            ast_bytes: self.ast_bytes,
            object_bytes: self.object_top,
            table_bytes,
            used: self.ast_bytes + self.object_top + table_bytes,
            available: self.available(),
            live_objects: self.slots.len() - free_slots,
            free_slots,
            allocations: self.allocations,
            reuses: self.reuses,
        }
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena").field("stats", &self.stats()).finish()
    }
}

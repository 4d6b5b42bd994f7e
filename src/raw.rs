use std::alloc::{alloc, dealloc, Layout};
use std::mem;
use std::ptr::NonNull;

use crate::StorageError;

/// Exclusive owner of a heap block sized for `capacity` elements of `T`.
///
/// The block is uninitialized memory and stays that way as far as this type
/// is concerned: `RawStorage` never constructs or destroys a `T`. Whoever
/// owns the storage is responsible for tracking which slots hold live values
/// and for destroying them before the storage is dropped, otherwise they are
/// leaked.
///
/// There is no `Clone` impl on purpose. Duplicating a raw block without
/// knowing which slots are live cannot be done safely, so ownership only
/// moves, and [`RawStorage::swap`] exchanges blocks between two owners in
/// O(1) without touching their contents.
pub struct RawStorage<T> {
    ptr: NonNull<T>,
    capacity: usize,
}

impl<T> RawStorage<T> {
    /// Storage with no block behind it. Does not allocate.
    pub fn empty() -> RawStorage<T> {
        RawStorage {
            ptr: NonNull::dangling(),
            capacity: 0,
        }
    }

    /// Allocates a block for exactly `capacity` elements, immediately.
    ///
    /// A capacity of zero is the same as [`RawStorage::empty`]. Zero-sized
    /// element types are rejected with `StorageError::ZeroSizedElement`.
    pub fn with_capacity(capacity: usize) -> Result<RawStorage<T>, StorageError> {
        if capacity == 0 {
            return Ok(RawStorage::empty());
        }
        if mem::size_of::<T>() == 0 {
            return Err(StorageError::ZeroSizedElement);
        }
        let layout = Layout::array::<T>(capacity)
            .map_err(|_| StorageError::CapacityOverflow { capacity })?;
        let ptr = NonNull::new(unsafe { alloc(layout) } as *mut T)
            .ok_or(StorageError::AllocFailed { capacity })?;
        trace!("raw: allocated block for {} slots of {} bytes", capacity, mem::size_of::<T>());
        Ok(RawStorage { ptr, capacity })
    }

    /// Number of element slots in the block, not bytes.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to the slot at `offset`. One past the last slot is a valid
    /// offset, so the result can serve as an end cursor.
    ///
    /// # Safety
    ///
    /// `offset` must not exceed the capacity; only a debug assertion checks it.
    #[inline(always)]
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "slot offset {} past capacity {}",
            offset,
            self.capacity
        );
        self.ptr.as_ptr().add(offset)
    }

    /// Reference to the value in the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be within capacity (debug-asserted only) and the slot
    /// must hold a live value.
    #[inline(always)]
    pub unsafe fn index(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity, "index {} past capacity {}", index, self.capacity);
        &*self.ptr.as_ptr().add(index)
    }

    /// Mutable variant of [`RawStorage::index`], same safety requirements.
    #[inline(always)]
    pub unsafe fn index_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity, "index {} past capacity {}", index, self.capacity);
        &mut *self.ptr.as_ptr().add(index)
    }

    /// Exchanges block ownership with `other` in O(1).
    pub fn swap(&mut self, other: &mut RawStorage<T>) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }
        // Capacity came through with_capacity, so the layout is known good.
        if let Ok(layout) = Layout::array::<T>(self.capacity) {
            trace!("raw: releasing block of {} slots", self.capacity);
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

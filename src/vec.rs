use std::fmt::{self, Debug};
use std::mem;
use std::ops::{Index, IndexMut};

use crate::iter::{Iter, IterMut};
use crate::raw::RawStorage;
use crate::StorageError;

/// Growable contiguous array built on one [`RawStorage`] block.
///
/// The first `len` slots of the block hold live values, everything after
/// them is uninitialized memory. `DynArray` performs every object-lifetime
/// operation itself: it constructs into slots, clones into fresh blocks,
/// relocates on growth and drops what it owns. The storage below never
/// touches element contents.
///
/// Growth allocates a fresh block, relocates the live range into it and then
/// swaps block ownership, so an allocation failure leaves the array exactly
/// as it was. Appends are amortized O(1): a full array doubles its live
/// count when it grows.
///
/// Operations that can fail to allocate return `Result` instead of
/// panicking. Element code (`Clone`, `Default`, closures) may panic; batch
/// construction sites roll back the partially built block before the panic
/// continues, so a half-finished `try_clone` or `resize` neither leaks nor
/// leaves the array changed.
pub struct DynArray<T> {
    storage: RawStorage<T>,
    len: usize,
}

/// Relocates `len` values from `src` to a non-overlapping `dst`.
///
/// Relocation is a bitwise move and cannot fail, which is what makes
/// grow-then-swap safe: the source range stays untouched until the batch is
/// complete. Types without drop glue go through one bulk copy.
///
/// # Safety
///
/// `src` must hold `len` live values, `dst` must have room for `len` slots,
/// and the ranges must not overlap. The source slots are uninitialized
/// afterwards; the caller must forget them.
unsafe fn relocate<T>(src: *const T, dst: *mut T, len: usize) {
    if mem::needs_drop::<T>() {
        for i in 0..len {
            dst.add(i).write(src.add(i).read());
        }
    } else {
        std::ptr::copy_nonoverlapping(src, dst, len);
    }
}

/// Drops `len` live values starting at `ptr`, in place.
///
/// # Safety
///
/// The whole range must be live, and nothing may use it afterwards.
unsafe fn drop_range<T>(ptr: *mut T, len: usize) {
    if mem::needs_drop::<T>() {
        for i in 0..len {
            std::ptr::drop_in_place(ptr.add(i));
        }
    }
}

/// Rollback for batch construction: drops the constructed prefix of a new
/// range if the batch does not run to completion.
struct PartialBatch<T> {
    base: *mut T,
    constructed: usize,
}

impl<T> Drop for PartialBatch<T> {
    fn drop(&mut self) {
        unsafe { drop_range(self.base, self.constructed) };
    }
}

/// Clone-constructs `len` values from `src` into the uninitialized `dst`.
/// If a clone panics, the values constructed so far are dropped again before
/// the panic continues; the source range is never touched.
///
/// # Safety
///
/// `src` must hold `len` live values and `dst` must have room for `len`
/// slots, non-overlapping with `src`.
unsafe fn clone_batch<T: Clone>(src: *const T, dst: *mut T, len: usize) {
    let mut batch = PartialBatch {
        base: dst,
        constructed: 0,
    };
    for i in 0..len {
        dst.add(i).write((*src.add(i)).clone());
        batch.constructed = i + 1;
    }
    mem::forget(batch);
}

/// Same rollback contract as [`clone_batch`], constructing from a closure.
unsafe fn fill_batch<T, F: FnMut() -> T>(dst: *mut T, len: usize, f: &mut F) {
    let mut batch = PartialBatch {
        base: dst,
        constructed: 0,
    };
    for i in 0..len {
        dst.add(i).write(f());
        batch.constructed = i + 1;
    }
    mem::forget(batch);
}

impl<T> DynArray<T> {
    /// An empty array. Does not allocate until the first element arrives.
    pub fn new() -> DynArray<T> {
        DynArray {
            storage: RawStorage::empty(),
            len: 0,
        }
    }

    /// An array of `len` default-constructed elements.
    pub fn with_len(len: usize) -> Result<DynArray<T>, StorageError>
    where
        T: Default,
    {
        let mut array = DynArray::new();
        array.resize_with(len, T::default)?;
        Ok(array)
    }

    /// An array holding clones of `values`, with capacity equal to its length.
    pub fn from_slice(values: &[T]) -> Result<DynArray<T>, StorageError>
    where
        T: Clone,
    {
        let mut storage = RawStorage::with_capacity(values.len())?;
        unsafe { clone_batch(values.as_ptr(), storage.as_mut_ptr(), values.len()) };
        Ok(DynArray {
            storage,
            len: values.len(),
        })
    }

    /// Count of live elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Count of slots the current block can hold without reallocating.
    /// Never decreases, except when the contents are moved out or swapped away.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Ensures capacity for at least `capacity` elements; a no-op when the
    /// block is already large enough.
    ///
    /// On failure the array is untouched: the replacement block is built
    /// first and ownership is swapped only once the live range has been
    /// relocated into it.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), StorageError> {
        if capacity <= self.storage.capacity() {
            return Ok(());
        }
        let mut replacement = RawStorage::with_capacity(capacity)?;
        debug!(
            "array: growing {} -> {} slots, {} live",
            self.storage.capacity(),
            capacity,
            self.len
        );
        unsafe { relocate(self.storage.as_ptr(), replacement.as_mut_ptr(), self.len) };
        // The old block leaves through `replacement`, holding spent slots only.
        self.storage.swap(&mut replacement);
        Ok(())
    }

    // Growth step for appends: 0 -> 1, otherwise double the live count.
    fn grown_capacity(&self) -> usize {
        if self.len == 0 {
            1
        } else {
            self.len * 2
        }
    }

    /// Appends `value` and returns a reference to its slot.
    pub fn push(&mut self, value: T) -> Result<&mut T, StorageError> {
        if self.len == self.storage.capacity() {
            let grown = self.grown_capacity();
            self.reserve(grown)?;
        }
        unsafe {
            let slot = self.storage.slot(self.len);
            slot.write(value);
            self.len += 1;
            Ok(&mut *slot)
        }
    }

    /// Removes and returns the last element, `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.storage.as_ptr().add(self.len).read() })
    }

    /// Inserts `value` before `index`, shifting the tail one slot right.
    /// `index == len` appends. Panics when `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T, StorageError> {
        if index > self.len {
            panic!("insert index {} out of bounds for length {}", index, self.len);
        }
        if index == self.len {
            return self.push(value);
        }
        if self.len == self.storage.capacity() {
            // Build the replacement block completely before taking ownership:
            // value first, then prefix and suffix around it.
            let grown = self.grown_capacity();
            let mut replacement = RawStorage::with_capacity(grown)?;
            unsafe {
                let dst: *mut T = replacement.as_mut_ptr();
                dst.add(index).write(value);
                relocate(self.storage.as_ptr(), dst, index);
                relocate(
                    self.storage.as_ptr().add(index),
                    dst.add(index + 1),
                    self.len - index,
                );
            }
            self.storage.swap(&mut replacement);
        } else {
            unsafe {
                // Shift the tail right, last slot first, then drop the value in.
                let ptr = self.storage.as_mut_ptr();
                let mut i = self.len;
                while i > index {
                    ptr.add(i).write(ptr.add(i - 1).read());
                    i -= 1;
                }
                ptr.add(index).write(value);
            }
        }
        self.len += 1;
        Ok(unsafe { &mut *self.storage.slot(index) })
    }

    /// Removes and returns the element at `index`, shifting the tail one
    /// slot left. `None` when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        unsafe {
            let ptr = self.storage.as_mut_ptr();
            let removed = ptr.add(index).read();
            for i in index..self.len - 1 {
                ptr.add(i).write(ptr.add(i + 1).read());
            }
            self.len -= 1;
            Some(removed)
        }
    }

    /// Sets the length to `len`: a longer array gains default-constructed
    /// elements at the end, a shorter one drops its tail.
    pub fn resize(&mut self, len: usize) -> Result<(), StorageError>
    where
        T: Default,
    {
        self.resize_with(len, T::default)
    }

    /// Like [`DynArray::resize`], constructing new elements with `f`.
    ///
    /// A panic in `f` drops the elements it already produced and leaves the
    /// length as it was; capacity reserved for the new tail is kept.
    pub fn resize_with<F: FnMut() -> T>(&mut self, len: usize, mut f: F) -> Result<(), StorageError> {
        if len < self.len {
            // Length goes down before the tail is destroyed: a panicking
            // element Drop must not leave destroyed slots counted as live.
            let tail = self.len - len;
            self.len = len;
            unsafe { drop_range(self.storage.as_mut_ptr().add(len), tail) };
        } else if len > self.len {
            self.reserve(len)?;
            unsafe { fill_batch(self.storage.as_mut_ptr().add(self.len), len - self.len, &mut f) };
            self.len = len;
        }
        Ok(())
    }

    /// Deep copy with independent storage, sized to the live range.
    ///
    /// A failure, allocation or a panicking element clone, leaves `self`
    /// untouched and releases everything built so far.
    pub fn try_clone(&self) -> Result<DynArray<T>, StorageError>
    where
        T: Clone,
    {
        let mut storage = RawStorage::with_capacity(self.len)?;
        unsafe { clone_batch(self.storage.as_ptr(), storage.as_mut_ptr(), self.len) };
        Ok(DynArray {
            storage,
            len: self.len,
        })
    }

    /// Overwrites `self` with a deep copy of `other`.
    ///
    /// When `other` does not fit the current block, a full replacement is
    /// built and swapped in, so failure leaves `self` untouched. When it
    /// does fit, the block is reused: the overlapping prefix is clone-assigned
    /// element by element and only the tail is constructed or dropped. A
    /// panicking clone-assignment in that branch can leave already-visited
    /// elements overwritten, but the length always matches the constructed
    /// range.
    pub fn clone_from(&mut self, other: &DynArray<T>) -> Result<(), StorageError>
    where
        T: Clone,
    {
        if other.len > self.storage.capacity() {
            let mut replacement = other.try_clone()?;
            self.swap(&mut replacement);
            return Ok(());
        }
        let overlap = self.len.min(other.len);
        unsafe {
            let dst = self.storage.as_mut_ptr();
            let src = other.storage.as_ptr();
            for i in 0..overlap {
                (*dst.add(i)).clone_from(&*src.add(i));
            }
            if other.len > self.len {
                clone_batch(src.add(overlap), dst.add(overlap), other.len - self.len);
                self.len = other.len;
            } else {
                // Same ordering as resize_with: dead slots stop counting
                // as live before their Drop runs.
                let tail = self.len - other.len;
                self.len = other.len;
                drop_range(dst.add(other.len), tail);
            }
        }
        Ok(())
    }

    /// Moves the contents out in O(1), leaving `self` empty but usable,
    /// with zero capacity.
    pub fn take(&mut self) -> DynArray<T> {
        DynArray {
            storage: mem::replace(&mut self.storage, RawStorage::empty()),
            len: mem::replace(&mut self.len, 0),
        }
    }

    /// Exchanges contents with `other` in O(1).
    pub fn swap(&mut self, other: &mut DynArray<T>) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Drops every element. The block is kept, capacity does not change.
    ///
    /// If an element's `Drop` panics, the elements after it leak instead of
    /// being dropped during unwinding; none are ever dropped twice.
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        unsafe { drop_range(self.storage.as_mut_ptr(), len) };
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            Some(unsafe { self.storage.index(index) })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            Some(unsafe { self.storage.index_mut(index) })
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Forward cursor over the live range.
    pub fn iter(&self) -> Iter<'_, T> {
        unsafe { Iter::new(self.storage.as_ptr(), self.storage.as_ptr().add(self.len)) }
    }

    /// Mutable forward cursor over the live range.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        unsafe {
            let ptr = self.storage.as_mut_ptr();
            IterMut::new(ptr, ptr.add(self.len))
        }
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // Elements first; the storage frees the raw block afterwards.
        unsafe { drop_range(self.storage.as_mut_ptr(), self.len) };
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> DynArray<T> {
        DynArray::new()
    }
}

impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        if index >= self.len {
            panic!("index {} out of bounds for length {}", index, self.len);
        }
        unsafe { self.storage.index(index) }
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        if index >= self.len {
            panic!("index {} out of bounds for length {}", index, self.len);
        }
        unsafe { self.storage.index_mut(index) }
    }
}

impl<T: Debug> Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &DynArray<T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq> PartialEq<[T]> for DynArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

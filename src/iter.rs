use std::marker::PhantomData;
use std::mem;

/// Forward cursor over a live element range, a begin/end pointer pair.
///
/// Invalidated, like any raw cursor into contiguous storage, by operations
/// that reallocate or shift the range; the borrow it holds on the array
/// prevents that statically.
pub struct Iter<'a, T> {
    ptr: *const T,
    end: *const T,
    _marker: PhantomData<&'a T>,
}

/// Mutable variant of [`Iter`].
pub struct IterMut<'a, T> {
    ptr: *mut T,
    end: *mut T,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> Iter<'a, T> {
    /// # Safety
    ///
    /// `[ptr, end)` must be a live element range outliving `'a`.
    pub(crate) unsafe fn new(ptr: *const T, end: *const T) -> Iter<'a, T> {
        Iter {
            ptr,
            end,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> IterMut<'a, T> {
    /// # Safety
    ///
    /// `[ptr, end)` must be a live element range outliving `'a`, with no
    /// other reference into it.
    pub(crate) unsafe fn new(ptr: *mut T, end: *mut T) -> IterMut<'a, T> {
        IterMut {
            ptr,
            end,
            _marker: PhantomData,
        }
    }
}

fn remaining<T>(ptr: *const T, end: *const T) -> usize {
    if mem::size_of::<T>() == 0 {
        0
    } else {
        (end as usize - ptr as usize) / mem::size_of::<T>()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ptr == self.end {
            None
        } else {
            let item = unsafe { &*self.ptr };
            self.ptr = unsafe { self.ptr.add(1) };
            Some(item)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = remaining(self.ptr, self.end);
        (len, Some(len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.ptr == self.end {
            None
        } else {
            self.end = unsafe { self.end.sub(1) };
            Some(unsafe { &*self.end })
        }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ptr == self.end {
            None
        } else {
            let item = unsafe { &mut *self.ptr };
            self.ptr = unsafe { self.ptr.add(1) };
            Some(item)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = remaining(self.ptr, self.end);
        (len, Some(len))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.ptr == self.end {
            None
        } else {
            self.end = unsafe { self.end.sub(1) };
            Some(unsafe { &mut *self.end })
        }
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

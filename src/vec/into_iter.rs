use core::fmt;
use core::iter::FusedIterator;
use core::ops::Range;
use core::ptr;
use core::slice;

use crate::alloc::Allocator;
use crate::storage::{destroy, FatBuffer};

/// An iterator which moves the elements out of a `Vec`.
///
/// Elements which are not consumed are dropped with the iterator, and the
/// storage is then released to the vector's allocator.
pub struct IntoIter<T, A: Allocator> {
    // slots in `live` still hold initialized elements
    live: Range<usize>,
    buf: FatBuffer<T, A>,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(super) fn new(mut buf: FatBuffer<T, A>) -> Self {
        let live = 0..buf.length();
        // SAFETY: the elements are owned by the iterator from here on
        unsafe { buf.set_length(0) };
        Self { live, buf }
    }

    /// The allocator which will receive the storage.
    pub fn allocator(&self) -> &A {
        &self.buf.alloc
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.data_ptr().add(self.live.start), self.len()) }
    }

    /// The elements not yet yielded, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        unsafe { slice::from_raw_parts_mut(self.buf.data_ptr_mut().add(self.live.start), len) }
    }

    /// Check whether every element has been yielded.
    pub const fn is_empty(&self) -> bool {
        self.live.start == self.live.end
    }

    /// The number of elements not yet yielded.
    pub const fn len(&self) -> usize {
        self.live.end - self.live.start
    }

    #[inline]
    unsafe fn read(&self, index: usize) -> T {
        ptr::read(self.buf.data_ptr().add(index))
    }
}

impl<T, A: Allocator> AsRef<[T]> for IntoIter<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> AsMut<[T]> for IntoIter<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let index = self.live.next()?;
        Some(unsafe { self.read(index) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.live.size_hint()
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        let index = self.live.next_back()?;
        Some(unsafe { self.read(index) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let start = self.live.start;
        let count = self.len();
        self.live.start = self.live.end;
        if count > 0 {
            unsafe { destroy(self.buf.data_ptr_mut().add(start), count) };
        }
    }
}

unsafe impl<T: Send, A: Allocator + Send> Send for IntoIter<T, A> {}

unsafe impl<T: Sync, A: Allocator + Sync> Sync for IntoIter<T, A> {}

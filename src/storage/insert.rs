use core::mem::ManuallyDrop;

use super::{destroy, relocate, FatBuffer};
use crate::alloc::Allocator;

/// A guard over a gap of uninitialized slots opened within a buffer.
///
/// Elements following the gap are held by the guard until it completes. If
/// the guard is dropped early, for instance while unwinding from a panicking
/// constructor, the elements it constructed are destroyed and the held
/// elements are moved back, leaving the buffer with its previous contents.
pub(crate) struct Inserter<'a, T> {
    data: *mut T,
    length: &'a mut usize,
    start: usize,
    pos: usize,
    end: usize,
    tail: usize,
}

impl<'a, T> Inserter<'a, T> {
    /// Open a gap of `count` slots at `index`, moving the elements at and
    /// after `index` up by `count` slots.
    #[inline]
    pub fn new<A: Allocator>(buf: &'a mut FatBuffer<T, A>, index: usize, count: usize) -> Self {
        let len = buf.header.length;
        assert!(index <= len && count <= buf.header.capacity - len);
        let data = buf.data.as_ptr();
        let tail = len - index;
        if count > 0 {
            unsafe { relocate(data.add(index), data.add(index + count), tail) };
        }
        buf.header.length = index;
        Self {
            data,
            length: &mut buf.header.length,
            start: index,
            pos: index,
            end: index + count,
            tail,
        }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    #[inline]
    pub fn push(&mut self, val: T) {
        assert!(self.pos < self.end);
        unsafe { self.data.add(self.pos).write(val) };
        self.pos += 1;
    }

    #[inline]
    pub fn push_with(&mut self, f: impl FnOnce() -> T) {
        assert!(self.pos < self.end);
        let val = f();
        unsafe { self.data.add(self.pos).write(val) };
        self.pos += 1;
    }

    #[inline]
    pub fn push_iter(&mut self, iter: &mut impl Iterator<Item = T>) {
        while self.pos < self.end {
            if let Some(item) = iter.next() {
                unsafe { self.data.add(self.pos).write(item) };
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    #[inline]
    pub fn push_repeat(&mut self, val: &T, count: usize)
    where
        T: Clone,
    {
        assert!(self.remaining() >= count);
        for _ in 0..count {
            unsafe { self.data.add(self.pos).write(val.clone()) };
            self.pos += 1;
        }
    }

    #[inline]
    pub fn push_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        assert!(self.remaining() >= items.len());
        for item in items {
            unsafe { self.data.add(self.pos).write(item.clone()) };
            self.pos += 1;
        }
    }

    /// Successfully complete the insertion. Unfilled slots of the gap are
    /// closed by moving the held elements down. Returns the new length of
    /// the buffer.
    #[inline]
    pub fn complete(self) -> usize {
        let mut slf = ManuallyDrop::new(self);
        if slf.pos < slf.end {
            unsafe { relocate(slf.data.add(slf.end), slf.data.add(slf.pos), slf.tail) };
        }
        let len = slf.pos + slf.tail;
        *slf.length = len;
        len
    }
}

impl<T> Drop for Inserter<'_, T> {
    fn drop(&mut self) {
        unsafe {
            destroy(self.data.add(self.start), self.pos - self.start);
            relocate(self.data.add(self.end), self.data.add(self.start), self.tail);
        }
        *self.length = self.start + self.tail;
    }
}

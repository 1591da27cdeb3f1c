use core::alloc::Layout;
use core::fmt;
use core::ptr::{self, NonNull};
use core::slice;

use const_default::ConstDefault;

use crate::alloc::{Allocator, AllocatorDefault};
use crate::capacity::max_capacity;
use crate::error::StorageError;

/// Compute the layout of an array of `capacity` elements of type `T`.
#[inline]
pub(crate) fn array_layout<T>(capacity: usize) -> Result<Layout, StorageError> {
    if capacity > max_capacity::<T>() {
        return Err(StorageError::LengthExceeded);
    }
    Ok(Layout::array::<T>(capacity)?)
}

/// The header associated with each buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct VecHeader {
    /// The number of slots in the allocation.
    pub capacity: usize,
    /// The number of initialized slots at the start of the allocation.
    pub length: usize,
}

impl VecHeader {
    pub const EMPTY: Self = Self {
        capacity: 0,
        length: 0,
    };
}

/// A slice allocation handle which stores the header metadata in the handle.
///
/// A buffer with zero capacity holds no allocation and a dangling data
/// pointer. Any other capacity is backed by a block obtained from `alloc`
/// using the layout of exactly `capacity` elements, which is released to the
/// same allocator instance when the buffer is relocated or dropped.
pub(crate) struct FatBuffer<T, A: Allocator> {
    pub(crate) header: VecHeader,
    pub(crate) data: NonNull<T>,
    pub(crate) alloc: A,
}

impl<T, A: Allocator> FatBuffer<T, A> {
    #[inline]
    pub(crate) const fn dangling(alloc: A) -> Self {
        Self {
            header: VecHeader::EMPTY,
            data: NonNull::dangling(),
            alloc,
        }
    }

    #[inline]
    pub(crate) fn allocate_in(capacity: usize, alloc: A) -> Result<Self, StorageError> {
        let mut buf = Self::dangling(alloc);
        buf.relocate(capacity)?;
        Ok(buf)
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.header.capacity
    }

    #[inline]
    pub(crate) fn length(&self) -> usize {
        self.header.length
    }

    /// Set the number of initialized elements.
    ///
    /// # Safety
    /// The first `len` slots must be initialized and `len` must not exceed
    /// the capacity.
    #[inline]
    pub(crate) unsafe fn set_length(&mut self, len: usize) {
        debug_assert!(len <= self.header.capacity);
        self.header.length = len;
    }

    #[inline]
    pub(crate) fn has_storage(&self) -> bool {
        self.header.capacity != 0
    }

    #[inline]
    pub(crate) fn data_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline]
    pub(crate) fn data_ptr_mut(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.data_ptr(), self.header.length) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.data_ptr_mut(), self.header.length) }
    }

    /// Move the live elements into a new allocation of exactly `capacity`
    /// slots and release the previous allocation. A capacity of zero
    /// releases the storage entirely.
    ///
    /// On failure the buffer is unchanged.
    pub(crate) fn relocate(&mut self, capacity: usize) -> Result<(), StorageError> {
        let length = self.header.length;
        debug_assert!(capacity >= length);
        if capacity == self.header.capacity {
            return Ok(());
        }
        let data = if capacity == 0 {
            NonNull::dangling()
        } else {
            let layout = array_layout::<T>(capacity)?;
            let ptr = self
                .alloc
                .allocate(layout)
                .map_err(|_| StorageError::AllocError(layout))?;
            let data = ptr.cast::<T>();
            if length > 0 {
                unsafe { ptr::copy_nonoverlapping(self.data.as_ptr(), data.as_ptr(), length) };
            }
            data
        };
        self.release();
        self.data = data;
        self.header.capacity = capacity;
        Ok(())
    }

    /// Return the allocation to the allocator without touching the elements.
    #[inline]
    fn release(&mut self) {
        if self.has_storage() {
            // the layout was validated when the allocation was produced
            if let Ok(layout) = array_layout::<T>(self.header.capacity) {
                unsafe { self.alloc.deallocate(self.data.cast(), layout) };
            }
            self.data = NonNull::dangling();
            self.header.capacity = 0;
        }
    }
}

impl<T, A: AllocatorDefault> ConstDefault for FatBuffer<T, A> {
    const DEFAULT: Self = Self::dangling(A::DEFAULT);
}

impl<T, A: Allocator + fmt::Debug> fmt::Debug for FatBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatBuffer")
            .field("header", &self.header)
            .field("data", &self.data)
            .field("alloc", &self.alloc)
            .finish()
    }
}

impl<T, A: Allocator> Drop for FatBuffer<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

//! Backing storage for collections.
//!
//! The buffer owns uninitialized slots obtained from an allocator. Elements
//! are constructed into slots, relocated between slots, and destroyed in
//! place by the primitives in this module.

use core::ptr;

mod alloc;
mod insert;

pub(crate) use self::{
    alloc::FatBuffer,
    insert::Inserter,
};

/// Move `count` elements from `src` into the slots at `dst`. The ranges may
/// overlap. The source slots are left logically uninitialized.
///
/// # Safety
/// Both ranges must lie within the same allocation, the source elements must
/// be initialized, and the destination slots not overlapping the source must
/// not hold live elements.
#[inline]
pub(crate) unsafe fn relocate<T>(src: *const T, dst: *mut T, count: usize) {
    if count > 0 {
        ptr::copy(src, dst, count);
    }
}

/// Drop `count` initialized elements starting at `data`, leaving the slots
/// uninitialized.
///
/// # Safety
/// The range must contain initialized elements which are not used afterward.
#[inline]
pub(crate) unsafe fn destroy<T>(data: *mut T, count: usize) {
    if count > 0 {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(data, count));
    }
}

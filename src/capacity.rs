//! Growth behavior and capacity limits of collections.

use core::fmt::Debug;
use core::mem::size_of;

/// The largest number of elements of type `T` a single allocation may hold.
///
/// An allocation can never exceed `isize::MAX` bytes. Zero-sized types are
/// limited only by the range of `usize`.
#[inline]
pub const fn max_capacity<T>() -> usize {
    let size = size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

/// Growth behavior for collections which have exceeded their available storage
pub trait Grow: Debug {
    /// Calculate the next capacity to request from the allocator, given the
    /// current capacity and the minimum number of elements which must fit.
    fn next_capacity<T>(prev: usize, minimum: usize) -> usize;
}

/// Growth behavior which never requests extra capacity
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowExact;

impl Grow for GrowExact {
    #[inline]
    fn next_capacity<T>(_prev: usize, minimum: usize) -> usize {
        minimum
    }
}

/// Growth behavior which consistently doubles in size.
///
/// An empty collection grows to a capacity of one. The result never falls
/// below the requested minimum, so a large reservation is satisfied by a
/// single allocation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowDoubling;

impl Grow for GrowDoubling {
    #[inline]
    fn next_capacity<T>(prev: usize, minimum: usize) -> usize {
        let preferred = if prev == 0 {
            1
        } else {
            prev.saturating_mul(2)
        };
        preferred.max(minimum).min(max_capacity::<T>().max(minimum))
    }
}

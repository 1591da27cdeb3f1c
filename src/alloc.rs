//! Support for memory allocation.

use core::alloc::Layout;
use core::fmt;
#[cfg(not(feature = "allocator-api2"))]
use core::ptr;
use core::ptr::NonNull;
#[cfg(feature = "zeroize")]
use core::slice;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
use core::mem::transmute;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
use alloc_crate::alloc::{alloc as raw_alloc, dealloc as raw_dealloc};

#[cfg(all(feature = "alloc", feature = "allocator-api2"))]
pub use allocator_api2::alloc::Global;
#[cfg(feature = "allocator-api2")]
pub use allocator_api2::alloc::{AllocError, Allocator};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

#[cfg(all(not(test), feature = "alloc"))]
pub use alloc_crate::alloc::handle_alloc_error;

#[cfg(any(test, not(feature = "alloc")))]
/// Report a failed allocation of `layout` by panicking.
pub fn handle_alloc_error(layout: Layout) -> ! {
    panic!("memory allocation of {} bytes failed", layout.size());
}

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
#[inline]
pub(crate) fn layout_dangling(layout: Layout) -> NonNull<u8> {
    // FIXME: use Layout::dangling when stabilized
    // SAFETY: layout alignments are guaranteed to be non-zero.
    #[allow(clippy::useless_transmute)]
    unsafe {
        NonNull::new_unchecked(transmute(layout.align()))
    }
}

/// Returned by an [`Allocator`] which could not satisfy a request, whether
/// because memory is exhausted or because the layout is unsupported.
#[cfg(not(feature = "allocator-api2"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocError;

#[cfg(not(feature = "allocator-api2"))]
impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allocator could not satisfy the request")
    }
}

#[cfg(all(feature = "std", not(feature = "allocator-api2")))]
impl std::error::Error for AllocError {}

/// A source of memory blocks for vector storage.
///
/// A vector only ever asks for array layouts of its element type, and always
/// returns a block to the same allocator instance which produced it, using
/// the layout it was requested with.
///
/// # Safety
/// A block returned by `allocate` must be at least `layout.size()` bytes
/// long and aligned to `layout.align()`. It must stay valid until it is
/// passed to `deallocate`, or until the allocator and all of its clones are
/// dropped, and moving the allocator must not affect it.
#[cfg(not(feature = "allocator-api2"))]
pub unsafe trait Allocator {
    /// Obtain a block of memory fitting `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError>;

    /// Return a block to this allocator.
    ///
    /// # Safety
    /// `ptr` must have been produced by `allocate` on this instance (or a
    /// clone of it) with the same `layout`, and must not be used afterward.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Obtain a block of memory fitting `layout`, filled with zeroes.
    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let ptr = self.allocate(layout)?;
        // SAFETY: the result of `allocate` must be properly aligned
        unsafe { ptr::write_bytes(ptr.cast::<u8>().as_ptr(), 0, ptr.len()) };
        Ok(ptr)
    }

    /// Borrow this allocator, for use where an owned allocator is expected.
    #[inline(always)]
    fn by_ref(&self) -> &Self
    where
        Self: Sized,
    {
        self
    }
}

#[cfg(not(feature = "allocator-api2"))]
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}

/// An allocator with a constant default instance, allowing `Vec::new` to be
/// a `const fn`. `ConstDefault` is not implemented for the `allocator-api2`
/// `Global`, hence a separate trait.
pub trait AllocatorDefault: Allocator + Clone + Default {
    /// The default instance.
    const DEFAULT: Self;
}

/// The process-wide allocator.
///
/// With the `alloc` feature, requests are forwarded to the
/// `#[global_allocator]`. Zero-sized requests never reach it and produce a
/// dangling, well-aligned pointer.
#[cfg(any(not(feature = "alloc"), not(feature = "allocator-api2")))]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "alloc", derive(Default, Copy))]
pub struct Global;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let ptr = if layout.size() == 0 {
            layout_dangling(layout)
        } else {
            let Some(ptr) = NonNull::new(unsafe { raw_alloc(layout) }) else {
                return Err(AllocError);
            };
            ptr
        };
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() > 0 {
            raw_dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(not(feature = "alloc"))]
// `Global` remains the default type parameter without the `alloc` feature,
// but cannot allocate.
unsafe impl Allocator for Global {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        unimplemented!();
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unimplemented!();
    }
}

#[cfg(feature = "alloc")]
impl AllocatorDefault for Global {
    const DEFAULT: Self = Global;
}

/// Select the allocator instance used by a copy of a container.
///
/// A vector is always moved together with its allocator. When a vector is
/// cloned, or when one vector is assigned a copy of another, the propagation
/// policy decides whether the destination clones the source's allocator,
/// keeps its own, or starts from a fresh default instance.
pub trait Propagate<A>: fmt::Debug {
    /// The allocator for a new container cloned from one using `source`.
    fn select_on_clone(source: &A) -> A;

    /// The allocator to adopt when a container is assigned a copy of one
    /// using `source`. `None` keeps the destination's current allocator.
    fn select_on_clone_from(source: &A) -> Option<A>;
}

/// Clone the source allocator on copy construction and on copy assignment.
///
/// For allocator handles which are references or shared pointers, the copy
/// shares the source's allocation strategy.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Share;

impl<A: Clone> Propagate<A> for Share {
    #[inline]
    fn select_on_clone(source: &A) -> A {
        source.clone()
    }

    #[inline]
    fn select_on_clone_from(source: &A) -> Option<A> {
        Some(source.clone())
    }
}

/// Clone the source allocator on copy construction, but keep the
/// destination's allocator on copy assignment.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Retain;

impl<A: Clone> Propagate<A> for Retain {
    #[inline]
    fn select_on_clone(source: &A) -> A {
        source.clone()
    }

    #[inline]
    fn select_on_clone_from(_source: &A) -> Option<A> {
        None
    }
}

/// Start every copy from a default allocator instance, and keep the
/// destination's allocator on copy assignment.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Reset;

impl<A: Default> Propagate<A> for Reset {
    #[inline]
    fn select_on_clone(_source: &A) -> A {
        A::default()
    }

    #[inline]
    fn select_on_clone_from(_source: &A) -> Option<A> {
        None
    }
}

#[cfg(feature = "zeroize")]
/// Wrap an allocator `A`, overwriting every block with zeroes before it is
/// returned to `A`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroizingAlloc<A>(pub A);

#[cfg(feature = "zeroize")]
unsafe impl<A: Allocator> Allocator for ZeroizingAlloc<A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.0.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() > 0 {
            let mem = slice::from_raw_parts_mut(ptr.as_ptr(), layout.size());
            mem.zeroize();
        }
        self.0.deallocate(ptr, layout)
    }
}

#[cfg(feature = "zeroize")]
impl<A: AllocatorDefault> AllocatorDefault for ZeroizingAlloc<A> {
    const DEFAULT: Self = ZeroizingAlloc(A::DEFAULT);
}

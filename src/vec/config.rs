//! `Vec` configuration types and trait definitions.

use core::fmt;
use core::marker::PhantomData;

use const_default::ConstDefault;

use crate::alloc::{Allocator, AllocatorDefault, Retain};
use crate::capacity::{Grow, GrowDoubling};

/// Define the associated types for `Vec` instances.
///
/// Any allocator type is a configuration on its own, using doubling growth
/// and the [`Retain`] propagation policy. Use [`Custom`] to select other
/// behaviors.
pub trait VecConfig {
    /// The allocator type.
    type Alloc: Allocator;

    /// The growth strategy.
    type Grow: Grow;

    /// The allocator propagation policy applied when cloning, normally an
    /// implementation of [`Propagate`](crate::alloc::Propagate).
    type Propagate;
}

impl<A: Allocator> VecConfig for A {
    type Alloc = A;
    type Grow = GrowDoubling;
    type Propagate = Retain;
}

/// Support creation of a new `Vec` instance from a configuration instance.
pub trait VecNewIn {
    /// The associated `Vec` configuration type.
    type Config: VecConfig;

    /// Obtain the allocator instance for the new `Vec`.
    fn into_alloc(self) -> <Self::Config as VecConfig>::Alloc;
}

impl<A: Allocator> VecNewIn for A {
    type Config = A;

    #[inline]
    fn into_alloc(self) -> A {
        self
    }
}

/// Parameterize `Vec` with a custom growth behavior or propagation policy.
///
/// ```
/// use flex_vec::alloc::{Global, Share};
/// use flex_vec::capacity::GrowExact;
/// use flex_vec::vec::{Custom, Vec};
///
/// let mut v = Vec::<u8, Custom<Global, GrowExact, Share>>::new();
/// v.push(1);
/// v.push(2);
/// assert_eq!(v.capacity(), 2);
/// ```
pub struct Custom<A, G: Grow = GrowDoubling, P = Retain> {
    alloc: A,
    _pd: PhantomData<(G, P)>,
}

impl<A, G: Grow, P> Custom<A, G, P> {
    /// Create a configuration instance wrapping an allocator.
    #[inline]
    pub const fn new(alloc: A) -> Self {
        Self {
            alloc,
            _pd: PhantomData,
        }
    }
}

impl<A: Clone, G: Grow, P> Clone for Custom<A, G, P> {
    fn clone(&self) -> Self {
        Self::new(self.alloc.clone())
    }
}

impl<A: AllocatorDefault, G: Grow, P> ConstDefault for Custom<A, G, P> {
    const DEFAULT: Self = Self::new(A::DEFAULT);
}

impl<A: Default, G: Grow, P> Default for Custom<A, G, P> {
    #[inline]
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A: fmt::Debug, G: Grow, P> fmt::Debug for Custom<A, G, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("alloc", &self.alloc)
            .field("grow", &core::any::type_name::<G>())
            .field("propagate", &core::any::type_name::<P>())
            .finish()
    }
}

impl<A: Allocator, G: Grow, P> VecConfig for Custom<A, G, P> {
    type Alloc = A;
    type Grow = G;
    type Propagate = P;
}

impl<A: Allocator, G: Grow, P> VecNewIn for Custom<A, G, P> {
    type Config = Self;

    #[inline]
    fn into_alloc(self) -> A {
        self.alloc
    }
}

//! A growable vector with pluggable allocators and validated positions.
//!
//! [`Vec`](crate::vec::Vec) owns a single contiguous buffer obtained from an
//! [`Allocator`](crate::alloc::Allocator) instance. The allocator, the growth
//! strategy and the allocator propagation rule applied when a vector is
//! cloned are selected at the type level through [`VecConfig`](crate::vec::VecConfig).
//!
//! Every operation which may allocate comes in two forms: a `try_*` form
//! returning a [`StorageError`], and a plain form which panics on failure.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc as alloc_crate;

pub mod alloc;

pub mod capacity;

pub(crate) mod error;

pub(crate) mod storage;

pub mod vec;

pub use self::error::{StorageError, UpdateError};

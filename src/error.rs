//! Error handling.

use core::alloc::{Layout, LayoutError};
use core::fmt;

/// An enumeration of error types raised by vector operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// A memory allocation failed.
    AllocError(Layout),
    /// A checked access referred to an index outside of the live elements.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the vector at the time of the access.
        len: usize,
    },
    /// The requested element count cannot be represented by an allocation.
    LengthExceeded,
    /// An element was requested from an empty vector.
    EmptyContainer,
    /// A position was issued by another vector, or before the elements
    /// of its vector were moved.
    StalePosition,
}

impl StorageError {
    /// Generic description of this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocError(_) => "Allocation error",
            Self::OutOfRange { .. } => "Index out of range",
            Self::LengthExceeded => "Exceeded maximum length",
            Self::EmptyContainer => "Empty container",
            Self::StalePosition => "Stale position",
        }
    }

    /// Generate a panic with this error as the reason.
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        if let Self::AllocError(layout) = self {
            crate::alloc::handle_alloc_error(layout);
        } else {
            panic!("{}", self)
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "{}: index {} for length {}", self.as_str(), index, len)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

// Array layouts only fail when the byte size overflows `isize`.
impl From<LayoutError> for StorageError {
    fn from(_err: LayoutError) -> Self {
        Self::LengthExceeded
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// The failure of an operation which was handed ownership of a value.
/// The value is returned to the caller together with the cause, and the
/// vector is left as it was before the call.
#[derive(Clone)]
pub struct UpdateError<T> {
    pub(crate) error: StorageError,
    pub(crate) value: T,
}

impl<T> UpdateError<T> {
    pub(crate) fn new(error: StorageError, value: T) -> Self {
        Self { error, value }
    }

    /// Generic description of this error.
    pub fn as_str(&self) -> &'static str {
        "Update error"
    }

    /// The reason the value could not be stored.
    pub fn error(&self) -> &StorageError {
        &self.error
    }

    /// Recover the value which could not be stored.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Split into the cause and the rejected value.
    pub fn into_parts(self) -> (StorageError, T) {
        (self.error, self.value)
    }

    /// Panic with the underlying cause, dropping the value.
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        self.error.panic()
    }
}

impl<T> fmt::Debug for UpdateError<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for UpdateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.as_str(), self.error)
    }
}

impl<T> From<UpdateError<T>> for StorageError {
    #[inline]
    fn from(err: UpdateError<T>) -> Self {
        err.error
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for UpdateError<T> {}

//! Validated element positions.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use core::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::error::StorageError;

static NEXT_OWNER: AtomicUsize = AtomicUsize::new(1);

/// A position within a specific `Vec`.
///
/// Positions are plain values: they remain usable as long as the vector
/// which produced them does not move or remove elements. Any reallocation,
/// insertion, erasure, truncation or assignment makes previously issued
/// positions stale, and using a stale position (or one issued by another
/// vector) through [`Vec::get_at`](super::Vec::get_at) or the positional
/// mutators reports [`StorageError::StalePosition`] instead of touching
/// moved elements.
///
/// Positions support arithmetic by signed offsets. Ordering and distance
/// are only defined between positions issued by the same vector in the
/// same state.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    owner: usize,
    epoch: usize,
    index: usize,
}

impl Position {
    /// The element index this position refers to.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The position of the following element.
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        self + 1
    }

    /// The position of the preceding element.
    #[inline]
    #[must_use]
    pub fn prev(self) -> Self {
        self - 1
    }

    /// The signed distance from `origin` to this position, or `None` if the
    /// positions were not issued by the same vector in the same state.
    #[inline]
    pub fn offset_from(self, origin: Self) -> Option<isize> {
        if self.same_origin(&origin) {
            Some(self.index.wrapping_sub(origin.index) as isize)
        } else {
            None
        }
    }

    #[inline]
    fn same_origin(&self, other: &Self) -> bool {
        self.owner == other.owner && self.epoch == other.epoch
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("index", &self.index)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.same_origin(other) {
            Some(self.index.cmp(&other.index))
        } else {
            None
        }
    }
}

impl Add<isize> for Position {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: isize) -> Self {
        self.index = self.index.wrapping_add_signed(rhs);
        self
    }
}

impl Sub<isize> for Position {
    type Output = Self;

    #[inline]
    fn sub(mut self, rhs: isize) -> Self {
        self.index = self.index.wrapping_add_signed(rhs.wrapping_neg());
        self
    }
}

impl AddAssign<isize> for Position {
    #[inline]
    fn add_assign(&mut self, rhs: isize) {
        *self = *self + rhs;
    }
}

impl SubAssign<isize> for Position {
    #[inline]
    fn sub_assign(&mut self, rhs: isize) {
        *self = *self - rhs;
    }
}

/// Issues and validates the positions of a single vector.
pub(crate) struct Tracker {
    // zero until the first position is issued
    owner: AtomicUsize,
    epoch: usize,
}

impl Tracker {
    #[inline]
    pub const fn new() -> Self {
        Self {
            owner: AtomicUsize::new(0),
            epoch: 0,
        }
    }

    fn owner(&self) -> usize {
        let id = self.owner.load(AtomicOrdering::Relaxed);
        if id != 0 {
            return id;
        }
        let fresh = NEXT_OWNER.fetch_add(1, AtomicOrdering::Relaxed);
        match self.owner.compare_exchange(
            0,
            fresh,
            AtomicOrdering::Relaxed,
            AtomicOrdering::Relaxed,
        ) {
            Ok(_) => fresh,
            Err(current) => current,
        }
    }

    #[inline]
    pub fn position(&self, index: usize) -> Position {
        Position {
            owner: self.owner(),
            epoch: self.epoch,
            index,
        }
    }

    /// Mark all previously issued positions as stale.
    #[inline]
    pub fn invalidate(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Resolve a position issued by this tracker to its index.
    #[inline]
    pub fn resolve(&self, pos: Position) -> Result<usize, StorageError> {
        if pos.owner == self.owner.load(AtomicOrdering::Relaxed) && pos.epoch == self.epoch {
            Ok(pos.index)
        } else {
            Err(StorageError::StalePosition)
        }
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let t = Tracker::new();
        let begin = t.position(0);
        let pos = begin + 3;
        assert_eq!(pos.index(), 3);
        assert_eq!(pos.prev().index(), 2);
        assert_eq!(pos.next().index(), 4);
        assert_eq!(pos.offset_from(begin), Some(3));
        assert_eq!(begin.offset_from(pos), Some(-3));
        let mut p = pos;
        p -= 2;
        p += 1;
        assert_eq!(p, begin + 2);
        assert!(begin < pos);
    }

    #[test]
    fn invalidate_makes_stale() {
        let mut t = Tracker::new();
        let pos = t.position(1);
        assert_eq!(t.resolve(pos), Ok(1));
        t.invalidate();
        assert_eq!(t.resolve(pos), Err(StorageError::StalePosition));
        assert_eq!(t.position(1).partial_cmp(&pos), None);
        assert_eq!(t.position(1).offset_from(pos), None);
    }

    #[test]
    fn foreign_position() {
        let a = Tracker::new();
        let b = Tracker::new();
        let pos = a.position(0);
        assert_eq!(b.resolve(pos), Err(StorageError::StalePosition));
        b.position(0);
        assert_eq!(b.resolve(pos), Err(StorageError::StalePosition));
        assert_ne!(a.position(0), b.position(0));
    }
}

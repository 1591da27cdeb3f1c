//! Support for generic vector structures.

use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut, Index, IndexMut};
use core::ptr::{self, NonNull};
use core::slice::SliceIndex;

use const_default::ConstDefault;

use crate::alloc::{AllocatorDefault, Global, Propagate};
use crate::capacity::{max_capacity, Grow};
use crate::error::{StorageError, UpdateError};
use crate::storage::{destroy, relocate, FatBuffer, Inserter};

use self::position::Tracker;

pub use self::{
    config::{Custom, VecConfig, VecNewIn},
    into_iter::IntoIter,
    position::Position,
};

mod config;
mod into_iter;
mod position;

#[macro_use]
mod macros;

#[cfg(feature = "zeroize")]
/// A `Vec` which automatically zeroizes its buffer when it is released.
pub type ZeroizingVec<T> = Vec<T, crate::alloc::ZeroizingAlloc<Global>>;

#[cfg(feature = "alloc")]
#[inline]
/// Create a `Vec<T>` from an array `[T; N]`.
pub fn from_array<T, const N: usize>(data: [T; N]) -> Vec<T> {
    from_array_in(data, Global)
}

#[inline]
/// Create a `Vec<T, C>` from an array `[T; N]` and an instance of `VecNewIn`.
pub fn from_array_in<T, C, const N: usize>(data: [T; N], alloc_in: C) -> Vec<T, C::Config>
where
    C: VecNewIn,
{
    let mut vec = Vec::with_capacity_in(N, alloc_in);
    vec.extend(data);
    vec
}

#[cfg(feature = "alloc")]
#[inline]
/// Create a `Vec<T>` from a cloneable element T and a count of the number of elements.
pub fn from_elem<T: Clone>(elem: T, count: usize) -> Vec<T> {
    Vec::from_elem(elem, count)
}

#[inline]
/// Create a `Vec<T, C>` from a cloneable element T, a count of the number of elements,
/// and an instance of `VecNewIn`.
pub fn from_elem_in<T, C>(elem: T, count: usize, alloc_in: C) -> Vec<T, C::Config>
where
    T: Clone,
    C: VecNewIn,
{
    Vec::from_elem_in(elem, count, alloc_in)
}

/// A growable, contiguous sequence of elements stored in a single
/// allocation obtained from the configured allocator.
///
/// Elements occupy the first `len()` slots of the allocation. Growth
/// relocates every element into a new allocation sized by the configured
/// [`Grow`] strategy and releases the previous allocation to the same
/// allocator instance. The allocator travels with the vector when it is
/// moved; when cloned, the configured propagation policy selects the
/// allocator for the copy.
///
/// Element positions handed out by [`begin`](Self::begin), [`end`](Self::end)
/// and the positional mutators are validated on use; see [`Position`].
pub struct Vec<T, C: VecConfig = Global> {
    buffer: FatBuffer<T, C::Alloc>,
    tracker: Tracker,
}

impl<T, C: VecConfig> Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    /// Constructs a new, empty `Vec<T, C>`.
    ///
    /// The vector will not allocate until elements are pushed onto it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flex_vec::vec::Vec;
    ///
    /// let vec: Vec<i32> = Vec::new();
    /// assert_eq!(vec.capacity(), 0);
    /// assert!(vec.storage_ptr().is_none());
    /// ```
    pub const fn new() -> Self {
        Self {
            buffer: FatBuffer::DEFAULT,
            tracker: Tracker::new(),
        }
    }

    /// Constructs a new, empty `Vec<T, C>` with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a new, empty `Vec<T, C>` with room for exactly `capacity` elements.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        Self::try_with_capacity_alloc(capacity, C::Alloc::DEFAULT)
    }

    /// Constructs a `Vec<T, C>` holding `count` default-constructed elements.
    pub fn from_default(count: usize) -> Self
    where
        T: Default,
    {
        match Self::try_from_default(count) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a `Vec<T, C>` holding `count` default-constructed elements.
    pub fn try_from_default(count: usize) -> Result<Self, StorageError>
    where
        T: Default,
    {
        Self::try_from_default_alloc(count, C::Alloc::DEFAULT)
    }

    /// Constructs a `Vec<T, C>` holding `count` copies of `value`.
    pub fn from_elem(value: T, count: usize) -> Self
    where
        T: Clone,
    {
        match Self::try_from_elem(value, count) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a `Vec<T, C>` holding `count` copies of `value`.
    pub fn try_from_elem(value: T, count: usize) -> Result<Self, StorageError>
    where
        T: Clone,
    {
        Self::try_from_elem_alloc(value, count, C::Alloc::DEFAULT)
    }

    /// Constructs a `Vec<T, C>` holding clones of the elements of `data`.
    pub fn from_slice(data: &[T]) -> Self
    where
        T: Clone,
    {
        match Self::try_from_slice(data) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a `Vec<T, C>` holding clones of the elements of `data`.
    pub fn try_from_slice(data: &[T]) -> Result<Self, StorageError>
    where
        T: Clone,
    {
        Self::try_from_slice_alloc(data, C::Alloc::DEFAULT)
    }

    /// Constructs a `Vec<T, C>` of `count` elements produced by calling `f`
    /// with each index in turn. The first error produced by `f` is returned
    /// after dropping the elements constructed so far.
    pub fn try_from_fn<E, F>(count: usize, f: F) -> Result<Self, E>
    where
        E: From<StorageError>,
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_from_fn_alloc(count, C::Alloc::DEFAULT, f)
    }

    /// Take the contents of this vector, leaving it empty with a default
    /// allocator instance.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }
}

impl<T, C: VecConfig> Vec<T, C> {
    #[inline]
    fn from_buffer(buffer: FatBuffer<T, C::Alloc>) -> Self {
        Self {
            buffer,
            tracker: Tracker::new(),
        }
    }

    #[inline]
    fn into_inner(self) -> FatBuffer<T, C::Alloc> {
        let me = ManuallyDrop::new(self);
        unsafe { ptr::read(&me.buffer) }
    }

    fn try_with_capacity_alloc(capacity: usize, alloc: C::Alloc) -> Result<Self, StorageError> {
        Ok(Self::from_buffer(FatBuffer::allocate_in(capacity, alloc)?))
    }

    fn try_from_fn_alloc<E, F>(count: usize, alloc: C::Alloc, mut f: F) -> Result<Self, E>
    where
        E: From<StorageError>,
        F: FnMut(usize) -> Result<T, E>,
    {
        let mut vec = Self::try_with_capacity_alloc(count, alloc)?;
        let mut insert = Inserter::new(&mut vec.buffer, 0, count);
        for index in 0..count {
            insert.push(f(index)?);
        }
        insert.complete();
        Ok(vec)
    }

    fn try_from_default_alloc(count: usize, alloc: C::Alloc) -> Result<Self, StorageError>
    where
        T: Default,
    {
        Self::try_from_fn_alloc(count, alloc, |_| Ok::<T, StorageError>(T::default()))
    }

    fn try_from_elem_alloc(value: T, count: usize, alloc: C::Alloc) -> Result<Self, StorageError>
    where
        T: Clone,
    {
        let mut vec = Self::try_with_capacity_alloc(count, alloc)?;
        if count > 0 {
            let mut insert = Inserter::new(&mut vec.buffer, 0, count);
            insert.push_repeat(&value, count - 1);
            insert.push(value);
            insert.complete();
        }
        Ok(vec)
    }

    fn try_from_slice_alloc(data: &[T], alloc: C::Alloc) -> Result<Self, StorageError>
    where
        T: Clone,
    {
        let mut vec = Self::try_with_capacity_alloc(data.len(), alloc)?;
        let mut insert = Inserter::new(&mut vec.buffer, 0, data.len());
        insert.push_slice(data);
        insert.complete();
        Ok(vec)
    }

    /// Constructs a new, empty `Vec<T, C>` using the allocator provided by
    /// `alloc_in`. No storage is allocated.
    pub fn new_in<A>(alloc_in: A) -> Self
    where
        A: VecNewIn<Config = C>,
    {
        Self::from_buffer(FatBuffer::dangling(alloc_in.into_alloc()))
    }

    /// Constructs a new, empty `Vec<T, C>` with room for exactly `capacity`
    /// elements, using the allocator provided by `alloc_in`.
    pub fn with_capacity_in<A>(capacity: usize, alloc_in: A) -> Self
    where
        A: VecNewIn<Config = C>,
    {
        match Self::try_with_capacity_in(capacity, alloc_in) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a new, empty `Vec<T, C>` with room for exactly
    /// `capacity` elements, using the allocator provided by `alloc_in`.
    pub fn try_with_capacity_in<A>(capacity: usize, alloc_in: A) -> Result<Self, StorageError>
    where
        A: VecNewIn<Config = C>,
    {
        Self::try_with_capacity_alloc(capacity, alloc_in.into_alloc())
    }

    /// Constructs a `Vec<T, C>` holding `count` default-constructed elements.
    pub fn from_default_in<A>(count: usize, alloc_in: A) -> Self
    where
        T: Default,
        A: VecNewIn<Config = C>,
    {
        match Self::try_from_default_in(count, alloc_in) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a `Vec<T, C>` holding `count` default-constructed elements.
    pub fn try_from_default_in<A>(count: usize, alloc_in: A) -> Result<Self, StorageError>
    where
        T: Default,
        A: VecNewIn<Config = C>,
    {
        Self::try_from_default_alloc(count, alloc_in.into_alloc())
    }

    /// Constructs a `Vec<T, C>` holding `count` copies of `value`.
    pub fn from_elem_in<A>(value: T, count: usize, alloc_in: A) -> Self
    where
        T: Clone,
        A: VecNewIn<Config = C>,
    {
        match Self::try_from_elem_in(value, count, alloc_in) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a `Vec<T, C>` holding `count` copies of `value`.
    pub fn try_from_elem_in<A>(value: T, count: usize, alloc_in: A) -> Result<Self, StorageError>
    where
        T: Clone,
        A: VecNewIn<Config = C>,
    {
        Self::try_from_elem_alloc(value, count, alloc_in.into_alloc())
    }

    /// Constructs a `Vec<T, C>` holding clones of the elements of `data`.
    pub fn from_slice_in<A>(data: &[T], alloc_in: A) -> Self
    where
        T: Clone,
        A: VecNewIn<Config = C>,
    {
        match Self::try_from_slice_in(data, alloc_in) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a `Vec<T, C>` holding clones of the elements of `data`.
    pub fn try_from_slice_in<A>(data: &[T], alloc_in: A) -> Result<Self, StorageError>
    where
        T: Clone,
        A: VecNewIn<Config = C>,
    {
        Self::try_from_slice_alloc(data, alloc_in.into_alloc())
    }

    /// Constructs a `Vec<T, C>` of `count` elements produced by calling `f`
    /// with each index in turn, using the allocator provided by `alloc_in`.
    ///
    /// If `f` fails (or panics), the elements constructed so far are dropped
    /// in order and the storage is released before the error is returned.
    ///
    /// ```
    /// use flex_vec::{alloc::Global, vec::Vec, StorageError};
    ///
    /// let res = Vec::<u32>::try_from_fn_in(10, Global, |i| {
    ///     if i == 3 {
    ///         Err(StorageError::EmptyContainer)
    ///     } else {
    ///         Ok(i as u32)
    ///     }
    /// });
    /// assert_eq!(res.err(), Some(StorageError::EmptyContainer));
    /// ```
    pub fn try_from_fn_in<A, E, F>(count: usize, alloc_in: A, f: F) -> Result<Self, E>
    where
        A: VecNewIn<Config = C>,
        E: From<StorageError>,
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_from_fn_alloc(count, alloc_in.into_alloc(), f)
    }

    /// Constructs a `Vec<T, C>` from the items of an iterator, using the
    /// allocator provided by `alloc_in`.
    pub fn from_iter_in<I, A>(iter: I, alloc_in: A) -> Self
    where
        I: IntoIterator<Item = T>,
        A: VecNewIn<Config = C>,
    {
        let mut vec = Self::new_in(alloc_in);
        vec.extend(iter);
        vec
    }
}

impl<T, C: VecConfig> Vec<T, C> {
    /// Access the allocator instance owned by this vector.
    #[inline]
    pub fn allocator(&self) -> &C::Alloc {
        &self.buffer.alloc
    }

    /// Returns a raw pointer to the first slot. The pointer is dangling when
    /// the vector holds no storage.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.data_ptr()
    }

    /// Returns a mutable raw pointer to the first slot. The pointer is
    /// dangling when the vector holds no storage.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.data_ptr_mut()
    }

    /// The address of the allocated storage, or `None` when the vector holds
    /// no storage.
    #[inline]
    pub fn storage_ptr(&self) -> Option<NonNull<T>> {
        if self.buffer.has_storage() {
            Some(self.buffer.data)
        } else {
            None
        }
    }

    /// Extracts a slice containing the entire vector.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    /// Extracts a mutable slice of the entire vector.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buffer.as_mut_slice()
    }

    /// The number of elements which fit in the current storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// The number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.length()
    }

    /// Check whether the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The largest number of elements any vector of `T` may hold.
    #[inline]
    pub const fn max_len(&self) -> usize {
        max_capacity::<T>()
    }

    /// Checked access to the element at `index`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, StorageError> {
        let len = self.len();
        self.as_slice()
            .get(index)
            .ok_or(StorageError::OutOfRange { index, len })
    }

    /// Checked mutable access to the element at `index`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, StorageError> {
        let len = self.len();
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(StorageError::OutOfRange { index, len })
    }

    /// Access the first element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn front(&self) -> &T {
        match self.as_slice().first() {
            Some(item) => item,
            None => StorageError::EmptyContainer.panic(),
        }
    }

    /// Mutably access the first element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        match self.as_mut_slice().first_mut() {
            Some(item) => item,
            None => StorageError::EmptyContainer.panic(),
        }
    }

    /// Access the last element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn back(&self) -> &T {
        match self.as_slice().last() {
            Some(item) => item,
            None => StorageError::EmptyContainer.panic(),
        }
    }

    /// Mutably access the last element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        match self.as_mut_slice().last_mut() {
            Some(item) => item,
            None => StorageError::EmptyContainer.panic(),
        }
    }

    /// The position of the first element.
    #[inline]
    pub fn begin(&self) -> Position {
        self.tracker.position(0)
    }

    /// The position following the last element.
    #[inline]
    pub fn end(&self) -> Position {
        self.tracker.position(self.len())
    }

    /// The position of the element at `index`. The index is not checked
    /// until the position is used.
    #[inline]
    pub fn position(&self, index: usize) -> Position {
        self.tracker.position(index)
    }

    /// Access the element at a position issued by this vector.
    pub fn get_at(&self, pos: Position) -> Result<&T, StorageError> {
        let index = self.tracker.resolve(pos)?;
        self.at(index)
    }

    /// Mutably access the element at a position issued by this vector.
    pub fn get_at_mut(&mut self, pos: Position) -> Result<&mut T, StorageError> {
        let index = self.tracker.resolve(pos)?;
        self.at_mut(index)
    }

    /// Ensure room for at least `capacity` elements, growing according to
    /// the configured [`Grow`] strategy.
    #[inline]
    pub fn ensure_capacity(&mut self, capacity: usize) {
        match self.try_ensure_capacity(capacity) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to ensure room for at least `capacity` elements. On failure the
    /// vector is unchanged.
    #[inline]
    pub fn try_ensure_capacity(&mut self, capacity: usize) -> Result<(), StorageError> {
        self.grow_to(capacity, false)
    }

    /// Reserve room for at least `additional` more elements.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        match self.try_reserve(additional) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to reserve room for at least `additional` more elements.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), StorageError> {
        let needed = self.needed(additional)?;
        self.grow_to(needed, false)
    }

    /// Reserve room for exactly `additional` more elements, if the current
    /// capacity is insufficient.
    #[inline]
    pub fn reserve_exact(&mut self, additional: usize) {
        match self.try_reserve_exact(additional) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to reserve room for exactly `additional` more elements, if the
    /// current capacity is insufficient.
    #[inline]
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), StorageError> {
        let needed = self.needed(additional)?;
        self.grow_to(needed, true)
    }

    #[inline]
    fn needed(&self, additional: usize) -> Result<usize, StorageError> {
        self.len()
            .checked_add(additional)
            .ok_or(StorageError::LengthExceeded)
    }

    fn grow_to(&mut self, needed: usize, exact: bool) -> Result<(), StorageError> {
        let capacity = self.buffer.capacity();
        if needed <= capacity {
            return Ok(());
        }
        if needed > max_capacity::<T>() {
            return Err(StorageError::LengthExceeded);
        }
        let target = if exact {
            needed
        } else {
            C::Grow::next_capacity::<T>(capacity, needed)
        };
        self.buffer.relocate(target)?;
        self.tracker.invalidate();
        Ok(())
    }

    /// Reduce the capacity to the current length. An empty vector releases
    /// its storage entirely.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        match self.try_shrink_to_fit() {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to reduce the capacity to the current length. On failure the
    /// vector is unchanged.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), StorageError> {
        let len = self.len();
        if self.buffer.capacity() > len {
            self.buffer.relocate(len)?;
            self.tracker.invalidate();
        }
        Ok(())
    }

    /// Validate an insertion position and make room for `count` more elements.
    fn insert_gap(&mut self, pos: Position, count: usize) -> Result<usize, StorageError> {
        let index = self.tracker.resolve(pos)?;
        let len = self.len();
        if index > len {
            return Err(StorageError::OutOfRange { index, len });
        }
        let needed = self.needed(count)?;
        self.grow_to(needed, false)?;
        Ok(index)
    }

    #[inline]
    fn moved_at(&mut self, index: usize) -> Position {
        self.tracker.invalidate();
        self.tracker.position(index)
    }

    /// Insert an element before `pos`, returning the position of the new
    /// element.
    ///
    /// # Panics
    /// Panics if the position is stale or out of range, or if storage could
    /// not be allocated.
    pub fn insert(&mut self, pos: Position, value: T) -> Position {
        match self.try_insert(pos, value) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to insert an element before `pos`. On failure the vector is
    /// unchanged and the value is returned with the error.
    pub fn try_insert(&mut self, pos: Position, value: T) -> Result<Position, UpdateError<T>> {
        let index = match self.insert_gap(pos, 1) {
            Ok(index) => index,
            Err(error) => return Err(UpdateError::new(error, value)),
        };
        let mut insert = Inserter::new(&mut self.buffer, index, 1);
        insert.push(value);
        insert.complete();
        Ok(self.moved_at(index))
    }

    /// Construct an element in place before `pos`, returning its position.
    pub fn insert_with<F>(&mut self, pos: Position, f: F) -> Position
    where
        F: FnOnce() -> T,
    {
        match self.try_insert_with(pos, f) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct an element in place before `pos`. Storage is
    /// reserved before `f` is called; if `f` panics, the vector keeps its
    /// previous elements.
    pub fn try_insert_with<F>(&mut self, pos: Position, f: F) -> Result<Position, StorageError>
    where
        F: FnOnce() -> T,
    {
        let index = self.insert_gap(pos, 1)?;
        let mut insert = Inserter::new(&mut self.buffer, index, 1);
        insert.push_with(f);
        insert.complete();
        Ok(self.moved_at(index))
    }

    /// Insert `count` copies of `value` before `pos`, returning the position
    /// of the first inserted element.
    pub fn insert_n(&mut self, pos: Position, count: usize, value: T) -> Position
    where
        T: Clone,
    {
        match self.try_insert_n(pos, count, value) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to insert `count` copies of `value` before `pos`. Inserting zero
    /// elements leaves existing positions valid.
    pub fn try_insert_n(
        &mut self,
        pos: Position,
        count: usize,
        value: T,
    ) -> Result<Position, StorageError>
    where
        T: Clone,
    {
        let index = self.insert_gap(pos, count)?;
        if count == 0 {
            return Ok(pos);
        }
        let mut insert = Inserter::new(&mut self.buffer, index, count);
        insert.push_repeat(&value, count - 1);
        insert.push(value);
        insert.complete();
        Ok(self.moved_at(index))
    }

    /// Insert clones of the elements of `values` before `pos`, returning the
    /// position of the first inserted element.
    pub fn insert_slice(&mut self, pos: Position, values: &[T]) -> Position
    where
        T: Clone,
    {
        match self.try_insert_slice(pos, values) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to insert clones of the elements of `values` before `pos`. If a
    /// clone panics, the vector keeps its previous elements.
    pub fn try_insert_slice(
        &mut self,
        pos: Position,
        values: &[T],
    ) -> Result<Position, StorageError>
    where
        T: Clone,
    {
        let index = self.insert_gap(pos, values.len())?;
        if values.is_empty() {
            return Ok(pos);
        }
        let mut insert = Inserter::new(&mut self.buffer, index, values.len());
        insert.push_slice(values);
        insert.complete();
        Ok(self.moved_at(index))
    }

    /// Remove the element at `pos`, returning the position of the element
    /// which followed it.
    pub fn erase(&mut self, pos: Position) -> Position {
        match self.try_erase(pos) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to remove the element at `pos`.
    pub fn try_erase(&mut self, pos: Position) -> Result<Position, StorageError> {
        let index = self.tracker.resolve(pos)?;
        let len = self.len();
        if index >= len {
            return Err(StorageError::OutOfRange { index, len });
        }
        let removed = unsafe { self.remove_unchecked(index) };
        let next = self.moved_at(index);
        drop(removed);
        Ok(next)
    }

    /// Remove the elements in `[first, last)`, returning the position of the
    /// element which followed them.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        match self.try_erase_range(first, last) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to remove the elements in `[first, last)`. An empty range leaves
    /// existing positions valid.
    pub fn try_erase_range(
        &mut self,
        first: Position,
        last: Position,
    ) -> Result<Position, StorageError> {
        let start = self.tracker.resolve(first)?;
        let end = self.tracker.resolve(last)?;
        let len = self.len();
        if end > len {
            return Err(StorageError::OutOfRange { index: end, len });
        }
        if start > end {
            return Err(StorageError::OutOfRange { index: start, len });
        }
        if start == end {
            return Ok(first);
        }
        unsafe {
            self.buffer.set_length(start);
            let data = self.buffer.data_ptr_mut();
            destroy(data.add(start), end - start);
            relocate(data.add(end), data.add(start), len - end);
            self.buffer.set_length(len - (end - start));
        }
        Ok(self.moved_at(start))
    }

    /// Remove and return the element at `index`, shifting later elements down.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len();
        if index >= len {
            StorageError::OutOfRange { index, len }.panic();
        }
        let removed = unsafe { self.remove_unchecked(index) };
        self.tracker.invalidate();
        removed
    }

    unsafe fn remove_unchecked(&mut self, index: usize) -> T {
        let len = self.buffer.length();
        let head = self.buffer.data_ptr_mut().add(index);
        let removed = ptr::read(head);
        relocate(head.add(1), head, len - index - 1);
        self.buffer.set_length(len - 1);
        removed
    }

    /// Append an element to the end of the vector.
    pub fn push(&mut self, item: T) {
        match self.try_push(item) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to append an element. On failure the vector is unchanged and the
    /// value is returned with the error.
    pub fn try_push(&mut self, item: T) -> Result<(), UpdateError<T>> {
        if let Err(error) = self.try_reserve(1) {
            return Err(UpdateError::new(error, item));
        }
        unsafe { self.push_unchecked(item) };
        Ok(())
    }

    /// Construct an element in place at the end of the vector, returning a
    /// reference to it.
    pub fn push_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        match self.try_push_with(f) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct an element in place at the end of the vector.
    /// Storage is reserved before `f` is called.
    pub fn try_push_with<F>(&mut self, f: F) -> Result<&mut T, StorageError>
    where
        F: FnOnce() -> T,
    {
        self.try_reserve(1)?;
        let item = f();
        Ok(unsafe { self.push_unchecked(item) })
    }

    /// # Safety
    /// The capacity must exceed the length.
    #[inline]
    unsafe fn push_unchecked(&mut self, item: T) -> &mut T {
        let length = self.buffer.length();
        let slot = self.buffer.data_ptr_mut().add(length);
        slot.write(item);
        self.buffer.set_length(length + 1);
        &mut *slot
    }

    /// Remove and return the last element, or `StorageError::EmptyContainer`
    /// if the vector is empty.
    pub fn pop(&mut self) -> Result<T, StorageError> {
        let len = self.len();
        if len == 0 {
            return Err(StorageError::EmptyContainer);
        }
        let item = unsafe {
            self.buffer.set_length(len - 1);
            ptr::read(self.buffer.data_ptr().add(len - 1))
        };
        self.tracker.invalidate();
        Ok(item)
    }

    /// Drop any elements beyond the first `len`. The capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        let prev = self.len();
        if len < prev {
            unsafe {
                self.buffer.set_length(len);
                destroy(self.buffer.data_ptr_mut().add(len), prev - len);
            }
            self.tracker.invalidate();
        }
    }

    /// Drop all elements. The capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resize the vector to `new_len` elements, cloning `value` into any new
    /// slots.
    #[inline]
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        match self.try_resize(new_len, value) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to resize the vector to `new_len` elements, cloning `value` into
    /// any new slots. Shrinking never reallocates.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let len = self.len();
        match new_len.cmp(&len) {
            Ordering::Greater => {
                self.grow_to(new_len, false)?;
                let count = new_len - len;
                let mut insert = Inserter::new(&mut self.buffer, len, count);
                insert.push_repeat(&value, count - 1);
                insert.push(value);
                insert.complete();
            }
            Ordering::Less => self.truncate(new_len),
            Ordering::Equal => (),
        }
        Ok(())
    }

    /// Resize the vector to `new_len` elements, default-constructing any new
    /// elements.
    #[inline]
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Try to resize the vector to `new_len` elements, default-constructing
    /// any new elements.
    #[inline]
    pub fn try_resize_default(&mut self, new_len: usize) -> Result<(), StorageError>
    where
        T: Default,
    {
        self.try_resize_with(new_len, T::default)
    }

    /// Resize the vector to `new_len` elements, calling `f` to produce any
    /// new elements.
    #[inline]
    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        match self.try_resize_with(new_len, f) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to resize the vector to `new_len` elements, calling `f` to
    /// produce any new elements. If `f` panics, the new elements are dropped
    /// and the length is restored.
    pub fn try_resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), StorageError>
    where
        F: FnMut() -> T,
    {
        let len = self.len();
        match new_len.cmp(&len) {
            Ordering::Greater => {
                self.grow_to(new_len, false)?;
                let mut insert = Inserter::new(&mut self.buffer, len, new_len - len);
                while insert.remaining() > 0 {
                    insert.push_with(&mut f);
                }
                insert.complete();
            }
            Ordering::Less => self.truncate(new_len),
            Ordering::Equal => (),
        }
        Ok(())
    }

    /// Replace the contents with `count` copies of `value`.
    pub fn assign_elem(&mut self, value: T, count: usize)
    where
        T: Clone,
    {
        match self.try_assign_elem(value, count) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to replace the contents with `count` copies of `value`. The
    /// previous elements are dropped before any storage is requested.
    pub fn try_assign_elem(&mut self, value: T, count: usize) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.clear();
        self.tracker.invalidate();
        self.grow_to(count, true)?;
        if count > 0 {
            let mut insert = Inserter::new(&mut self.buffer, 0, count);
            insert.push_repeat(&value, count - 1);
            insert.push(value);
            insert.complete();
        }
        Ok(())
    }

    /// Replace the contents with clones of the elements of `values`.
    pub fn assign_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        match self.try_assign_slice(values) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to replace the contents with clones of the elements of `values`.
    pub fn try_assign_slice(&mut self, values: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.clear();
        self.tracker.invalidate();
        self.grow_to(values.len(), true)?;
        let mut insert = Inserter::new(&mut self.buffer, 0, values.len());
        insert.push_slice(values);
        insert.complete();
        Ok(())
    }

    /// Replace the contents with the items of an iterator.
    pub fn assign_iter<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        match self.try_assign_iter(iter) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to replace the contents with the items of an iterator.
    pub fn try_assign_iter<I>(&mut self, iter: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.tracker.invalidate();
        let mut iter = iter.into_iter();
        self.grow_to(iter.size_hint().0, true)?;
        self.try_extend_iter(&mut iter)?;
        Ok(())
    }

    /// Append clones of the elements of `items`.
    pub fn extend_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        match self.try_extend_from_slice(items) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to append clones of the elements of `items`.
    pub fn try_extend_from_slice(&mut self, items: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.try_reserve(items.len())?;
        let len = self.len();
        let mut insert = Inserter::new(&mut self.buffer, len, items.len());
        insert.push_slice(items);
        insert.complete();
        Ok(())
    }

    fn try_extend_iter(
        &mut self,
        iter: &mut impl Iterator<Item = T>,
    ) -> Result<(), UpdateError<T>> {
        loop {
            let len = self.len();
            let spare = self.capacity() - len;
            if spare > 0 {
                let mut insert = Inserter::new(&mut self.buffer, len, spare);
                insert.push_iter(iter);
                let full = insert.remaining() == 0;
                insert.complete();
                if !full {
                    // ran out of items to insert
                    return Ok(());
                }
            }
            let Some(item) = iter.next() else {
                return Ok(());
            };
            let reserve = iter.size_hint().0.saturating_add(1);
            if let Err(error) = self.try_reserve(reserve) {
                return Err(UpdateError::new(error, item));
            }
            unsafe { self.push_unchecked(item) };
        }
    }

    /// Exchange the contents, capacities and allocators of two vectors.
    /// Positions follow the elements they refer to.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T, C: VecConfig> AsRef<[T]> for Vec<T, C> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, C: VecConfig> AsMut<[T]> for Vec<T, C> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, C: VecConfig> Borrow<[T]> for Vec<T, C> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, C: VecConfig> BorrowMut<[T]> for Vec<T, C> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, C: VecConfig> Clone for Vec<T, C>
where
    C::Propagate: Propagate<C::Alloc>,
{
    fn clone(&self) -> Self {
        let alloc = <C::Propagate as Propagate<C::Alloc>>::select_on_clone(self.allocator());
        match Self::try_from_slice_alloc(self.as_slice(), alloc) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Some(alloc) =
            <C::Propagate as Propagate<C::Alloc>>::select_on_clone_from(source.allocator())
        {
            // existing storage is released to the allocator which produced it
            *self = match Self::try_from_slice_alloc(source.as_slice(), alloc) {
                Ok(res) => res,
                Err(error) => error.panic(),
            };
        } else {
            self.assign_slice(source.as_slice());
        }
    }
}

impl<T: fmt::Debug, C: VecConfig> fmt::Debug for Vec<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<T, C: VecConfig> Default for Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: VecConfig> Deref for Vec<T, C> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, C: VecConfig> DerefMut for Vec<T, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, C: VecConfig> Drop for Vec<T, C> {
    fn drop(&mut self) {
        let len = self.buffer.length();
        unsafe {
            self.buffer.set_length(0);
            destroy(self.buffer.data_ptr_mut(), len);
        }
    }
}

impl<T, C: VecConfig> Extend<T> for Vec<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        match self.try_extend_iter(&mut iter.into_iter()) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }
}

impl<'a, T: Clone + 'a, C: VecConfig> Extend<&'a T> for Vec<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        match self.try_extend_iter(&mut iter.into_iter().cloned()) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }
}

impl<T, C: VecConfig> FromIterator<T> for Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T, C: VecConfig, const N: usize> From<[T; N]> for Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from(data: [T; N]) -> Self {
        let mut vec = Self::with_capacity(N);
        vec.extend(data);
        vec
    }
}

impl<T: Clone, C: VecConfig> From<&[T]> for Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from(data: &[T]) -> Self {
        Self::from_slice(data)
    }
}

impl<T: Clone, C: VecConfig, const N: usize> From<&[T; N]> for Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from(data: &[T; N]) -> Self {
        Self::from_slice(data)
    }
}

#[cfg(feature = "alloc")]
impl<T, C: VecConfig> From<alloc_crate::vec::Vec<T>> for Vec<T, C>
where
    C::Alloc: AllocatorDefault,
{
    fn from(vec: alloc_crate::vec::Vec<T>) -> Self {
        let mut result = Self::with_capacity(vec.len());
        result.extend(vec);
        result
    }
}

#[cfg(feature = "alloc")]
impl<T, C: VecConfig> From<Vec<T, C>> for alloc_crate::vec::Vec<T> {
    fn from(vec: Vec<T, C>) -> Self {
        let mut result = alloc_crate::vec::Vec::with_capacity(vec.len());
        result.extend(vec);
        result
    }
}

impl<T: Hash, C: VecConfig> Hash for Vec<T, C> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T, C: VecConfig, I: SliceIndex<[T]>> Index<I> for Vec<T, C> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, C: VecConfig, I: SliceIndex<[T]>> IndexMut<I> for Vec<T, C> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, C: VecConfig> IntoIterator for Vec<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T, C::Alloc>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.into_inner())
    }
}

impl<'a, T, C: VecConfig> IntoIterator for &'a Vec<T, C> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, C: VecConfig> IntoIterator for &'a mut Vec<T, C> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T1, C1, T2, C2> PartialEq<Vec<T2, C2>> for Vec<T1, C1>
where
    C1: VecConfig,
    C2: VecConfig,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl<T: Eq, C: VecConfig> Eq for Vec<T, C> {}

impl<T1, C1, T2> PartialEq<[T2]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &[T2]) -> bool {
        self.as_slice().eq(other)
    }
}

impl<T1, C1, T2> PartialEq<&[T2]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &&[T2]) -> bool {
        self.as_slice().eq(*other)
    }
}

impl<T1, C1, T2, const N: usize> PartialEq<[T2; N]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &[T2; N]) -> bool {
        self.as_slice().eq(&other[..])
    }
}

impl<T1, C1, T2, const N: usize> PartialEq<&[T2; N]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &&[T2; N]) -> bool {
        self.as_slice().eq(&other[..])
    }
}

impl<T1, T2, C2> PartialEq<Vec<T2, C2>> for [T1]
where
    T1: PartialEq<T2>,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        self.eq(other.as_slice())
    }
}

impl<T1, T2, C2> PartialEq<Vec<T2, C2>> for &[T1]
where
    T1: PartialEq<T2>,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        (*self).eq(other.as_slice())
    }
}

impl<T1, T2, C2, const N: usize> PartialEq<Vec<T2, C2>> for [T1; N]
where
    T1: PartialEq<T2>,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        self[..].eq(other.as_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T1, C1, T2> PartialEq<alloc_crate::vec::Vec<T2>> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &alloc_crate::vec::Vec<T2>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T1, T2, C2> PartialEq<Vec<T2, C2>> for alloc_crate::vec::Vec<T1>
where
    T1: PartialEq<T2>,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl<T: PartialOrd, C: VecConfig> PartialOrd for Vec<T, C> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, C: VecConfig> Ord for Vec<T, C> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

unsafe impl<T: Send, C: VecConfig> Send for Vec<T, C> where C::Alloc: Send {}

unsafe impl<T: Sync, C: VecConfig> Sync for Vec<T, C> where C::Alloc: Sync {}

#[cfg(feature = "zeroize")]
impl<T, A: crate::alloc::Allocator> zeroize::Zeroize for Vec<T, crate::alloc::ZeroizingAlloc<A>> {
    fn zeroize(&mut self) {
        self.clear();
        // released storage is wiped by the allocator
        self.shrink_to_fit();
    }
}

#[cfg(feature = "zeroize")]
impl<T, A: crate::alloc::Allocator> zeroize::ZeroizeOnDrop
    for Vec<T, crate::alloc::ZeroizingAlloc<A>>
{
}

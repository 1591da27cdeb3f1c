#![cfg(feature = "alloc")]

use core::marker::PhantomData as Cfg;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rstest::rstest;

use flex_vec::{
    alloc::{AllocatorDefault, Global},
    capacity::GrowExact,
    vec::{Custom, Vec as FlexVec, VecConfig},
    StorageError,
};

const SLICE: &[usize] = &[1, 2, 3, 4, 5];

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Zst;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static CONSTRUCTED: Cell<usize> = const { Cell::new(0) };
}

fn live() -> isize {
    LIVE.with(Cell::get)
}

/// An element type whose construction fails after a configured number of
/// successful constructions on the current thread.
#[derive(Debug, PartialEq)]
struct Fragile(u32);

impl Fragile {
    fn reset(limit: usize) {
        LIVE.with(|l| l.set(0));
        CONSTRUCTED.with(|c| c.set(limit));
    }

    fn try_new(value: u32) -> Option<Self> {
        CONSTRUCTED.with(|c| {
            let remain = c.get();
            if remain == 0 {
                None
            } else {
                c.set(remain - 1);
                LIVE.with(|l| l.set(l.get() + 1));
                Some(Self(value))
            }
        })
    }

    fn new(value: u32) -> Self {
        match Self::try_new(value) {
            Some(res) => res,
            None => panic!("construction failed"),
        }
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        Self::new(self.0)
    }
}

impl Default for Fragile {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        LIVE.with(|l| l.set(l.get() - 1));
    }
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn vec_new<C: VecConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let v = FlexVec::<usize, C>::new();
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 0);
    assert!(v.storage_ptr().is_none());
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn vec_with_capacity<C: VecConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let v = FlexVec::<usize, C>::with_capacity(10);
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), 10);
    assert!(v.storage_ptr().is_some());
    let v = FlexVec::<usize, C>::with_capacity(0);
    assert!(v.storage_ptr().is_none());
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn vec_extend<C: VecConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let mut v = FlexVec::<usize, C>::new();
    v.extend(SLICE.iter().cloned());
    assert!(v.capacity() >= SLICE.len());
    assert_eq!(v.len(), SLICE.len());
    assert_eq!(v.as_slice(), SLICE);
    v.extend(SLICE);
    assert_eq!(&v[5..], SLICE);
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn vec_zst<C: VecConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let mut v = FlexVec::<Zst, C>::new();
    v.push(Zst);
    v.resize_default(10);
    assert_eq!(v.len(), 10);
    assert_eq!(v.pop(), Ok(Zst));
    assert_eq!(v.max_len(), usize::MAX);
}

#[test]
fn vec_growth_doubling() {
    let mut res = [0usize; 10];
    let mut v = FlexVec::<usize>::new();
    for cap in res.iter_mut() {
        v.push(1);
        *cap = v.capacity();
    }
    assert_eq!(res, [1, 2, 4, 4, 8, 8, 8, 8, 16, 16]);
}

#[test]
fn vec_growth_exact() {
    let mut v = FlexVec::<usize, Custom<Global, GrowExact>>::new();
    for idx in 1..=5 {
        v.push(idx);
        assert_eq!(v.capacity(), idx);
    }
}

#[test]
fn vec_reserve_then_push() {
    let mut v = FlexVec::<usize>::new();
    v.reserve(50);
    assert_eq!(v.capacity(), 50);
    let storage = v.storage_ptr();
    for idx in 0..50 {
        v.push(idx);
    }
    assert_eq!(v.storage_ptr(), storage);
    assert_eq!(v.capacity(), 50);
}

#[test]
fn vec_reserve_exact() {
    let mut v = FlexVec::<usize>::from_slice(SLICE);
    v.reserve_exact(3);
    assert_eq!(v.capacity(), 8);
    v.reserve_exact(1);
    assert_eq!(v.capacity(), 8);
    v.ensure_capacity(9);
    assert_eq!(v.capacity(), 16);
}

#[test]
fn vec_reserve_overflow() {
    let mut v = FlexVec::<u64>::from_slice(&[1, 2]);
    assert_eq!(v.try_reserve(usize::MAX), Err(StorageError::LengthExceeded));
    assert_eq!(
        v.try_ensure_capacity(v.max_len() + 1),
        Err(StorageError::LengthExceeded)
    );
    assert_eq!(v, [1, 2]);
    assert_eq!(
        FlexVec::<u64>::try_with_capacity(usize::MAX).err(),
        Some(StorageError::LengthExceeded)
    );
}

#[test]
fn vec_at() {
    let mut v = FlexVec::<usize>::from_slice(SLICE);
    assert_eq!(v.at(0), Ok(&1));
    assert_eq!(v.at(4), Ok(&5));
    assert_eq!(v.at(5), Err(StorageError::OutOfRange { index: 5, len: 5 }));
    *v.at_mut(1).expect("in range") = 20;
    assert_eq!(v[1], 20);
    assert_eq!(
        FlexVec::<usize>::new().at(0),
        Err(StorageError::OutOfRange { index: 0, len: 0 })
    );
}

#[test]
#[should_panic]
fn vec_index_out_of_range() {
    let v = FlexVec::<usize>::from_slice(SLICE);
    let _ = v[5];
}

#[test]
fn vec_front_back() {
    let mut v = FlexVec::<usize>::from_slice(SLICE);
    assert_eq!(*v.front(), 1);
    assert_eq!(*v.back(), 5);
    *v.front_mut() = 10;
    *v.back_mut() = 50;
    assert_eq!(v, [10, 2, 3, 4, 50]);
}

#[test]
fn vec_insert_erase_pop() {
    let mut v = FlexVec::<i32>::new();
    v.push(1);
    v.push(2);
    v.push(3);
    let pos = v.insert(v.begin() + 1, 99);
    assert_eq!(v, [1, 99, 2, 3]);
    assert_eq!(v.get_at(pos), Ok(&99));
    let next = v.erase(v.begin() + 2);
    assert_eq!(v, [1, 99, 3]);
    assert_eq!(v.get_at(next), Ok(&3));
    assert_eq!(v.pop(), Ok(3));
    assert_eq!(v, [1, 99]);
}

#[test]
fn vec_insert_at_end() {
    let mut v = FlexVec::<i32>::from_slice(&[1, 2]);
    let pos = v.insert(v.end(), 3);
    assert_eq!(pos.index(), 2);
    assert_eq!(v, [1, 2, 3]);
    v.insert(v.begin(), 0);
    assert_eq!(v, [0, 1, 2, 3]);
}

#[test]
fn vec_insert_invalid_position() {
    let mut v = FlexVec::<i32>::from_slice(&[1, 2]);
    let err = v.try_insert(v.end() + 1, 3).expect_err("out of range");
    assert_eq!(err.error(), &StorageError::OutOfRange { index: 3, len: 2 });
    assert_eq!(err.into_value(), 3);

    let other = FlexVec::<i32>::from_slice(&[1, 2]);
    let err = v.try_insert(other.begin(), 3).expect_err("foreign");
    assert_eq!(err.error(), &StorageError::StalePosition);

    let stale = v.begin();
    v.push(3);
    assert_eq!(v.try_erase(stale), Err(StorageError::StalePosition));
    assert_eq!(v, [1, 2, 3]);
}

#[test]
#[should_panic(expected = "Stale position")]
fn vec_insert_stale_panics() {
    let mut v = FlexVec::<i32>::from_slice(&[1, 2]);
    let pos = v.begin();
    v.clear();
    v.insert(pos, 1);
}

#[test]
fn vec_insert_n_and_slice() {
    let mut v = FlexVec::<i32>::from_slice(&[1, 5]);
    let pos = v.insert_n(v.begin() + 1, 2, 7);
    assert_eq!(v, [1, 7, 7, 5]);
    assert_eq!(pos.index(), 1);
    let pos = v.insert_slice(v.begin() + 3, &[8, 9]);
    assert_eq!(v, [1, 7, 7, 8, 9, 5]);
    assert_eq!(v.get_at(pos), Ok(&8));
    let pos = v.insert_slice(v.end(), &[]);
    assert_eq!(pos, v.end());
}

#[test]
fn vec_insert_with() {
    let mut v = FlexVec::<String>::from_slice(&["a".to_string(), "c".to_string()]);
    let pos = v.insert_with(v.begin() + 1, || "b".to_string());
    assert_eq!(v.get_at(pos).map(String::as_str), Ok("b"));
    let last = v.push_with(|| "d".to_string());
    last.push('!');
    assert_eq!(v, ["a", "b", "c", "d!"]);
}

#[test]
fn vec_erase_range() {
    let mut v = FlexVec::<usize>::from_slice(SLICE);
    let pos = v.erase_range(v.begin() + 1, v.end() - 1);
    assert_eq!(v, [1, 5]);
    assert_eq!(v.get_at(pos), Ok(&5));
    let pos = v.erase_range(v.begin(), v.end());
    assert!(v.is_empty());
    assert_eq!(pos, v.end());
    assert_eq!(v.capacity(), 5);
}

#[test]
fn vec_positions() {
    let v = FlexVec::<usize>::from_slice(SLICE);
    let begin = v.begin();
    let end = v.end();
    assert_eq!(end.offset_from(begin), Some(5));
    assert!(begin < end);
    let mut pos = begin;
    let mut seen = Vec::new();
    while pos != end {
        seen.push(*v.get_at(pos).expect("valid position"));
        pos = pos.next();
    }
    assert_eq!(seen, SLICE);
    assert_eq!(v.get_at(end.prev()), Ok(&5));
    assert_eq!(
        v.get_at(begin.prev()),
        Err(StorageError::OutOfRange {
            index: usize::MAX,
            len: 5
        })
    );

    let other = v.clone();
    assert_eq!(other.begin().partial_cmp(&begin), None);
    assert_eq!(other.get_at(begin), Err(StorageError::StalePosition));
}

#[test]
fn vec_pop_empty() {
    let mut v = FlexVec::<usize>::new();
    assert_eq!(v.pop(), Err(StorageError::EmptyContainer));
    assert!(v.storage_ptr().is_none());
}

#[test]
fn vec_resize() {
    let mut v = FlexVec::<i32>::from_slice(&[1, 2, 3]);
    v.resize_default(5);
    assert_eq!(v, [1, 2, 3, 0, 0]);
    let storage = v.storage_ptr();
    let capacity = v.capacity();
    v.resize_default(2);
    assert_eq!(v, [1, 2]);
    assert_eq!(v.storage_ptr(), storage);
    assert_eq!(v.capacity(), capacity);
    v.resize(4, 9);
    assert_eq!(v, [1, 2, 9, 9]);
    let mut next = 10;
    v.resize_with(6, || {
        next += 1;
        next
    });
    assert_eq!(v, [1, 2, 9, 9, 11, 12]);
}

#[test]
fn vec_shrink_to_fit() {
    let mut v = FlexVec::<usize>::with_capacity(10);
    v.extend_from_slice(SLICE);
    v.shrink_to_fit();
    assert_eq!(v.capacity(), 5);
    assert_eq!(v, SLICE);
    let storage = v.storage_ptr();
    v.shrink_to_fit();
    assert_eq!(v.storage_ptr(), storage);
    v.clear();
    v.shrink_to_fit();
    assert_eq!(v.capacity(), 0);
    assert!(v.storage_ptr().is_none());
}

#[test]
fn vec_assign() {
    let mut v = FlexVec::<usize>::from_slice(SLICE);
    v.assign_elem(7, 3);
    assert_eq!(v, [7, 7, 7]);
    assert_eq!(v.capacity(), 5);
    v.assign_slice(&[1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(v, [1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(v.capacity(), 7);
    v.assign_iter((0..3).map(|i| i * 10));
    assert_eq!(v, [0, 10, 20]);
    v.assign_elem(1, 0);
    assert!(v.is_empty());
}

#[test]
fn assign_invalidates_empty_positions() {
    let mut v = FlexVec::<usize>::with_capacity(4);
    let pos = v.begin();
    v.assign_slice(&[1, 2]);
    assert_eq!(v.get_at(pos), Err(StorageError::StalePosition));

    let pos = v.begin();
    v.clear();
    let empty = v.begin();
    v.assign_elem(3, 2);
    assert_eq!(v.get_at(pos), Err(StorageError::StalePosition));
    assert_eq!(v.get_at(empty), Err(StorageError::StalePosition));

    v.clear();
    let empty = v.begin();
    v.assign_iter([4, 5]);
    assert_eq!(v.get_at(empty), Err(StorageError::StalePosition));
    assert_eq!(v.get_at(v.begin()), Ok(&4));
    assert_eq!(v.capacity(), 4);
}

#[test]
fn vec_clone_independent() {
    let mut a = FlexVec::<String>::from_slice(&["x".to_string(), "y".to_string()]);
    let b = a.clone();
    a[0].push('!');
    a.push("z".to_string());
    assert_eq!(b, ["x", "y"]);
    assert_eq!(a, ["x!", "y", "z"]);
    assert_ne!(a.as_ptr(), b.as_ptr());
}

#[test]
fn vec_clone_from() {
    let src = FlexVec::<usize>::from_slice(SLICE);
    let mut dst = FlexVec::<usize>::from_slice(&[9; 2]);
    dst.clone_from(&src);
    assert_eq!(dst, SLICE);
    assert_eq!(dst.capacity(), 5);

    let mut dst = FlexVec::<usize>::with_capacity(20);
    dst.clone_from(&src);
    assert_eq!(dst, SLICE);
    assert_eq!(dst.capacity(), 20);
}

#[test]
fn vec_self_assign() {
    let mut v = FlexVec::<usize>::from_slice(SLICE);
    let capacity = v.capacity();
    let snapshot = v.clone();
    v.clone_from(&snapshot);
    assert_eq!(v, SLICE);
    assert_eq!(v.capacity(), capacity);

    let storage = v.storage_ptr();
    v = core::mem::take(&mut v);
    assert_eq!(v, SLICE);
    assert_eq!(v.capacity(), capacity);
    assert_eq!(v.storage_ptr(), storage);
}

#[test]
fn vec_move() {
    let mut src = FlexVec::<usize>::from_slice(SLICE);
    let storage = src.storage_ptr();
    let dst = src.take();
    assert!(src.is_empty());
    assert_eq!(src.capacity(), 0);
    assert!(src.storage_ptr().is_none());
    assert_eq!(dst, SLICE);
    assert_eq!(dst.storage_ptr(), storage);

    let moved = dst;
    assert_eq!(moved.storage_ptr(), storage);
}

#[test]
fn vec_swap_with() {
    let mut a = FlexVec::<usize>::from_slice(SLICE);
    let mut b = FlexVec::<usize>::with_capacity(1);
    let pos = a.begin() + 2;
    a.swap_with(&mut b);
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 1);
    assert_eq!(b, SLICE);
    assert_eq!(b.get_at(pos), Ok(&3));
}

#[test]
fn vec_into_iter() {
    let v = FlexVec::<String>::from_iter(["a", "b", "c", "d"].map(String::from));
    let mut iter = v.into_iter();
    assert_eq!(iter.len(), 4);
    assert_eq!(iter.next().as_deref(), Some("a"));
    assert_eq!(iter.next_back().as_deref(), Some("d"));
    assert_eq!(iter.as_slice(), ["b", "c"]);
    // remaining items are dropped with the iterator
    drop(iter);

    let v = FlexVec::<usize>::from_slice(SLICE);
    let collected: Vec<usize> = v.into_iter().rev().collect();
    assert_eq!(collected, [5, 4, 3, 2, 1]);
}

#[test]
fn vec_macro() {
    let v: FlexVec<usize> = flex_vec::vec![1, 2, 3];
    assert_eq!(v, [1, 2, 3]);
    let v: FlexVec<usize> = flex_vec::vec![4; 3];
    assert_eq!(v, [4, 4, 4]);
    let v: FlexVec<usize> = flex_vec::vec![];
    assert!(v.is_empty());
    let v = flex_vec::vec![in Global; 1usize, 2];
    assert_eq!(v, [1, 2]);
}

#[test]
fn vec_from_conversions() {
    let v = FlexVec::<usize>::from([1, 2, 3]);
    assert_eq!(v, [1, 2, 3]);
    let v = FlexVec::<usize>::from(SLICE);
    assert_eq!(v, SLICE);
    let v = FlexVec::<usize>::from(vec![1, 2]);
    assert_eq!(v, vec![1, 2]);
    let converted: Vec<usize> = v.into();
    assert_eq!(converted, [1, 2]);
}

#[test]
fn vec_debug() {
    let v = FlexVec::<usize>::from_slice(&[1, 2]);
    assert_eq!(format!("{:?}", v), "[1, 2]");
}

#[test]
fn vec_default_construct() {
    let v = FlexVec::<i32>::from_default(4);
    assert_eq!(v, [0, 0, 0, 0]);
    assert_eq!(v.capacity(), 4);
    let v = FlexVec::<i32>::from_elem(3, 2);
    assert_eq!(v, [3, 3]);
}

#[test]
fn construction_failure_rolls_back() {
    Fragile::reset(3);
    let res = catch_unwind(|| FlexVec::<Fragile>::from_default(10));
    assert!(res.is_err());
    assert_eq!(live(), 0);

    Fragile::reset(3);
    let res = FlexVec::<Fragile>::try_from_fn_in(10, Global, |i| {
        Fragile::try_new(i as u32).ok_or(StorageError::EmptyContainer)
    });
    assert_eq!(res.err(), Some(StorageError::EmptyContainer));
    assert_eq!(live(), 0);
}

#[test]
fn insert_failure_keeps_contents() {
    Fragile::reset(5);
    let mut v = fragile_values(3);
    let capacity = v.capacity();
    let res = catch_unwind(AssertUnwindSafe(|| {
        let value = Fragile::new(9);
        v.insert_n(v.begin() + 1, 4, value);
    }));
    assert!(res.is_err());
    assert_eq!(v.iter().map(|f| f.0).collect::<Vec<_>>(), [0, 1, 2]);
    assert_eq!(live(), 3);
    assert!(v.capacity() >= capacity);
    drop(v);
    assert_eq!(live(), 0);
}

#[test]
fn resize_failure_keeps_contents() {
    Fragile::reset(4);
    let mut v = fragile_values(2);
    let res = catch_unwind(AssertUnwindSafe(|| v.resize_default(6)));
    assert!(res.is_err());
    assert_eq!(v.len(), 2);
    assert_eq!(live(), 2);
}

#[test]
fn clone_failure_releases() {
    Fragile::reset(4);
    let v = fragile_values(3);
    let res = catch_unwind(AssertUnwindSafe(|| v.clone()));
    assert!(res.is_err());
    assert_eq!(live(), 3);
}

fn fragile_values(count: usize) -> FlexVec<Fragile> {
    FlexVec::try_from_fn(count, |i| {
        Fragile::try_new(i as u32).ok_or(StorageError::EmptyContainer)
    })
    .expect("construction budget")
}

/// Create a [`Vec`](crate::vec::Vec) containing the arguments.
///
/// An allocator may be provided with the `in` prefix:
///
/// ```
/// use flex_vec::{alloc::Global, vec};
///
/// let a: flex_vec::vec::Vec<u32> = vec![1, 2, 3];
/// let b = vec![in Global; 7u32; 2];
/// assert_eq!(a, [1, 2, 3]);
/// assert_eq!(b, [7, 7]);
/// ```
#[macro_export]
macro_rules! vec {
    (in $alloc:expr $(;)?) => (
        $crate::vec::Vec::new_in($alloc)
    );
    (in $alloc:expr; $elem:expr; $n:expr) => (
        $crate::vec::from_elem_in($elem, $n, $alloc)
    );
    (in $alloc:expr; $($x:expr),+ $(,)?) => (
        $crate::vec::from_array_in([$($x),+], $alloc)
    );
    () => (
        $crate::vec::Vec::new()
    );
    ($elem:expr; $n:expr) => (
        $crate::vec::from_elem($elem, $n)
    );
    ($($x:expr),+ $(,)?) => (
        $crate::vec::from_array([$($x),+])
    );
}

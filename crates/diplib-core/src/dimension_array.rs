//! Short arrays for sizes, strides and coordinates
//!
//! [`DimensionArray`] is a dynamic array of plain-data elements that keeps
//! up to four elements inline and only allocates on the heap when it grows
//! beyond that. Images rarely have more than four dimensions, so sizes,
//! strides and coordinates almost never allocate.
//!
//! The array dereferences to a slice, so indexing, iteration (forward and
//! reverse), `first`/`last` and the usual slice algorithms are available
//! directly. The methods here add the arithmetic and permutation helpers
//! used throughout the library.
//!
//! # Examples
//!
//! ```
//! use diplib_core::UnsignedArray;
//!
//! let mut sizes = UnsignedArray::from_slice(&[256, 256, 10]);
//! assert_eq!(sizes.product(), 655_360);
//! sizes.push(3);
//! assert!(sizes.is_inline());
//! sizes.push(2);
//! assert!(!sizes.is_inline());
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Deref, DerefMut, Mul, Sub, SubAssign};

/// Number of elements stored without a heap allocation.
pub const INLINE_CAPACITY: usize = 4;

#[derive(Clone)]
enum Storage<T: Copy + Default> {
    Inline { len: usize, data: [T; INLINE_CAPACITY] },
    Heap(Vec<T>),
}

/// A dynamic array optimised for short lengths.
///
/// Elements must be `Copy`; they are never dropped individually.
#[derive(Clone)]
pub struct DimensionArray<T: Copy + Default> {
    storage: Storage<T>,
}

/// Sizes and unsigned coordinates.
pub type UnsignedArray = DimensionArray<usize>;
/// Strides and signed offsets.
pub type IntegerArray = DimensionArray<isize>;
/// Floating-point coordinates and per-dimension parameters.
pub type FloatArray = DimensionArray<f64>;
/// Per-dimension flags.
pub type BooleanArray = DimensionArray<bool>;

impl<T: Copy + Default> Default for DimensionArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> DimensionArray<T> {
    /// Create an empty array.
    pub fn new() -> Self {
        DimensionArray {
            storage: Storage::Inline {
                len: 0,
                data: [T::default(); INLINE_CAPACITY],
            },
        }
    }

    /// Create an array of `len` copies of `value`.
    pub fn filled(len: usize, value: T) -> Self {
        let mut out = Self::new();
        out.resize(len, value);
        out
    }

    /// Create an array by copying a slice.
    pub fn from_slice(values: &[T]) -> Self {
        if values.len() <= INLINE_CAPACITY {
            let mut data = [T::default(); INLINE_CAPACITY];
            data[..values.len()].copy_from_slice(values);
            DimensionArray {
                storage: Storage::Inline {
                    len: values.len(),
                    data,
                },
            }
        } else {
            DimensionArray {
                storage: Storage::Heap(values.to_vec()),
            }
        }
    }

    /// Whether the elements currently live inline (no heap allocation).
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline { .. })
    }

    /// View as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Inline { len, data } => &data[..*len],
            Storage::Heap(v) => v,
        }
    }

    /// View as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Inline { len, data } => &mut data[..*len],
            Storage::Heap(v) => v,
        }
    }

    /// Change the length, filling new elements with `value`.
    ///
    /// Shrinking back to the inline capacity releases the heap buffer.
    pub fn resize(&mut self, new_len: usize, value: T) {
        let old_len = self.len();
        if new_len <= INLINE_CAPACITY {
            let mut data = [T::default(); INLINE_CAPACITY];
            let kept = old_len.min(new_len);
            data[..kept].copy_from_slice(&self.as_slice()[..kept]);
            for elem in &mut data[kept..new_len] {
                *elem = value;
            }
            self.storage = Storage::Inline { len: new_len, data };
        } else if let Storage::Heap(v) = &mut self.storage {
            v.resize(new_len, value);
        } else {
            let mut v = self.as_slice().to_vec();
            v.resize(new_len, value);
            self.storage = Storage::Heap(v);
        }
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.resize(0, T::default());
    }

    /// Append an element at the end.
    pub fn push(&mut self, value: T) {
        let n = self.len();
        self.resize(n + 1, value);
    }

    /// Remove the last element, if any.
    pub fn pop(&mut self) -> Option<T> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let last = self[n - 1];
        self.resize(n - 1, T::default());
        Some(last)
    }

    /// Insert `value` at `index`, moving later elements up.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        let n = self.len();
        assert!(index <= n, "insert index {index} out of range for length {n}");
        self.resize(n + 1, value);
        let s = self.as_mut_slice();
        s.copy_within(index..n, index + 1);
        s[index] = value;
    }

    /// Remove and return the element at `index`, moving later elements down.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> T {
        let n = self.len();
        assert!(index < n, "erase index {index} out of range for length {n}");
        let value = self[index];
        self.as_mut_slice().copy_within(index + 1..n, index);
        self.resize(n - 1, T::default());
        value
    }

    /// Set all elements to `value`.
    pub fn fill(&mut self, value: T) {
        for elem in self.as_mut_slice() {
            *elem = value;
        }
    }

    /// Reorder elements: `out[i] = self[order[i]]`.
    ///
    /// The output has the length of `order`, so this can also select a
    /// subset of the elements.
    ///
    /// # Panics
    ///
    /// Panics if an element of `order` is out of range.
    pub fn permute(&self, order: &[usize]) -> Self {
        let mut out = Self::new();
        for &o in order {
            out.push(self[o]);
        }
        out
    }

    /// Undo a [`permute`](Self::permute): `out[order[i]] = self[i]`.
    ///
    /// Elements not addressed by `order` are left at their default value.
    ///
    /// # Panics
    ///
    /// Panics if an element of `order` is out of range.
    pub fn inverse_permute(&self, order: &[usize]) -> Self {
        let n = order.iter().copied().max().map_or(0, |m| m + 1);
        let mut out = Self::filled(n, T::default());
        for (i, &o) in order.iter().enumerate() {
            out[o] = self[i];
        }
        out
    }

    /// Number of elements for which `pred` holds.
    pub fn count(&self, pred: impl Fn(T) -> bool) -> usize {
        self.iter().filter(|&&v| pred(v)).count()
    }
}

impl<T: Copy + Default + PartialOrd> DimensionArray<T> {
    /// Sort in place in ascending order (insertion sort; arrays are short).
    pub fn sort(&mut self) {
        let s = self.as_mut_slice();
        for i in 1..s.len() {
            let mut j = i;
            while j > 0 && s[j] < s[j - 1] {
                s.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    /// Sort in place, applying the same reordering to `other`.
    ///
    /// # Panics
    ///
    /// Panics if `other` is shorter than `self`.
    pub fn sort_with<S: Copy + Default>(&mut self, other: &mut DimensionArray<S>) {
        let s = self.as_mut_slice();
        let o = other.as_mut_slice();
        for i in 1..s.len() {
            let mut j = i;
            while j > 0 && s[j] < s[j - 1] {
                s.swap(j, j - 1);
                o.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    /// Indices that would sort the array, stable for equal elements.
    pub fn sorted_indices(&self) -> UnsignedArray {
        let mut indices: UnsignedArray = (0..self.len()).collect();
        let s = self.as_slice();
        let idx = indices.as_mut_slice();
        for i in 1..idx.len() {
            let mut j = i;
            while j > 0 && s[idx[j]] < s[idx[j - 1]] {
                idx.swap(j, j - 1);
                j -= 1;
            }
        }
        indices
    }

    /// True if sizes are equal and every element is smaller than in `other`.
    pub fn all_lt(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a < b)
    }

    /// True if sizes are equal and every element is larger than in `other`.
    pub fn all_gt(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a > b)
    }

    /// True if sizes are equal and no element is larger than in `other`.
    pub fn all_le(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a <= b)
    }

    /// True if sizes are equal and no element is smaller than in `other`.
    pub fn all_ge(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a >= b)
    }
}

impl<T> DimensionArray<T>
where
    T: Copy + Default + Add<Output = T> + Mul<Output = T>,
{
    /// Sum of all elements (zero for an empty array).
    pub fn sum(&self) -> T {
        self.iter().fold(T::default(), |acc, &v| acc + v)
    }

    /// Sum of the squares of all elements.
    pub fn norm_square(&self) -> T {
        self.iter().fold(T::default(), |acc, &v| acc + v * v)
    }
}

macro_rules! impl_product {
    ($($t:ty => $one:expr),*) => {
        $(
            impl DimensionArray<$t> {
                /// Product of all elements (one for an empty array).
                pub fn product(&self) -> $t {
                    self.iter().fold($one, |acc, &v| acc * v)
                }
            }
        )*
    };
}

impl_product!(usize => 1, isize => 1, f64 => 1.0);

impl BooleanArray {
    /// True if every element is set (also for an empty array).
    pub fn all(&self) -> bool {
        self.iter().all(|&b| b)
    }

    /// True if at least one element is set.
    pub fn any(&self) -> bool {
        self.iter().any(|&b| b)
    }
}

impl UnsignedArray {
    /// Convert to signed elements.
    pub fn to_integer(&self) -> IntegerArray {
        self.iter().map(|&v| v as isize).collect()
    }

    /// Convert to floating-point elements.
    pub fn to_float(&self) -> FloatArray {
        self.iter().map(|&v| v as f64).collect()
    }
}

impl<T: Copy + Default> Deref for DimensionArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default> DerefMut for DimensionArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Copy + Default + PartialEq> PartialEq for DimensionArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Copy + Default + Eq> Eq for DimensionArray<T> {}

impl<T: Copy + Default + fmt::Debug> fmt::Debug for DimensionArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy + Default + fmt::Display> fmt::Display for DimensionArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "}}")
    }
}

impl<T: Copy + Default> FromIterator<T> for DimensionArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        for v in iter {
            out.push(v);
        }
        out
    }
}

impl<T: Copy + Default> From<&[T]> for DimensionArray<T> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T: Copy + Default, const N: usize> From<[T; N]> for DimensionArray<T> {
    fn from(values: [T; N]) -> Self {
        Self::from_slice(&values)
    }
}

impl<T: Copy + Default> From<Vec<T>> for DimensionArray<T> {
    fn from(values: Vec<T>) -> Self {
        if values.len() <= INLINE_CAPACITY {
            Self::from_slice(&values)
        } else {
            DimensionArray {
                storage: Storage::Heap(values),
            }
        }
    }
}

impl<'a, T: Copy + Default> IntoIterator for &'a DimensionArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// Element-wise addition of an array of the same length.
///
/// # Panics
///
/// Panics if the lengths differ.
impl<T: Copy + Default + AddAssign> AddAssign<&DimensionArray<T>> for DimensionArray<T> {
    fn add_assign(&mut self, rhs: &DimensionArray<T>) {
        assert_eq!(self.len(), rhs.len(), "array lengths differ");
        for (a, &b) in self.iter_mut().zip(rhs.iter()) {
            *a += b;
        }
    }
}

/// Element-wise subtraction of an array of the same length.
///
/// # Panics
///
/// Panics if the lengths differ.
impl<T: Copy + Default + SubAssign> SubAssign<&DimensionArray<T>> for DimensionArray<T> {
    fn sub_assign(&mut self, rhs: &DimensionArray<T>) {
        assert_eq!(self.len(), rhs.len(), "array lengths differ");
        for (a, &b) in self.iter_mut().zip(rhs.iter()) {
            *a -= b;
        }
    }
}

impl<T: Copy + Default + AddAssign> AddAssign<T> for DimensionArray<T> {
    fn add_assign(&mut self, rhs: T) {
        for a in self.iter_mut() {
            *a += rhs;
        }
    }
}

impl<T: Copy + Default + SubAssign> SubAssign<T> for DimensionArray<T> {
    fn sub_assign(&mut self, rhs: T) {
        for a in self.iter_mut() {
            *a -= rhs;
        }
    }
}

impl<T: Copy + Default + AddAssign> Add<T> for DimensionArray<T> {
    type Output = DimensionArray<T>;

    fn add(mut self, rhs: T) -> Self::Output {
        self += rhs;
        self
    }
}

impl<T: Copy + Default + SubAssign> Sub<T> for DimensionArray<T> {
    type Output = DimensionArray<T>;

    fn sub(mut self, rhs: T) -> Self::Output {
        self -= rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_to_heap_and_back() {
        let mut a = UnsignedArray::from_slice(&[1, 2, 3, 4]);
        assert!(a.is_inline());
        a.push(5);
        assert!(!a.is_inline());
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(a.pop(), Some(5));
        assert!(a.is_inline());
        assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_and_erase() {
        let mut a = IntegerArray::from_slice(&[10, 20, 30]);
        a.insert(1, 15);
        assert_eq!(a.as_slice(), &[10, 15, 20, 30]);
        a.insert(4, 40);
        assert_eq!(a.as_slice(), &[10, 15, 20, 30, 40]);
        assert_eq!(a.erase(0), 10);
        assert_eq!(a.as_slice(), &[15, 20, 30, 40]);
        assert!(a.is_inline());
    }

    #[test]
    fn test_resize_fills_new_elements() {
        let mut a = UnsignedArray::filled(2, 7);
        a.resize(6, 1);
        assert_eq!(a.as_slice(), &[7, 7, 1, 1, 1, 1]);
        a.resize(3, 0);
        assert_eq!(a.as_slice(), &[7, 7, 1]);
        a.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn test_sort_and_sorted_indices() {
        let mut a = FloatArray::from_slice(&[3.0, 1.0, 2.0, 1.0, 0.5]);
        let idx = a.sorted_indices();
        assert_eq!(idx.as_slice(), &[4, 1, 3, 2, 0]);
        let mut other = UnsignedArray::from_slice(&[0, 1, 2, 3, 4]);
        a.sort_with(&mut other);
        assert_eq!(a.as_slice(), &[0.5, 1.0, 1.0, 2.0, 3.0]);
        assert_eq!(other.as_slice(), &[4, 1, 3, 2, 0]);
    }

    #[test]
    fn test_permute_roundtrip() {
        let a = UnsignedArray::from_slice(&[5, 6, 7]);
        let order = [2, 0, 1];
        let p = a.permute(&order);
        assert_eq!(p.as_slice(), &[7, 5, 6]);
        assert_eq!(p.inverse_permute(&order), a);
    }

    #[test]
    fn test_reductions() {
        let a = UnsignedArray::from_slice(&[2, 3, 4]);
        assert_eq!(a.sum(), 9);
        assert_eq!(a.product(), 24);
        assert_eq!(a.norm_square(), 29);
        assert_eq!(UnsignedArray::new().product(), 1);
        assert_eq!(a.count(|v| v > 2), 2);
        let b = BooleanArray::from_slice(&[true, false]);
        assert!(b.any());
        assert!(!b.all());
    }

    #[test]
    fn test_comparisons_require_equal_lengths() {
        let a = UnsignedArray::from_slice(&[1, 2]);
        let b = UnsignedArray::from_slice(&[2, 3]);
        let c = UnsignedArray::from_slice(&[2, 3, 4]);
        assert!(a.all_lt(&b));
        assert!(b.all_gt(&a));
        assert!(a.all_le(&a));
        assert!(!a.all_lt(&c));
        assert!(!c.all_ge(&a));
    }

    #[test]
    fn test_elementwise_arithmetic() {
        let mut a = IntegerArray::from_slice(&[1, 2, 3]);
        a += &IntegerArray::from_slice(&[1, 1, 1]);
        assert_eq!(a.as_slice(), &[2, 3, 4]);
        a -= 2;
        assert_eq!(a.as_slice(), &[0, 1, 2]);
        let b = a + 10;
        assert_eq!(b.as_slice(), &[10, 11, 12]);
    }
}

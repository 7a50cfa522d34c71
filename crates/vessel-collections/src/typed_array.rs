use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Add;

use vessel_engine::Variant;

use crate::array::{copy_out, Array};
use crate::error::Result;
use crate::iter::{LiveIter, SnapshotIter};
use crate::marshal::{FromVariant, Marshal, ToVariant};

/// Array whose elements are all of type `T`.
///
/// A typed array is a view: it reaches the engine only through the wrapped
/// [`Array`] and never holds a handle of its own. `S` decides who owns that
/// array. With the default `S = Array` the view owns it outright; with
/// `S = &Array` (see [`Array::typed`]) it borrows one, and several views of
/// different element types may share the same storage.
///
/// Writes are typed by construction. Reads verify each element and report
/// [`CollectionError::TypeConversion`](crate::CollectionError::TypeConversion)
/// when the engine holds something else.
pub struct TypedArray<T, S = Array> {
    inner: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Marshal> TypedArray<T> {
    pub fn new() -> Self {
        Self::wrap(Array::new())
    }

    /// Typed array holding every element of `source`. `None` is rejected with
    /// `NullInput`.
    pub fn from_collection<I>(source: Option<I>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        Array::from_collection(source).map(Self::wrap)
    }

    pub fn from_slice(items: &[T]) -> Self {
        items.iter().collect()
    }

    /// Adopt an untyped array as-is. Elements are verified lazily, on read.
    pub fn from_untyped(array: Array) -> Self {
        Self::wrap(array)
    }
}

impl<T: Marshal, S: Borrow<Array>> TypedArray<T, S> {
    pub fn wrap(inner: S) -> Self {
        TypedArray {
            inner,
            _marker: PhantomData,
        }
    }

    /// The wrapped untyped array. Writing through it bypasses the element
    /// type.
    pub fn as_untyped(&self) -> &Array {
        self.inner.borrow()
    }

    pub fn into_untyped(self) -> S {
        self.inner
    }

    pub fn get(&self, index: usize) -> Result<T> {
        let value = self.as_untyped().get(index)?;
        T::from_variant(&value)
    }

    pub fn set(&self, index: usize, value: T) -> Result<()> {
        self.as_untyped().set(index, value)
    }

    pub fn len(&self) -> usize {
        self.as_untyped().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_untyped().is_empty()
    }

    pub fn push(&self, value: T) -> Result<usize> {
        self.as_untyped().push(value)
    }

    pub fn insert(&self, index: usize, value: T) -> Result<()> {
        self.as_untyped().insert(index, value)
    }

    pub fn remove(&self, value: &T) -> bool {
        self.as_untyped().remove(value)
    }

    pub fn remove_at(&self, index: usize) -> Result<()> {
        self.as_untyped().remove_at(index)
    }

    pub fn clear(&self) -> Result<()> {
        self.as_untyped().clear()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.as_untyped().contains(value)
    }

    /// `-1` when absent
    pub fn index_of(&self, value: &T) -> i64 {
        self.as_untyped().index_of(value)
    }

    /// Owned typed copy of the current contents
    pub fn duplicate(&self, deep: bool) -> Result<TypedArray<T>> {
        self.as_untyped().duplicate(deep).map(TypedArray::wrap)
    }

    pub fn resize(&self, new_len: usize) -> Result<()> {
        self.as_untyped().resize(new_len)
    }

    pub fn shuffle(&self) -> Result<()> {
        self.as_untyped().shuffle()
    }

    pub fn concat<R: Borrow<Array>>(&self, other: &TypedArray<T, R>) -> Result<TypedArray<T>> {
        self.as_untyped().concat(other.as_untyped()).map(TypedArray::wrap)
    }

    pub fn iter_live(&self) -> LiveIter<'_, T> {
        LiveIter::new(self.as_untyped())
    }

    pub fn iter_snapshot(&self) -> Result<SnapshotIter<T>> {
        self.as_untyped().duplicate(false).map(SnapshotIter::new)
    }

    /// Copy every element into `dest` starting at `dest[index]`. Nothing is
    /// written unless all elements fit and convert.
    pub fn copy_to(&self, dest: &mut [T], index: usize) -> Result<()> {
        copy_out(self.as_untyped(), dest, index)
    }
}

impl<T: Marshal> Default for TypedArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, L, R> Add<&'a TypedArray<T, R>> for &'a TypedArray<T, L>
where
    T: Marshal,
    L: Borrow<Array>,
    R: Borrow<Array>,
{
    type Output = Result<TypedArray<T>>;

    fn add(self, rhs: &'a TypedArray<T, R>) -> Result<TypedArray<T>> {
        self.concat(rhs)
    }
}

impl<T, S: Borrow<Array>> fmt::Display for TypedArray<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner.borrow(), f)
    }
}

impl<T, S: Borrow<Array>> fmt::Debug for TypedArray<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedArray<{}>({})", std::any::type_name::<T>(), self.inner.borrow())
    }
}

impl<T, L: Borrow<Array>, R: Borrow<Array>> PartialEq<TypedArray<T, R>> for TypedArray<T, L> {
    fn eq(&self, other: &TypedArray<T, R>) -> bool {
        self.inner.borrow() == other.inner.borrow()
    }
}

impl<T: Marshal> FromIterator<T> for TypedArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::wrap(iter.into_iter().collect())
    }
}

impl<'a, T: Marshal> FromIterator<&'a T> for TypedArray<T> {
    fn from_iter<I: IntoIterator<Item = &'a T>>(iter: I) -> Self {
        Self::wrap(iter.into_iter().collect())
    }
}

impl<T, S: Borrow<Array>> ToVariant for TypedArray<T, S> {
    fn to_variant(&self) -> Variant {
        self.inner.borrow().to_variant()
    }
}

/// Checks only that the value is an array; elements are verified on read.
impl<T: Marshal> FromVariant for TypedArray<T> {
    fn from_variant(value: &Variant) -> Result<Self> {
        Array::from_variant(value).map(Self::wrap)
    }
}

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use vessel_engine::Variant;

use crate::dictionary::{copy_entries_out, entries_of, Dictionary};
use crate::error::Result;
use crate::iter::Entries;
use crate::marshal::{FromVariant, Marshal, ToVariant};
use crate::typed_array::TypedArray;

/// Dictionary from `K` to `V`, viewed over an untyped [`Dictionary`].
///
/// Ownership works as for [`TypedArray`]: `S = Dictionary` owns the
/// storage, `S = &Dictionary` borrows it. Keys and values are verified
/// whenever they are read back.
pub struct TypedDictionary<K, V, S = Dictionary> {
    inner: S,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: Marshal, V: Marshal> TypedDictionary<K, V> {
    pub fn new() -> Self {
        Self::wrap(Dictionary::new())
    }

    /// Every pair of `source`, added in order. `None` is rejected with
    /// `NullInput` and a repeated key with `DuplicateKey`.
    pub fn from_collection<I>(source: Option<I>) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Dictionary::from_collection(source).map(Self::wrap)
    }

    pub fn from_untyped(dict: Dictionary) -> Self {
        Self::wrap(dict)
    }
}

impl<K: Marshal, V: Marshal, S: Borrow<Dictionary>> TypedDictionary<K, V, S> {
    pub fn wrap(inner: S) -> Self {
        TypedDictionary {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn as_untyped(&self) -> &Dictionary {
        self.inner.borrow()
    }

    pub fn into_untyped(self) -> S {
        self.inner
    }

    pub fn get(&self, key: &K) -> Result<V> {
        let value = self.as_untyped().get(key)?;
        V::from_variant(&value)
    }

    pub fn set(&self, key: K, value: V) -> Result<()> {
        self.as_untyped().set(key, value)
    }

    /// `Ok(None)` when the key is absent; a stored value of the wrong type
    /// is still an error.
    pub fn try_get(&self, key: &K) -> Result<Option<V>> {
        self.as_untyped()
            .try_get(key)
            .map(|value| V::from_variant(&value))
            .transpose()
    }

    pub fn add(&self, key: K, value: V) -> Result<()> {
        self.as_untyped().add(key, value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.as_untyped().contains_key(key)
    }

    pub fn contains_entry(&self, key: &K, value: &V) -> bool {
        self.as_untyped().contains(key, value)
    }

    pub fn remove(&self, key: &K) -> bool {
        self.as_untyped().remove(key)
    }

    pub fn remove_entry(&self, key: &K, value: &V) -> bool {
        self.as_untyped().remove_entry(key, value)
    }

    pub fn clear(&self) -> Result<()> {
        self.as_untyped().clear()
    }

    pub fn len(&self) -> usize {
        self.as_untyped().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_untyped().is_empty()
    }

    pub fn keys(&self) -> Result<TypedArray<K>> {
        self.as_untyped().keys().map(TypedArray::wrap)
    }

    pub fn values(&self) -> Result<TypedArray<V>> {
        self.as_untyped().values().map(TypedArray::wrap)
    }

    pub fn duplicate(&self, deep: bool) -> Result<TypedDictionary<K, V>> {
        self.as_untyped().duplicate(deep).map(TypedDictionary::wrap)
    }

    pub fn iter_snapshot(&self) -> Result<Entries<K, V>> {
        entries_of(self.as_untyped())
    }

    pub fn copy_to(&self, dest: &mut [(K, V)], index: usize) -> Result<()> {
        copy_entries_out(self.as_untyped(), dest, index)
    }
}

impl<K: Marshal, V: Marshal> Default for TypedDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: Borrow<Dictionary>> fmt::Display for TypedDictionary<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner.borrow(), f)
    }
}

impl<K, V, S: Borrow<Dictionary>> fmt::Debug for TypedDictionary<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypedDictionary<{}, {}>({})",
            std::any::type_name::<K>(),
            std::any::type_name::<V>(),
            self.inner.borrow()
        )
    }
}

impl<K, V, L, R> PartialEq<TypedDictionary<K, V, R>> for TypedDictionary<K, V, L>
where
    L: Borrow<Dictionary>,
    R: Borrow<Dictionary>,
{
    fn eq(&self, other: &TypedDictionary<K, V, R>) -> bool {
        self.inner.borrow() == other.inner.borrow()
    }
}

impl<K: Marshal, V: Marshal> FromIterator<(K, V)> for TypedDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::wrap(iter.into_iter().collect())
    }
}

impl<K, V, S: Borrow<Dictionary>> ToVariant for TypedDictionary<K, V, S> {
    fn to_variant(&self) -> Variant {
        self.inner.borrow().to_variant()
    }
}

impl<K: Marshal, V: Marshal> FromVariant for TypedDictionary<K, V> {
    fn from_variant(value: &Variant) -> Result<Self> {
        Dictionary::from_variant(value).map(Self::wrap)
    }
}

//! The two iteration contracts.
//!
//! [`LiveIter`] reads the array's current state at every step.
//! [`SnapshotIter`] and [`Entries`] walk state captured when they were
//! created and never observe later mutation of the source.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use vessel_engine::Variant;

use crate::array::Array;
use crate::error::{CollectionError, Result};
use crate::marshal::FromVariant;

/// Index-driven pass over an array's live contents.
///
/// The length is captured when the pass starts and element `i` is fetched
/// from the engine on step `i`, so replacing an element ahead of the cursor
/// is observed. Growing or shrinking the array mid-pass is not supported:
/// the next step yields [`CollectionError::CountChanged`] once and the pass
/// ends.
pub struct LiveIter<'a, T = Variant> {
    array: &'a Array,
    index: usize,
    count: usize,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> LiveIter<'a, T> {
    pub(crate) fn new(array: &'a Array) -> Self {
        Self {
            array,
            index: 0,
            count: array.len(),
            finished: false,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: FromVariant> Iterator for LiveIter<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.index >= self.count {
            return None;
        }

        let actual = self.array.len();
        if actual != self.count {
            self.finished = true;
            return Some(Err(CollectionError::CountChanged {
                expected: self.count,
                actual,
            }));
        }

        let item = self.array.get(self.index).and_then(|v| T::from_variant(&v));
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        (0, Some(self.count - self.index))
    }
}

impl<'a, T: FromVariant> FusedIterator for LiveIter<'a, T> {}

/// Pass over a private shallow copy of an array
pub struct SnapshotIter<T = Variant> {
    items: Array,
    index: usize,
    count: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SnapshotIter<T> {
    pub(crate) fn new(items: Array) -> Self {
        let count = items.len();
        Self {
            items,
            index: 0,
            count,
            _marker: PhantomData,
        }
    }
}

impl<T: FromVariant> Iterator for SnapshotIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let item = self.items.get(self.index).and_then(|v| T::from_variant(&v));
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: FromVariant> ExactSizeIterator for SnapshotIter<T> {}

impl<T: FromVariant> FusedIterator for SnapshotIter<T> {}

/// Dictionary entry enumerator.
///
/// Keys, values and the entry count are captured once at construction;
/// the enumerator then walks them by position. Mutating the dictionary
/// afterwards does not affect it.
pub struct Entries<K = Variant, V = Variant> {
    keys: Array,
    values: Array,
    index: usize,
    count: usize,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Entries<K, V> {
    pub(crate) fn new(keys: Array, values: Array, count: usize) -> Self {
        Self {
            keys,
            values,
            index: 0,
            count,
            _marker: PhantomData,
        }
    }

    /// Restart from the first captured entry
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl<K: FromVariant, V: FromVariant> Iterator for Entries<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        let i = self.index;
        self.index += 1;

        let entry = self
            .keys
            .get(i)
            .and_then(|k| K::from_variant(&k))
            .and_then(|key| {
                let value = self.values.get(i).and_then(|v| V::from_variant(&v))?;
                Ok((key, value))
            });
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl<K: FromVariant, V: FromVariant> ExactSizeIterator for Entries<K, V> {}

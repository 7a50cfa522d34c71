use std::fmt;
use std::ops::Add;

use vessel_engine::icall::array as native;
use vessel_engine::{RawArray, Status, Variant, VariantType};

use crate::error::{check, CollectionError, Result};
use crate::handle::{take_engine_string, ArrayKind, NativeHandle};
use crate::iter::{LiveIter, SnapshotIter};
use crate::marshal::{FromVariant, Marshal, ToVariant};
use crate::typed_array::TypedArray;

/// Engine-backed ordered sequence of [`Variant`]s.
///
/// Owns exactly one engine handle. Every query goes to the engine; nothing
/// (not even the length) is cached on this side. Mutating methods take
/// `&self` because the storage lives in the engine and may be shared with
/// typed views of the same array.
pub struct Array {
    handle: NativeHandle<ArrayKind>,
}

/// Boundary index for a host index. Indices past `i64::MAX` cannot exist in
/// the engine and are reported by it as out of range.
pub(crate) fn boundary_index(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

impl Array {
    /// Empty array
    pub fn new() -> Self {
        Self::construct("construct", |dest| unsafe { native::vessel_array_ctor(dest) })
    }

    /// Array holding every element of `source`, in iteration order.
    /// `None` stands for an absent source and is rejected.
    pub fn from_collection<I>(source: Option<I>) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: ToVariant,
    {
        let source = source.ok_or(CollectionError::NullInput("collection"))?;

        let array = Array::new();
        for item in source {
            array.push(item)?;
        }
        Ok(array)
    }

    /// Array populated by the engine from a list of dynamic values
    pub fn from_values(values: &[Variant]) -> Self {
        Self::construct("construct", |dest| unsafe {
            native::vessel_array_ctor_from_variants(values.as_ptr(), values.len(), dest)
        })
    }

    /// Take ownership of a handle the engine writes into `dest`.
    pub(crate) fn adopt(operation: &'static str, ctor: impl FnOnce(*mut RawArray) -> Status) -> Result<Self> {
        NativeHandle::acquire(operation, ctor).map(|handle| Array { handle })
    }

    /// Constructors that cannot fail on a valid destination. A failure is
    /// logged and leaves the array in the released state, where every
    /// operation reports `NativeOperation`.
    fn construct(operation: &'static str, ctor: impl FnOnce(*mut RawArray) -> Status) -> Self {
        Self::adopt(operation, ctor).unwrap_or_else(|err| {
            log::error!("engine could not {} an array: {}", operation, err);
            Array::released()
        })
    }

    pub(crate) fn released() -> Self {
        Array {
            handle: NativeHandle::released(),
        }
    }

    pub(crate) fn ptr(&self) -> *const RawArray {
        self.handle.as_ptr()
    }

    fn range_checked(&self, operation: &'static str, index: usize, status: Status) -> Result<()> {
        match status {
            Status::ParameterRangeError => Err(CollectionError::IndexOutOfRange {
                index,
                count: self.len(),
            }),
            other => check(operation, other),
        }
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Result<Variant> {
        let mut out = Variant::Nil;
        let status = unsafe { native::vessel_array_at(self.ptr(), boundary_index(index), &mut out) };
        self.range_checked("get", index, status)?;
        Ok(out)
    }

    /// Overwrite the element at `index`
    pub fn set(&self, index: usize, value: impl ToVariant) -> Result<()> {
        let value = value.to_variant();
        let status = unsafe { native::vessel_array_set_at(self.ptr(), boundary_index(index), &value) };
        self.range_checked("set", index, status)
    }

    pub fn len(&self) -> usize {
        let count = unsafe { native::vessel_array_count(self.ptr()) };
        usize::try_from(count).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `value`, returning its index
    pub fn push(&self, value: impl ToVariant) -> Result<usize> {
        let value = value.to_variant();
        let index = unsafe { native::vessel_array_add(self.ptr(), &value) };
        usize::try_from(index).map_err(|_| CollectionError::native("add", Status::InvalidParameter))
    }

    /// Insert before `index`; `index == len()` appends
    pub fn insert(&self, index: usize, value: impl ToVariant) -> Result<()> {
        let value = value.to_variant();
        let status = unsafe { native::vessel_array_insert(self.ptr(), boundary_index(index), &value) };
        self.range_checked("insert", index, status)
    }

    /// Remove the first element equal to `value`. `false` when none matched.
    pub fn remove(&self, value: impl ToVariant) -> bool {
        let value = value.to_variant();
        unsafe { native::vessel_array_remove(self.ptr(), &value) }
    }

    pub fn remove_at(&self, index: usize) -> Result<()> {
        let status = unsafe { native::vessel_array_remove_at(self.ptr(), boundary_index(index)) };
        self.range_checked("remove_at", index, status)
    }

    pub fn clear(&self) -> Result<()> {
        check("clear", unsafe { native::vessel_array_clear(self.ptr()) })
    }

    pub fn contains(&self, value: impl ToVariant) -> bool {
        let value = value.to_variant();
        unsafe { native::vessel_array_contains(self.ptr(), &value) }
    }

    /// Index of the first element equal to `value`, or `-1` when absent.
    pub fn index_of(&self, value: impl ToVariant) -> i64 {
        let value = value.to_variant();
        unsafe { native::vessel_array_index_of(self.ptr(), &value) }
    }

    /// Independent copy. A shallow copy (`deep == false`) still shares
    /// nested arrays and dictionaries with `self`.
    pub fn duplicate(&self, deep: bool) -> Result<Array> {
        Array::adopt("duplicate", |dest| unsafe {
            native::vessel_array_duplicate(self.ptr(), deep, dest)
        })
    }

    /// Grow or shrink to exactly `new_len` elements. New slots hold `Nil`.
    pub fn resize(&self, new_len: usize) -> Result<()> {
        let status = unsafe { native::vessel_array_resize(self.ptr(), boundary_index(new_len)) };
        if !status.is_ok() {
            log::debug!("resize to {} failed: {}", new_len, status);
        }
        check("resize", status)
    }

    /// Randomize element order in place using the engine's generator
    pub fn shuffle(&self) -> Result<()> {
        check("shuffle", unsafe { native::vessel_array_shuffle(self.ptr()) })
    }

    /// New array with `self`'s elements followed by `other`'s. Neither
    /// operand changes.
    pub fn concat(&self, other: &Array) -> Result<Array> {
        Array::adopt("concatenate", |dest| unsafe {
            native::vessel_array_concatenate(self.ptr(), other.ptr(), dest)
        })
    }

    /// Live pass over the current contents. See [`LiveIter`].
    pub fn iter_live(&self) -> LiveIter<'_> {
        LiveIter::new(self)
    }

    /// Pass over a shallow copy taken now. Later mutation of `self` is not
    /// observed.
    pub fn iter_snapshot(&self) -> Result<SnapshotIter> {
        self.duplicate(false).map(SnapshotIter::new)
    }

    /// Copy every element into `dest` starting at `dest[index]`.
    ///
    /// Capacity is checked before anything is written.
    pub fn copy_to(&self, dest: &mut [Variant], index: usize) -> Result<()> {
        copy_out(self, dest, index)
    }

    /// Typed view borrowing this array
    pub fn typed<T: Marshal>(&self) -> TypedArray<T, &Array> {
        TypedArray::wrap(self)
    }

    /// Release the engine handle now and report a failure, unlike the
    /// silent release on drop.
    pub fn dispose(mut self) -> Result<()> {
        self.handle.release()
    }
}

/// Shared by the untyped and typed `copy_to`.
pub(crate) fn copy_out<T: FromVariant>(array: &Array, dest: &mut [T], index: usize) -> Result<()> {
    let count = array.len();
    let required = index.saturating_add(count);
    if dest.len() < required {
        return Err(CollectionError::DestinationTooSmall {
            required,
            capacity: dest.len(),
        });
    }

    // Convert everything first so a bad element leaves `dest` untouched.
    let items = (0..count)
        .map(|i| array.get(i).and_then(|v| T::from_variant(&v)))
        .collect::<Result<Vec<T>>>()?;

    for (slot, item) in dest[index..].iter_mut().zip(items) {
        *slot = item;
    }
    Ok(())
}

impl Default for Array {
    fn default() -> Self {
        Array::new()
    }
}

impl Add<&Array> for &Array {
    type Output = Result<Array>;

    fn add(self, rhs: &Array) -> Result<Array> {
        self.concat(rhs)
    }
}

/// The engine's rendering. Strings are quoted, a container nested inside
/// itself shows as `[...]` and NUL characters as `\u{0}`.
impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = unsafe { take_engine_string(native::vessel_array_to_string(self.ptr())) };
        f.write_str(&text)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array({})", self)
    }
}

/// Element-wise equality of the current contents
impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.to_variant() == other.to_variant()
    }
}

impl<T: ToVariant> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let values: Vec<Variant> = iter.into_iter().map(|item| item.to_variant()).collect();
        Array::from_values(&values)
    }
}

/// Shares storage: the variant refers to the same engine array.
impl ToVariant for Array {
    fn to_variant(&self) -> Variant {
        let mut out = Variant::Nil;
        let status = unsafe { native::vessel_variant_from_array(self.ptr(), &mut out) };
        if !status.is_ok() {
            log::warn!("array could not cross as a variant: {}", status);
        }
        out
    }
}

/// New handle over the variant's storage (no copy)
impl FromVariant for Array {
    fn from_variant(value: &Variant) -> Result<Self> {
        if value.get_type() != VariantType::Array {
            return Err(CollectionError::conversion::<Array>(value.get_type()));
        }
        Array::adopt("from_variant", |dest| unsafe {
            native::vessel_array_from_variant(value, dest)
        })
    }
}

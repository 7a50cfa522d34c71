use std::fmt;

use vessel_engine::icall::dict as native;
use vessel_engine::{RawDictionary, Status, Variant, VariantType};

use crate::array::Array;
use crate::error::{check, CollectionError, Result};
use crate::handle::{take_engine_string, DictionaryKind, NativeHandle};
use crate::iter::Entries;
use crate::marshal::{FromVariant, Marshal, ToVariant};
use crate::typed_dictionary::TypedDictionary;

/// Engine-backed, insertion-ordered mapping from [`Variant`] keys to
/// [`Variant`] values.
///
/// Note the asymmetry inherited from the engine: [`Dictionary::get`] fails
/// on a missing key while [`Dictionary::set`] inserts it.
pub struct Dictionary {
    handle: NativeHandle<DictionaryKind>,
}

/// Key rendering used in error messages
fn describe_key(key: &Variant) -> String {
    match key {
        Variant::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self::adopt("construct", |dest| unsafe { native::vessel_dictionary_ctor(dest) }).unwrap_or_else(|err| {
            log::error!("engine could not construct a dictionary: {}", err);
            Dictionary {
                handle: NativeHandle::released(),
            }
        })
    }

    /// Dictionary holding every pair of `source`, added in iteration order.
    /// `None` stands for an absent source and is rejected; a repeated key
    /// fails with `DuplicateKey`.
    pub fn from_collection<I, K, V>(source: Option<I>) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToVariant,
        V: ToVariant,
    {
        let source = source.ok_or(CollectionError::NullInput("collection"))?;

        let dict = Dictionary::new();
        for (key, value) in source {
            dict.add(key, value)?;
        }
        Ok(dict)
    }

    /// Dictionary built from literal pairs. A repeated key keeps the last
    /// value, as with `set`.
    pub fn from_pairs(pairs: &[(Variant, Variant)]) -> Self {
        pairs.iter().map(|(k, v)| (k, v)).collect()
    }

    pub(crate) fn adopt(operation: &'static str, ctor: impl FnOnce(*mut RawDictionary) -> Status) -> Result<Self> {
        NativeHandle::acquire(operation, ctor).map(|handle| Dictionary { handle })
    }

    pub(crate) fn ptr(&self) -> *const RawDictionary {
        self.handle.as_ptr()
    }

    /// Value stored under `key`; `KeyNotFound` when absent
    pub fn get(&self, key: impl ToVariant) -> Result<Variant> {
        let key = key.to_variant();
        let mut out = Variant::Nil;
        match unsafe { native::vessel_dictionary_get_value(self.ptr(), &key, &mut out) } {
            Status::Ok => Ok(out),
            Status::DoesNotExist => Err(CollectionError::KeyNotFound {
                key: describe_key(&key),
            }),
            other => Err(CollectionError::native("get", other)),
        }
    }

    /// Store `value` under `key`, inserting the key when absent (upsert)
    pub fn set(&self, key: impl ToVariant, value: impl ToVariant) -> Result<()> {
        let (key, value) = (key.to_variant(), value.to_variant());
        check("set", unsafe { native::vessel_dictionary_set_value(self.ptr(), &key, &value) })
    }

    /// Like [`Dictionary::get`] with absence as `None`
    pub fn try_get(&self, key: impl ToVariant) -> Option<Variant> {
        let key = key.to_variant();
        let mut out = Variant::Nil;
        unsafe { native::vessel_dictionary_try_get_value(self.ptr(), &key, &mut out) }.then_some(out)
    }

    /// Insert a new entry; `DuplicateKey` when `key` is already present
    pub fn add(&self, key: impl ToVariant, value: impl ToVariant) -> Result<()> {
        let (key, value) = (key.to_variant(), value.to_variant());
        match unsafe { native::vessel_dictionary_add(self.ptr(), &key, &value) } {
            Status::AlreadyExists => Err(CollectionError::DuplicateKey {
                key: describe_key(&key),
            }),
            other => check("add", other),
        }
    }

    pub fn contains_key(&self, key: impl ToVariant) -> bool {
        let key = key.to_variant();
        unsafe { native::vessel_dictionary_contains_key(self.ptr(), &key) }
    }

    /// Whether `key` is present and maps to `value`
    pub fn contains(&self, key: impl ToVariant, value: impl ToVariant) -> bool {
        let (key, value) = (key.to_variant(), value.to_variant());
        unsafe { native::vessel_dictionary_contains(self.ptr(), &key, &value) }
    }

    /// Remove the entry under `key`. `false` when absent.
    pub fn remove(&self, key: impl ToVariant) -> bool {
        let key = key.to_variant();
        unsafe { native::vessel_dictionary_remove_key(self.ptr(), &key) }
    }

    /// Remove the entry under `key` only when it maps to `value`
    pub fn remove_entry(&self, key: impl ToVariant, value: impl ToVariant) -> bool {
        let (key, value) = (key.to_variant(), value.to_variant());
        unsafe { native::vessel_dictionary_remove(self.ptr(), &key, &value) }
    }

    pub fn clear(&self) -> Result<()> {
        check("clear", unsafe { native::vessel_dictionary_clear(self.ptr()) })
    }

    pub fn len(&self) -> usize {
        let count = unsafe { native::vessel_dictionary_count(self.ptr()) };
        usize::try_from(count).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh array of the keys in insertion order. Each call extracts a new,
    /// independent array.
    pub fn keys(&self) -> Result<Array> {
        Array::adopt("keys", |dest| unsafe { native::vessel_dictionary_keys(self.ptr(), dest) })
    }

    /// Fresh array of the values, ordered like [`Dictionary::keys`]
    pub fn values(&self) -> Result<Array> {
        Array::adopt("values", |dest| unsafe { native::vessel_dictionary_values(self.ptr(), dest) })
    }

    /// Independent copy; `deep == false` shares nested containers.
    pub fn duplicate(&self, deep: bool) -> Result<Dictionary> {
        Dictionary::adopt("duplicate", |dest| unsafe {
            native::vessel_dictionary_duplicate(self.ptr(), deep, dest)
        })
    }

    /// Entry enumerator over the state at this call. See [`Entries`].
    pub fn iter_snapshot(&self) -> Result<Entries> {
        entries_of(self)
    }

    /// Copy every entry into `dest` starting at `dest[index]`.
    ///
    /// Capacity is checked before anything is written.
    pub fn copy_to(&self, dest: &mut [(Variant, Variant)], index: usize) -> Result<()> {
        copy_entries_out(self, dest, index)
    }

    /// Typed view borrowing this dictionary
    pub fn typed<K: Marshal, V: Marshal>(&self) -> TypedDictionary<K, V, &Dictionary> {
        TypedDictionary::wrap(self)
    }

    /// Release the engine handle now, reporting a failure.
    pub fn dispose(mut self) -> Result<()> {
        self.handle.release()
    }
}

pub(crate) fn entries_of<K, V>(dict: &Dictionary) -> Result<Entries<K, V>> {
    let keys = dict.keys()?;
    let values = dict.values()?;
    let count = dict.len();
    Ok(Entries::new(keys, values, count))
}

pub(crate) fn copy_entries_out<K, V>(dict: &Dictionary, dest: &mut [(K, V)], index: usize) -> Result<()>
where
    K: FromVariant,
    V: FromVariant,
{
    let count = dict.len();
    let required = index.saturating_add(count);
    if dest.len() < required {
        return Err(CollectionError::DestinationTooSmall {
            required,
            capacity: dest.len(),
        });
    }

    let entries = entries_of::<K, V>(dict)?.collect::<Result<Vec<_>>>()?;
    for (slot, entry) in dest[index..].iter_mut().zip(entries) {
        *slot = entry;
    }
    Ok(())
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::new()
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = unsafe { take_engine_string(native::vessel_dictionary_to_string(self.ptr())) };
        f.write_str(&text)
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dictionary({})", self)
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.to_variant() == other.to_variant()
    }
}

/// Later pairs overwrite earlier ones with the same key.
impl<K: ToVariant, V: ToVariant> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let dict = Dictionary::new();
        for (key, value) in iter {
            if let Err(err) = dict.set(key, value) {
                log::warn!("dropping entry while collecting a dictionary: {}", err);
            }
        }
        dict
    }
}

impl ToVariant for Dictionary {
    fn to_variant(&self) -> Variant {
        let mut out = Variant::Nil;
        let status = unsafe { native::vessel_variant_from_dictionary(self.ptr(), &mut out) };
        if !status.is_ok() {
            log::warn!("dictionary could not cross as a variant: {}", status);
        }
        out
    }
}

impl FromVariant for Dictionary {
    fn from_variant(value: &Variant) -> Result<Self> {
        if value.get_type() != VariantType::Dictionary {
            return Err(CollectionError::conversion::<Dictionary>(value.get_type()));
        }
        Dictionary::adopt("from_variant", |dest| unsafe {
            native::vessel_dictionary_from_variant(value, dest)
        })
    }
}

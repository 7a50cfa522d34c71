use std::os::raw::c_char;

use super::array::{write_handle as write_array_handle, RawArray};
use super::into_c_string;
use crate::status::Status;
use crate::storage::{ArrayRef, DictRef};
use crate::variant::Variant;

/// Raw mapping handle (C-compatible). Null is the released state.
#[repr(C)]
#[derive(Debug)]
pub struct RawDictionary {
    pub(crate) data: *mut DictRef,
}

impl Default for RawDictionary {
    fn default() -> Self {
        Self {
            data: std::ptr::null_mut(),
        }
    }
}

impl RawDictionary {
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub(crate) fn from_ref(dict: DictRef) -> Self {
        Self {
            data: Box::into_raw(Box::new(dict)),
        }
    }
}

unsafe fn storage<'a>(ptr: *const RawDictionary) -> Option<&'a DictRef> {
    ptr.as_ref()?.data.as_ref()
}

unsafe fn write_handle(dest: *mut RawDictionary, dict: DictRef) -> Status {
    if dest.is_null() {
        return Status::InvalidParameter;
    }
    dest.write(RawDictionary::from_ref(dict));
    Status::Ok
}

/// Create an empty dictionary
///
/// # Safety
/// `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_ctor(dest: *mut RawDictionary) -> Status {
    write_handle(dest, DictRef::new(Vec::new()))
}

/// Release the handle. Releasing a null handle again is a no-op.
///
/// # Safety
/// `ptr` must be null or valid for reads and writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_dispose(ptr: *mut RawDictionary) -> Status {
    let Some(handle) = ptr.as_mut() else {
        return Status::InvalidParameter;
    };

    if !handle.data.is_null() {
        drop(Box::from_raw(handle.data));
        handle.data = std::ptr::null_mut();
    }

    Status::Ok
}

/// Read the value stored under `key`
///
/// # Safety
/// `ptr` must be null or a valid handle; `key` must be null or point to an
/// initialized value; `out` must be null or point to an initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_get_value(
    ptr: *const RawDictionary,
    key: *const Variant,
    out: *mut Variant,
) -> Status {
    let (Some(dict), Some(key), Some(out)) = (storage(ptr), key.as_ref(), out.as_mut()) else {
        return Status::InvalidParameter;
    };

    match dict.get(key) {
        Some(value) => {
            *out = value;
            Status::Ok
        }
        None => Status::DoesNotExist,
    }
}

/// Like `vessel_dictionary_get_value`, reporting absence as `false`
///
/// # Safety
/// Same contract as `vessel_dictionary_get_value`.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_try_get_value(
    ptr: *const RawDictionary,
    key: *const Variant,
    out: *mut Variant,
) -> bool {
    vessel_dictionary_get_value(ptr, key, out).is_ok()
}

/// Store `value` under `key`, inserting the key when absent
///
/// # Safety
/// `ptr` must be null or a valid handle; `key` and `value` must be null or
/// point to initialized values.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_set_value(
    ptr: *const RawDictionary,
    key: *const Variant,
    value: *const Variant,
) -> Status {
    let (Some(dict), Some(key), Some(value)) = (storage(ptr), key.as_ref(), value.as_ref()) else {
        return Status::InvalidParameter;
    };

    dict.upsert(key.clone(), value.clone());
    Status::Ok
}

/// New array of the keys, in insertion order
///
/// # Safety
/// `ptr` must be null or a valid handle; `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_keys(ptr: *const RawDictionary, dest: *mut RawArray) -> Status {
    let Some(dict) = storage(ptr) else {
        return Status::InvalidParameter;
    };

    let keys = dict.with(|entries| entries.iter().map(|e| e.key.clone()).collect());
    write_array_handle(dest, ArrayRef::new(keys))
}

/// New array of the values, in key insertion order
///
/// # Safety
/// `ptr` must be null or a valid handle; `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_values(ptr: *const RawDictionary, dest: *mut RawArray) -> Status {
    let Some(dict) = storage(ptr) else {
        return Status::InvalidParameter;
    };

    let values = dict.with(|entries| entries.iter().map(|e| e.value.clone()).collect());
    write_array_handle(dest, ArrayRef::new(values))
}

/// Number of entries (0 for a released handle)
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_count(ptr: *const RawDictionary) -> i64 {
    storage(ptr).map_or(0, |dict| dict.len() as i64)
}

/// Insert a new entry; fails with `AlreadyExists` when `key` is present
///
/// # Safety
/// `ptr` must be null or a valid handle; `key` and `value` must be null or
/// point to initialized values.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_add(
    ptr: *const RawDictionary,
    key: *const Variant,
    value: *const Variant,
) -> Status {
    let (Some(dict), Some(key), Some(value)) = (storage(ptr), key.as_ref(), value.as_ref()) else {
        return Status::InvalidParameter;
    };

    if dict.position(key).is_some() {
        return Status::AlreadyExists;
    }

    dict.upsert(key.clone(), value.clone());
    Status::Ok
}

/// Remove every entry
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_clear(ptr: *const RawDictionary) -> Status {
    match storage(ptr) {
        Some(dict) => {
            dict.with_mut(|entries| entries.clear());
            Status::Ok
        }
        None => Status::InvalidParameter,
    }
}

/// Whether `key` is present and maps to `value`
///
/// # Safety
/// `ptr` must be null or a valid handle; `key` and `value` must be null or
/// point to initialized values.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_contains(
    ptr: *const RawDictionary,
    key: *const Variant,
    value: *const Variant,
) -> bool {
    let (Some(dict), Some(key), Some(value)) = (storage(ptr), key.as_ref(), value.as_ref()) else {
        return false;
    };

    dict.get(key).map_or(false, |stored| &stored == value)
}

/// Whether `key` is present
///
/// # Safety
/// `ptr` must be null or a valid handle; `key` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_contains_key(ptr: *const RawDictionary, key: *const Variant) -> bool {
    match (storage(ptr), key.as_ref()) {
        (Some(dict), Some(key)) => dict.position(key).is_some(),
        _ => false,
    }
}

/// Copy the dictionary. Nested containers are shared unless `deep` is set.
/// A deep copy of a self-containing dictionary reports `Failed`.
///
/// # Safety
/// `ptr` must be null or a valid handle; `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_duplicate(
    ptr: *const RawDictionary,
    deep: bool,
    dest: *mut RawDictionary,
) -> Status {
    let Some(dict) = storage(ptr) else {
        return Status::InvalidParameter;
    };

    match dict.duplicate(deep) {
        Ok(copy) => write_handle(dest, copy),
        Err(status) => status,
    }
}

/// Remove the entry under `key`; `false` when absent
///
/// # Safety
/// `ptr` must be null or a valid handle; `key` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_remove_key(ptr: *const RawDictionary, key: *const Variant) -> bool {
    let (Some(dict), Some(key)) = (storage(ptr), key.as_ref()) else {
        return false;
    };

    match dict.position(key) {
        Some(index) => {
            dict.with_mut(|entries| entries.remove(index));
            true
        }
        None => false,
    }
}

/// Remove the entry under `key` only when it maps to `value`
///
/// # Safety
/// Same contract as `vessel_dictionary_contains`.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_remove(
    ptr: *const RawDictionary,
    key: *const Variant,
    value: *const Variant,
) -> bool {
    vessel_dictionary_contains(ptr, key, value) && vessel_dictionary_remove_key(ptr, key)
}

/// Format the dictionary; free the result with `vessel_string_free`
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_to_string(ptr: *const RawDictionary) -> *mut c_char {
    match storage(ptr) {
        Some(dict) => into_c_string(dict.to_string()),
        None => std::ptr::null_mut(),
    }
}

/// New handle sharing the storage of a `Dictionary` variant
///
/// # Safety
/// `value` must be null or point to an initialized value; `dest` must be
/// valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_dictionary_from_variant(value: *const Variant, dest: *mut RawDictionary) -> Status {
    match value.as_ref() {
        Some(Variant::Dictionary(dict)) => write_handle(dest, dict.clone()),
        _ => Status::InvalidParameter,
    }
}

/// Wrap the handle's storage in a variant (shared, not copied)
///
/// # Safety
/// `ptr` must be null or a valid handle; `out` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_variant_from_dictionary(ptr: *const RawDictionary, out: *mut Variant) -> Status {
    let (Some(dict), Some(out)) = (storage(ptr), out.as_mut()) else {
        return Status::InvalidParameter;
    };
    *out = Variant::Dictionary(dict.clone());
    Status::Ok
}

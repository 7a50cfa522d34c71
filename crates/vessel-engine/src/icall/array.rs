use std::os::raw::c_char;

use rand::seq::SliceRandom;

use super::into_c_string;
use crate::config;
use crate::status::Status;
use crate::storage::ArrayRef;
use crate::variant::Variant;

/// Raw sequence handle (C-compatible)
///
/// Holds one reference to engine storage. The null state is the released
/// state; `Default` produces it.
#[repr(C)]
#[derive(Debug)]
pub struct RawArray {
    pub(crate) data: *mut ArrayRef,
}

impl Default for RawArray {
    fn default() -> Self {
        Self {
            data: std::ptr::null_mut(),
        }
    }
}

impl RawArray {
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub(crate) fn from_ref(array: ArrayRef) -> Self {
        Self {
            data: Box::into_raw(Box::new(array)),
        }
    }
}

/// Storage behind a live handle, `None` for null or released handles.
unsafe fn storage<'a>(ptr: *const RawArray) -> Option<&'a ArrayRef> {
    ptr.as_ref()?.data.as_ref()
}

pub(crate) unsafe fn write_handle(dest: *mut RawArray, array: ArrayRef) -> Status {
    if dest.is_null() {
        return Status::InvalidParameter;
    }
    dest.write(RawArray::from_ref(array));
    Status::Ok
}

/// Checked conversion of a boundary index into a slot position.
fn slot(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}

/// Create an empty array
///
/// # Safety
/// `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_ctor(dest: *mut RawArray) -> Status {
    write_handle(dest, ArrayRef::new(Vec::new()))
}

/// Create an array populated from `len` dynamic values
///
/// # Safety
/// `items` must point to `len` initialized values (or be null when `len`
/// is zero) and `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_ctor_from_variants(
    items: *const Variant,
    len: usize,
    dest: *mut RawArray,
) -> Status {
    if items.is_null() && len > 0 {
        return Status::InvalidParameter;
    }

    let elements = if len > 0 {
        std::slice::from_raw_parts(items, len).to_vec()
    } else {
        Vec::new()
    };

    write_handle(dest, ArrayRef::new(elements))
}

/// Release the handle. Releasing a null handle again is a no-op.
///
/// # Safety
/// `ptr` must be null or valid for reads and writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_dispose(ptr: *mut RawArray) -> Status {
    let Some(handle) = ptr.as_mut() else {
        return Status::InvalidParameter;
    };

    if !handle.data.is_null() {
        drop(Box::from_raw(handle.data));
        handle.data = std::ptr::null_mut();
    }

    Status::Ok
}

/// Read the element at `index` into `out`
///
/// # Safety
/// `ptr` must be null or a valid handle; `out` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_at(ptr: *const RawArray, index: i64, out: *mut Variant) -> Status {
    let (Some(array), Some(out)) = (storage(ptr), out.as_mut()) else {
        return Status::InvalidParameter;
    };

    array.with(|items| match slot(index, items.len()) {
        Some(i) => {
            *out = items[i].clone();
            Status::Ok
        }
        None => Status::ParameterRangeError,
    })
}

/// Overwrite the element at `index`
///
/// # Safety
/// `ptr` must be null or a valid handle; `value` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_set_at(ptr: *const RawArray, index: i64, value: *const Variant) -> Status {
    let (Some(array), Some(value)) = (storage(ptr), value.as_ref()) else {
        return Status::InvalidParameter;
    };
    let value = value.clone();

    array.with_mut(|items| match slot(index, items.len()) {
        Some(i) => {
            items[i] = value;
            Status::Ok
        }
        None => Status::ParameterRangeError,
    })
}

/// Number of elements (0 for a released handle)
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_count(ptr: *const RawArray) -> i64 {
    storage(ptr).map_or(0, |array| array.len() as i64)
}

/// Append an element, returning its index (-1 for an invalid call)
///
/// # Safety
/// `ptr` must be null or a valid handle; `item` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_add(ptr: *const RawArray, item: *const Variant) -> i64 {
    let (Some(array), Some(item)) = (storage(ptr), item.as_ref()) else {
        return -1;
    };
    let item = item.clone();

    array.with_mut(|items| {
        items.push(item);
        (items.len() - 1) as i64
    })
}

/// Remove every element
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_clear(ptr: *const RawArray) -> Status {
    match storage(ptr) {
        Some(array) => {
            array.with_mut(|items| items.clear());
            Status::Ok
        }
        None => Status::InvalidParameter,
    }
}

/// New array holding `left`'s elements followed by `right`'s
///
/// # Safety
/// `left` and `right` must be null or valid handles; `dest` must be valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_concatenate(
    left: *const RawArray,
    right: *const RawArray,
    dest: *mut RawArray,
) -> Status {
    let (Some(left), Some(right)) = (storage(left), storage(right)) else {
        return Status::InvalidParameter;
    };

    let elements = left.with(|a| right.with(|b| a.iter().chain(b.iter()).cloned().collect()));
    write_handle(dest, ArrayRef::new(elements))
}

/// Whether any element equals `item`
///
/// # Safety
/// `ptr` must be null or a valid handle; `item` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_contains(ptr: *const RawArray, item: *const Variant) -> bool {
    vessel_array_index_of(ptr, item) >= 0
}

/// Copy the array. Nested containers are shared unless `deep` is set.
/// A deep copy of a self-containing array reports `Failed`.
///
/// # Safety
/// `ptr` must be null or a valid handle; `dest` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_duplicate(ptr: *const RawArray, deep: bool, dest: *mut RawArray) -> Status {
    let Some(array) = storage(ptr) else {
        return Status::InvalidParameter;
    };

    match array.duplicate(deep) {
        Ok(copy) => write_handle(dest, copy),
        Err(status) => status,
    }
}

/// Index of the first element equal to `item`, or -1
///
/// # Safety
/// `ptr` must be null or a valid handle; `item` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_index_of(ptr: *const RawArray, item: *const Variant) -> i64 {
    let (Some(array), Some(item)) = (storage(ptr), item.as_ref()) else {
        return -1;
    };

    array.with(|items| {
        items
            .iter()
            .position(|v| v == item)
            .map_or(-1, |i| i as i64)
    })
}

/// Insert before `index`; `index == count` appends
///
/// # Safety
/// `ptr` must be null or a valid handle; `item` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_insert(ptr: *const RawArray, index: i64, item: *const Variant) -> Status {
    let (Some(array), Some(item)) = (storage(ptr), item.as_ref()) else {
        return Status::InvalidParameter;
    };
    let item = item.clone();

    array.with_mut(|items| match slot(index, items.len() + 1) {
        Some(i) => {
            items.insert(i, item);
            Status::Ok
        }
        None => Status::ParameterRangeError,
    })
}

/// Remove the first element equal to `item`
///
/// # Safety
/// `ptr` must be null or a valid handle; `item` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_remove(ptr: *const RawArray, item: *const Variant) -> bool {
    let index = vessel_array_index_of(ptr, item);
    index >= 0 && vessel_array_remove_at(ptr, index).is_ok()
}

/// Remove the element at `index`, shifting later elements left
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_remove_at(ptr: *const RawArray, index: i64) -> Status {
    let Some(array) = storage(ptr) else {
        return Status::InvalidParameter;
    };

    array.with_mut(|items| match slot(index, items.len()) {
        Some(i) => {
            items.remove(i);
            Status::Ok
        }
        None => Status::ParameterRangeError,
    })
}

/// Grow or shrink to exactly `new_size` elements; new slots hold `Nil`
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_resize(ptr: *const RawArray, new_size: i64) -> Status {
    let Some(array) = storage(ptr) else {
        return Status::InvalidParameter;
    };
    let Ok(new_size) = usize::try_from(new_size) else {
        return Status::InvalidParameter;
    };

    let max_len = config::config().max_len;
    if new_size > max_len {
        log::debug!("resize to {} rejected (max_len {})", new_size, max_len);
        return Status::OutOfMemory;
    }

    array.with_mut(|items| {
        if items.try_reserve(new_size.saturating_sub(items.len())).is_err() {
            return Status::OutOfMemory;
        }
        items.resize(new_size, Variant::Nil);
        Status::Ok
    })
}

/// Randomize element order in place
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_shuffle(ptr: *const RawArray) -> Status {
    let Some(array) = storage(ptr) else {
        return Status::InvalidParameter;
    };

    config::with_rng(|rng| array.with_mut(|items| items.shuffle(rng)));
    Status::Ok
}

/// Format the array; free the result with `vessel_string_free`
///
/// # Safety
/// `ptr` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_to_string(ptr: *const RawArray) -> *mut c_char {
    match storage(ptr) {
        Some(array) => into_c_string(array.to_string()),
        None => std::ptr::null_mut(),
    }
}

/// New handle sharing the storage of an `Array` variant
///
/// # Safety
/// `value` must be null or point to an initialized value; `dest` must be
/// valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vessel_array_from_variant(value: *const Variant, dest: *mut RawArray) -> Status {
    match value.as_ref() {
        Some(Variant::Array(array)) => write_handle(dest, array.clone()),
        _ => Status::InvalidParameter,
    }
}

/// Wrap the handle's storage in a variant (shared, not copied)
///
/// # Safety
/// `ptr` must be null or a valid handle; `out` must be null or point to an
/// initialized value.
#[no_mangle]
pub unsafe extern "C" fn vessel_variant_from_array(ptr: *const RawArray, out: *mut Variant) -> Status {
    let (Some(array), Some(out)) = (storage(ptr), out.as_mut()) else {
        return Status::InvalidParameter;
    };
    *out = Variant::Array(array.clone());
    Status::Ok
}

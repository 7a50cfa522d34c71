// Engine boundary: C-compatible entry points over raw container handles.
//
// Dynamic values cross by pointer to `Variant`; both sides of the boundary
// are built from this crate, so the layout is shared.
#![allow(improper_ctypes_definitions)]

pub mod array;
pub mod dict;

use std::ffi::CString;
use std::os::raw::c_char;

pub use array::RawArray;
pub use dict::RawDictionary;

/// Release a string returned by one of the `*_to_string` functions.
///
/// # Safety
/// `ptr` must be null or a pointer returned by this module that has not
/// been freed yet.
#[no_mangle]
pub unsafe extern "C" fn vessel_string_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(CString::from_raw(ptr));
}

/// Move formatted text onto the heap as a C string.
/// Interior NUL characters are written as the escape `\u{0}`.
pub(crate) fn into_c_string(text: String) -> *mut c_char {
    let text = if text.contains('\0') {
        text.replace('\0', "\\u{0}")
    } else {
        text
    };
    match CString::new(text) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

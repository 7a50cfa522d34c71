use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;

use vessel_engine::icall::{array, dict, vessel_string_free};
use vessel_engine::{RawArray, RawDictionary, Status};

use crate::error::{check, Result};

/// The kind of engine storage a [`NativeHandle`] refers to.
pub trait NativeKind {
    type Raw: Default + fmt::Debug;

    const NAME: &'static str;

    /// Release the engine side of `raw`, leaving it null.
    ///
    /// # Safety
    /// `raw` must point to a handle produced by the engine.
    unsafe fn release(raw: *mut Self::Raw) -> Status;

    fn is_null(raw: &Self::Raw) -> bool;
}

/// Sequence storage
#[derive(Debug)]
pub enum ArrayKind {}

/// Mapping storage
#[derive(Debug)]
pub enum DictionaryKind {}

impl NativeKind for ArrayKind {
    type Raw = RawArray;

    const NAME: &'static str = "array";

    unsafe fn release(raw: *mut RawArray) -> Status {
        array::vessel_array_dispose(raw)
    }

    fn is_null(raw: &RawArray) -> bool {
        raw.is_null()
    }
}

impl NativeKind for DictionaryKind {
    type Raw = RawDictionary;

    const NAME: &'static str = "dictionary";

    unsafe fn release(raw: *mut RawDictionary) -> Status {
        dict::vessel_dictionary_dispose(raw)
    }

    fn is_null(raw: &RawDictionary) -> bool {
        raw.is_null()
    }
}

/// Exclusive owner of one engine handle.
///
/// The handle is released exactly once: by [`NativeHandle::release`], or by
/// `Drop` when nobody released it explicitly. Further releases are no-ops.
pub struct NativeHandle<K: NativeKind> {
    raw: K::Raw,
}

impl<K: NativeKind> NativeHandle<K> {
    /// Run an engine constructor that writes a fresh handle and take
    /// ownership of the result.
    pub(crate) fn acquire(operation: &'static str, ctor: impl FnOnce(*mut K::Raw) -> Status) -> Result<Self> {
        let mut raw = K::Raw::default();
        let status = ctor(&mut raw);

        // Owned before the status check so a partially written handle is
        // still released.
        let handle = NativeHandle { raw };
        check(operation, status)?;

        log::trace!("acquired {} handle from {}", K::NAME, operation);
        Ok(handle)
    }

    /// A handle in the released state
    pub(crate) fn released() -> Self {
        NativeHandle {
            raw: K::Raw::default(),
        }
    }

    pub(crate) fn as_ptr(&self) -> *const K::Raw {
        &self.raw
    }

    pub fn is_released(&self) -> bool {
        K::is_null(&self.raw)
    }

    /// Release the engine storage. Safe to call any number of times.
    pub fn release(&mut self) -> Result<()> {
        if self.is_released() {
            return Ok(());
        }

        let status = unsafe { K::release(&mut self.raw) };
        log::trace!("released {} handle", K::NAME);
        check("dispose", status)
    }
}

impl<K: NativeKind> Drop for NativeHandle<K> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            log::warn!("automatic release of {} handle failed: {}", K::NAME, err);
        }
    }
}

impl<K: NativeKind> fmt::Debug for NativeHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &K::NAME)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Copy out and free a string produced by the engine. Null reads as empty.
///
/// # Safety
/// `ptr` must be null or an engine string that has not been freed.
pub(crate) unsafe fn take_engine_string(ptr: *mut c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let text = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    vessel_string_free(ptr);
    text
}

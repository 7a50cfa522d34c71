//! Typed collections over the vessel container engine.
//!
//! [`Array`] and [`Dictionary`] each own one engine handle and forward every
//! operation across the engine boundary as [`Variant`]s. [`TypedArray`] and
//! [`TypedDictionary`] put a static element type on top, verifying values as
//! they are read back.
//!
//! ```ignore
//! use vessel_collections::{varray, TypedArray};
//!
//! let scores = varray![3i64, 1i64, 2i64];
//! let view = scores.typed::<i64>();
//! view.push(4)?;
//! assert_eq!(view.get(3)?, 4);
//! ```


mod array;
mod dictionary;
mod error;
mod handle;
mod iter;
mod marshal;
mod typed_array;
mod typed_dictionary;

pub use array::Array;
pub use dictionary::Dictionary;
pub use error::{CollectionError, Result};
pub use handle::{ArrayKind, DictionaryKind, NativeHandle, NativeKind};
pub use iter::{Entries, LiveIter, SnapshotIter};
pub use marshal::{FromVariant, Marshal, ToVariant};
pub use typed_array::TypedArray;
pub use typed_dictionary::TypedDictionary;

pub use vessel_engine as engine;
pub use vessel_engine::{configure, EngineConfig, Status, VarString, Variant, VariantType};

/// Build an [`Array`] from a list of values, each converted with
/// [`ToVariant`].
#[macro_export]
macro_rules! varray {
    () => {
        $crate::Array::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Array::from_values(&[$($crate::ToVariant::to_variant(&$value)),+])
    };
}

/// Build a [`Dictionary`] from `key => value` pairs. Later duplicates win.
#[macro_export]
macro_rules! vdict {
    () => {
        $crate::Dictionary::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Dictionary::from_pairs(&[
            $(($crate::ToVariant::to_variant(&$key), $crate::ToVariant::to_variant(&$value))),+
        ])
    };
}

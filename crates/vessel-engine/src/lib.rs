//! Reference container engine for the vessel collections.
//!
//! Owns sequence and mapping storage on the GC heap and exposes it only
//! through raw handles and the C-compatible entry points in [`icall`].
//! Values cross the boundary as [`Variant`]s.

#[cfg(test)]
mod tests;

pub mod config;
pub mod icall;
mod status;
mod storage;
mod variant;

pub use config::{configure, EngineConfig};
pub use icall::{RawArray, RawDictionary};
pub use status::Status;
pub use storage::{ArrayRef, DictRef};
pub use variant::{VarString, Variant, VariantType};

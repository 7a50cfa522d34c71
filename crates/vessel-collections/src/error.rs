use vessel_engine::{Status, VariantType};

/// Failures surfaced by the collection facades and typed views
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    #[error("required argument `{0}` was absent")]
    NullInput(&'static str),

    #[error("index {index} is out of range for length {count}")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("key {key} was not found")]
    KeyNotFound { key: String },

    #[error("an entry with key {key} already exists")]
    DuplicateKey { key: String },

    #[error("cannot convert {found} to {expected}")]
    TypeConversion {
        expected: &'static str,
        found: VariantType,
    },

    #[error("destination holds {capacity} slots but {required} are required")]
    DestinationTooSmall { required: usize, capacity: usize },

    #[error("native {operation} failed: {status}")]
    NativeOperation {
        operation: &'static str,
        status: Status,
    },

    #[error("length changed from {expected} to {actual} during iteration")]
    CountChanged { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, CollectionError>;

impl CollectionError {
    pub(crate) fn conversion<T: ?Sized>(found: VariantType) -> Self {
        CollectionError::TypeConversion {
            expected: std::any::type_name::<T>(),
            found,
        }
    }

    pub(crate) fn native(operation: &'static str, status: Status) -> Self {
        CollectionError::NativeOperation { operation, status }
    }
}

/// Map a non-`Ok` status from an operation that has no index or key to
/// report.
pub(crate) fn check(operation: &'static str, status: Status) -> Result<()> {
    status
        .into_result()
        .map_err(|status| CollectionError::native(operation, status))
}

use std::fmt;

/// Status codes reported by the engine boundary.
///
/// The discriminants are part of the boundary contract and never change.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok = 0,
    Failed = 1,
    ParameterRangeError = 5,
    OutOfMemory = 6,
    InvalidParameter = 31,
    AlreadyExists = 32,
    DoesNotExist = 33,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// `Ok(())` for `Status::Ok`, the status itself otherwise.
    pub fn into_result(self) -> Result<(), Status> {
        match self {
            Status::Ok => Ok(()),
            other => Err(other),
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Failed => write!(f, "operation failed"),
            Status::ParameterRangeError => write!(f, "parameter out of range"),
            Status::OutOfMemory => write!(f, "out of memory"),
            Status::InvalidParameter => write!(f, "invalid parameter"),
            Status::AlreadyExists => write!(f, "already exists"),
            Status::DoesNotExist => write!(f, "does not exist"),
        }
    }
}

impl std::error::Error for Status {}

//! Error types for storage operations

use std::error::Error;
use std::fmt;

/// Error type returned by store collaborators.
///
/// The in-memory stores only raise `Operation`, `Internal` and
/// `AlreadyExists`. `Connection`, `Timeout`, `Temporary` and `Serialization`
/// are for host-supplied stores backed by a database or a remote service.
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    Connection(String),

    /// Operation error
    Operation(String),

    /// Internal error
    Internal(String),

    /// Item already exists
    AlreadyExists(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Storage timeout error
    Timeout(String),

    /// Temporary/transient error
    Temporary(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether a caller-side retry might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Connection(_) | StorageError::Timeout(_) | StorageError::Temporary(_)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StorageError::Operation(msg) => write!(f, "Operation error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
            StorageError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::Temporary(msg) => write!(f, "Temporary error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

// This allows StorageError to be converted to the top-level SociographError
impl From<StorageError> for crate::SociographError {
    fn from(err: StorageError) -> Self {
        crate::SociographError::Storage(err.to_string())
    }
}

//! Storage collaborator errors.

use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by the storage engine. Each carries the HTTP status the
/// engine associates with it; the resource layer propagates that status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document [{id}] not found")]
    NotFound { id: String },

    #[error("document [{id}] already exists")]
    AlreadyExists { id: String },

    #[error("version conflict for document [{id}]: current version [{current}] is different than the one provided [{expected}]")]
    VersionConflict { id: String, current: u64, expected: u64 },

    #[error("search engine unavailable: {0}")]
    Unavailable(String),

    #[error("search engine failure: {0}")]
    Internal(String),
}

impl StoreError {
    /// Status code associated with this error by the engine.
    pub fn code(&self) -> u16 {
        match self {
            StoreError::NotFound { .. } => 404,
            StoreError::AlreadyExists { .. } | StoreError::VersionConflict { .. } => 409,
            StoreError::Unavailable(_) | StoreError::Internal(_) => 500,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::AlreadyExists { .. } => "already_exists",
            StoreError::VersionConflict { .. } => "version_conflict",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Internal(_) => "internal",
        }
    }
}

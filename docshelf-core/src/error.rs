//! Error types for DOCSHELF operations

use thiserror::Error;

use crate::identity::DocumentId;

/// Errors raised by the document and blob stores.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Document not found: {id}")]
    NotFound { id: DocumentId },

    #[error("Document already exists: {id}")]
    AlreadyExists { id: DocumentId },

    #[error("Storage I/O failed during {operation}: {reason}")]
    Io { operation: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn io(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            operation: operation.into(),
            reason: err.to_string(),
        }
    }
}

/// Errors raised while resolving a session token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown or expired session token")]
    UnknownToken,

    #[error("Session store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Request validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid limit {limit}: must be at least 1")]
    InvalidLimit { limit: i64 },

    #[error("Unknown filter field: {field}")]
    UnknownFilterField { field: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type returned by every DOCSHELF operation.
///
/// Each variant is one of the kinds the transport layer distinguishes;
/// lower-level errors are folded into a kind by the `From` impls below.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocshelfError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Document not found: {id}")]
    NotFound { id: DocumentId },

    #[error("Bad request: {0}")]
    BadRequest(#[from] ValidationError),

    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl DocshelfError {
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// HTTP status code the transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            DocshelfError::Unauthenticated => 401,
            DocshelfError::Forbidden => 403,
            DocshelfError::NotFound { .. } => 404,
            DocshelfError::BadRequest(_) => 400,
            DocshelfError::Internal { .. } => 500,
        }
    }
}

impl From<StorageError> for DocshelfError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => DocshelfError::NotFound { id },
            other => DocshelfError::Internal {
                reason: other.to_string(),
            },
        }
    }
}

impl From<SessionError> for DocshelfError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownToken => DocshelfError::Unauthenticated,
            SessionError::Unavailable { reason } => DocshelfError::Internal { reason },
        }
    }
}

impl From<ConfigError> for DocshelfError {
    fn from(err: ConfigError) -> Self {
        DocshelfError::Internal {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DocshelfError {
    fn from(err: serde_json::Error) -> Self {
        DocshelfError::Internal {
            reason: format!("serialization failed: {}", err),
        }
    }
}

/// Result type alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for DOCSHELF operations.
pub type DocshelfResult<T> = Result<T, DocshelfError>;

// =============================================================================
// TESTS
// =============================================================================

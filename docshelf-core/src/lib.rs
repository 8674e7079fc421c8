//! DOCSHELF Core - Document Types
//!
//! Data structures shared by every DOCSHELF crate: document entities,
//! typed identifiers, the error hierarchy, service configuration and the
//! visibility policy. Nothing in here performs I/O.

pub mod config;
pub mod entities;
pub mod error;
pub mod filter;
pub mod identity;
pub mod policy;

pub use config::{DetailInvalidation, ServiceConfig};
pub use entities::{Document, DocumentDraft, DocumentView};
pub use error::{
    ConfigError, DocshelfError, DocshelfResult, SessionError, StorageError, StorageResult,
    ValidationError,
};
pub use filter::{FieldFilter, ListQuery};
pub use identity::{new_document_id, DocumentId, Identity, SessionToken, Timestamp};
pub use policy::is_visible;

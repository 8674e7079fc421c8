//! Collaborator traits consumed by the document service.
//!
//! Session resolution, metadata persistence and blob persistence live
//! outside the service. Every call here may block on external I/O; none of
//! them is ever made while the response cache lock is held.

use std::path::PathBuf;

use async_trait::async_trait;
use docshelf_core::{
    Document, DocumentId, Identity, ListQuery, SessionError, SessionToken, StorageResult,
};

/// Maps an opaque session token to the identity it was issued for.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve a token. `SessionError::UnknownToken` means "not authenticated".
    async fn resolve(&self, token: &SessionToken) -> Result<Identity, SessionError>;
}

/// Durable document metadata.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails if the id is already taken.
    async fn put(&self, doc: &Document) -> StorageResult<()>;

    /// Fetch a document by id. `StorageError::NotFound` if absent.
    async fn get(&self, id: DocumentId) -> StorageResult<Document>;

    /// Delete a document by id.
    async fn delete(&self, id: DocumentId) -> StorageResult<()>;

    /// List documents owned by `query.target_owner()` that the viewer may
    /// see, narrowed by the optional field filter, ordered by name then
    /// creation time, and truncated to `query.limit`.
    async fn list(&self, query: &ListQuery) -> StorageResult<Vec<Document>>;
}

/// Durable binary content, one blob per document.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, id: DocumentId, bytes: &[u8]) -> StorageResult<()>;

    /// Delete a blob. Deleting a blob that does not exist is not an error.
    async fn delete(&self, id: DocumentId) -> StorageResult<()>;

    /// Where the blob for `id` lives. Pure; does not touch the store.
    fn path_for(&self, id: DocumentId) -> PathBuf;
}

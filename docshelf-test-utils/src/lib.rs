//! DOCSHELF Test Utilities
//!
//! Shared test infrastructure for the DOCSHELF workspace:
//! - Fault-injecting document and blob stores that count their calls
//! - Draft fixtures for common scenarios
//! - Proptest generators for identities and drafts

// Re-export the reference stores from their source crate
pub use docshelf_storage::{InMemoryDocumentStore, InMemorySessionRegistry};

pub use docshelf_core::{
    Document, DocumentDraft, DocumentId, DocshelfError, Identity, SessionToken, StorageError,
};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use docshelf_core::{ListQuery, StorageResult};
use docshelf_storage::{BlobStore, DocumentStore};

// ============================================================================
// COUNTING DOCUMENT STORE
// ============================================================================

/// Document store that counts calls and can be told to fail.
///
/// Wraps an [`InMemoryDocumentStore`]; reads of the call counters are how
/// tests tell a cache hit from a store round-trip.
#[derive(Debug, Default)]
pub struct CountingDocumentStore {
    inner: InMemoryDocumentStore,
    puts: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
    lists: AtomicUsize,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    stall_put: AtomicBool,
}

impl CountingDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.inner.contains(id)
    }

    pub fn document_count(&self) -> usize {
        self.inner.document_count()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Make `put` commit the record and then never acknowledge it.
    pub fn stall_puts_after_write(&self, stall: bool) {
        self.stall_put.store(stall, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingDocumentStore {
    async fn put(&self, doc: &Document) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::io("put", "injected metadata write failure"));
        }
        self.inner.put(doc).await?;
        if self.stall_put.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn get(&self, id: DocumentId) -> StorageResult<Document> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn delete(&self, id: DocumentId) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::io("delete", "injected metadata delete failure"));
        }
        self.inner.delete(id).await
    }

    async fn list(&self, query: &ListQuery) -> StorageResult<Vec<Document>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(query).await
    }
}

// ============================================================================
// MEMORY BLOB STORE
// ============================================================================

/// In-memory blob store with failure injection.
///
/// A failing `put` still leaves the first half of the bytes behind, the way
/// an interrupted write to disk would. A hanging `put` writes the same
/// partial content and then never completes.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<DocumentId, Vec<u8>>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    hang_put: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn blob(&self, id: DocumentId) -> Option<Vec<u8>> {
        self.lock().get(&id).cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.lock().len()
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn hang_puts(&self, hang: bool) {
        self.hang_put.store(hang, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<DocumentId, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_partial(&self, id: DocumentId, bytes: &[u8]) {
        let half = bytes.len() / 2;
        self.lock().insert(id, bytes[..half].to_vec());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, id: DocumentId, bytes: &[u8]) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.hang_put.load(Ordering::SeqCst) {
            self.write_partial(id, bytes);
            std::future::pending::<()>().await;
        }
        if self.fail_put.load(Ordering::SeqCst) {
            self.write_partial(id, bytes);
            return Err(StorageError::io("write blob", "injected blob write failure"));
        }
        self.lock().insert(id, bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::io("remove blob", "injected blob delete failure"));
        }
        self.lock().remove(&id);
        Ok(())
    }

    fn path_for(&self, id: DocumentId) -> PathBuf {
        PathBuf::from("/blobs").join(id.to_string())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A private, metadata-only draft shared with `grant`.
pub fn private_draft(name: &str, grant: &[&str]) -> DocumentDraft {
    DocumentDraft::new(name, "application/json")
        .with_grant(grant.iter().copied())
        .with_payload(serde_json::json!({ "name": name }))
}

/// A public, metadata-only draft.
pub fn public_draft(name: &str) -> DocumentDraft {
    DocumentDraft::new(name, "text/plain").with_public(true)
}

/// A private blob draft shared with `grant`.
pub fn blob_draft(name: &str, grant: &[&str]) -> DocumentDraft {
    DocumentDraft::new(name, "application/octet-stream")
        .with_blob(true)
        .with_grant(grant.iter().copied())
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Identities drawn from a small population so collisions are common.
    pub fn identity_strategy() -> impl Strategy<Value = Identity> {
        prop_oneof![
            Just(Identity::new("alice")),
            Just(Identity::new("bob")),
            Just(Identity::new("carol")),
            Just(Identity::new("dave")),
        ]
    }

    /// Metadata-only drafts with arbitrary visibility and grants.
    pub fn draft_strategy() -> impl Strategy<Value = DocumentDraft> {
        (
            "[a-z]{1,8}",
            any::<bool>(),
            proptest::collection::vec(identity_strategy(), 0..4),
        )
            .prop_map(|(name, public, grant)| {
                DocumentDraft::new(name, "text/plain")
                    .with_public(public)
                    .with_grant(grant)
            })
    }
}

//! Document Service
//!
//! Coordinates the session resolver, the document and blob stores and the
//! response cache for the four document operations:
//!
//! - `create`: persist metadata then blob, compensating on failure, then
//!   invalidate the owner's cached lists
//! - `delete`: owner-only; invalidate before removing blob and metadata
//! - `fetch_detail`: viewer-partition read-through guarded by the access policy
//! - `fetch_list`: viewer or grant partition read-through
//!
//! # Ordering
//!
//! Create invalidates strictly after both writes succeed. Delete
//! invalidates strictly before anything is removed. Neither holds the cache
//! lock across a store call.

use std::sync::Arc;

use chrono::Utc;
use docshelf_core::filter::resolve_limit;
use docshelf_core::{
    is_visible, new_document_id, DetailInvalidation, DocshelfError, DocshelfResult, Document,
    DocumentDraft, DocumentId, DocumentView, FieldFilter, Identity, ListQuery, ServiceConfig,
    SessionToken,
};
use docshelf_storage::{
    BlobStore, CacheEntry, CacheKey, DocumentStore, FsBlobStore, InMemoryDocumentStore,
    ResponseCache, SessionResolver,
};

use crate::saga::{Compensation, UploadSaga};
use crate::types::{DetailResponse, ListRequest, ListResponse};

/// The document service.
///
/// Holds shared handles only; cloning the `Arc`s is the way to share one
/// service between request handlers.
pub struct DocumentService {
    sessions: Arc<dyn SessionResolver>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    cache: Arc<ResponseCache>,
    config: ServiceConfig,
}

impl DocumentService {
    pub fn new(
        sessions: Arc<dyn SessionResolver>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        cache: Arc<ResponseCache>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            sessions,
            documents,
            blobs,
            cache,
            config,
        }
    }

    /// Build a single-process service from configuration: an in-memory
    /// document store, a filesystem blob store under `config.blob_dir` and
    /// a fresh cache.
    pub async fn bootstrap(
        config: ServiceConfig,
        sessions: Arc<dyn SessionResolver>,
    ) -> DocshelfResult<Self> {
        config.validate()?;
        let blobs = FsBlobStore::open(&config.blob_dir).await?;
        tracing::info!(
            blob_dir = %config.blob_dir.display(),
            detail_invalidation = ?config.detail_invalidation,
            "Document service ready"
        );
        Ok(Self::new(
            sessions,
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(blobs),
            Arc::new(ResponseCache::new()),
            config,
        ))
    }

    async fn authenticate(&self, token: &SessionToken) -> DocshelfResult<Identity> {
        self.sessions.resolve(token).await.map_err(|e| {
            tracing::debug!(error = %e, "Session resolution failed");
            DocshelfError::from(e)
        })
    }

    // ========================================================================
    // CREATE
    // ========================================================================

    /// Upload a document, with blob content when `draft.is_blob` is set.
    pub async fn create(
        &self,
        token: &SessionToken,
        draft: DocumentDraft,
        blob: Option<Vec<u8>>,
    ) -> DocshelfResult<DocumentId> {
        let owner = self.authenticate(token).await?;
        draft.validate(blob.is_some())?;

        let id = new_document_id();
        let doc = Document::from_draft(draft, id, owner.clone(), *token, Utc::now());

        // Armed before the write: a create dropped while `put` is in flight
        // may leave a record the store already committed.
        let mut saga = UploadSaga::new(Arc::clone(&self.documents), Arc::clone(&self.blobs));
        saga.record(Compensation::DeleteMetadata(id));
        if let Err(e) = self.documents.put(&doc).await {
            saga.commit();
            return Err(e.into());
        }

        if let Some(bytes) = blob {
            saga.record(Compensation::DeleteBlob(id));
            if let Err(e) = self.blobs.put(id, &bytes).await {
                tracing::error!(document_id = %id, error = %e, "Blob write failed, rolling back upload");
                saga.rollback().await;
                return Err(e.into());
            }
        }
        saga.commit();

        self.cache.invalidate_owner(&owner, &doc.grant);
        tracing::info!(
            document_id = %id,
            owner = %owner,
            is_blob = doc.is_blob,
            grantees = doc.grant.len(),
            "Document created"
        );
        Ok(id)
    }

    // ========================================================================
    // DELETE
    // ========================================================================

    /// Delete a document. Only its owner may do so.
    pub async fn delete(&self, token: &SessionToken, id: DocumentId) -> DocshelfResult<()> {
        let viewer = self.authenticate(token).await?;
        let doc = self.documents.get(id).await?;
        if doc.owner != viewer {
            tracing::warn!(document_id = %id, viewer = %viewer, "Delete forbidden for non-owner");
            return Err(DocshelfError::Forbidden);
        }

        self.cache.invalidate_owner(&doc.owner, &doc.grant);
        if self.config.detail_invalidation == DetailInvalidation::FanOut {
            self.cache.invalidate_detail_readers(id);
        }

        let mut blob_error = None;
        if doc.is_blob {
            if let Err(e) = self.blobs.delete(id).await {
                tracing::error!(document_id = %id, error = %e, "Blob delete failed");
                blob_error = Some(e);
            }
        }

        self.documents.delete(id).await.map_err(|e| {
            tracing::error!(document_id = %id, error = %e, "Metadata delete failed");
            DocshelfError::internal(e.to_string())
        })?;

        if let Some(e) = blob_error {
            return Err(DocshelfError::internal(e.to_string()));
        }
        tracing::info!(document_id = %id, owner = %doc.owner, "Document deleted");
        Ok(())
    }

    // ========================================================================
    // DETAIL
    // ========================================================================

    /// Fetch one document's view. `head_only` confirms existence and
    /// visibility without a body.
    pub async fn fetch_detail(
        &self,
        token: &SessionToken,
        id: DocumentId,
        head_only: bool,
    ) -> DocshelfResult<DetailResponse> {
        let viewer = self.authenticate(token).await?;
        let key = CacheKey::detail(id);

        if let Some(entry) = self.cache.get_viewer_entry(&viewer, &key) {
            tracing::debug!(document_id = %id, viewer = %viewer, "Detail cache hit");
            if head_only {
                return Ok(DetailResponse::Head);
            }
            let view: DocumentView = serde_json::from_slice(entry.body())?;
            return Ok(self.detail_response(view));
        }
        tracing::debug!(document_id = %id, viewer = %viewer, "Detail cache miss");

        let doc = self.documents.get(id).await?;
        if !is_visible(&doc, &viewer) {
            tracing::warn!(document_id = %id, viewer = %viewer, "Detail forbidden");
            return Err(DocshelfError::Forbidden);
        }
        if head_only {
            return Ok(DetailResponse::Head);
        }

        let view = doc.view();
        let entry = CacheEntry::ok(serde_json::to_vec(&view)?);
        match self.config.detail_invalidation {
            DetailInvalidation::ViewerOnly => self.cache.set_viewer_entry(&viewer, key, entry),
            DetailInvalidation::FanOut => self.cache.set_tracked_detail_entry(&viewer, id, entry),
        }
        Ok(self.detail_response(view))
    }

    fn detail_response(&self, view: DocumentView) -> DetailResponse {
        let blob_path = view.file.then(|| self.blobs.path_for(view.id));
        DetailResponse::Document { view, blob_path }
    }

    // ========================================================================
    // LIST
    // ========================================================================

    /// List documents visible to the caller, optionally another owner's
    /// and optionally narrowed by one field.
    pub async fn fetch_list(
        &self,
        token: &SessionToken,
        request: ListRequest,
    ) -> DocshelfResult<ListResponse> {
        let viewer = self.authenticate(token).await?;
        let limit = resolve_limit(
            request.limit,
            self.config.list_default_limit,
            self.config.list_max_limit,
        )?;
        let filter = FieldFilter::parse(&request.field_key, &request.field_value)?;

        // An empty owner filter, or one naming the caller, lists the
        // caller's own documents.
        let owner = request
            .owner
            .filter(|owner| !owner.as_str().is_empty() && owner != &viewer);
        let key = CacheKey::list(owner.as_ref(), filter.as_ref(), limit, &viewer);

        let cached = match &owner {
            None => self.cache.get_viewer_entry(&viewer, &key),
            Some(owner) => self.cache.get_grant_entry(&viewer, owner, &key),
        };
        if let Some(entry) = cached {
            tracing::debug!(key = %key, "List cache hit");
            return Ok(list_response(entry, request.head_only));
        }
        tracing::debug!(key = %key, "List cache miss");

        let query = ListQuery {
            owner: owner.clone(),
            viewer: viewer.clone(),
            filter,
            limit,
        };
        let views: Vec<DocumentView> = self
            .documents
            .list(&query)
            .await?
            .iter()
            .map(Document::view)
            .collect();
        let entry = CacheEntry::ok(serde_json::to_vec(&views)?);

        match &owner {
            None => self.cache.set_viewer_entry(&viewer, key, entry.clone()),
            Some(owner) => self.cache.set_grant_entry(&viewer, owner, key, entry.clone()),
        }
        Ok(list_response(entry, request.head_only))
    }
}

fn list_response(entry: CacheEntry, head_only: bool) -> ListResponse {
    ListResponse {
        body: (!head_only).then(|| entry.shared_body()),
    }
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

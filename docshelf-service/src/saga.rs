//! Upload Compensation
//!
//! An upload writes to two stores with no shared transaction. Each write
//! that succeeds (or may have partially succeeded) records the action that
//! undoes it. On failure the recorded actions run newest first.
//!
//! A saga dropped before `commit` or `rollback` finishes (for example when
//! the request future is cancelled) hands its remaining actions to a task
//! on the current tokio runtime.

use std::sync::Arc;

use docshelf_core::DocumentId;
use docshelf_storage::{BlobStore, DocumentStore};

/// A single undo action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// Remove the document's metadata record.
    DeleteMetadata(DocumentId),
    /// Remove whatever blob content was written for the document.
    DeleteBlob(DocumentId),
}

/// Ordered list of compensations for one upload.
pub struct UploadSaga {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    pending: Vec<Compensation>,
}

impl UploadSaga {
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            documents,
            blobs,
            pending: Vec::new(),
        }
    }

    pub fn record(&mut self, step: Compensation) {
        self.pending.push(step);
    }

    pub fn pending(&self) -> &[Compensation] {
        &self.pending
    }

    /// The upload completed; nothing will be undone.
    pub fn commit(mut self) {
        self.pending.clear();
    }

    /// Run every recorded compensation, newest first.
    ///
    /// Failures are logged and do not stop the remaining steps. Steps are
    /// popped one at a time, so if this future is itself dropped the rest
    /// are picked up by `Drop`.
    pub async fn rollback(mut self) {
        while let Some(step) = self.pending.pop() {
            run_step(self.documents.as_ref(), self.blobs.as_ref(), step).await;
        }
    }
}

impl Drop for UploadSaga {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let steps = std::mem::take(&mut self.pending);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    steps = steps.len(),
                    "Upload abandoned before completion, compensating in background"
                );
                let documents = Arc::clone(&self.documents);
                let blobs = Arc::clone(&self.blobs);
                handle.spawn(async move {
                    for step in steps.into_iter().rev() {
                        run_step(documents.as_ref(), blobs.as_ref(), step).await;
                    }
                });
            }
            Err(_) => {
                tracing::error!(
                    steps = ?steps,
                    "Upload abandoned outside a runtime; compensation skipped"
                );
            }
        }
    }
}

async fn run_step(documents: &dyn DocumentStore, blobs: &dyn BlobStore, step: Compensation) {
    let result = match step {
        Compensation::DeleteMetadata(id) => documents.delete(id).await,
        Compensation::DeleteBlob(id) => blobs.delete(id).await,
    };
    match result {
        Ok(()) => tracing::debug!(step = ?step, "Compensation applied"),
        Err(e) => tracing::error!(step = ?step, error = %e, "Compensation failed"),
    }
}

//! In-memory reference stores.
//!
//! `InMemoryDocumentStore` implements the full [`DocumentStore`] contract
//! (ownership filter, visibility, field filter, ordering, limit) and is the
//! store used by tests and single-process deployments.
//! `InMemorySessionRegistry` stands in for the external session store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use docshelf_core::{
    is_visible, Document, DocumentId, Identity, ListQuery, SessionError, SessionToken,
    StorageError, StorageResult,
};

use crate::traits::{DocumentStore, SessionResolver};

// ============================================================================
// DOCUMENT STORE
// ============================================================================

/// In-memory document metadata store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentId, Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored documents.
    pub fn document_count(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents
            .read()
            .map(|docs| docs.contains_key(&id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, doc: &Document) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(|_| StorageError::LockPoisoned)?;
        if docs.contains_key(&doc.id) {
            return Err(StorageError::AlreadyExists { id: doc.id });
        }
        docs.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get(&self, id: DocumentId) -> StorageResult<Document> {
        let docs = self.documents.read().map_err(|_| StorageError::LockPoisoned)?;
        docs.get(&id).cloned().ok_or(StorageError::NotFound { id })
    }

    async fn delete(&self, id: DocumentId) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(|_| StorageError::LockPoisoned)?;
        docs.remove(&id);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> StorageResult<Vec<Document>> {
        let docs = self.documents.read().map_err(|_| StorageError::LockPoisoned)?;
        let owner = query.target_owner();
        let mut matched: Vec<Document> = docs
            .values()
            .filter(|d| &d.owner == owner)
            .filter(|d| is_visible(d, &query.viewer))
            .filter(|d| query.filter.as_ref().map_or(true, |f| f.matches(d)))
            .cloned()
            .collect();
        drop(docs);

        matched.sort_by(|a, b| a.name.cmp(&b.name).then(a.created.cmp(&b.created)));
        matched.truncate(query.limit);
        Ok(matched)
    }
}

// ============================================================================
// SESSION REGISTRY
// ============================================================================

/// In-memory session registry mapping tokens to identities.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionToken, Identity>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `identity`.
    pub fn issue(&self, identity: impl Into<Identity>) -> StorageResult<SessionToken> {
        let token = SessionToken::generate();
        self.sessions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(token, identity.into());
        Ok(token)
    }

    /// Revoke a token. Revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &SessionToken) -> StorageResult<()> {
        self.sessions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .remove(token);
        Ok(())
    }
}

#[async_trait]
impl SessionResolver for InMemorySessionRegistry {
    async fn resolve(&self, token: &SessionToken) -> Result<Identity, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::Unavailable {
            reason: "session registry lock poisoned".to_string(),
        })?;
        sessions.get(token).cloned().ok_or(SessionError::UnknownToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use docshelf_core::{new_document_id, DocumentDraft, FieldFilter};

    fn doc(owner: &str, name: &str, public: bool, grant: &[&str]) -> Document {
        Document::from_draft(
            DocumentDraft::new(name, "text/plain")
                .with_public(public)
                .with_grant(grant.iter().copied()),
            new_document_id(),
            Identity::new(owner),
            SessionToken::generate(),
            Utc::now(),
        )
    }

    fn query(owner: Option<&str>, viewer: &str, limit: usize) -> ListQuery {
        ListQuery {
            owner: owner.map(Identity::new),
            viewer: Identity::new(viewer),
            filter: None,
            limit,
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryDocumentStore::new();
        let d = doc("alice", "a", false, &[]);
        store.put(&d).await.unwrap();
        assert_eq!(store.get(d.id).await.unwrap(), d);
        assert!(matches!(
            store.put(&d).await,
            Err(StorageError::AlreadyExists { .. })
        ));

        store.delete(d.id).await.unwrap();
        assert!(matches!(
            store.get(d.id).await,
            Err(StorageError::NotFound { .. })
        ));
        assert_eq!(store.document_count(), 0);
    }

    #[tokio::test]
    async fn test_own_list_sees_everything_sorted() {
        let store = InMemoryDocumentStore::new();
        let mut b = doc("alice", "b", false, &[]);
        let mut a2 = doc("alice", "a", false, &[]);
        let mut a1 = doc("alice", "a", true, &[]);
        let now = Utc::now();
        a1.created = now - Duration::seconds(10);
        a2.created = now;
        b.created = now - Duration::seconds(20);
        for d in [&b, &a2, &a1] {
            store.put(d).await.unwrap();
        }
        store.put(&doc("bob", "z", true, &[])).await.unwrap();

        let listed = store.list(&query(None, "alice", 100)).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id, b.id]);

        let limited = store.list(&query(None, "alice", 2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_list_respects_visibility() {
        let store = InMemoryDocumentStore::new();
        let shared = doc("alice", "shared", false, &["bob"]);
        let public = doc("alice", "public", true, &[]);
        let private = doc("alice", "private", false, &["carol"]);
        for d in [&shared, &public, &private] {
            store.put(d).await.unwrap();
        }

        let listed = store.list(&query(Some("alice"), "bob", 100)).await.unwrap();
        let names: Vec<_> = listed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["public", "shared"]);
    }

    #[tokio::test]
    async fn test_list_field_filter() {
        let store = InMemoryDocumentStore::new();
        store.put(&doc("alice", "a", true, &[])).await.unwrap();
        store.put(&doc("alice", "b", false, &[])).await.unwrap();

        let mut q = query(None, "alice", 100);
        q.filter = Some(FieldFilter::Public(false));
        let listed = store.list(&q).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "b");
    }

    #[tokio::test]
    async fn test_session_registry() {
        let sessions = InMemorySessionRegistry::new();
        let token = sessions.issue("alice").unwrap();
        assert_eq!(sessions.resolve(&token).await.unwrap(), Identity::new("alice"));

        sessions.revoke(&token).unwrap();
        assert_eq!(
            sessions.resolve(&token).await.unwrap_err(),
            SessionError::UnknownToken
        );
        assert_eq!(
            sessions.resolve(&SessionToken::generate()).await.unwrap_err(),
            SessionError::UnknownToken
        );
    }
}

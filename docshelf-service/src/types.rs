//! Request and response types for the document service.

use std::path::PathBuf;
use std::sync::Arc;

use docshelf_core::{DocshelfResult, DocumentView, Identity};

// ============================================================================
// LIST REQUEST
// ============================================================================

/// Parameters of a list fetch, as received from the caller.
///
/// Field filter and limit are raw here and validated by the service before
/// any store is consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// List another identity's documents instead of the caller's own.
    pub owner: Option<Identity>,
    pub field_key: String,
    pub field_value: String,
    pub limit: Option<i64>,
    pub head_only: bool,
}

impl ListRequest {
    /// The caller's own documents.
    pub fn own() -> Self {
        Self::default()
    }

    /// Documents owned by `owner`.
    pub fn owned_by(owner: impl Into<Identity>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_key = key.into();
        self.field_value = value.into();
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn head_only(mut self) -> Self {
        self.head_only = true;
        self
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Result of a detail fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailResponse {
    /// The document exists and is visible; no body was requested.
    Head,
    Document {
        view: DocumentView,
        /// Where the blob content lives, for blob documents.
        blob_path: Option<PathBuf>,
    },
}

impl DetailResponse {
    pub fn view(&self) -> Option<&DocumentView> {
        match self {
            DetailResponse::Head => None,
            DetailResponse::Document { view, .. } => Some(view),
        }
    }

    pub fn blob_path(&self) -> Option<&PathBuf> {
        match self {
            DetailResponse::Head => None,
            DetailResponse::Document { blob_path, .. } => blob_path.as_ref(),
        }
    }
}

/// Result of a list fetch: the serialized JSON array of document views,
/// absent for head-only requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse {
    pub body: Option<Arc<[u8]>>,
}

impl ListResponse {
    /// Decode the body. A head-only response decodes to an empty list.
    pub fn views(&self) -> DocshelfResult<Vec<DocumentView>> {
        match &self.body {
            Some(body) => Ok(serde_json::from_slice(body)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_builders() {
        let req = ListRequest::owned_by("alice")
            .with_filter("public", "true")
            .with_limit(5)
            .head_only();
        assert_eq!(req.owner, Some(Identity::new("alice")));
        assert_eq!(req.field_key, "public");
        assert_eq!(req.field_value, "true");
        assert_eq!(req.limit, Some(5));
        assert!(req.head_only);
        assert_eq!(ListRequest::own().owner, None);
    }

    #[test]
    fn test_head_list_response_has_no_views() {
        let resp = ListResponse { body: None };
        assert!(resp.views().unwrap().is_empty());
    }

    #[test]
    fn test_list_response_decodes_body() {
        let body: Arc<[u8]> = Arc::from(b"[]".as_slice());
        let resp = ListResponse { body: Some(body) };
        assert!(resp.views().unwrap().is_empty());
    }
}

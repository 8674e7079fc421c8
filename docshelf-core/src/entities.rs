//! Document entities

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{DocumentId, Identity, SessionToken, Timestamp};

/// A stored document's metadata.
///
/// Owned by the document store. The cache never holds a `Document`, only
/// serialized [`DocumentView`] snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub mime: String,
    /// Whether a binary payload lives in the blob store under `id`.
    pub is_blob: bool,
    pub is_public: bool,
    pub owner: Identity,
    /// Identities granted read access, in the order the owner listed them.
    pub grant: Vec<Identity>,
    pub created: Timestamp,
    /// Session the document was uploaded with. Owner-private.
    pub session_token: Option<SessionToken>,
    pub payload: Option<serde_json::Value>,
}

impl Document {
    /// Build a document from an upload draft once the owner and id are known.
    pub fn from_draft(
        draft: DocumentDraft,
        id: DocumentId,
        owner: Identity,
        session_token: SessionToken,
        created: Timestamp,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            mime: draft.mime,
            is_blob: draft.is_blob,
            is_public: draft.is_public,
            owner,
            grant: draft.grant,
            created,
            session_token: Some(session_token),
            payload: draft.payload,
        }
    }

    /// The caller-facing view of this document.
    pub fn view(&self) -> DocumentView {
        DocumentView {
            id: self.id,
            name: self.name.clone(),
            mime: self.mime.clone(),
            file: self.is_blob,
            public: self.is_public,
            grant: self.grant.clone(),
            created: self.created,
            json: self.payload.clone(),
        }
    }
}

/// Upload input: a document before it has an id or an owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub name: String,
    pub mime: String,
    #[serde(rename = "file")]
    pub is_blob: bool,
    #[serde(rename = "public")]
    pub is_public: bool,
    #[serde(default)]
    pub grant: Vec<Identity>,
    #[serde(rename = "json", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl DocumentDraft {
    pub fn new(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            ..Default::default()
        }
    }

    pub fn with_blob(mut self, is_blob: bool) -> Self {
        self.is_blob = is_blob;
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_grant<I, T>(mut self, grant: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Identity>,
    {
        self.grant = grant.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Check the draft against the binary payload that accompanies it.
    ///
    /// A blob document must arrive with bytes and a metadata-only document
    /// must arrive without them.
    pub fn validate(&self, has_blob: bool) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }
        match (self.is_blob, has_blob) {
            (true, false) => Err(ValidationError::InvalidValue {
                field: "file".to_string(),
                reason: "document is marked as a file but no content was supplied".to_string(),
            }),
            (false, true) => Err(ValidationError::InvalidValue {
                field: "file".to_string(),
                reason: "content was supplied for a document not marked as a file".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Serialized shape of a document as returned to callers and cached.
///
/// Owner and session token are never part of the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: DocumentId,
    pub name: String,
    pub mime: String,
    pub file: bool,
    pub public: bool,
    pub grant: Vec<Identity>,
    pub created: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::new_document_id;
    use chrono::Utc;

    fn sample() -> Document {
        Document::from_draft(
            DocumentDraft::new("report.pdf", "application/pdf")
                .with_blob(true)
                .with_grant(["bob", "carol"]),
            new_document_id(),
            Identity::new("alice"),
            SessionToken::generate(),
            Utc::now(),
        )
    }

    #[test]
    fn test_view_hides_owner_and_token() {
        let json = serde_json::to_value(sample().view()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("owner"));
        assert!(!obj.contains_key("session_token"));
        assert_eq!(obj["file"], serde_json::Value::Bool(true));
        assert!(!obj.contains_key("json"));
    }

    #[test]
    fn test_view_keeps_grant_order() {
        let view = sample().view();
        assert_eq!(view.grant, vec![Identity::new("bob"), Identity::new("carol")]);
    }

    #[test]
    fn test_draft_wire_names() {
        let draft: DocumentDraft = serde_json::from_str(
            r#"{"name":"a","mime":"text/plain","file":false,"public":true,"grant":["bob"],"json":{"k":1}}"#,
        )
        .unwrap();
        assert!(draft.is_public);
        assert!(!draft.is_blob);
        assert_eq!(draft.grant, vec![Identity::new("bob")]);
        assert_eq!(draft.payload, Some(serde_json::json!({"k": 1})));
    }

    #[test]
    fn test_draft_validation() {
        assert!(DocumentDraft::new("a", "text/plain").validate(false).is_ok());
        assert!(DocumentDraft::new("a", "text/plain").with_blob(true).validate(true).is_ok());
        assert!(DocumentDraft::new("", "text/plain").validate(false).is_err());
        assert!(DocumentDraft::new("a", "text/plain").with_blob(true).validate(false).is_err());
        assert!(DocumentDraft::new("a", "text/plain").validate(true).is_err());
    }
}

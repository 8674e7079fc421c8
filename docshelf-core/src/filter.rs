//! List query filters
//!
//! A list request may narrow its result by a single field equality check.
//! Only a fixed set of fields can be filtered on; anything else is rejected
//! before the store is consulted.

use serde::{Deserialize, Serialize};

use crate::entities::Document;
use crate::error::ValidationError;
use crate::identity::Identity;

/// Single-field equality filter for document lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "lowercase")]
pub enum FieldFilter {
    Name(String),
    Mime(String),
    File(bool),
    Public(bool),
}

impl FieldFilter {
    /// Parse a raw `key=value` pair from a request.
    ///
    /// The filter only applies when both key and value are non-empty;
    /// otherwise `Ok(None)` is returned and the list is unfiltered.
    pub fn parse(key: &str, value: &str) -> Result<Option<Self>, ValidationError> {
        let key = key.trim();
        if key.is_empty() || value.is_empty() {
            return Ok(None);
        }
        let filter = match key {
            "name" => FieldFilter::Name(value.to_string()),
            "mime" => FieldFilter::Mime(value.to_string()),
            "file" => FieldFilter::File(parse_bool(key, value)?),
            "public" => FieldFilter::Public(parse_bool(key, value)?),
            other => {
                return Err(ValidationError::UnknownFilterField {
                    field: other.to_string(),
                })
            }
        };
        Ok(Some(filter))
    }

    pub fn key(&self) -> &'static str {
        match self {
            FieldFilter::Name(_) => "name",
            FieldFilter::Mime(_) => "mime",
            FieldFilter::File(_) => "file",
            FieldFilter::Public(_) => "public",
        }
    }

    /// Canonical string form of the filter value.
    pub fn value(&self) -> String {
        match self {
            FieldFilter::Name(v) | FieldFilter::Mime(v) => v.clone(),
            FieldFilter::File(b) | FieldFilter::Public(b) => b.to_string(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            FieldFilter::Name(v) => &doc.name == v,
            FieldFilter::Mime(v) => &doc.mime == v,
            FieldFilter::File(b) => doc.is_blob == *b,
            FieldFilter::Public(b) => doc.is_public == *b,
        }
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ValidationError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected true or false, got {:?}", value),
        }),
    }
}

/// A validated list query as handed to the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Whose documents to list. `None` means the viewer's own.
    pub owner: Option<Identity>,
    pub viewer: Identity,
    pub filter: Option<FieldFilter>,
    pub limit: usize,
}

impl ListQuery {
    /// The identity whose documents are listed.
    pub fn target_owner(&self) -> &Identity {
        self.owner.as_ref().unwrap_or(&self.viewer)
    }
}

/// Turn a caller-supplied limit into an effective one.
///
/// Absent means `default`; anything below 1 is rejected; anything above
/// `max` is clamped.
pub fn resolve_limit(
    requested: Option<i64>,
    default: usize,
    max: usize,
) -> Result<usize, ValidationError> {
    match requested {
        None => Ok(default.min(max)),
        Some(limit) if limit < 1 => Err(ValidationError::InvalidLimit { limit }),
        Some(limit) => Ok(usize::try_from(limit).unwrap_or(usize::MAX).min(max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requires_both_parts() {
        assert_eq!(FieldFilter::parse("", "x").unwrap(), None);
        assert_eq!(FieldFilter::parse("name", "").unwrap(), None);
        assert_eq!(
            FieldFilter::parse("name", "a.txt").unwrap(),
            Some(FieldFilter::Name("a.txt".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let err = FieldFilter::parse("owner_login; drop table docs", "x").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownFilterField { .. }));
    }

    #[test]
    fn test_parse_boolean_fields() {
        assert_eq!(
            FieldFilter::parse("public", "true").unwrap(),
            Some(FieldFilter::Public(true))
        );
        assert_eq!(
            FieldFilter::parse("file", "false").unwrap(),
            Some(FieldFilter::File(false))
        );
        assert!(FieldFilter::parse("public", "yes").is_err());
    }

    #[test]
    fn test_key_value_canonical_form() {
        let filter = FieldFilter::File(true);
        assert_eq!(filter.key(), "file");
        assert_eq!(filter.value(), "true");
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, 100, 1000).unwrap(), 100);
        assert_eq!(resolve_limit(Some(1), 100, 1000).unwrap(), 1);
        assert_eq!(resolve_limit(Some(5000), 100, 1000).unwrap(), 1000);
        assert!(matches!(
            resolve_limit(Some(0), 100, 1000),
            Err(ValidationError::InvalidLimit { limit: 0 })
        ));
        assert!(resolve_limit(Some(-3), 100, 1000).is_err());
    }

    #[test]
    fn test_target_owner_defaults_to_viewer() {
        let query = ListQuery {
            owner: None,
            viewer: Identity::new("alice"),
            filter: None,
            limit: 10,
        };
        assert_eq!(query.target_owner(), &Identity::new("alice"));

        let query = ListQuery {
            owner: Some(Identity::new("bob")),
            ..query
        };
        assert_eq!(query.target_owner(), &Identity::new("bob"));
    }
}

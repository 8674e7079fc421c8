//! Cache keys derived from query shape.
//!
//! `CacheKey` has no public constructor other than [`CacheKey::detail`] and
//! [`CacheKey::list`], so every key in the cache comes from one of the two
//! query shapes the service answers.

use std::fmt;

use docshelf_core::{DocumentId, FieldFilter, Identity};

/// Segment separator inside a list key.
const SEPARATOR: char = ':';

/// Escape character for separators that occur inside a segment.
const ESCAPE: char = '\\';

/// Opaque cache key, unique within its partition.
///
/// # Format
///
/// - detail: `file:<document id>`
/// - list: `list:<owner>:<field key>:<field value>:<limit>:viewedBy:<viewer>`
///
/// Absent parts are empty segments. Identity and value segments have `\`
/// and `:` escaped, so distinct queries never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    inner: String,
}

impl CacheKey {
    /// Key for a single-document detail response.
    pub fn detail(id: DocumentId) -> Self {
        Self {
            inner: format!("file{}{}", SEPARATOR, id),
        }
    }

    /// Key for a list response.
    ///
    /// `owner` is the target-owner filter (`None` for the viewer's own
    /// documents); `limit` is the effective limit after defaulting and
    /// clamping; `viewer` is always part of the key.
    pub fn list(
        owner: Option<&Identity>,
        filter: Option<&FieldFilter>,
        limit: usize,
        viewer: &Identity,
    ) -> Self {
        let owner = owner.map(|o| escape(o.as_str())).unwrap_or_default();
        let (field_key, field_value) = match filter {
            Some(f) => (f.key().to_string(), escape(&f.value())),
            None => (String::new(), String::new()),
        };
        Self {
            inner: format!(
                "list{sep}{owner}{sep}{field_key}{sep}{field_value}{sep}{limit}{sep}viewedBy{sep}{viewer}",
                sep = SEPARATOR,
                viewer = escape(viewer.as_str()),
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether this is a detail key.
    pub fn is_detail(&self) -> bool {
        self.inner.starts_with("file:")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

fn escape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == ESCAPE || c == SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

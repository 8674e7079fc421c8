//! Service Configuration
//!
//! Configuration is loaded from `DOCSHELF_*` environment variables with
//! defaults suitable for local development.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of documents returned by a list request.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Upper bound applied to caller-supplied list limits.
pub const DEFAULT_LIST_MAX_LIMIT: usize = 1000;

/// Default directory for blob content.
pub const DEFAULT_BLOB_DIR: &str = "./data/blobs";

/// How detail responses cached by non-owners are invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailInvalidation {
    /// Only the owner's viewer partition is cleared on mutation. A grantee's
    /// cached detail of a deleted document survives until the grantee's own
    /// partition is cleared.
    #[default]
    ViewerOnly,
    /// Every viewer that cached a document's detail has that entry removed
    /// when the document is deleted.
    FanOut,
}

impl FromStr for DetailInvalidation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer-only" => Ok(DetailInvalidation::ViewerOnly),
            "fan-out" => Ok(DetailInvalidation::FanOut),
            other => Err(ConfigError::InvalidValue {
                field: "DOCSHELF_DETAIL_INVALIDATION".to_string(),
                value: other.to_string(),
                reason: "expected viewer-only or fan-out".to_string(),
            }),
        }
    }
}

/// Configuration for the document service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Directory the filesystem blob store writes into.
    pub blob_dir: PathBuf,
    /// Limit used when a list request does not specify one.
    pub list_default_limit: usize,
    /// Largest limit a list request may ask for.
    pub list_max_limit: usize,
    pub detail_invalidation: DetailInvalidation,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            blob_dir: PathBuf::from(DEFAULT_BLOB_DIR),
            list_default_limit: DEFAULT_LIST_LIMIT,
            list_max_limit: DEFAULT_LIST_MAX_LIMIT,
            detail_invalidation: DetailInvalidation::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create ServiceConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DOCSHELF_BLOB_DIR`: Blob directory (default: ./data/blobs)
    /// - `DOCSHELF_LIST_DEFAULT_LIMIT`: Default list limit (default: 100)
    /// - `DOCSHELF_LIST_MAX_LIMIT`: Maximum list limit (default: 1000)
    /// - `DOCSHELF_DETAIL_INVALIDATION`: "viewer-only" or "fan-out" (default: viewer-only)
    pub fn from_env() -> Result<Self, ConfigError> {
        let blob_dir = std::env::var("DOCSHELF_BLOB_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOB_DIR));

        let list_default_limit =
            parse_env_usize("DOCSHELF_LIST_DEFAULT_LIMIT", DEFAULT_LIST_LIMIT)?;
        let list_max_limit = parse_env_usize("DOCSHELF_LIST_MAX_LIMIT", DEFAULT_LIST_MAX_LIMIT)?;

        let detail_invalidation = match std::env::var("DOCSHELF_DETAIL_INVALIDATION") {
            Ok(value) => value.parse()?,
            Err(_) => DetailInvalidation::default(),
        };

        let config = Self {
            blob_dir,
            list_default_limit,
            list_max_limit,
            detail_invalidation,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list_default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "list_default_limit".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.list_default_limit > self.list_max_limit {
            return Err(ConfigError::InvalidValue {
                field: "list_default_limit".to_string(),
                value: self.list_default_limit.to_string(),
                reason: format!("must not exceed list_max_limit ({})", self.list_max_limit),
            });
        }
        Ok(())
    }

    pub fn with_blob_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.blob_dir = dir.into();
        self
    }

    pub fn with_list_limits(mut self, default: usize, max: usize) -> Self {
        self.list_default_limit = default;
        self.list_max_limit = max;
        self
    }

    pub fn with_detail_invalidation(mut self, mode: DetailInvalidation) -> Self {
        self.detail_invalidation = mode;
        self
    }
}

fn parse_env_usize(var: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: var.to_string(),
            value: raw.clone(),
            reason: "expected a non-negative integer".to_string(),
        }),
        Err(_) => Ok(default),
    }
}

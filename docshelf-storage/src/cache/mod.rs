//! Viewer-scoped response cache.
//!
//! Serialized responses are cached per requesting identity, never shared
//! between identities, so a cache hit can be returned without re-checking
//! access. There is no TTL and no eviction: entries live until a mutation
//! invalidates them or the process exits.
//!
//! # Partitions
//!
//! - [`ViewerPartition`]: viewer → key → entry. Detail responses (whoever
//!   owns the document) and "list my own documents" responses.
//! - [`GrantPartition`]: grantee → owner → key → entry. "List documents
//!   owned by X" responses.
//!
//! A mutation by an owner clears the owner's viewer partition and the
//! owner's sub-map inside each grantee's grant partition.
//!
//! # Example
//!
//! ```ignore
//! let cache = ResponseCache::new();
//! let key = CacheKey::list(None, None, 100, &viewer);
//! if let Some(entry) = cache.get_viewer_entry(&viewer, &key) {
//!     return Ok(entry.body());
//! }
//! ```

pub mod key;
pub mod partition;
pub mod response_cache;
pub mod stats;

pub use key::CacheKey;
pub use partition::{GrantPartition, ViewerPartition};
pub use response_cache::{CacheEntry, ResponseCache};
pub use stats::CacheStats;

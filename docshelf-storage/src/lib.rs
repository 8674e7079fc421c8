//! DOCSHELF Storage - Store Traits, Response Cache and Reference Stores
//!
//! Defines the narrow interfaces the document service consumes (session
//! resolution, document metadata, blob content), the two-tier response
//! cache, and reference implementations of the stores.

pub mod blob;
pub mod cache;
pub mod memory;
pub mod traits;

pub use blob::FsBlobStore;
pub use cache::{
    CacheEntry, CacheKey, CacheStats, GrantPartition, ResponseCache, ViewerPartition,
};
pub use memory::{InMemoryDocumentStore, InMemorySessionRegistry};
pub use traits::{BlobStore, DocumentStore, SessionResolver};

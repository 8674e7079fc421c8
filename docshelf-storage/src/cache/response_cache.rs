//! The response cache engine.
//!
//! Both partitions sit behind one `RwLock`, so every call here is atomic
//! with respect to every other call. Lookups take the read lock and run
//! concurrently; stores and invalidations take the write lock. Nothing is
//! awaited while the lock is held.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use docshelf_core::{DocumentId, Identity};

use super::key::CacheKey;
use super::partition::{GrantPartition, ViewerPartition};
use super::stats::CacheStats;

/// An immutable cached response: status code plus serialized body.
///
/// Cloning is cheap; the body is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    status: u16,
    body: Arc<[u8]>,
}

impl CacheEntry {
    pub fn new(status: u16, body: impl Into<Arc<[u8]>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response.
    pub fn ok(body: impl Into<Arc<[u8]>>) -> Self {
        Self::new(200, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn shared_body(&self) -> Arc<[u8]> {
        Arc::clone(&self.body)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    viewer: ViewerPartition,
    grant: GrantPartition,
    /// Viewers holding a tracked detail entry, per document.
    detail_readers: HashMap<DocumentId, HashSet<Identity>>,
}

/// Two-tier, viewer-scoped response cache.
///
/// Constructed once at startup and shared (behind an `Arc`) with the
/// document service. Holds no reference to any store.
#[derive(Debug, Default)]
pub struct ResponseCache {
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidated: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // VIEWER PARTITION
    // ========================================================================

    pub fn get_viewer_entry(&self, viewer: &Identity, key: &CacheKey) -> Option<CacheEntry> {
        let found = self.read().viewer.get(viewer, key).cloned();
        self.record_lookup(found.is_some());
        found
    }

    pub fn set_viewer_entry(&self, viewer: &Identity, key: CacheKey, entry: CacheEntry) {
        self.write().viewer.insert(viewer.clone(), key, entry);
    }

    /// Store a detail entry and remember that `viewer` holds it, so
    /// [`invalidate_detail_readers`](Self::invalidate_detail_readers) can
    /// find it later. Both happen under one write lock.
    pub fn set_tracked_detail_entry(&self, viewer: &Identity, id: DocumentId, entry: CacheEntry) {
        let mut state = self.write();
        state
            .viewer
            .insert(viewer.clone(), CacheKey::detail(id), entry);
        state
            .detail_readers
            .entry(id)
            .or_default()
            .insert(viewer.clone());
    }

    /// Drop everything cached for `viewer`. Idempotent.
    pub fn invalidate_viewer_partition(&self, viewer: &Identity) -> usize {
        let removed = self.write().viewer.remove_viewer(viewer);
        self.record_invalidation(removed);
        tracing::debug!(viewer = %viewer, removed, "Invalidated viewer partition");
        removed
    }

    // ========================================================================
    // GRANT PARTITION
    // ========================================================================

    pub fn get_grant_entry(
        &self,
        grantee: &Identity,
        owner: &Identity,
        key: &CacheKey,
    ) -> Option<CacheEntry> {
        let found = self.read().grant.get(grantee, owner, key).cloned();
        self.record_lookup(found.is_some());
        found
    }

    pub fn set_grant_entry(
        &self,
        grantee: &Identity,
        owner: &Identity,
        key: CacheKey,
        entry: CacheEntry,
    ) {
        self.write()
            .grant
            .insert(grantee.clone(), owner.clone(), key, entry);
    }

    /// Drop `owner`'s lists from each grantee's grant partition, removing
    /// grantees left with nothing cached.
    pub fn invalidate_grant_partition(&self, owner: &Identity, grantees: &[Identity]) -> usize {
        let removed = self.write().grant.remove_owner(owner, grantees);
        self.record_invalidation(removed);
        tracing::debug!(owner = %owner, grantees = grantees.len(), removed, "Invalidated grant partition");
        removed
    }

    // ========================================================================
    // MUTATION HELPERS
    // ========================================================================

    /// Invalidate everything an owner mutation can affect: the owner's
    /// viewer partition and the owner's sub-map for each grantee, in one
    /// atomic step.
    pub fn invalidate_owner(&self, owner: &Identity, grantees: &[Identity]) -> usize {
        let removed = {
            let mut state = self.write();
            state.viewer.remove_viewer(owner) + state.grant.remove_owner(owner, grantees)
        };
        self.record_invalidation(removed);
        tracing::debug!(
            owner = %owner,
            grantees = grantees.len(),
            removed,
            "Invalidated owner partitions"
        );
        removed
    }

    /// Remove the detail entry for `id` from every viewer recorded by
    /// [`set_tracked_detail_entry`](Self::set_tracked_detail_entry).
    pub fn invalidate_detail_readers(&self, id: DocumentId) -> usize {
        let key = CacheKey::detail(id);
        let removed = {
            let mut state = self.write();
            let readers = state.detail_readers.remove(&id).unwrap_or_default();
            readers
                .iter()
                .filter(|viewer| state.viewer.remove_entry(viewer, &key))
                .count()
        };
        self.record_invalidation(removed);
        tracing::debug!(document_id = %id, removed, "Invalidated detail readers");
        removed
    }

    // ========================================================================
    // INTROSPECTION
    // ========================================================================

    pub fn stats(&self) -> CacheStats {
        let state = self.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            viewer_entries: state.viewer.entry_count() as u64,
            grant_entries: state.grant.entry_count() as u64,
            invalidated: self.invalidated.load(Ordering::Relaxed),
        }
    }

    /// Whether anything is cached for `viewer` in the viewer partition.
    pub fn has_viewer_partition(&self, viewer: &Identity) -> bool {
        self.read().viewer.contains_viewer(viewer)
    }

    /// Whether `grantee` has any of `owner`'s lists cached.
    pub fn has_grant_partition(&self, grantee: &Identity, owner: &Identity) -> bool {
        self.read().grant.contains(grantee, owner)
    }

    /// Drop every entry in both partitions.
    pub fn clear(&self) {
        let mut state = self.write();
        state.viewer.clear();
        state.grant.clear();
        state.detail_readers.clear();
    }

    fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_invalidation(&self, removed: usize) {
        self.invalidated.fetch_add(removed as u64, Ordering::Relaxed);
    }

    // Every operation leaves the maps consistent before it can panic, so a
    // poisoned lock still guards valid state.
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

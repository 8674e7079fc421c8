//! The two cache partitions.
//!
//! Neither type does any locking; [`ResponseCache`](super::ResponseCache)
//! owns one of each behind a single lock. They are plain associative
//! stores so their invalidation rules can be tested on their own.

use std::collections::HashMap;

use docshelf_core::Identity;

use super::key::CacheKey;
use super::response_cache::CacheEntry;

/// viewer → key → entry.
#[derive(Debug, Default)]
pub struct ViewerPartition {
    viewers: HashMap<Identity, HashMap<CacheKey, CacheEntry>>,
}

impl ViewerPartition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, viewer: &Identity, key: &CacheKey) -> Option<&CacheEntry> {
        self.viewers.get(viewer)?.get(key)
    }

    /// Store an entry, silently replacing any previous one.
    pub fn insert(&mut self, viewer: Identity, key: CacheKey, entry: CacheEntry) {
        self.viewers.entry(viewer).or_default().insert(key, entry);
    }

    /// Drop everything cached for `viewer`. Returns the number of entries
    /// removed; zero if the viewer had nothing cached.
    pub fn remove_viewer(&mut self, viewer: &Identity) -> usize {
        self.viewers.remove(viewer).map(|m| m.len()).unwrap_or(0)
    }

    /// Drop a single entry, pruning the viewer if it becomes empty.
    pub fn remove_entry(&mut self, viewer: &Identity, key: &CacheKey) -> bool {
        let Some(entries) = self.viewers.get_mut(viewer) else {
            return false;
        };
        let removed = entries.remove(key).is_some();
        if entries.is_empty() {
            self.viewers.remove(viewer);
        }
        removed
    }

    pub fn contains_viewer(&self, viewer: &Identity) -> bool {
        self.viewers.contains_key(viewer)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    pub fn entry_count(&self) -> usize {
        self.viewers.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.viewers.clear();
    }
}

/// grantee → owner → key → entry.
#[derive(Debug, Default)]
pub struct GrantPartition {
    grantees: HashMap<Identity, HashMap<Identity, HashMap<CacheKey, CacheEntry>>>,
}

impl GrantPartition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, grantee: &Identity, owner: &Identity, key: &CacheKey) -> Option<&CacheEntry> {
        self.grantees.get(grantee)?.get(owner)?.get(key)
    }

    /// Store an entry, silently replacing any previous one.
    pub fn insert(&mut self, grantee: Identity, owner: Identity, key: CacheKey, entry: CacheEntry) {
        self.grantees
            .entry(grantee)
            .or_default()
            .entry(owner)
            .or_default()
            .insert(key, entry);
    }

    /// Drop `owner`'s sub-map from every listed grantee, and drop a grantee
    /// entirely once it has no owners left. Grantees with nothing cached
    /// are skipped. Returns the number of entries removed.
    pub fn remove_owner<'a, I>(&mut self, owner: &Identity, grantees: I) -> usize
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let mut removed = 0;
        for grantee in grantees {
            let Some(owners) = self.grantees.get_mut(grantee) else {
                continue;
            };
            removed += owners.remove(owner).map(|m| m.len()).unwrap_or(0);
            if owners.is_empty() {
                self.grantees.remove(grantee);
            }
        }
        removed
    }

    pub fn contains(&self, grantee: &Identity, owner: &Identity) -> bool {
        self.grantees
            .get(grantee)
            .is_some_and(|owners| owners.contains_key(owner))
    }

    pub fn contains_grantee(&self, grantee: &Identity) -> bool {
        self.grantees.contains_key(grantee)
    }

    pub fn entry_count(&self) -> usize {
        self.grantees
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    pub fn clear(&mut self) {
        self.grantees.clear();
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn identity_strategy() -> impl Strategy<Value = Identity> {
        "[a-d]".prop_map(Identity::new)
    }

    proptest! {
        /// Property: after remove_owner, no listed grantee holds the owner,
        /// and no grantee is left with an empty owner map.
        #[test]
        fn prop_remove_owner_leaves_no_trace(
            inserts in proptest::collection::vec(
                (identity_strategy(), identity_strategy(), identity_strategy()),
                0..20,
            ),
            owner in identity_strategy(),
            grantees in proptest::collection::vec(identity_strategy(), 0..4),
        ) {
            let mut p = GrantPartition::new();
            for (grantee, o, viewer) in &inserts {
                p.insert(
                    grantee.clone(),
                    o.clone(),
                    CacheKey::list(Some(o), None, 100, viewer),
                    CacheEntry::ok(Vec::new()),
                );
            }
            p.remove_owner(&owner, grantees.iter());
            for g in &grantees {
                prop_assert!(!p.contains(g, &owner));
            }
            for (grantee, _, _) in &inserts {
                if p.contains_grantee(grantee) {
                    prop_assert!(p.grantees[grantee].values().all(|m| !m.is_empty()));
                    prop_assert!(!p.grantees[grantee].is_empty());
                }
            }
        }

        /// Property: removing a viewer twice equals removing it once.
        #[test]
        fn prop_remove_viewer_idempotent(
            inserts in proptest::collection::vec((identity_strategy(), identity_strategy()), 0..20),
            target in identity_strategy(),
        ) {
            let mut once = ViewerPartition::new();
            let mut twice = ViewerPartition::new();
            for (viewer, other) in &inserts {
                let key = CacheKey::list(Some(other), None, 100, viewer);
                once.insert(viewer.clone(), key.clone(), CacheEntry::ok(Vec::new()));
                twice.insert(viewer.clone(), key, CacheEntry::ok(Vec::new()));
            }
            once.remove_viewer(&target);
            twice.remove_viewer(&target);
            twice.remove_viewer(&target);
            prop_assert_eq!(once.entry_count(), twice.entry_count());
            prop_assert_eq!(once.viewer_count(), twice.viewer_count());
            prop_assert!(!twice.contains_viewer(&target));
        }
    }
}

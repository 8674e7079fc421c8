//! Cache usage statistics.

/// Snapshot of response cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups that found an entry.
    pub hits: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
    /// Entries currently held in the viewer partition.
    pub viewer_entries: u64,
    /// Entries currently held in the grant partition.
    pub grant_entries: u64,
    /// Entries removed by invalidation since startup.
    pub invalidated: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.viewer_entries + self.grant_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_entry_count_sums_partitions() {
        let stats = CacheStats {
            viewer_entries: 3,
            grant_entries: 4,
            ..Default::default()
        };
        assert_eq!(stats.entry_count(), 7);
    }
}

//! TTL cache implementation

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

struct CacheItem<T> {
    value: T,
    expires_at: Instant,
}

/// Key-value cache where every entry carries an absolute expiry.
///
/// Expired entries are dropped on read and by a periodic linear sweep;
/// there is no eviction beyond expiry.
pub struct TtlCache<T> {
    entries: RwLock<HashMap<String, CacheItem<T>>>,
    default_ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    /// Create a cache with the given default entry TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Store a value under the default TTL
    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with an explicit TTL
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let item = CacheItem {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key.into(), item);
    }

    /// Fetch a value; expired entries are removed and report a miss
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(item) if item.expires_at > Instant::now() => Some(item.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remove an entry, returning whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Drop all expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, item| item.expires_at > now);
        let purged = before - entries.len();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }
        purged
    }

    /// Number of entries currently held (including not-yet-purged expired ones)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of entry count and keys
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            size: entries.len(),
            keys: entries.keys().cloned().collect(),
        }
    }
}

/// Spawn a background task that sweeps expired entries periodically
pub fn spawn_purge_task<T>(
    cache: Arc<TtlCache<T>>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    use tokio::time::interval;

    info!(
        "Starting background cache purge task (interval: {}s)",
        interval_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

        // Skip the first tick (which fires immediately)
        ticker.tick().await;

        loop {
            ticker.tick().await;
            cache.purge_expired();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_value_before_expiry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn expired_entries_are_removed_on_read() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_with_ttl("a", 1, Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("a"), None);
        // Removed by the read itself, not just hidden
        assert!(cache.is_empty());
    }

    #[test]
    fn remove_invalidates_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", "value".to_string());
        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn purge_sweeps_only_expired_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_with_ttl("stale", 1, Duration::from_millis(5));
        cache.insert("fresh", 2);
        std::thread::sleep(Duration::from_millis(15));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(2));
    }

    #[test]
    fn insert_overwrites_and_refreshes_expiry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_with_ttl("a", 1, Duration::from_millis(5));
        cache.insert("a", 2);
        std::thread::sleep(Duration::from_millis(15));

        assert_eq!(cache.get("a"), Some(2));
    }

    #[test]
    fn stats_report_size_and_keys() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("b", 2);

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        let mut keys = stats.keys;
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}

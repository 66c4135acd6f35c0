//! Time-boxed response cache
//!
//! Entries are immutable once written and expire independently. A miss just
//! means the caller fetches and stores again; concurrent writers for the same
//! key are expected to store equivalent values, so the last one wins.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Default lifetime of a cached response
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Cache consulted before every external call
pub trait ResponseCache<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    fn insert(&self, key: K, value: V);
}

/// In-memory cache with a fixed time-to-live per entry
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            entries.retain(|_, (_, expires_at)| *expires_at > now);
        }
    }
}

impl<K, V> ResponseCache<K, V> for TtlCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            _ => None,
        }
    }

    fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, (value, Instant::now() + self.ttl));
        }
    }
}

/// Cache that never stores anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl<K, V> ResponseCache<K, V> for NoCache {
    fn get(&self, _key: &K) -> Option<V> {
        None
    }

    fn insert(&self, _key: K, _value: V) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_independently() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(10));
        cache.insert("first", 1);
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.insert("second", 2);
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.get(&"first"), None);
        assert_eq!(cache.get(&"second"), Some(2));

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_last_writer_wins() {
        let cache: TtlCache<&str, u32> = TtlCache::new(DEFAULT_CACHE_TTL);
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_stores_nothing() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::ZERO);
        cache.insert("k", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"k"), None);
    }

    #[test]
    fn test_no_cache() {
        let cache = NoCache;
        ResponseCache::<&str, u32>::insert(&cache, "k", 1);
        assert_eq!(ResponseCache::<&str, u32>::get(&cache, &"k"), None);
    }
}

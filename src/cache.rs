// Response cache for vendor lookups
// Sits between the HTTP routes and hostConnect so repeated searches skip the XML round trip

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Default)]
struct CacheCounters {
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
    eviction_count: AtomicUsize,
    expired_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub eviction_count: usize,
    pub expired_count: usize,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub default_ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 500,
            default_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

struct CacheEntry<V> {
    data: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Build a cache key from a kind prefix and any serializable parameters.
///
/// Parameters go through `serde_json::Value`, whose maps keep their keys sorted, so
/// two criteria that differ only in field order share a key.
pub fn generate_key<P: Serialize + ?Sized>(kind: &str, params: &P) -> String {
    let canonical = serde_json::to_value(params)
        .map(|value| value.to_string())
        .unwrap_or_default();
    format!("{}:{}", kind, canonical)
}

/// Thread-safe TTL map with a bounded number of entries.
pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
    counters: CacheCounters,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
            counters: CacheCounters::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let expired = entries.get(key).map(CacheEntry::is_expired);
        match expired {
            Some(true) => {
                entries.remove(key);
                self.counters.expired_count.fetch_add(1, Ordering::Relaxed);
                self.counters.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(false) => {
                self.counters.hit_count.fetch_add(1, Ordering::Relaxed);
                entries.get(key).map(|entry| entry.data.clone())
            }
            None => {
                self.counters.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    // Stores with the default TTL unless one is given
    pub fn insert(&self, key: impl Into<String>, data: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let mut entries = self.entries.lock();

        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            let oldest_key = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest_key {
                entries.remove(&oldest_key);
                self.counters.eviction_count.fetch_add(1, Ordering::Relaxed);
                debug!(key = %oldest_key, "evicted oldest cache entry");
            }
        }

        entries.insert(
            key,
            CacheEntry {
                data,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        self.counters
            .expired_count
            .fetch_add(removed, Ordering::Relaxed);
        removed
    }

    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStatsReport {
        let entries = self.entries.lock();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStatsReport {
            items_count: entries.len(),
            hit_count: self.counters.hit_count.load(Ordering::Relaxed),
            miss_count: self.counters.miss_count.load(Ordering::Relaxed),
            eviction_count: self.counters.eviction_count.load(Ordering::Relaxed),
            expired_count: self.counters.expired_count.load(Ordering::Relaxed),
            keys,
        }
    }
}

impl<V: Clone + Send + 'static> ResponseCache<V> {
    /// Periodically drop expired entries until the runtime shuts down.
    pub fn spawn_sweeper(cache: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let period = cache.config.cleanup_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = cache.cleanup_expired();
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    fn small_cache(max_entries: usize, ttl_ms: u64) -> ResponseCache<String> {
        ResponseCache::new(CacheConfig {
            max_entries,
            default_ttl: Duration::from_millis(ttl_ms),
            cleanup_interval: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_key_ignores_field_order() {
        let a = json!({"productType": "Group Tours", "destination": "Nairobi"});
        let b = json!({"destination": "Nairobi", "productType": "Group Tours"});
        assert_eq!(generate_key("search", &a), generate_key("search", &b));
        assert_ne!(generate_key("search", &a), generate_key("product", &a));
    }

    #[test]
    fn test_expiration_and_ttl() {
        let cache = small_cache(10, 50);
        cache.insert("short", "a".to_string(), None);
        cache.insert("long", "b".to_string(), Some(Duration::from_secs(60)));

        assert_eq!(cache.get("short").as_deref(), Some("a"));
        thread::sleep(Duration::from_millis(80));

        assert!(cache.get("short").is_none());
        assert_eq!(cache.get("long").as_deref(), Some("b"));

        let stats = cache.stats();
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 1);
    }

    #[test]
    fn test_evicts_oldest_insertion_when_full() {
        let cache = small_cache(3, 60_000);
        for i in 0..3 {
            cache.insert(format!("k{}", i), i.to_string(), None);
            thread::sleep(Duration::from_millis(2));
        }
        // Reads do not refresh insertion order
        assert!(cache.get("k0").is_some());

        cache.insert("k3", "3".to_string(), None);
        assert_eq!(cache.len(), 3);
        assert!(cache.get("k0").is_none());
        assert!(cache.get("k3").is_some());
        assert_eq!(cache.stats().eviction_count, 1);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = small_cache(2, 60_000);
        cache.insert("a", "1".to_string(), None);
        cache.insert("b", "2".to_string(), None);
        cache.insert("a", "3".to_string(), None);
        assert_eq!(cache.get("a").as_deref(), Some("3"));
        assert!(cache.get("b").is_some());
        assert_eq!(cache.stats().eviction_count, 0);
    }

    #[test]
    fn test_invalidate_prefix_and_clear() {
        let cache = small_cache(10, 60_000);
        cache.insert("search:{}", "s".to_string(), None);
        cache.insert("search:{\"a\":1}", "s".to_string(), None);
        cache.insert("product-detail:{}", "p".to_string(), None);

        assert_eq!(cache.invalidate_prefix("search:"), 2);
        assert_eq!(cache.stats().keys, vec!["product-detail:{}".to_string()]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = small_cache(10, 20);
        cache.insert("a", "1".to_string(), None);
        cache.insert("b", "2".to_string(), Some(Duration::from_secs(60)));
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_access_with_contention() {
        let cache = Arc::new(small_cache(50, 60_000));
        let mut handles = vec![];
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..500 {
                    let key = format!("search:{}", j % 80);
                    if rand::random::<f64>() < 0.8 {
                        let _ = cache.get(&key);
                    } else {
                        cache.insert(key, format!("{}-{}", i, j), None);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 50);
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let cache = Arc::new(ResponseCache::new(CacheConfig {
            max_entries: 10,
            default_ttl: Duration::from_millis(5),
            cleanup_interval: Duration::from_millis(20),
        }));
        cache.insert("gone", 1u32, None);
        let handle = ResponseCache::spawn_sweeper(Arc::clone(&cache));

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert!(cache.is_empty());
    }
}

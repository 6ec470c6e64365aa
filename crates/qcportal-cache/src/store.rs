use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Default entry lifetime when none is given: 300 000 ms (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// A cached value with its absolute expiry instant.
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory TTL cache over async loaders.
///
/// Entries are readable only while `now < expires_at`; an expired entry is
/// indistinguishable from an absent one and is recomputed through the loader,
/// never served stale. Expiry is checked lazily on read; there is no
/// background sweep. Callers that want to reclaim memory from expired entries
/// can invoke [`purge_expired`](Self::purge_expired) explicitly.
///
/// The loader runs without holding the map lock, so a slow loader never
/// blocks readers. Concurrent `get` calls on the same cold key each invoke
/// their own loader (no single-flight); the last write wins.
pub struct ResponseCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ResponseCache<V> {
    /// Creates a cache with the default TTL of 5 minutes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Creates a cache whose `get`/`set` use the given TTL when none is
    /// passed explicitly.
    #[must_use]
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached value for `key`, or loads and stores a fresh one.
    ///
    /// If a non-expired entry exists the stored value is returned without
    /// invoking `loader`. Otherwise `loader` runs; on success the result is
    /// stored with the cache's default TTL and returned.
    ///
    /// # Errors
    ///
    /// A loader failure propagates unchanged to the caller. The entry for
    /// `key` is left untouched: a prior entry, if any, is neither deleted nor
    /// overwritten, and no entry is created for a cold key.
    pub async fn get<F, Fut, E>(&self, key: &str, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_with_ttl(key, self.default_ttl, loader).await
    }

    /// Same as [`get`](Self::get) with an explicit TTL for the stored entry.
    pub async fn get_with_ttl<F, Fut, E>(&self, key: &str, ttl: Duration, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key, "cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key, "cache miss");

        // Not held across the loader await: readers of other keys proceed,
        // and a failing loader leaves the map exactly as it was.
        let value = loader().await?;
        self.insert(key.to_string(), value.clone(), ttl).await;
        Ok(value)
    }

    /// Unconditionally stores `value` under `key` with the default TTL.
    ///
    /// Used to warm or prime the cache outside the `get` path.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.insert(key.into(), value, self.default_ttl).await;
    }

    /// Unconditionally stores `value` under `key` with an explicit TTL.
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.insert(key.into(), value, ttl).await;
    }

    /// Removes the entry for `key`. Returns `true` if an entry was present,
    /// expired or not.
    pub async fn delete(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drops all entries. Used at logout and between test cases.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "cache cleared");
    }

    /// Removes expired entries and returns how many were dropped.
    ///
    /// Never runs on its own; reads already treat expired entries as absent,
    /// so this is purely a memory-reclamation hook for the owner.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the cache holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of hit/miss counters and the current entry count.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }

    /// Reads a non-expired value. Expired entries are left in place; they are
    /// overwritten by the next successful load.
    async fn lookup(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    async fn insert(&self, key: String, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a non-expired entry.
    pub hits: u64,
    /// Reads that went to the loader.
    pub misses: u64,
    /// Stored entries, including expired ones not yet purged.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate in `[0.0, 1.0]`; zero when nothing has been read yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    /// Loader that counts invocations and returns a fixed value.
    fn counting_loader(
        counter: Arc<AtomicUsize>,
        value: &str,
    ) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<String, String>> + Send>> {
        let value = value.to_string();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let value = value.clone();
            Box::pin(async move { Ok(value) })
        }
    }

    #[tokio::test]
    async fn test_loader_invoked_once_within_ttl() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), "fresh");

        let ttl = Duration::from_millis(80);
        let first = cache.get_with_ttl("customers", ttl, &loader).await.unwrap();
        let second = cache.get_with_ttl("customers", ttl, &loader).await.unwrap();

        assert_eq!(first, "fresh");
        assert_eq!(second, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // After the TTL elapses the entry reads as absent and the loader
        // runs again.
        tokio::time::sleep(Duration::from_millis(120)).await;
        let third = cache.get_with_ttl("customers", ttl, &loader).await.unwrap();
        assert_eq!(third, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), "v");

        cache
            .get_with_ttl("k", Duration::ZERO, &loader)
            .await
            .unwrap();
        cache
            .get_with_ttl("k", Duration::ZERO, &loader)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_loader_does_not_poison() {
        let cache: ResponseCache<String> = ResponseCache::new();

        // Cold key, failing loader: no entry is created.
        let result: Result<String, String> = cache
            .get("reasons", || async { Err("upstream down".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "upstream down");
        assert!(cache.is_empty().await);

        // The same key with a succeeding loader recovers.
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), "recovered");
        let value = cache.get("reasons", &loader).await.unwrap();
        assert_eq!(value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_prior_entry() {
        let cache: ResponseCache<String> = ResponseCache::new();

        cache
            .set_with_ttl("parts", "old".to_string(), Duration::ZERO)
            .await;

        // Entry is expired; the failing loader must not delete it.
        let result: Result<String, String> = cache
            .get("parts", || async { Err("boom".to_string()) })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.len().await, 1);

        // A succeeding loader overwrites it.
        let value: String = cache
            .get("parts", || async { Ok::<_, String>("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "new");
    }

    #[tokio::test]
    async fn test_set_primes_without_loader() {
        let cache: ResponseCache<String> = ResponseCache::new();
        cache.set("materials", "primed".to_string()).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(calls.clone(), "never");
        let value = cache.get("materials", &loader).await.unwrap();

        assert_eq!(value, "primed");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache: ResponseCache<i32> = ResponseCache::new();
        cache.set("a", 1).await;
        cache.set("b", 2).await;

        assert!(cache.delete("a").await);
        assert!(!cache.delete("a").await);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired_drops_only_stale_entries() {
        let cache: ResponseCache<i32> = ResponseCache::new();
        cache.set_with_ttl("stale", 1, Duration::ZERO).await;
        cache.set_with_ttl("live", 2, Duration::from_secs(60)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(
            cache
                .get("live", || async { Err::<i32, String>("unused".into()) })
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        use tokio_test::block_on;

        let cache: ResponseCache<i32> = ResponseCache::new();

        let _ = block_on(cache.get("k", || async { Ok::<_, String>(7) })).unwrap();
        let _ = block_on(cache.get("k", || async { Ok::<_, String>(8) })).unwrap();

        let stats = block_on(cache.stats());
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_concurrent_cold_gets_each_invoke_loader() {
        let cache = Arc::new(ResponseCache::<String>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_loader = |calls: Arc<AtomicUsize>| {
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok::<_, String>("loaded".to_string())
                }
            }
        };

        let (a, b) = tokio::join!(
            cache.get("cold", slow_loader(calls.clone())),
            cache.get("cold", slow_loader(calls.clone())),
        );

        assert_eq!(a.unwrap(), "loaded");
        assert_eq!(b.unwrap(), "loaded");
        // No single-flight: both in-flight gets load independently.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

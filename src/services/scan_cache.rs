// TTL-bound verdict cache on top of the key-value store
// Keys are "cache:scan:{url}"; a re-scan supersedes the previous entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::models::verdict::Verdict;
use crate::storage::{KeyValueStore, StorageError};

pub const CACHE_KEY_PREFIX: &str = "cache:scan:";

// =============================================================================
// CACHE ENTRY
// =============================================================================

/// Stored form of a cached verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// SCAN CACHE
// =============================================================================

/// Verdict cache with a single configurable TTL. Staleness is enforced on
/// read and by the periodic sweeper; per-key operations are independent.
pub struct ScanCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ScanCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn cache_key(url: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, url)
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::MAX);
        Utc::now().signed_duration_since(entry.timestamp) > ttl
    }

    /// Fetch a cached verdict. Stale and undecodable entries are dropped on
    /// read and reported as a miss.
    pub async fn get(&self, url: &str) -> Result<Option<Verdict>, StorageError> {
        let key = Self::cache_key(url);
        let raw = match self.store.get(&key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping undecodable cache entry for {}: {}", url, e);
                self.store.remove(&key).await?;
                return Ok(None);
            },
        };

        if self.is_expired(&entry) {
            self.store.remove(&key).await?;
            return Ok(None);
        }

        Ok(Some(entry.verdict))
    }

    /// Cache a verdict for a URL, replacing any previous entry.
    pub async fn set(&self, url: &str, verdict: &Verdict) -> Result<(), StorageError> {
        let key = Self::cache_key(url);
        let entry = CacheEntry {
            url: url.to_string(),
            verdict: verdict.clone(),
            timestamp: Utc::now(),
        };
        let raw = serde_json::to_string(&entry).map_err(|e| StorageError::Corrupt {
            key: key.clone(),
            source: e,
        })?;

        self.store.set(&key, &raw).await
    }

    pub async fn remove(&self, url: &str) -> Result<(), StorageError> {
        self.store.remove(&Self::cache_key(url)).await
    }

    /// Sweep every cache entry older than the TTL. Returns the number of
    /// entries removed. Undecodable entries are removed as well.
    pub async fn clear_expired(&self) -> Result<usize, StorageError> {
        let keys = self.store.keys(CACHE_KEY_PREFIX).await?;
        let mut removed = 0;

        for key in keys {
            let raw = match self.store.get(&key).await? {
                Some(raw) => raw,
                None => continue,
            };

            let expired = match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => self.is_expired(&entry),
                Err(_) => true,
            };

            if expired {
                self.store.remove(&key).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

// =============================================================================
// BACKGROUND SWEEPER
// =============================================================================

/// Spawn a background task that periodically evicts expired cache entries.
/// Runs one sweep immediately, then on the configured interval.
pub fn spawn_cache_sweeper(cache: Arc<ScanCache>, sweep_interval: Duration) {
    tokio::spawn(async move {
        info!("Running initial scan cache sweep...");
        match cache.clear_expired().await {
            Ok(removed) => {
                info!("Initial cache sweep removed {} expired entries", removed);
            },
            Err(e) => {
                error!("Initial cache sweep failed: {}", e);
            },
        }

        let mut interval = tokio::time::interval(sweep_interval);

        // Skip the first tick since we just swept
        interval.tick().await;

        loop {
            interval.tick().await;

            match cache.clear_expired().await {
                Ok(removed) if removed > 0 => {
                    info!("Cache sweep removed {} expired entries", removed);
                },
                Ok(_) => {},
                Err(e) => {
                    error!("Cache sweep failed: {}", e);
                },
            }
        }
    });
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::verdict::{reasons, ScanStatus};
    use crate::storage::MemoryStore;

    fn cache_with_ttl(ttl: Duration) -> (ScanCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = ScanCache::new(store.clone(), ttl);
        (cache, store)
    }

    fn sample_verdict() -> Verdict {
        Verdict::new(ScanStatus::Safe, 10, reasons::NO_API_KEY)
    }

    #[tokio::test]
    async fn test_round_trip_within_ttl() {
        let (cache, _) = cache_with_ttl(Duration::from_secs(60));
        let verdict = sample_verdict();

        cache.set("https://example.com/", &verdict).await.unwrap();
        let cached = cache.get("https://example.com/").await.unwrap().unwrap();

        assert_eq!(cached.status, ScanStatus::Safe);
        assert_eq!(cached.score, 10);
        assert_eq!(cached.reason, reasons::NO_API_KEY);
    }

    #[tokio::test]
    async fn test_miss_for_unknown_url() {
        let (cache, _) = cache_with_ttl(Duration::from_secs(60));
        assert!(cache.get("https://example.com/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_is_dropped_on_read() {
        let (cache, store) = cache_with_ttl(Duration::from_millis(10));

        cache.set("https://example.com/", &sample_verdict()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cache.get("https://example.com/").await.unwrap().is_none());

        // The entry is gone from the backing store, not just masked
        let key = format!("{}https://example.com/", CACHE_KEY_PREFIX);
        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_dropped_on_read() {
        let (cache, store) = cache_with_ttl(Duration::from_secs(60));

        let key = format!("{}https://example.com/", CACHE_KEY_PREFIX);
        store.set(&key, "not json").await.unwrap();

        assert!(cache.get("https://example.com/").await.unwrap().is_none());
        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_expired_removes_only_stale_entries() {
        let (cache, store) = cache_with_ttl(Duration::from_secs(3600));

        cache.set("https://fresh.example/", &sample_verdict()).await.unwrap();

        let stale = CacheEntry {
            url: "https://stale.example/".to_string(),
            verdict: sample_verdict(),
            timestamp: Utc::now() - chrono::Duration::hours(2),
        };
        let key = format!("{}https://stale.example/", CACHE_KEY_PREFIX);
        store
            .set(&key, &serde_json::to_string(&stale).unwrap())
            .await
            .unwrap();

        let removed = cache.clear_expired().await.unwrap();

        assert_eq!(removed, 1);
        assert!(cache.get("https://stale.example/").await.unwrap().is_none());
        assert!(cache.get("https://fresh.example/").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rescan_supersedes_previous_entry() {
        let (cache, _) = cache_with_ttl(Duration::from_secs(60));

        cache.set("https://example.com/", &sample_verdict()).await.unwrap();

        let updated = Verdict::new(ScanStatus::Malicious, 100, reasons::BLACKLISTED);
        cache.set("https://example.com/", &updated).await.unwrap();

        let cached = cache.get("https://example.com/").await.unwrap().unwrap();
        assert_eq!(cached.status, ScanStatus::Malicious);
        assert_eq!(cached.score, 100);
    }
}

// Scan history and aggregate counters, persisted through the key-value store
// Read-modify-write cycles are serialized so concurrent scans never lose
// updates

use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::models::scan::{HistoryEntry, ScanStats};
use crate::models::verdict::{ScanStatus, Verdict};
use crate::storage::{KeyValueStore, StorageError};

pub const HISTORY_KEY: &str = "scan:history";
pub const STATS_KEY: &str = "scan:stats";

// =============================================================================
// SCAN RECORDER
// =============================================================================

/// Records completed scans: a bounded newest-first history list and
/// monotonically increasing counters.
pub struct ScanRecorder {
    store: Arc<dyn KeyValueStore>,
    history_limit: usize,
    // Guards every read-modify-write cycle on the history and stats keys
    write_lock: Mutex<()>,
}

impl ScanRecorder {
    pub fn new(store: Arc<dyn KeyValueStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit,
            write_lock: Mutex::new(()),
        }
    }

    /// Record one completed scan: prepend a history entry, drop anything
    /// past the bound, and bump the matching counter.
    pub async fn record(
        &self,
        url: &str,
        domain: &str,
        verdict: &Verdict,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut history: Vec<HistoryEntry> = self.load_or_default(HISTORY_KEY).await?;
        history.insert(
            0,
            HistoryEntry {
                url: url.to_string(),
                domain: domain.to_string(),
                result: verdict.clone(),
                timestamp: Utc::now(),
            },
        );
        history.truncate(self.history_limit);
        self.save(HISTORY_KEY, &history).await?;

        let mut stats: ScanStats = self.load_or_default(STATS_KEY).await?;
        stats.total_scans += 1;
        match verdict.status {
            ScanStatus::Malicious => stats.malicious += 1,
            ScanStatus::Suspicious => stats.suspicious += 1,
            _ => stats.safe += 1,
        }
        self.save(STATS_KEY, &stats).await
    }

    /// The most recent `limit` history entries, newest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        let mut history: Vec<HistoryEntry> = self.load_or_default(HISTORY_KEY).await?;
        history.truncate(limit);
        Ok(history)
    }

    pub async fn stats(&self) -> Result<ScanStats, StorageError> {
        self.load_or_default(STATS_KEY).await
    }

    /// Drop all history entries. Counters are left untouched.
    pub async fn clear_history(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(HISTORY_KEY).await
    }

    // Missing and undecodable records both start fresh
    async fn load_or_default<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        let raw = match self.store.get(key).await? {
            Some(raw) => raw,
            None => return Ok(T::default()),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Resetting undecodable record at {}: {}", key, e);
                Ok(T::default())
            },
        }
    }

    async fn save<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            source: e,
        })?;
        self.store.set(key, &raw).await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::verdict::reasons;
    use crate::storage::MemoryStore;

    fn recorder_with_limit(limit: usize) -> Arc<ScanRecorder> {
        Arc::new(ScanRecorder::new(Arc::new(MemoryStore::new()), limit))
    }

    fn safe_verdict() -> Verdict {
        Verdict::new(ScanStatus::Safe, 0, reasons::WHITELISTED)
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let recorder = recorder_with_limit(100);

        recorder
            .record("https://first.example/", "first.example", &safe_verdict())
            .await
            .unwrap();
        recorder
            .record("https://second.example/", "second.example", &safe_verdict())
            .await
            .unwrap();

        let history = recorder.history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].url, "https://second.example/");
        assert_eq!(history[1].url, "https://first.example/");
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let recorder = recorder_with_limit(3);

        for i in 0..5 {
            let url = format!("https://site{}.example/", i);
            recorder
                .record(&url, "site.example", &safe_verdict())
                .await
                .unwrap();
        }

        let history = recorder.history(100).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].url, "https://site4.example/");
        assert_eq!(history[2].url, "https://site2.example/");
    }

    #[tokio::test]
    async fn test_history_respects_query_limit() {
        let recorder = recorder_with_limit(100);

        for i in 0..10 {
            let url = format!("https://site{}.example/", i);
            recorder
                .record(&url, "site.example", &safe_verdict())
                .await
                .unwrap();
        }

        let history = recorder.history(4).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].url, "https://site9.example/");
    }

    #[tokio::test]
    async fn test_stats_count_by_status() {
        let recorder = recorder_with_limit(100);

        let malicious = Verdict::new(ScanStatus::Malicious, 100, reasons::BLACKLISTED);
        let suspicious = Verdict::new(ScanStatus::Suspicious, 50, reasons::NO_API_KEY);

        recorder.record("https://a.example/", "a.example", &malicious).await.unwrap();
        recorder.record("https://b.example/", "b.example", &suspicious).await.unwrap();
        recorder.record("https://c.example/", "c.example", &safe_verdict()).await.unwrap();
        recorder.record("https://d.example/", "d.example", &safe_verdict()).await.unwrap();

        let stats = recorder.stats().await.unwrap();
        assert_eq!(stats.total_scans, 4);
        assert_eq!(stats.malicious, 1);
        assert_eq!(stats.suspicious, 1);
        assert_eq!(stats.safe, 2);
    }

    #[tokio::test]
    async fn test_concurrent_records_do_not_lose_updates() {
        let recorder = recorder_with_limit(100);

        let mut handles = Vec::new();
        for i in 0..20 {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                let url = format!("https://site{}.example/", i);
                recorder
                    .record(&url, "site.example", &safe_verdict())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = recorder.stats().await.unwrap();
        assert_eq!(stats.total_scans, 20);
        assert_eq!(stats.safe, 20);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_stats() {
        let recorder = recorder_with_limit(100);

        recorder
            .record("https://a.example/", "a.example", &safe_verdict())
            .await
            .unwrap();
        recorder.clear_history().await.unwrap();

        assert!(recorder.history(10).await.unwrap().is_empty());
        assert_eq!(recorder.stats().await.unwrap().total_scans, 1);
    }

    #[tokio::test]
    async fn test_undecodable_history_starts_fresh() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "not json").await.unwrap();
        let recorder = ScanRecorder::new(store, 100);

        recorder
            .record("https://a.example/", "a.example", &safe_verdict())
            .await
            .unwrap();

        let history = recorder.history(10).await.unwrap();
        assert_eq!(history.len(), 1);
    }
}

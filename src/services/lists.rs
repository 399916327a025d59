// User-curated whitelist and blacklist, persisted through the key-value
// store and seeded from configuration on first use
// Matching is substring containment against the hostname, so an entry of
// "example.com" also covers every subdomain

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::storage::{KeyValueStore, StorageError};

pub const LISTS_KEY: &str = "scan:lists";

// =============================================================================
// LIST SET
// =============================================================================

/// The pair of user-editable domain lists. Entries are stored lowercased.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSet {
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

// =============================================================================
// LIST SERVICE
// =============================================================================

/// Manages the persisted list set. Until the first mutation is stored, the
/// configured seed lists are served; after that the stored set wins.
pub struct ListService {
    store: Arc<dyn KeyValueStore>,
    seed: ListSet,
    // Guards read-modify-write cycles on the lists key
    write_lock: Mutex<()>,
}

impl ListService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        whitelist: Vec<String>,
        blacklist: Vec<String>,
    ) -> Self {
        Self {
            store,
            seed: ListSet {
                whitelist,
                blacklist,
            },
            write_lock: Mutex::new(()),
        }
    }

    /// Current list set. Unlike scan records, an undecodable list is an
    /// error: curated lists are never silently reset.
    pub async fn lists(&self) -> Result<ListSet, StorageError> {
        let raw = match self.store.get(LISTS_KEY).await? {
            Some(raw) => raw,
            None => return Ok(self.seed.clone()),
        };

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: LISTS_KEY.to_string(),
            source: e,
        })
    }

    /// True when any whitelist entry occurs within `domain`.
    pub async fn is_whitelisted(&self, domain: &str) -> Result<bool, StorageError> {
        let lists = self.lists().await?;
        Ok(Self::matches(&lists.whitelist, domain))
    }

    /// True when any blacklist entry occurs within `domain`.
    pub async fn is_blacklisted(&self, domain: &str) -> Result<bool, StorageError> {
        let lists = self.lists().await?;
        Ok(Self::matches(&lists.blacklist, domain))
    }

    pub async fn add_to_whitelist(&self, domain: &str) -> Result<ListSet, StorageError> {
        self.mutate(|lists| Self::add_entry(&mut lists.whitelist, domain))
            .await
    }

    pub async fn remove_from_whitelist(&self, domain: &str) -> Result<ListSet, StorageError> {
        self.mutate(|lists| Self::remove_entry(&mut lists.whitelist, domain))
            .await
    }

    pub async fn add_to_blacklist(&self, domain: &str) -> Result<ListSet, StorageError> {
        self.mutate(|lists| Self::add_entry(&mut lists.blacklist, domain))
            .await
    }

    pub async fn remove_from_blacklist(&self, domain: &str) -> Result<ListSet, StorageError> {
        self.mutate(|lists| Self::remove_entry(&mut lists.blacklist, domain))
            .await
    }

    fn matches(entries: &[String], domain: &str) -> bool {
        entries.iter().any(|entry| domain.contains(entry.as_str()))
    }

    fn add_entry(entries: &mut Vec<String>, domain: &str) {
        let domain = domain.to_lowercase();
        if !entries.contains(&domain) {
            entries.push(domain);
        }
    }

    fn remove_entry(entries: &mut Vec<String>, domain: &str) {
        let domain = domain.to_lowercase();
        entries.retain(|entry| entry != &domain);
    }

    async fn mutate<F>(&self, apply: F) -> Result<ListSet, StorageError>
    where
        F: FnOnce(&mut ListSet),
    {
        let _guard = self.write_lock.lock().await;

        let mut lists = self.lists().await?;
        apply(&mut lists);

        let raw = serde_json::to_string(&lists).map_err(|e| StorageError::Corrupt {
            key: LISTS_KEY.to_string(),
            source: e,
        })?;
        self.store.set(LISTS_KEY, &raw).await?;

        Ok(lists)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! In-process cache backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::trace;

use super::{CachedExtraction, ExtractionCache, Result, check_key};

/// Entries held in memory. Expired entries are dropped when read and
/// swept on every write.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedExtraction>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ExtractionCache for MemoryCache {
    async fn get(&self, hash: &str) -> Result<Option<CachedExtraction>> {
        check_key(hash)?;

        let expired = {
            let entries = self.entries.read().await;
            match entries.get(hash) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(self.ttl, Utc::now()) => {
                    return Ok(Some(entry.clone()));
                }
                Some(_) => true,
            }
        };

        if expired {
            trace!("Evicting expired cache entry {}", hash);
            self.entries.write().await.remove(hash);
        }
        Ok(None)
    }

    /// Stores the entry and drops every other entry that has expired.
    async fn set(&self, entry: &CachedExtraction) -> Result<()> {
        check_key(&entry.hash)?;

        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(self.ttl, now));
        if entries.len() < before {
            trace!("Swept {} expired cache entries", before - entries.len());
        }

        entries.insert(entry.hash.clone(), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::content_hash;
    use crate::models::invoice::PartialInvoice;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new(Duration::hours(1));
        let hash = content_hash(b"bill");
        let entry = CachedExtraction::new(hash.clone(), PartialInvoice::default(), vec![]);

        assert!(cache.get(&hash).await.unwrap().is_none());
        cache.set(&entry).await.unwrap();
        assert_eq!(cache.get(&hash).await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = MemoryCache::new(Duration::hours(1));
        let hash = content_hash(b"old bill");
        let mut entry = CachedExtraction::new(hash.clone(), PartialInvoice::default(), vec![]);
        entry.timestamp = Utc::now() - Duration::hours(2);

        cache.set(&entry).await.unwrap();
        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&hash).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_sweeps_expired_entries() {
        let cache = MemoryCache::new(Duration::hours(1));
        let stale_hash = content_hash(b"never read again");
        let mut stale = CachedExtraction::new(stale_hash.clone(), PartialInvoice::default(), vec![]);
        stale.timestamp = Utc::now() - Duration::hours(2);
        cache.set(&stale).await.unwrap();

        let fresh = CachedExtraction::new(content_hash(b"new bill"), PartialInvoice::default(), vec![]);
        cache.set(&fresh).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&fresh.hash).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejects_bad_key() {
        let cache = MemoryCache::new(Duration::hours(1));
        assert!(cache.get("not-a-hash").await.is_err());
    }
}

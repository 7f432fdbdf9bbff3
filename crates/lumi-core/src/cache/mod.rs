//! Content-hash keyed cache of extraction results.
//!
//! Caching is best-effort: backends report failures as [`CacheError`] and
//! the extraction pipeline logs them and carries on as if the cache missed.

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CacheError, LumiError};
use crate::models::config::{CacheBackend, CacheConfig};
use crate::models::invoice::{ExtractionConfidence, PartialInvoice};

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A stored extraction, keyed by the SHA-256 of the original PDF bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedExtraction {
    pub hash: String,
    pub result: PartialInvoice,
    pub confidence: Vec<ExtractionConfidence>,
    pub timestamp: DateTime<Utc>,
}

impl CachedExtraction {
    pub fn new(
        hash: impl Into<String>,
        result: PartialInvoice,
        confidence: Vec<ExtractionConfidence>,
    ) -> Self {
        Self {
            hash: hash.into(),
            result,
            confidence,
            timestamp: Utc::now(),
        }
    }

    /// Whether the entry is older than `ttl` at `now`.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.timestamp > ttl
    }
}

/// Storage backend for extraction results.
#[async_trait]
pub trait ExtractionCache: Send + Sync {
    /// Fetch a live entry; expired entries count as misses.
    async fn get(&self, hash: &str) -> Result<Option<CachedExtraction>>;

    /// Store an entry under its hash, replacing any previous one.
    async fn set(&self, entry: &CachedExtraction) -> Result<()>;
}

/// Lowercase SHA-256 hex digest of the raw bytes.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Whether `key` looks like a SHA-256 hex digest.
pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

/// Build the configured cache backend; `None` when caching is disabled.
pub fn from_config(config: &CacheConfig) -> crate::Result<Option<Arc<dyn ExtractionCache>>> {
    let ttl = config.ttl();
    match config.backend {
        CacheBackend::Disabled => Ok(None),
        CacheBackend::Memory => Ok(Some(Arc::new(MemoryCache::new(ttl)))),
        CacheBackend::File => {
            let dir = config.directory.clone().ok_or_else(|| {
                LumiError::Config("file cache requires cache.directory".to_string())
            })?;
            Ok(Some(Arc::new(FileCache::new(dir, ttl))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        let hash = content_hash(b"hello");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert!(check_key(&hash).is_ok());
        assert!(check_key("../etc/passwd").is_err());
    }

    #[test]
    fn test_expiry() {
        let entry = CachedExtraction::new(content_hash(b"x"), PartialInvoice::default(), vec![]);
        let ttl = Duration::hours(1);
        assert!(!entry.is_expired(ttl, entry.timestamp + Duration::minutes(59)));
        assert!(entry.is_expired(ttl, entry.timestamp + Duration::minutes(61)));
    }

    #[test]
    fn test_entry_json_format() {
        let mut result = PartialInvoice::default();
        result.client_number = Some("7204076116".into());
        let entry = CachedExtraction::new("ab".repeat(32), result, vec![]);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["hash"], "ab".repeat(32));
        assert_eq!(json["result"]["clientNumber"], "7204076116");
        assert!(json["confidence"].as_array().unwrap().is_empty());
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_from_config() {
        let mut config = CacheConfig::default();
        config.backend = CacheBackend::Disabled;
        assert!(from_config(&config).unwrap().is_none());

        config.backend = CacheBackend::Memory;
        assert!(from_config(&config).unwrap().is_some());

        config.backend = CacheBackend::File;
        config.directory = None;
        assert!(from_config(&config).is_err());
    }
}

//! Directory-backed cache backend: one JSON file per content hash.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::fs;
use tracing::{debug, trace};

use super::{CachedExtraction, ExtractionCache, Result, check_key};

/// Stores each entry as `<dir>/<hash>.json`.
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
    write_seq: AtomicU64,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            write_seq: AtomicU64::new(0),
        }
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash))
    }
}

#[async_trait]
impl ExtractionCache for FileCache {
    async fn get(&self, hash: &str) -> Result<Option<CachedExtraction>> {
        check_key(hash)?;
        let path = self.entry_path(hash);

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CachedExtraction = serde_json::from_slice(&data)?;
        if entry.is_expired(self.ttl, Utc::now()) {
            trace!("Removing expired cache file {}", path.display());
            // Another writer may have replaced or removed it already.
            let _ = fs::remove_file(&path).await;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn set(&self, entry: &CachedExtraction) -> Result<()> {
        check_key(&entry.hash)?;
        fs::create_dir_all(&self.dir).await?;

        // Unique temp file renamed over the entry; readers only see whole files.
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!("{}.{}.{}.tmp", entry.hash, std::process::id(), seq));
        let content = serde_json::to_vec_pretty(entry)?;

        fs::write(&tmp, content).await?;
        fs::rename(&tmp, self.entry_path(&entry.hash)).await?;

        debug!("Cached extraction {} in {}", entry.hash, self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::cache::content_hash;
    use crate::error::CacheError;
    use crate::models::invoice::PartialInvoice;

    fn sample_entry(hash: &str) -> CachedExtraction {
        let result = PartialInvoice {
            client_number: Some("7204076116".into()),
            reference_month: NaiveDate::from_ymd_opt(2024, 1, 1),
            electricity_value: Some(Decimal::new(4775, 2)),
            compensated_energy_value: Some(Decimal::new(-22542, 2)),
            ..Default::default()
        };
        let confidence = result.confidence();
        CachedExtraction::new(hash, result, confidence)
    }

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"), Duration::hours(1));
        let hash = content_hash(b"bill");
        let entry = sample_entry(&hash);

        assert!(cache.get(&hash).await.unwrap().is_none());
        cache.set(&entry).await.unwrap();

        let loaded = cache.get(&hash).await.unwrap().unwrap();
        assert_eq!(loaded.result, entry.result);
        assert_eq!(loaded.confidence, entry.confidence);
        assert_eq!(loaded.timestamp, entry.timestamp);
    }

    #[tokio::test]
    async fn test_expired_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::hours(1));
        let hash = content_hash(b"old");
        let mut entry = sample_entry(&hash);
        entry.timestamp = Utc::now() - Duration::days(2);

        cache.set(&entry).await.unwrap();
        assert!(cache.get(&hash).await.unwrap().is_none());
        assert!(!dir.path().join(format!("{}.json", hash)).exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::hours(1));
        let hash = content_hash(b"corrupt");
        std::fs::write(dir.path().join(format!("{}.json", hash)), b"{not json").unwrap();

        assert!(matches!(
            cache.get(&hash).await,
            Err(CacheError::Serialization(_))
        ));
    }
}

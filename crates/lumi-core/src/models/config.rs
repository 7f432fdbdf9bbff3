//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::invoice::CemigLayout;

/// Longest accepted cache TTL (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Main configuration for lumi.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LumiConfig {
    /// Bill extraction configuration.
    pub extraction: ExtractionConfig,

    /// Extraction cache configuration.
    pub cache: CacheConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// Bill extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Layout used when none is given explicitly.
    pub default_layout: String,

    /// Look up and store results in the extraction cache.
    pub use_cache: bool,

    /// Reject records that fail layout validation.
    pub validate_result: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_layout: CemigLayout::NAME.to_string(),
            use_cache: true,
            validate_result: true,
        }
    }
}

/// Where extraction results are cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Process-local map.
    Memory,
    /// One JSON file per entry in `directory`.
    #[default]
    File,
    /// No caching.
    Disabled,
}

/// Extraction cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache backend.
    pub backend: CacheBackend,

    /// Directory for the file backend (the CLI fills in a per-user default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::File,
            directory: None,
            ttl_secs: 24 * 60 * 60,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime as a duration.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs.min(MAX_TTL_SECS) as i64)
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages accepted (0 = unlimited).
    pub max_pages: u32,
}

impl LumiConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

//! Subcommands and the wiring they share.

pub mod batch;
pub mod config;
pub mod dashboard;
pub mod extract;
pub mod layouts;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use lumi_core::cache;
use lumi_core::invoice::{ExtractionPipeline, LayoutRegistry};
use lumi_core::models::config::{CacheBackend, LumiConfig};
use lumi_core::pdf::LopdfConverter;

/// Output format for extracted bills.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumi")
        .join("config.json")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumi")
        .join("extractions")
}

/// Load the config named on the command line, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LumiConfig> {
    if let Some(path) = config_path {
        return Ok(LumiConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(LumiConfig::from_file(&path)?)
    } else {
        Ok(LumiConfig::default())
    }
}

/// Wire the layout registry, PDF converter and configured cache.
pub fn build_pipeline(config: &LumiConfig) -> anyhow::Result<ExtractionPipeline> {
    let mut cache_config = config.cache.clone();
    if cache_config.backend == CacheBackend::File && cache_config.directory.is_none() {
        cache_config.directory = Some(default_cache_dir());
    }

    let cache = cache::from_config(&cache_config)?;
    let converter = LopdfConverter::new().with_max_pages(config.pdf.max_pages);

    Ok(
        ExtractionPipeline::new(Arc::new(LayoutRegistry::with_defaults()), Arc::new(converter))
            .with_cache(cache),
    )
}

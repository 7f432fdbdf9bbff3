//! Extraction orchestration: cache lookup, PDF conversion, field extraction,
//! validation and cache write-through.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::layout::Layout;
use super::registry::LayoutRegistry;
use crate::cache::{CachedExtraction, ExtractionCache, content_hash};
use crate::error::{ExtractionError, PdfError};
use crate::models::invoice::{ExtractionConfidence, InvoiceRecord, PartialInvoice};
use crate::pdf::PdfTextConverter;

/// Per-call switches for [`ExtractionPipeline::extract_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub use_cache: bool,
    pub validate_result: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            validate_result: true,
        }
    }
}

/// Where and how a result was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    /// Page count of the converted PDF; 0 when served from cache.
    pub num_pages: u32,
    pub layout: String,
    /// Wall-clock time of the extraction; 0 when served from cache.
    pub processing_time_ms: u64,
    #[serde(default)]
    pub from_cache: bool,
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub data: PartialInvoice,
    pub confidence: Vec<ExtractionConfidence>,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// The finalized record, if every field is present.
    pub fn record(&self) -> Option<InvoiceRecord> {
        self.data.to_record()
    }
}

/// Turns PDF bytes into invoice data using a named layout.
///
/// Holds no per-request state; one pipeline can serve concurrent extractions.
#[derive(Clone)]
pub struct ExtractionPipeline {
    registry: Arc<LayoutRegistry>,
    converter: Arc<dyn PdfTextConverter>,
    cache: Option<Arc<dyn ExtractionCache>>,
}

impl ExtractionPipeline {
    /// Create a pipeline without a cache.
    pub fn new(registry: Arc<LayoutRegistry>, converter: Arc<dyn PdfTextConverter>) -> Self {
        Self {
            registry,
            converter,
            cache: None,
        }
    }

    /// Attach a cache; `None` disables caching for every call.
    pub fn with_cache(mut self, cache: Option<Arc<dyn ExtractionCache>>) -> Self {
        self.cache = cache;
        self
    }

    /// Extract invoice fields from raw PDF bytes.
    pub async fn extract_data(
        &self,
        bytes: &[u8],
        layout_name: &str,
        options: ExtractOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::invalid_buffer());
        }

        let layout = self
            .registry
            .get(layout_name)
            .ok_or_else(|| ExtractionError::layout_not_found(layout_name))?;

        let cache = if options.use_cache {
            self.cache.as_ref()
        } else {
            None
        };

        let hash = cache.map(|_| content_hash(bytes));

        if let (Some(cache), Some(hash)) = (cache, hash.as_deref()) {
            if let Some(hit) = lookup(cache.as_ref(), hash).await {
                debug!("Cache hit for {}", hash);
                return Ok(ExtractionResult {
                    data: hit.result,
                    confidence: hit.confidence,
                    metadata: ExtractionMetadata {
                        num_pages: 0,
                        layout: layout_name.to_string(),
                        processing_time_ms: 0,
                        from_cache: true,
                    },
                });
            }
        }

        let start = Instant::now();

        let pdf = self.converter.convert(bytes).await.map_err(|e| match e {
            PdfError::Aborted(reason) => {
                error!("PDF conversion aborted: {}", reason);
                ExtractionError::unknown(format!("PDF conversion aborted: {}", reason))
            }
            other => ExtractionError::pdf_parse(&other),
        })?;

        let (data, valid) = run_layout(layout.as_ref(), &pdf.text, options.validate_result)?;
        let confidence = data.confidence();

        // Hits skip validation, so only records that pass it are stored.
        if let (Some(cache), Some(hash)) = (cache, hash) {
            if valid {
                let entry = CachedExtraction::new(hash, data.clone(), confidence.clone());
                if let Err(e) = cache.set(&entry).await {
                    warn!("Failed to write extraction cache: {}", e);
                }
            }
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} fields with layout {} from {} pages in {}ms",
            confidence.len(),
            layout.name(),
            pdf.num_pages,
            processing_time_ms
        );

        Ok(ExtractionResult {
            data,
            confidence,
            metadata: ExtractionMetadata {
                num_pages: pdf.num_pages,
                layout: layout_name.to_string(),
                processing_time_ms,
                from_cache: false,
            },
        })
    }

    /// Extract invoice fields from already converted text. Never touches the cache.
    pub fn extract_from_text(
        &self,
        text: &str,
        layout_name: &str,
        validate_result: bool,
    ) -> Result<ExtractionResult, ExtractionError> {
        let layout = self
            .registry
            .get(layout_name)
            .ok_or_else(|| ExtractionError::layout_not_found(layout_name))?;

        let start = Instant::now();
        let (data, _) = run_layout(layout.as_ref(), text, validate_result)?;
        let confidence = data.confidence();

        Ok(ExtractionResult {
            data,
            confidence,
            metadata: ExtractionMetadata {
                num_pages: 0,
                layout: layout_name.to_string(),
                processing_time_ms: start.elapsed().as_millis() as u64,
                from_cache: false,
            },
        })
    }
}

/// Extract and optionally validate. Returns the record and whether it is valid.
fn run_layout(
    layout: &dyn Layout,
    text: &str,
    validate_result: bool,
) -> Result<(PartialInvoice, bool), ExtractionError> {
    let data = layout.extract(text);
    let validation = layout.validate(&data);

    if validate_result && !validation.is_valid {
        warn!(
            "Validation failed for layout {}: {:?}",
            layout.name(),
            validation.failed_fields()
        );
        return Err(ExtractionError::invalid_data(
            layout.name(),
            validation.errors,
            Some(data),
        ));
    }

    Ok((data, validation.is_valid))
}

async fn lookup(cache: &dyn ExtractionCache, hash: &str) -> Option<CachedExtraction> {
    match cache.get(hash).await {
        Ok(hit) => hit,
        Err(e) => {
            warn!("Extraction cache lookup failed, treating as miss: {}", e);
            None
        }
    }
}

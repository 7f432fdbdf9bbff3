//! Core library for CEMIG electricity bill extraction.
//!
//! This crate provides:
//! - PDF-to-text conversion (lopdf + pdf-extract)
//! - Layout-driven regex extraction of bill fields with fallback pattern chains
//! - All-or-nothing validation of extracted records
//! - A content-hash keyed extraction cache (memory or file backed)
//! - Dashboard aggregations over finalized records

pub mod cache;
pub mod dashboard;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use cache::{CachedExtraction, ExtractionCache, FileCache, MemoryCache, content_hash};
pub use dashboard::{DashboardFilter, DashboardSummary, MonthlyPoint, summarize};
pub use error::{CacheError, ErrorCode, ErrorDetail, ExtractionError, LumiError, PdfError, Result};
pub use invoice::{
    CemigLayout, ExtractOptions, ExtractionMetadata, ExtractionPipeline, ExtractionResult, Layout,
    LayoutRegistry, RecordValidator, ValidationResult,
};
pub use models::config::LumiConfig;
pub use models::invoice::{
    ExtractedValue, ExtractionConfidence, ExtractionMethod, InvoiceField, InvoiceRecord,
    PartialInvoice,
};
pub use pdf::{LopdfConverter, PdfExtractor, PdfProcessor, PdfText, PdfTextConverter};

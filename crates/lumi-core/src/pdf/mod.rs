//! PDF-to-text conversion.

pub(crate) mod extractor;

pub use extractor::{LopdfConverter, PdfExtractor};

use async_trait::async_trait;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Plain text of a PDF with its page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    pub num_pages: u32,
}

/// Trait for synchronous PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Converts raw PDF bytes to text for the extraction pipeline.
#[async_trait]
pub trait PdfTextConverter: Send + Sync {
    async fn convert(&self, data: &[u8]) -> Result<PdfText>;
}

//! PDF text extraction using lopdf and pdf-extract.

use async_trait::async_trait;
use lopdf::Document;
use tracing::debug;

use super::{PdfProcessor, PdfText, PdfTextConverter, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF and return its text with the page count.
    pub fn extract_all(data: &[u8], max_pages: u32) -> Result<PdfText> {
        let mut extractor = Self::new();
        extractor.load(data)?;

        let num_pages = extractor.page_count();
        if max_pages > 0 && num_pages > max_pages {
            return Err(PdfError::TooManyPages {
                pages: num_pages,
                limit: max_pages,
            });
        }

        let text = extractor.extract_text()?;
        debug!("Extracted {} chars of text from {} pages", text.len(), num_pages);

        Ok(PdfText { text, num_pages })
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

/// [`PdfTextConverter`] backed by [`PdfExtractor`], run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct LopdfConverter {
    max_pages: u32,
}

impl LopdfConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject documents with more than `max_pages` pages (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

#[async_trait]
impl PdfTextConverter for LopdfConverter {
    async fn convert(&self, data: &[u8]) -> Result<PdfText> {
        let data = data.to_vec();
        let max_pages = self.max_pages;

        tokio::task::spawn_blocking(move || PdfExtractor::extract_all(&data, max_pages))
            .await
            .map_err(|e| PdfError::Aborted(e.to_string()))?
    }
}

/// A minimal PDF with `pages` blank pages.
#[cfg(test)]
pub(crate) fn blank_pdf(pages: usize) -> Vec<u8> {
    use lopdf::{Object, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

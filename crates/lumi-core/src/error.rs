//! Error types for the lumi-core library.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::models::invoice::PartialInvoice;

/// Main error type for the lumi library.
#[derive(Error, Debug)]
pub enum LumiError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Bill extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Extraction cache error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has more pages than the configured limit.
    #[error("PDF has {pages} pages, limit is {limit}")]
    TooManyPages { pages: u32, limit: u32 },

    /// The conversion library panicked or its worker was lost.
    #[error("PDF conversion aborted: {0}")]
    Aborted(String),
}

/// Errors raised by extraction cache backends.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store I/O failed.
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be (de)serialized.
    #[error("cache entry is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key is not a SHA-256 hex digest.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

/// Machine-readable error code surfaced to extraction callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidBuffer,
    LayoutNotFound,
    PdfParseError,
    InvalidData,
    UnknownError,
    /// Per-field validation failure, rendered as `INVALID_<FIELD_NAME>`.
    InvalidField(String),
}

impl ErrorCode {
    /// Per-field code for a camelCase field name.
    pub fn invalid_field(name: &str) -> Self {
        ErrorCode::InvalidField(name.to_string())
    }

    pub fn as_string(&self) -> String {
        match self {
            ErrorCode::InvalidBuffer => "INVALID_BUFFER".to_string(),
            ErrorCode::LayoutNotFound => "LAYOUT_NOT_FOUND".to_string(),
            ErrorCode::PdfParseError => "PDF_PARSE_ERROR".to_string(),
            ErrorCode::InvalidData => "INVALID_DATA".to_string(),
            ErrorCode::UnknownError => "UNKNOWN_ERROR".to_string(),
            ErrorCode::InvalidField(name) => format!("INVALID_{}", screaming_snake(name)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

/// `clientNumber` -> `CLIENT_NUMBER`.
fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_uppercase());
    }
    out
}

/// One entry of an extraction error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Validation failure for a named field.
    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::invalid_field(field),
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

/// The single error type of the extraction pipeline.
///
/// Every failure carries one or more [`ErrorDetail`]s; validation failures
/// may also carry the record that was rejected.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionError {
    pub errors: Vec<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_data: Option<PartialInvoice>,
}

impl ExtractionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorDetail::new(code, message)],
            partial_data: None,
        }
    }

    pub fn invalid_buffer() -> Self {
        Self::new(ErrorCode::InvalidBuffer, "input is empty, expected PDF bytes")
    }

    pub fn layout_not_found(name: &str) -> Self {
        Self::new(ErrorCode::LayoutNotFound, format!("layout not found: {}", name))
    }

    pub fn pdf_parse(err: &PdfError) -> Self {
        Self::new(ErrorCode::PdfParseError, err.to_string())
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }

    /// Validation failure: an `INVALID_DATA` entry followed by the per-field entries.
    pub fn invalid_data(
        layout: &str,
        field_errors: Vec<ErrorDetail>,
        partial: Option<PartialInvoice>,
    ) -> Self {
        let mut errors = Vec::with_capacity(field_errors.len() + 1);
        errors.push(ErrorDetail::new(
            ErrorCode::InvalidData,
            format!("extracted data failed {} validation", layout),
        ));
        errors.extend(field_errors);
        Self {
            errors,
            partial_data: partial,
        }
    }

    /// Codes of all entries, in order.
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code.clone()).collect()
    }

    /// Whether any entry has the given code.
    pub fn has_code(&self, code: &ErrorCode) -> bool {
        self.errors.iter().any(|e| &e.code == code)
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Result type for the lumi library.
pub type Result<T> = std::result::Result<T, LumiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_codes() {
        assert_eq!(
            ErrorCode::invalid_field("clientNumber").to_string(),
            "INVALID_CLIENT_NUMBER"
        );
        assert_eq!(
            ErrorCode::invalid_field("compensatedEnergyValue").to_string(),
            "INVALID_COMPENSATED_ENERGY_VALUE"
        );
        assert_eq!(ErrorCode::invalid_field("total").to_string(), "INVALID_TOTAL");
    }

    #[test]
    fn test_code_serializes_as_wire_string() {
        assert_eq!(
            serde_json::to_value(ErrorCode::PdfParseError).unwrap(),
            serde_json::json!("PDF_PARSE_ERROR")
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::invalid_field("sceeValue")).unwrap(),
            "\"INVALID_SCEE_VALUE\""
        );
    }

    #[test]
    fn test_error_json_shape() {
        let err = ExtractionError::invalid_data(
            "CEMIG",
            vec![ErrorDetail::for_field("clientNumber", "missing")],
            None,
        );
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["errors"][0]["code"], "INVALID_DATA");
        assert!(json["errors"][0].get("field").is_none());
        assert_eq!(json["errors"][1]["code"], "INVALID_CLIENT_NUMBER");
        assert_eq!(json["errors"][1]["field"], "clientNumber");
        assert!(json.get("partialData").is_none());
    }

    #[test]
    fn test_display_joins_entries() {
        let err = ExtractionError::layout_not_found("LIGHT");
        assert_eq!(err.to_string(), "[LAYOUT_NOT_FOUND] layout not found: LIGHT");
        assert!(err.has_code(&ErrorCode::LayoutNotFound));
    }
}

//! Bill field extraction: layouts, pattern rules, validation and the
//! extraction pipeline.

mod cemig;
mod layout;
mod pipeline;
mod registry;
pub mod rules;
mod validator;

pub use cemig::CemigLayout;
pub use layout::{FieldParser, FieldRule, Layout};
pub use pipeline::{ExtractOptions, ExtractionMetadata, ExtractionPipeline, ExtractionResult};
pub use registry::LayoutRegistry;
pub use validator::{RecordValidator, ValidationResult, validate_invoice};

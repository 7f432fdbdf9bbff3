//! Record validation.
//!
//! Validation is all-or-nothing: one failing field rejects the whole record
//! and no data is returned with the errors.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ErrorDetail;
use crate::models::invoice::{InvoiceField, InvoiceRecord, PartialInvoice};

/// Outcome of validating a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult<T> {
    pub is_valid: bool,
    pub errors: Vec<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ValidationResult<T> {
    fn from_errors(errors: Vec<ErrorDetail>, data: impl FnOnce() -> Option<T>) -> Self {
        if errors.is_empty() {
            let data = data();
            Self {
                is_valid: data.is_some(),
                errors,
                data,
            }
        } else {
            Self {
                is_valid: false,
                errors,
                data: None,
            }
        }
    }

    /// Fields named by the errors, in order.
    pub fn failed_fields(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter_map(|e| e.field.as_deref())
            .collect()
    }
}

/// Validate an extracted bill against the layout rules.
///
/// Requires a client number of exactly `client_number_digits` ASCII digits,
/// a reference month and every numeric field. Signs and ranges are not checked.
pub fn validate_invoice(
    record: &PartialInvoice,
    client_number_digits: usize,
) -> ValidationResult<InvoiceRecord> {
    let mut errors = Vec::new();

    match record.client_number.as_deref() {
        None => errors.push(missing(InvoiceField::ClientNumber)),
        Some(number)
            if number.len() != client_number_digits
                || !number.chars().all(|c| c.is_ascii_digit()) =>
        {
            errors.push(ErrorDetail::for_field(
                InvoiceField::ClientNumber.name(),
                format!(
                    "client number must be exactly {} digits, got {:?}",
                    client_number_digits, number
                ),
            ));
        }
        Some(_) => {}
    }

    if record.reference_month.is_none() {
        errors.push(missing(InvoiceField::ReferenceMonth));
    }

    for field in InvoiceField::ALL.into_iter().filter(InvoiceField::is_numeric) {
        if record.get(field).is_none() {
            errors.push(missing(field));
        }
    }

    ValidationResult::from_errors(errors, || record.to_record())
}

fn missing(field: InvoiceField) -> ErrorDetail {
    ErrorDetail::for_field(field.name(), format!("{} is missing or not a valid value", field))
}

/// Generic validator for records that did not come through a layout
/// (hand-entered or DTO-bound JSON objects).
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    required: Vec<String>,
    numeric: Vec<String>,
}

impl RecordValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields that must be present, non-null and non-empty.
    pub fn with_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Fields that must be present and hold a JSON number.
    pub fn with_numeric<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Validator preset for invoice records.
    pub fn for_invoices() -> Self {
        Self::new()
            .with_required(InvoiceField::ALL.iter().map(|f| f.name()))
            .with_numeric(
                InvoiceField::ALL
                    .iter()
                    .filter(|f| f.is_numeric())
                    .map(|f| f.name()),
            )
    }

    pub fn validate(&self, record: &Map<String, Value>) -> ValidationResult<Map<String, Value>> {
        let mut errors = Vec::new();

        for name in &self.required {
            let present = match record.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                errors.push(ErrorDetail::for_field(name, format!("{} is required", name)));
            }
        }

        for name in &self.numeric {
            // A field already reported as missing is not reported twice.
            if errors.iter().any(|e| e.field.as_deref() == Some(name.as_str())) {
                continue;
            }
            if !matches!(record.get(name), Some(Value::Number(_))) {
                errors.push(ErrorDetail::for_field(name, format!("{} must be a number", name)));
            }
        }

        ValidationResult::from_errors(errors, || Some(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::error::ErrorCode;

    fn complete() -> PartialInvoice {
        PartialInvoice {
            client_number: Some("7204076116".into()),
            reference_month: NaiveDate::from_ymd_opt(2024, 1, 1),
            electricity_quantity: Some(50),
            electricity_value: Some(Decimal::new(4775, 2)),
            scee_quantity: Some(456),
            scee_value: Some(Decimal::new(23542, 2)),
            compensated_energy_quantity: Some(456),
            compensated_energy_value: Some(Decimal::new(-22542, 2)),
            public_lighting_value: Some(Decimal::new(4943, 2)),
        }
    }

    #[test]
    fn test_complete_record_is_valid() {
        let result = validate_invoice(&complete(), 10);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.data.map(|r| r.client_number), Some("7204076116".to_string()));
    }

    #[test]
    fn test_missing_client_number_rejects_whole_record() {
        let mut record = complete();
        record.client_number = None;

        let result = validate_invoice(&record, 10);
        assert!(!result.is_valid);
        assert!(result.data.is_none());
        assert_eq!(result.failed_fields(), vec!["clientNumber"]);
        assert_eq!(
            result.errors[0].code,
            ErrorCode::invalid_field("clientNumber")
        );
    }

    #[test]
    fn test_client_number_format() {
        for bad in ["720407611", "72040761160", "72040761a6"] {
            let mut record = complete();
            record.client_number = Some(bad.into());
            let result = validate_invoice(&record, 10);
            assert_eq!(result.failed_fields(), vec!["clientNumber"], "{}", bad);
        }
    }

    #[test]
    fn test_negative_amounts_are_not_rejected() {
        let mut record = complete();
        record.electricity_value = Some(Decimal::new(-100, 2));
        assert!(validate_invoice(&record, 10).is_valid);
    }

    #[test]
    fn test_every_missing_field_is_listed() {
        let result = validate_invoice(&PartialInvoice::default(), 10);
        assert_eq!(result.errors.len(), 9);
        assert_eq!(
            result.errors[8].code.to_string(),
            "INVALID_PUBLIC_LIGHTING_VALUE"
        );
    }

    #[test]
    fn test_record_validator() {
        let validator = RecordValidator::new()
            .with_required(["name", "total"])
            .with_numeric(["total"]);

        let ok = json!({"name": "Conta", "total": 10.5});
        let result = validator.validate(ok.as_object().unwrap());
        assert!(result.is_valid);
        assert!(result.data.is_some());

        let bad = json!({"name": " ", "total": "10,5"});
        let result = validator.validate(bad.as_object().unwrap());
        assert!(!result.is_valid);
        assert!(result.data.is_none());
        assert_eq!(result.failed_fields(), vec!["name", "total"]);
        assert_eq!(result.errors[1].code.to_string(), "INVALID_TOTAL");
    }

    #[test]
    fn test_record_validator_reports_missing_once() {
        let validator = RecordValidator::new()
            .with_required(["total"])
            .with_numeric(["total"]);
        let result = validator.validate(&Map::new());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_invoice_preset_accepts_serialized_record() {
        let record = complete().to_record().unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let result = RecordValidator::for_invoices().validate(value.as_object().unwrap());
        assert!(result.is_valid, "{:?}", result.errors);
    }
}

//! Electricity bill data models for CEMIG invoices.
//!
//! A bill moves through two shapes: [`PartialInvoice`] holds whatever the
//! layout patterns managed to extract, and [`InvoiceRecord`] is the finalized
//! invoice that only exists once every field has been validated.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ErrorDetail;

/// A named attribute of an electricity bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceField {
    /// Customer number (Nº DO CLIENTE).
    ClientNumber,
    /// Billing month (Referente a).
    ReferenceMonth,
    /// Energia Elétrica consumption in kWh.
    ElectricityQuantity,
    /// Energia Elétrica amount in R$.
    ElectricityValue,
    /// Energia SCEE s/ ICMS consumption in kWh.
    SceeQuantity,
    /// Energia SCEE s/ ICMS amount in R$.
    SceeValue,
    /// Energia compensada GD I in kWh.
    CompensatedEnergyQuantity,
    /// Energia compensada GD I amount in R$, stored as a negative adjustment.
    CompensatedEnergyValue,
    /// Contrib Ilum Publica Municipal amount in R$.
    PublicLightingValue,
}

impl InvoiceField {
    /// All fields in extraction order.
    pub const ALL: [InvoiceField; 9] = [
        InvoiceField::ClientNumber,
        InvoiceField::ReferenceMonth,
        InvoiceField::ElectricityQuantity,
        InvoiceField::ElectricityValue,
        InvoiceField::SceeQuantity,
        InvoiceField::SceeValue,
        InvoiceField::CompensatedEnergyQuantity,
        InvoiceField::CompensatedEnergyValue,
        InvoiceField::PublicLightingValue,
    ];

    /// Wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            InvoiceField::ClientNumber => "clientNumber",
            InvoiceField::ReferenceMonth => "referenceMonth",
            InvoiceField::ElectricityQuantity => "electricityQuantity",
            InvoiceField::ElectricityValue => "electricityValue",
            InvoiceField::SceeQuantity => "sceeQuantity",
            InvoiceField::SceeValue => "sceeValue",
            InvoiceField::CompensatedEnergyQuantity => "compensatedEnergyQuantity",
            InvoiceField::CompensatedEnergyValue => "compensatedEnergyValue",
            InvoiceField::PublicLightingValue => "publicLightingValue",
        }
    }

    /// Whether the field carries a number (quantity or amount).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, InvoiceField::ClientNumber | InvoiceField::ReferenceMonth)
    }
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedValue {
    Text(String),
    Integer(i64),
    Amount(Decimal),
    Month(NaiveDate),
}

impl fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedValue::Text(s) => f.write_str(s),
            ExtractedValue::Integer(n) => write!(f, "{}", n),
            ExtractedValue::Amount(d) => write!(f, "{}", d.normalize()),
            ExtractedValue::Month(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Fields extracted from a bill so far. A field whose pattern chain found
/// nothing is `None`; there are no placeholder defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialInvoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_month_option")]
    pub reference_month: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity_quantity: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub electricity_value: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scee_quantity: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub scee_value: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensated_energy_quantity: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub compensated_energy_value: Option<Decimal>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub public_lighting_value: Option<Decimal>,
}

impl PartialInvoice {
    /// Store a value for a field.
    ///
    /// Returns `false` and leaves the record untouched when the value kind
    /// does not fit the field (e.g. a date for a kWh quantity).
    pub fn set(&mut self, field: InvoiceField, value: ExtractedValue) -> bool {
        use ExtractedValue::*;
        use InvoiceField::*;

        match (field, value) {
            (ClientNumber, Text(s)) => self.client_number = Some(s),
            (ReferenceMonth, Month(d)) => self.reference_month = Some(d),
            (ElectricityQuantity, Integer(n)) => self.electricity_quantity = Some(n),
            (ElectricityValue, Amount(d)) => self.electricity_value = Some(d),
            (SceeQuantity, Integer(n)) => self.scee_quantity = Some(n),
            (SceeValue, Amount(d)) => self.scee_value = Some(d),
            (CompensatedEnergyQuantity, Integer(n)) => self.compensated_energy_quantity = Some(n),
            (CompensatedEnergyValue, Amount(d)) => self.compensated_energy_value = Some(d),
            (PublicLightingValue, Amount(d)) => self.public_lighting_value = Some(d),
            _ => return false,
        }
        true
    }

    /// Current value of a field, if extracted.
    pub fn get(&self, field: InvoiceField) -> Option<ExtractedValue> {
        use InvoiceField::*;

        match field {
            ClientNumber => self.client_number.clone().map(ExtractedValue::Text),
            ReferenceMonth => self.reference_month.map(ExtractedValue::Month),
            ElectricityQuantity => self.electricity_quantity.map(ExtractedValue::Integer),
            ElectricityValue => self.electricity_value.map(ExtractedValue::Amount),
            SceeQuantity => self.scee_quantity.map(ExtractedValue::Integer),
            SceeValue => self.scee_value.map(ExtractedValue::Amount),
            CompensatedEnergyQuantity => self.compensated_energy_quantity.map(ExtractedValue::Integer),
            CompensatedEnergyValue => self.compensated_energy_value.map(ExtractedValue::Amount),
            PublicLightingValue => self.public_lighting_value.map(ExtractedValue::Amount),
        }
    }

    /// Fields that currently hold a value, in extraction order.
    pub fn present_fields(&self) -> Vec<InvoiceField> {
        InvoiceField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }

    /// Fields that are still missing, in extraction order.
    pub fn missing_fields(&self) -> Vec<InvoiceField> {
        InvoiceField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// One confidence entry per extracted field.
    pub fn confidence(&self) -> Vec<ExtractionConfidence> {
        InvoiceField::ALL
            .into_iter()
            .filter_map(|field| {
                self.get(field)
                    .map(|value| ExtractionConfidence::regex(field, &value))
            })
            .collect()
    }

    /// Convert into a finalized record when every field is present.
    ///
    /// This only checks presence; format rules live in the layout validator.
    pub fn to_record(&self) -> Option<InvoiceRecord> {
        InvoiceRecord::try_from(self).ok()
    }
}

impl TryFrom<&PartialInvoice> for InvoiceRecord {
    /// One entry per missing field, in extraction order.
    type Error = Vec<ErrorDetail>;

    fn try_from(p: &PartialInvoice) -> Result<Self, Self::Error> {
        match (
            &p.client_number,
            p.reference_month,
            p.electricity_quantity,
            p.electricity_value,
            p.scee_quantity,
            p.scee_value,
            p.compensated_energy_quantity,
            p.compensated_energy_value,
            p.public_lighting_value,
        ) {
            (
                Some(client_number),
                Some(reference_month),
                Some(electricity_quantity),
                Some(electricity_value),
                Some(scee_quantity),
                Some(scee_value),
                Some(compensated_energy_quantity),
                Some(compensated_energy_value),
                Some(public_lighting_value),
            ) => Ok(InvoiceRecord {
                client_number: client_number.clone(),
                reference_month,
                electricity_quantity,
                electricity_value,
                scee_quantity,
                scee_value,
                compensated_energy_quantity,
                compensated_energy_value,
                public_lighting_value,
            }),
            _ => Err(p
                .missing_fields()
                .into_iter()
                .map(|f| ErrorDetail::for_field(f.name(), format!("{} is missing", f)))
                .collect()),
        }
    }
}

/// A validated electricity bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub client_number: String,

    #[serde(with = "iso_month")]
    pub reference_month: NaiveDate,

    pub electricity_quantity: i64,

    #[serde(with = "rust_decimal::serde::float")]
    pub electricity_value: Decimal,

    pub scee_quantity: i64,

    #[serde(with = "rust_decimal::serde::float")]
    pub scee_value: Decimal,

    pub compensated_energy_quantity: i64,

    /// Negative: the GD credit deducted from the bill.
    #[serde(with = "rust_decimal::serde::float")]
    pub compensated_energy_value: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub public_lighting_value: Decimal,
}

impl InvoiceRecord {
    /// Energy consumed in kWh: Energia Elétrica plus Energia SCEE.
    pub fn energy_consumption_kwh(&self) -> i64 {
        self.electricity_quantity + self.scee_quantity
    }

    /// Energy compensated by distributed generation, in kWh.
    pub fn compensated_energy_kwh(&self) -> i64 {
        self.compensated_energy_quantity
    }

    /// What the bill would cost without the GD credit.
    pub fn total_value_without_gd(&self) -> Decimal {
        self.electricity_value + self.scee_value + self.public_lighting_value
    }

    /// Savings from distributed generation (positive).
    pub fn gd_savings(&self) -> Decimal {
        self.compensated_energy_value.abs()
    }
}

impl From<InvoiceRecord> for PartialInvoice {
    fn from(record: InvoiceRecord) -> Self {
        Self {
            client_number: Some(record.client_number),
            reference_month: Some(record.reference_month),
            electricity_quantity: Some(record.electricity_quantity),
            electricity_value: Some(record.electricity_value),
            scee_quantity: Some(record.scee_quantity),
            scee_value: Some(record.scee_value),
            compensated_energy_quantity: Some(record.compensated_energy_quantity),
            compensated_energy_value: Some(record.compensated_energy_value),
            public_lighting_value: Some(record.public_lighting_value),
        }
    }
}

/// How a field value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Regex,
}

/// Confidence annotation for one extracted field.
///
/// The score is always 1.0 for regex matches; the field is kept so the
/// output shape stays stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfidence {
    pub field: String,
    pub value: String,
    pub confidence: f32,
    pub method: ExtractionMethod,
}

impl ExtractionConfidence {
    pub fn regex(field: InvoiceField, value: &ExtractedValue) -> Self {
        Self {
            field: field.name().to_string(),
            value: value.to_string(),
            confidence: 1.0,
            method: ExtractionMethod::Regex,
        }
    }
}

/// Reference months are written as `YYYY-MM-DD`; full ISO-8601 timestamps
/// (as produced by other services) are accepted on read and truncated to the day.
mod iso_month {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date: {}", raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}

mod iso_month_option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::iso_month::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::iso_month::parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date: {}", raw))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> InvoiceRecord {
        InvoiceRecord {
            client_number: "7204076116".to_string(),
            reference_month: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            electricity_quantity: 50,
            electricity_value: Decimal::new(4775, 2),
            scee_quantity: 456,
            scee_value: Decimal::new(23542, 2),
            compensated_energy_quantity: 456,
            compensated_energy_value: Decimal::new(-22542, 2),
            public_lighting_value: Decimal::new(4943, 2),
        }
    }

    #[test]
    fn test_try_from_partial() {
        let complete = PartialInvoice::from(sample_record());
        assert_eq!(InvoiceRecord::try_from(&complete), Ok(sample_record()));

        let mut partial = complete.clone();
        partial.scee_value = None;
        partial.public_lighting_value = None;
        let errors = InvoiceRecord::try_from(&partial).unwrap_err();
        let codes: Vec<String> = errors.iter().map(|e| e.code.to_string()).collect();
        assert_eq!(codes, vec!["INVALID_SCEE_VALUE", "INVALID_PUBLIC_LIGHTING_VALUE"]);
    }

    #[test]
    fn test_set_rejects_mismatched_kind() {
        let mut record = PartialInvoice::default();
        assert!(!record.set(InvoiceField::ElectricityQuantity, ExtractedValue::Text("50".into())));
        assert!(record.is_empty());

        assert!(record.set(InvoiceField::ElectricityQuantity, ExtractedValue::Integer(50)));
        assert_eq!(record.electricity_quantity, Some(50));
    }

    #[test]
    fn test_confidence_lists_present_fields_only() {
        let mut record = PartialInvoice::default();
        record.set(InvoiceField::ClientNumber, ExtractedValue::Text("7204076116".into()));
        record.set(InvoiceField::ElectricityValue, ExtractedValue::Amount(Decimal::new(4775, 2)));

        let confidence = record.confidence();
        assert_eq!(confidence.len(), 2);
        assert_eq!(confidence[0].field, "clientNumber");
        assert_eq!(confidence[1].value, "47.75");
        assert!(confidence.iter().all(|c| c.confidence == 1.0));
        assert!(confidence.iter().all(|c| c.method == ExtractionMethod::Regex));
    }

    #[test]
    fn test_partial_invoice_json_shape() {
        let partial = PartialInvoice::from(sample_record());
        let json = serde_json::to_value(&partial).unwrap();

        assert_eq!(json["clientNumber"], "7204076116");
        assert_eq!(json["referenceMonth"], "2024-01-01");
        assert_eq!(json["electricityQuantity"], 50);
        assert_eq!(json["compensatedEnergyValue"], -225.42);

        let back: PartialInvoice = serde_json::from_value(json).unwrap();
        assert_eq!(back, partial);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let mut partial = PartialInvoice::default();
        partial.scee_quantity = Some(456);
        let json = serde_json::to_string(&partial).unwrap();
        assert_eq!(json, r#"{"sceeQuantity":456}"#);
    }

    #[test]
    fn test_reference_month_accepts_timestamps() {
        let json = r#"{"referenceMonth":"2024-03-01T00:00:00.000Z"}"#;
        let partial: PartialInvoice = serde_json::from_str(json).unwrap();
        assert_eq!(partial.reference_month, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_record_derived_values() {
        let record = sample_record();
        assert_eq!(record.energy_consumption_kwh(), 506);
        assert_eq!(record.compensated_energy_kwh(), 456);
        assert_eq!(record.total_value_without_gd(), Decimal::new(33260, 2));
        assert_eq!(record.gd_savings(), Decimal::new(22542, 2));
    }

    #[test]
    fn test_to_record_requires_every_field() {
        let mut partial = PartialInvoice::from(sample_record());
        assert_eq!(partial.to_record(), Some(sample_record()));

        partial.scee_value = None;
        assert_eq!(partial.to_record(), None);
        assert_eq!(partial.missing_fields(), vec![InvoiceField::SceeValue]);
    }
}

//! CEMIG (Companhia Energética de Minas Gerais) bill layout.

use crate::models::invoice::InvoiceField;

use super::layout::{FieldParser, FieldRule, Layout};
use super::rules::patterns::*;

/// Layout for CEMIG residential bills with distributed generation (GD).
pub struct CemigLayout {
    rules: Vec<FieldRule>,
}

impl CemigLayout {
    pub const NAME: &'static str = "CEMIG";
    pub const VERSION: &'static str = "1.0.0";

    /// Client numbers on CEMIG bills are exactly ten digits.
    pub const CLIENT_NUMBER_DIGITS: usize = 10;

    pub fn new() -> Self {
        use FieldParser::*;
        use InvoiceField::*;

        // The compensated amount is printed as a deduction; it is always
        // stored negative regardless of the sign on the bill.
        let rules = vec![
            FieldRule::new(ClientNumber, &CLIENT_NUMBER_PATTERNS, Identity),
            FieldRule::new(ReferenceMonth, &REFERENCE_MONTH_PATTERNS, MonthYear),
            FieldRule::new(ElectricityQuantity, &ELECTRICITY_QUANTITY_PATTERNS, Integer),
            FieldRule::new(ElectricityValue, &ELECTRICITY_VALUE_PATTERNS, Decimal),
            FieldRule::new(SceeQuantity, &SCEE_QUANTITY_PATTERNS, Integer),
            FieldRule::new(SceeValue, &SCEE_VALUE_PATTERNS, Decimal),
            FieldRule::new(CompensatedEnergyQuantity, &COMPENSATED_QUANTITY_PATTERNS, Integer),
            FieldRule::new(CompensatedEnergyValue, &COMPENSATED_VALUE_PATTERNS, NegatedDecimal),
            FieldRule::new(PublicLightingValue, &PUBLIC_LIGHTING_PATTERNS, Decimal),
        ];

        Self { rules }
    }
}

impl Default for CemigLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for CemigLayout {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    fn client_number_digits(&self) -> usize {
        Self::CLIENT_NUMBER_DIGITS
    }
}

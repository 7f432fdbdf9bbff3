//! Layout abstraction: one bill format's field rules.

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::models::invoice::{ExtractedValue, InvoiceField, InvoiceRecord, PartialInvoice};

use super::rules::{
    FieldMatch, find_first_match_in, normalize_whitespace, parse_decimal, parse_month_year,
    parse_quantity,
};
use super::validator::{ValidationResult, validate_invoice};

/// How a matched capture becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldParser {
    /// Group 1 as-is (trimmed).
    Identity,
    /// Group 1 as an integer, thousands separators allowed.
    Integer,
    /// Group 1 as a Brazilian decimal.
    Decimal,
    /// Group 1 as a Brazilian decimal, forced negative.
    NegatedDecimal,
    /// Group 1 is a month token, group 2 the year.
    MonthYear,
}

impl FieldParser {
    pub fn parse(&self, found: &FieldMatch) -> Option<ExtractedValue> {
        let first = found.group(1)?;
        match self {
            FieldParser::Identity => Some(ExtractedValue::Text(first.trim().to_string())),
            FieldParser::Integer => parse_quantity(first).map(ExtractedValue::Integer),
            FieldParser::Decimal => Some(ExtractedValue::Amount(parse_decimal(first))),
            FieldParser::NegatedDecimal => {
                Some(ExtractedValue::Amount(-parse_decimal(first).abs()))
            }
            FieldParser::MonthYear => {
                parse_month_year(first, found.group(2)?).map(ExtractedValue::Month)
            }
        }
    }
}

/// Extraction rule for one field: its pattern chain and parser.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: InvoiceField,
    pub patterns: &'static [Regex],
    pub parser: FieldParser,
}

impl FieldRule {
    pub fn new(field: InvoiceField, patterns: &'static [Regex], parser: FieldParser) -> Self {
        Self {
            field,
            patterns,
            parser,
        }
    }
}

/// A bill format: named, versioned set of field rules.
///
/// Layouts are built once at startup and shared read-only between
/// concurrent extractions.
pub trait Layout: Send + Sync {
    /// Registry name (e.g. "CEMIG").
    fn name(&self) -> &str;

    /// Layout revision.
    fn version(&self) -> &str;

    /// Field rules in extraction order.
    fn rules(&self) -> &[FieldRule];

    /// Exact number of digits in a client number.
    fn client_number_digits(&self) -> usize;

    /// Pattern chain for a field, if the layout extracts it.
    fn patterns(&self, field: InvoiceField) -> Option<&[Regex]> {
        self.rules()
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.patterns)
    }

    /// Run every field rule over the bill text.
    ///
    /// Fields are independent: a field whose chain finds nothing, or whose
    /// capture does not parse, is simply left out of the record.
    fn extract(&self, text: &str) -> PartialInvoice {
        let normalized = normalize_whitespace(text);
        let mut record = PartialInvoice::default();

        for rule in self.rules() {
            let Some(found) = find_first_match_in(&normalized, text, rule.patterns) else {
                trace!("{}: no pattern matched {}", self.name(), rule.field);
                continue;
            };

            let Some(value) = rule.parser.parse(&found) else {
                debug!(
                    "{}: pattern {} matched {} but the capture did not parse: {:?}",
                    self.name(),
                    found.pattern_index,
                    rule.field,
                    found.groups
                );
                continue;
            };

            debug!(
                "{}: {} = {} (pattern {}, {:?} text)",
                self.name(),
                rule.field,
                value,
                found.pattern_index,
                found.pass
            );

            if !record.set(rule.field, value) {
                warn!("{}: parser produced the wrong kind of value for {}", self.name(), rule.field);
            }
        }

        record
    }

    /// Check an extracted record; all fields must pass or the whole record is rejected.
    fn validate(&self, record: &PartialInvoice) -> ValidationResult<InvoiceRecord> {
        validate_invoice(record, self.client_number_digits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::invoice::rules::TextPass;

    fn matched(groups: &[&str]) -> FieldMatch {
        FieldMatch {
            groups: groups.iter().map(|g| Some(g.to_string())).collect(),
            pattern_index: 0,
            pass: TextPass::Normalized,
        }
    }

    #[test]
    fn test_parsers() {
        assert_eq!(
            FieldParser::Identity.parse(&matched(&[" 7204076116 "])),
            Some(ExtractedValue::Text("7204076116".into()))
        );
        assert_eq!(
            FieldParser::Integer.parse(&matched(&["1.456"])),
            Some(ExtractedValue::Integer(1456))
        );
        assert_eq!(
            FieldParser::Decimal.parse(&matched(&["47,75"])),
            Some(ExtractedValue::Amount(Decimal::new(4775, 2)))
        );
        assert_eq!(
            FieldParser::MonthYear.parse(&matched(&["FEV", "2024"])),
            Some(ExtractedValue::Month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()))
        );
    }

    #[test]
    fn test_negated_decimal_is_always_negative() {
        let expected = Some(ExtractedValue::Amount(Decimal::new(-22542, 2)));
        assert_eq!(FieldParser::NegatedDecimal.parse(&matched(&["225,42"])), expected);
        assert_eq!(FieldParser::NegatedDecimal.parse(&matched(&["-225,42"])), expected);
    }

    #[test]
    fn test_month_year_needs_both_groups() {
        assert_eq!(FieldParser::MonthYear.parse(&matched(&["JAN"])), None);
        assert_eq!(FieldParser::MonthYear.parse(&matched(&["XYZ", "2024"])), None);
    }

    #[test]
    fn test_integer_parse_failure() {
        assert_eq!(FieldParser::Integer.parse(&matched(&["12x"])), None);
    }
}

//! Dashboard aggregations over finalized invoice records.
//!
//! Energy figures are in kWh, money in R$.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::invoice::InvoiceRecord;

/// Selects the records that take part in a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    pub client_number: Option<String>,
    /// First month included.
    pub from: Option<NaiveDate>,
    /// Last month included.
    pub to: Option<NaiveDate>,
}

impl DashboardFilter {
    pub fn matches(&self, record: &InvoiceRecord) -> bool {
        if let Some(client) = &self.client_number {
            if &record.client_number != client {
                return false;
            }
        }
        if let Some(from) = self.from {
            if record.reference_month < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.reference_month > to {
                return false;
            }
        }
        true
    }
}

/// Energy and money totals for one reference month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// First day of the month, YYYY-MM-DD.
    pub month: String,
    pub energy_consumption_kwh: i64,
    pub compensated_energy_kwh: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value_without_gd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gd_savings: Decimal,
    pub invoices: usize,
}

impl MonthlyPoint {
    fn new(month: NaiveDate) -> Self {
        Self {
            month: month.format("%Y-%m-%d").to_string(),
            energy_consumption_kwh: 0,
            compensated_energy_kwh: 0,
            total_value_without_gd: Decimal::ZERO,
            gd_savings: Decimal::ZERO,
            invoices: 0,
        }
    }

    fn add(&mut self, record: &InvoiceRecord) {
        self.energy_consumption_kwh += record.energy_consumption_kwh();
        self.compensated_energy_kwh += record.compensated_energy_kwh();
        self.total_value_without_gd += record.total_value_without_gd();
        self.gd_savings += record.gd_savings();
        self.invoices += 1;
    }
}

/// Totals plus a chronological monthly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub invoices: usize,
    pub energy_consumption_kwh: i64,
    pub compensated_energy_kwh: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value_without_gd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gd_savings: Decimal,
    pub monthly: Vec<MonthlyPoint>,
}

/// Aggregate the records accepted by `filter`.
pub fn summarize<'a, I>(records: I, filter: &DashboardFilter) -> DashboardSummary
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut months: BTreeMap<NaiveDate, MonthlyPoint> = BTreeMap::new();

    for record in records.into_iter().filter(|r| filter.matches(r)) {
        months
            .entry(record.reference_month)
            .or_insert_with(|| MonthlyPoint::new(record.reference_month))
            .add(record);
    }

    let monthly: Vec<MonthlyPoint> = months.into_values().collect();

    DashboardSummary {
        invoices: monthly.iter().map(|p| p.invoices).sum(),
        energy_consumption_kwh: monthly.iter().map(|p| p.energy_consumption_kwh).sum(),
        compensated_energy_kwh: monthly.iter().map(|p| p.compensated_energy_kwh).sum(),
        total_value_without_gd: monthly.iter().map(|p| p.total_value_without_gd).sum(),
        gd_savings: monthly.iter().map(|p| p.gd_savings).sum(),
        monthly,
    }
}

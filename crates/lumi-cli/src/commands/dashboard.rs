//! Dashboard command - aggregate extracted bills.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use glob::glob;
use serde_json::Value;
use tracing::{debug, warn};

use lumi_core::dashboard::{DashboardFilter, DashboardSummary, summarize};
use lumi_core::invoice::RecordValidator;
use lumi_core::invoice::rules::format_brl;
use lumi_core::models::invoice::InvoiceRecord;

/// Arguments for the dashboard command.
#[derive(Args)]
pub struct DashboardArgs {
    /// JSON files written by `extract` or `batch` (glob pattern)
    #[arg(required = true)]
    input: String,

    /// Only include this client number
    #[arg(long)]
    client: Option<String>,

    /// First month included (YYYY-MM)
    #[arg(long)]
    from: Option<String>,

    /// Last month included (YYYY-MM)
    #[arg(long)]
    to: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: DashboardFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum DashboardFormat {
    /// JSON output
    Json,
    /// Plain text table
    Text,
}

pub fn run(args: DashboardArgs) -> anyhow::Result<()> {
    let filter = DashboardFilter {
        client_number: args.client.clone(),
        from: args.from.as_deref().map(parse_month).transpose()?,
        to: args.to.as_deref().map(parse_month).transpose()?,
    };

    let files: Vec<PathBuf> = glob(&args.input)?.filter_map(|r| r.ok()).collect();
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let validator = RecordValidator::for_invoices();
    let mut records = Vec::with_capacity(files.len());

    for path in &files {
        match load_record(path, &validator) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    debug!("Loaded {} of {} records", records.len(), files.len());

    let summary = summarize(&records, &filter);

    match args.format {
        DashboardFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        DashboardFormat::Text => print!("{}", format_text(&summary)),
    }

    Ok(())
}

/// Parse `YYYY-MM` into the first day of that month.
fn parse_month(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid month '{}', expected YYYY-MM", value))
}

/// Read a finalized record, either bare or wrapped in an extraction result's `data`.
fn load_record(path: &Path, validator: &RecordValidator) -> anyhow::Result<InvoiceRecord> {
    let content = fs::read_to_string(path)?;
    let mut value: Value = serde_json::from_str(&content)?;

    if let Some(data) = value.get_mut("data") {
        value = data.take();
    }

    let Some(object) = value.as_object() else {
        anyhow::bail!("expected a JSON object");
    };

    let validation = validator.validate(object);
    if !validation.is_valid {
        anyhow::bail!("incomplete record, failed fields: {:?}", validation.failed_fields());
    }

    Ok(serde_json::from_value(value)?)
}

fn format_text(summary: &DashboardSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10}  {:>8}  {:>16}  {:>18}  {:>18}  {:>14}\n",
        "Month", "Bills", "Consumption kWh", "Compensated kWh", "Total without GD", "GD savings"
    ));

    for point in &summary.monthly {
        output.push_str(&format!(
            "{:<10}  {:>8}  {:>16}  {:>18}  {:>18}  {:>14}\n",
            point.month.get(..7).unwrap_or(point.month.as_str()),
            point.invoices,
            point.energy_consumption_kwh,
            point.compensated_energy_kwh,
            format_brl(point.total_value_without_gd),
            format_brl(point.gd_savings)
        ));
    }

    output.push_str(&format!(
        "{:<10}  {:>8}  {:>16}  {:>18}  {:>18}  {:>14}\n",
        "Total",
        summary.invoices,
        summary.energy_consumption_kwh,
        summary.compensated_energy_kwh,
        format_brl(summary.total_value_without_gd),
        format_brl(summary.gd_savings)
    ));

    output
}

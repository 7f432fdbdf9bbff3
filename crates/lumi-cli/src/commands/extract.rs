//! Extract command - pull billing data from a single bill.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use lumi_core::error::ExtractionError;
use lumi_core::invoice::rules::{format_brl, format_reference_month};
use lumi_core::invoice::{ExtractOptions, ExtractionPipeline, ExtractionResult};
use lumi_core::models::config::LumiConfig;
use lumi_core::models::invoice::{InvoiceField, PartialInvoice};

use super::{OutputFormat, build_pipeline, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input bill (PDF, or text already extracted from one)
    #[arg(required = true)]
    input: PathBuf,

    /// Bill layout (default: from config)
    #[arg(short, long)]
    layout: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Bypass the extraction cache
    #[arg(long)]
    no_cache: bool,

    /// Return incomplete records instead of failing validation
    #[arg(long)]
    no_validate: bool,

    /// Show per-field confidence and metadata
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let pipeline = build_pipeline(&config)?;
    let layout = args
        .layout
        .clone()
        .unwrap_or_else(|| config.extraction.default_layout.clone());
    let options = options_for(&config, args.no_cache, args.no_validate);

    info!("Extracting {} with layout {}", args.input.display(), layout);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Extracting bill data...");

    let outcome = extract_file(&pipeline, &args.input, &layout, options).await;
    pb.finish_and_clear();

    let result = match outcome? {
        Ok(result) => result,
        Err(e) => return Err(report_failure(e)),
    };

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        for entry in &result.confidence {
            println!(
                "{} {}: {} ({:.1}%, {:?})",
                style("ℹ").blue(),
                entry.field,
                entry.value,
                entry.confidence * 100.0,
                entry.method
            );
        }
        println!(
            "{} {} pages, layout {}, {}ms{}",
            style("ℹ").blue(),
            result.metadata.num_pages,
            result.metadata.layout,
            result.metadata.processing_time_ms,
            if result.metadata.from_cache { " (cached)" } else { "" }
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Config defaults narrowed by the command-line switches.
pub(crate) fn options_for(config: &LumiConfig, no_cache: bool, no_validate: bool) -> ExtractOptions {
    ExtractOptions {
        use_cache: config.extraction.use_cache && !no_cache,
        validate_result: config.extraction.validate_result && !no_validate,
    }
}

/// Run the pipeline on a `.pdf` file, or on a `.txt` file holding converted text.
pub(crate) async fn extract_file(
    pipeline: &ExtractionPipeline,
    path: &Path,
    layout: &str,
    options: ExtractOptions,
) -> anyhow::Result<Result<ExtractionResult, ExtractionError>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            Ok(pipeline.extract_data(&data, layout, options).await)
        }
        "txt" => {
            let text = fs::read_to_string(path)?;
            Ok(pipeline.extract_from_text(&text, layout, options.validate_result))
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Print the structured error to stderr and turn it into the command's error.
fn report_failure(err: ExtractionError) -> anyhow::Error {
    if let Ok(json) = serde_json::to_string_pretty(&err) {
        eprintln!("{}", json);
    }
    anyhow::anyhow!("Extraction failed: {}", err)
}

pub(crate) fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(&result.data),
        OutputFormat::Text => Ok(format_text(&result.data)),
    }
}

fn format_csv(data: &PartialInvoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(InvoiceField::ALL.iter().map(|f| f.name()))?;
    wtr.write_record(
        InvoiceField::ALL
            .iter()
            .map(|f| data.get(*f).map(|v| v.to_string()).unwrap_or_default()),
    )?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(data: &PartialInvoice) -> String {
    let mut output = String::new();
    let missing = "-".to_string();

    output.push_str(&format!(
        "Client: {}\n",
        data.client_number.as_ref().unwrap_or(&missing)
    ));
    output.push_str(&format!(
        "Reference month: {}\n",
        data.reference_month
            .map(format_reference_month)
            .unwrap_or_else(|| missing.clone())
    ));
    output.push('\n');

    let kwh = |q: Option<i64>| q.map(|q| format!("{} kWh", q)).unwrap_or_else(|| missing.clone());
    let brl = |v: Option<rust_decimal::Decimal>| v.map(format_brl).unwrap_or_else(|| missing.clone());

    output.push_str(&format!(
        "Energia Elétrica:     {:>10}  {:>14}\n",
        kwh(data.electricity_quantity),
        brl(data.electricity_value)
    ));
    output.push_str(&format!(
        "Energia SCEE:         {:>10}  {:>14}\n",
        kwh(data.scee_quantity),
        brl(data.scee_value)
    ));
    output.push_str(&format!(
        "Energia compensada:   {:>10}  {:>14}\n",
        kwh(data.compensated_energy_quantity),
        brl(data.compensated_energy_value)
    ));
    output.push_str(&format!(
        "Iluminação pública:   {:>10}  {:>14}\n",
        "",
        brl(data.public_lighting_value)
    ));

    if let Some(record) = data.to_record() {
        output.push('\n');
        output.push_str(&format!(
            "Consumption: {} kWh, compensated: {} kWh\n",
            record.energy_consumption_kwh(),
            record.compensated_energy_kwh()
        ));
        output.push_str(&format!(
            "Total without GD: {}, GD savings: {}\n",
            format_brl(record.total_value_without_gd()),
            format_brl(record.gd_savings())
        ));
    }

    output
}

//! Layouts command - list the bill layouts the extractor knows.

use clap::Args;
use console::style;
use serde::Serialize;

use lumi_core::invoice::LayoutRegistry;

/// Arguments for the layouts command.
#[derive(Args)]
pub struct LayoutsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct LayoutInfo<'a> {
    name: &'a str,
    version: &'a str,
    client_number_digits: usize,
    fields: Vec<FieldInfo>,
}

#[derive(Serialize)]
struct FieldInfo {
    name: &'static str,
    patterns: usize,
}

pub fn run(args: LayoutsArgs) -> anyhow::Result<()> {
    let registry = LayoutRegistry::with_defaults();

    let layouts: Vec<_> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .collect();

    let infos: Vec<LayoutInfo> = layouts
        .iter()
        .map(|layout| LayoutInfo {
            name: layout.name(),
            version: layout.version(),
            client_number_digits: layout.client_number_digits(),
            fields: layout
                .rules()
                .iter()
                .map(|rule| FieldInfo {
                    name: rule.field.name(),
                    patterns: rule.patterns.len(),
                })
                .collect(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        println!(
            "{} {} (v{}, {}-digit client number)",
            style("●").green(),
            style(info.name).bold(),
            info.version,
            info.client_number_digits
        );
        for (i, field) in info.fields.iter().enumerate() {
            println!("   {}. {} ({} patterns)", i + 1, field.name, field.patterns);
        }
    }

    Ok(())
}

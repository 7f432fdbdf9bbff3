//! CLI application for CEMIG electricity bill extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, dashboard, extract, layouts};

/// Lumi - Extract billing data from CEMIG electricity bills
#[derive(Parser)]
#[command(name = "lumi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract billing data from a single bill
    Extract(extract::ExtractArgs),

    /// Extract billing data from many bills
    Batch(batch::BatchArgs),

    /// Aggregate extracted bills into dashboard totals
    Dashboard(dashboard::DashboardArgs),

    /// List the registered bill layouts
    Layouts(layouts::LayoutsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so stdout stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Dashboard(args) => dashboard::run(args),
        Commands::Layouts(args) => layouts::run(args),
        Commands::Config(args) => config::run(args, config_path),
    }
}

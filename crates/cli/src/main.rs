//! Command-line front end for receipt parsing and OCR exports.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{export_lines, parse, scan};

/// Turn recognized receipt text into structured records
#[derive(Parser)]
#[command(name = "receipto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a recognized-text file into a receipt record
    Parse(parse::ParseArgs),

    /// Recognize a receipt image, then parse it
    Scan(scan::ScanArgs),

    /// Convert OCR line exports into a CSV for manual labeling
    ExportLines(export_lines::ExportLinesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse(args) => parse::run(args),
        Commands::Scan(args) => scan::run(args).await,
        Commands::ExportLines(args) => export_lines::run(args),
    }
}

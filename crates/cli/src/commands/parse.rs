//! Parse command - turn a recognized-text file into a receipt record.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use receipto_ocr::ReceiptParser;

use super::ParseReport;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file to parse, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let text = read_input(&args.input)?;
    info!("Parsing {} characters from {}", text.chars().count(), args.input.display());

    let report = ParseReport::new(ReceiptParser::parse(&text));
    println!("{}", report.to_json()?);
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

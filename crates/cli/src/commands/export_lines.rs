//! Export-lines command - turn OCR line dumps into a CSV ready for labeling.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use clap::Args;
use regex::Regex;
use tracing::{debug, info};

const HEADER: [&str; 4] = ["line_text", "label", "receipt_source", "notes"];

/// Arguments for the export-lines command.
#[derive(Args)]
pub struct ExportLinesArgs {
    /// A text export file, or a folder containing export files
    #[arg(long, required = true)]
    input: PathBuf,

    /// Output CSV path
    #[arg(long, required = true)]
    output: PathBuf,

    /// Which files to include when the input is a folder
    #[arg(long, default_value = "*.txt")]
    glob: String,

    /// Use this receipt_source value for every line
    #[arg(long)]
    receipt_source: Option<String>,

    /// Prefix for generated receipt_source values
    #[arg(long, default_value = "receipt_")]
    receipt_prefix: String,

    /// Skip empty and whitespace-only lines
    #[arg(long)]
    skip_empty: bool,
}

pub fn run(args: ExportLinesArgs) -> anyhow::Result<()> {
    let rows = export(&args)?;
    info!("Exported {rows} lines");
    println!("Wrote {rows} lines to {}", args.output.display());
    Ok(())
}

/// Write the labeling CSV and return the number of rows written.
fn export(args: &ExportLinesArgs) -> anyhow::Result<usize> {
    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    let files = input_files(&args.input, &args.glob)?;
    if files.is_empty() {
        anyhow::bail!("No input files found in {} (glob={})", args.input.display(), args.glob);
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    wtr.write_record(HEADER)?;

    let mut rows = 0;
    for (index, path) in files.iter().enumerate() {
        let source = receipt_source_for(
            path,
            args.receipt_source.as_deref(),
            &args.receipt_prefix,
            index + 1,
        );
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        debug!(file = %path.display(), %source, "exporting lines");

        for raw_line in text.lines() {
            let line = raw_line.trim_matches('\u{feff}');
            if args.skip_empty && line.trim().is_empty() {
                continue;
            }
            wtr.write_record([line, "", source.as_str(), ""])?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

/// A single file, or the sorted regular files in a folder matching `pattern`.
fn input_files(input: &Path, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let dir = input
        .to_str()
        .with_context(|| format!("Input path is not valid UTF-8: {}", input.display()))?;
    let full_pattern = format!("{}/{pattern}", glob::Pattern::escape(dir));

    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn receipt_number() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)receipt[_-]?(\d+)").expect("invalid regex"))
}

/// Forced value, else `<prefix><NNN>` from a `receipt_<n>` file stem, else
/// `<prefix><index>` zero-padded to three digits.
fn receipt_source_for(path: &Path, forced: Option<&str>, prefix: &str, index: usize) -> String {
    if let Some(forced) = forced.filter(|f| !f.is_empty()) {
        return forced.to_string();
    }

    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let number = receipt_number()
        .captures(&stem)
        .and_then(|caps| caps[1].parse::<u64>().ok());

    match number {
        Some(n) => format!("{prefix}{n:03}"),
        None => format!("{prefix}{index:03}"),
    }
}

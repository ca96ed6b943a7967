//! Scan command - recognize a receipt image, then parse the winning text.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use receipto_ocr::{OcrConfig, OcrOutcome, ReceiptParser, ReceiptPipeline};

use super::ParseReport;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt image (PNG, JPEG, ...)
    #[arg(required = true)]
    input: PathBuf,

    /// Path to an OCR config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Include per-line recognition output
    #[arg(long)]
    show_lines: bool,
}

#[derive(Serialize)]
struct ScanReport {
    line_count: usize,
    average_confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<String>>,
    receipt: ParseReport,
}

pub async fn run(args: ScanArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => OcrConfig::load(path)?,
        None => OcrConfig::default(),
    };

    info!("Scanning {}", args.input.display());

    let pipeline = ReceiptPipeline::new(engine(&config)).with_config(config);
    let page = match pipeline.process_file(&args.input).await {
        OcrOutcome::Success(page) => page,
        OcrOutcome::Error { message } => anyhow::bail!("{}: {message}", args.input.display()),
    };

    let report = ScanReport {
        line_count: page.text.line_count(),
        average_confidence: page.text.average_confidence(),
        lines: args
            .show_lines
            .then(|| page.text.lines.iter().map(|l| l.text.clone()).collect()),
        receipt: ParseReport::new(ReceiptParser::parse(&page.text.full_text)),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(feature = "tesseract")]
fn engine(config: &OcrConfig) -> receipto_ocr::recognizer::tesseract_backend::TesseractRecognizer {
    receipto_ocr::recognizer::tesseract_backend::TesseractRecognizer::from_config(&config.tesseract)
}

#[cfg(not(feature = "tesseract"))]
fn engine(_config: &OcrConfig) -> unavailable::Unavailable {
    unavailable::Unavailable
}

#[cfg(not(feature = "tesseract"))]
mod unavailable {
    use image::DynamicImage;
    use receipto_ocr::{OcrBackend, OcrError, VisionText};

    /// Stands in for the recognition engine when built without one.
    pub struct Unavailable;

    impl OcrBackend for Unavailable {
        fn recognize(&self, _image: &DynamicImage) -> Result<VisionText, OcrError> {
            Err(OcrError::NotAvailable)
        }
    }
}

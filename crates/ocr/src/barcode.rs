//! Barcode scanning boundary. Independent of receipt parsing; the application
//! calls it alongside the text pipeline.

use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::recognizer::OcrError;
use crate::types::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeFormat {
    QrCode,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code128,
    Code39,
    Code93,
    Itf,
    Codabar,
    Pdf417,
    Aztec,
    DataMatrix,
    Unknown,
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BarcodeFormat::QrCode => "QR Code",
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::UpcE => "UPC-E",
            BarcodeFormat::Code128 => "Code 128",
            BarcodeFormat::Code39 => "Code 39",
            BarcodeFormat::Code93 => "Code 93",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::Codabar => "Codabar",
            BarcodeFormat::Pdf417 => "PDF417",
            BarcodeFormat::Aztec => "Aztec",
            BarcodeFormat::DataMatrix => "Data Matrix",
            BarcodeFormat::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeValueType {
    Text,
    Url,
    Email,
    Phone,
    Sms,
    Wifi,
    Product,
    Isbn,
    Unknown,
}

impl fmt::Display for BarcodeValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BarcodeValueType::Text => "Text",
            BarcodeValueType::Url => "URL",
            BarcodeValueType::Email => "Email",
            BarcodeValueType::Phone => "Phone",
            BarcodeValueType::Sms => "SMS",
            BarcodeValueType::Wifi => "WiFi",
            BarcodeValueType::Product => "Product",
            BarcodeValueType::Isbn => "ISBN",
            BarcodeValueType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBarcode {
    pub raw_value: String,
    pub display_value: String,
    pub format: BarcodeFormat,
    pub value_type: BarcodeValueType,
    pub bounding_box: Option<BoundingBox>,
}

/// A barcode decoding service.
pub trait BarcodeBackend: Send + Sync {
    fn scan(&self, image: &DynamicImage) -> Result<Vec<DetectedBarcode>, OcrError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BarcodeScanResult {
    Success { barcodes: Vec<DetectedBarcode> },
    NoBarcodes,
    Error { message: String },
}

pub struct BarcodeScanner<B: BarcodeBackend> {
    backend: B,
}

impl<B: BarcodeBackend> BarcodeScanner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Never fails: backend errors are reported as `BarcodeScanResult::Error`.
    pub fn scan_image(&self, image: &DynamicImage) -> BarcodeScanResult {
        match self.backend.scan(image) {
            Ok(barcodes) if barcodes.is_empty() => BarcodeScanResult::NoBarcodes,
            Ok(barcodes) => BarcodeScanResult::Success { barcodes },
            Err(e) => {
                warn!("Barcode scan failed: {e}");
                BarcodeScanResult::Error { message: format!("Barcode scan failed: {e}") }
            }
        }
    }
}

pub mod barcode;
pub mod config;
pub mod extract;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod rules;
pub mod types;

pub use barcode::{BarcodeBackend, BarcodeScanResult, BarcodeScanner, DetectedBarcode};
pub use config::{ConfigError, OcrConfig, TesseractConfig};
pub use extract::ReceiptParser;
pub use layout::{LayoutAnalyzer, NoLayout};
pub use pipeline::{select_richer, Pass, ReceiptPipeline};
pub use preprocess::{ContrastStretch, ImageEnhancer, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::{
    BoundingBox, ClassifiedRegion, DetectedRegion, OcrOutcome, OcrPage, RecognizedText, RegionType,
    VisionText,
};

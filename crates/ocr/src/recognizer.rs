use image::DynamicImage;
use thiserror::Error;

use crate::types::VisionText;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available; build with the `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over a text recognition service.
/// Implementations must not alter the image; the orchestrator runs them twice
/// per document, possibly at the same time.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<VisionText, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Reads every image as the same fixed text, so the pipeline and parser can be
/// exercised without Tesseract installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<VisionText, OcrError> {
        Ok(VisionText::from_plain_text(&self.text, None))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use crate::config::TesseractConfig;
    use crate::preprocess::encode_as_png;
    use crate::types::VisionText;
    use image::DynamicImage;
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        pub fn from_config(config: &TesseractConfig) -> Self {
            Self::new(config.data_path.clone(), &config.language)
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<VisionText, OcrError> {
            let png = encode_as_png(image).map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            // Tesseract reports a page-level mean in 0..=100.
            let confidence = (lt.mean_text_conf() as f32 / 100.0).clamp(0.0, 1.0);
            Ok(VisionText::from_plain_text(&text, Some(confidence)))
        }
    }
}

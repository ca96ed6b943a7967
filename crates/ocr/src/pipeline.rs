use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use tokio::task::{self, JoinError};
use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::layout::{self, LayoutAnalyzer, NoLayout};
use crate::preprocess::{self, ContrastStretch, ImageEnhancer};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{ClassifiedRegion, OcrOutcome, OcrPage, RecognizedText, VisionText};

/// Which recognition pass produced the text that was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Original,
    Enhanced,
}

/// Orchestrates: recognize original → enhance → recognize enhanced + detect
/// regions → keep the richer text.
///
/// Holds no per-call state; `process` may run concurrently on a shared pipeline.
pub struct ReceiptPipeline<R: OcrBackend + 'static> {
    recognizer: Arc<R>,
    enhancer: Arc<dyn ImageEnhancer>,
    layout: Arc<dyn LayoutAnalyzer>,
    config: OcrConfig,
}

impl<R: OcrBackend + 'static> ReceiptPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
            enhancer: Arc::new(ContrastStretch),
            layout: Arc::new(NoLayout),
            config: OcrConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OcrConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_enhancer(mut self, enhancer: impl ImageEnhancer + 'static) -> Self {
        self.enhancer = Arc::new(enhancer);
        self
    }

    pub fn with_layout(mut self, layout: impl LayoutAnalyzer + 'static) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> OcrOutcome {
        match tokio::fs::read(path).await {
            Ok(bytes) => self.process_bytes(&bytes).await,
            Err(e) => {
                warn!(path = %path.display(), "Failed to read image: {e}");
                OcrOutcome::error("Failed to load image")
            }
        }
    }

    /// Process encoded image bytes (JPEG / PNG / …).
    pub async fn process_bytes(&self, data: &[u8]) -> OcrOutcome {
        let image = match preprocess::load_from_bytes(data) {
            Ok(img) => img,
            Err(e) => {
                warn!("{e}");
                return OcrOutcome::error("Failed to load image");
            }
        };
        let image = preprocess::fit_within(image, self.config.max_dimension);
        self.process(image).await
    }

    /// Run both recognition passes and region detection, then keep the pass
    /// with more text. Never fails past this boundary: every error becomes
    /// `OcrOutcome::Error` or an empty region list.
    pub async fn process(&self, image: DynamicImage) -> OcrOutcome {
        let original = Arc::new(image);

        let first_pass = self.spawn_recognition(Arc::clone(&original));
        let enhanced = self.enhance(Arc::clone(&original)).await;
        let second_pass = self.spawn_recognition(Arc::clone(&enhanced));
        let regions = self.detect_regions(enhanced);

        let (first_pass, second_pass, regions) = tokio::join!(first_pass, second_pass, regions);

        let original_text = match flatten(first_pass) {
            Ok(text) => text,
            Err(message) => return OcrOutcome::error(format!("OCR failed: {message}")),
        };
        let enhanced_text = match flatten(second_pass) {
            Ok(text) => text,
            Err(message) => return OcrOutcome::error(format!("OCR failed: {message}")),
        };

        debug!(
            original_chars = original_text.char_len(),
            enhanced_chars = enhanced_text.char_len(),
            "recognition passes finished"
        );

        let (pass, winner) = select_richer(original_text, enhanced_text);
        debug!(?pass, regions = regions.len(), "selected recognition pass");

        if winner.full_text.is_empty() {
            return OcrOutcome::error("No text detected in image");
        }

        OcrOutcome::Success(OcrPage { text: RecognizedText::from_vision(&winner), regions })
    }

    // ── Stages ────────────────────────────────────────────────────────────────

    fn spawn_recognition(
        &self,
        image: Arc<DynamicImage>,
    ) -> task::JoinHandle<Result<VisionText, OcrError>> {
        let recognizer = Arc::clone(&self.recognizer);
        task::spawn_blocking(move || recognizer.recognize(&image))
    }

    /// Falls back to the original image when enhancement is disabled or fails.
    async fn enhance(&self, original: Arc<DynamicImage>) -> Arc<DynamicImage> {
        if !self.config.enhance {
            return original;
        }

        let enhancer = Arc::clone(&self.enhancer);
        let source = Arc::clone(&original);
        match task::spawn_blocking(move || enhancer.enhance(&source)).await {
            Ok(Ok(enhanced)) => Arc::new(enhanced),
            Ok(Err(e)) => {
                warn!("Image enhancement failed, using original: {e}");
                original
            }
            Err(e) => {
                warn!("Image enhancement task failed, using original: {e}");
                original
            }
        }
    }

    async fn detect_regions(&self, image: Arc<DynamicImage>) -> Vec<ClassifiedRegion> {
        if !self.config.detect_regions {
            return Vec::new();
        }

        let analyzer = Arc::clone(&self.layout);
        match task::spawn_blocking(move || layout::analyze(analyzer.as_ref(), &image)).await {
            Ok(Ok(regions)) => regions,
            Ok(Err(e)) => {
                warn!("Region detection failed: {e}");
                Vec::new()
            }
            Err(e) => {
                warn!("Region detection task failed: {e}");
                Vec::new()
            }
        }
    }
}

/// Keep the reading with more characters. The comparison is strict, so equal
/// lengths keep the enhanced reading.
pub fn select_richer(original: VisionText, enhanced: VisionText) -> (Pass, VisionText) {
    if original.char_len() > enhanced.char_len() {
        (Pass::Original, original)
    } else {
        (Pass::Enhanced, enhanced)
    }
}

fn flatten(joined: Result<Result<VisionText, OcrError>, JoinError>) -> Result<VisionText, String> {
    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use image::DynamicImage;

use crate::recognizer::OcrError;
use crate::types::{ClassifiedRegion, DetectedRegion};

/// Layout analysis service: finds blocks on the page and labels them as
/// receipt sections. Either step may fail; the orchestrator then reports no
/// regions.
pub trait LayoutAnalyzer: Send + Sync {
    fn detect_regions(&self, image: &DynamicImage) -> Result<Vec<DetectedRegion>, OcrError>;

    fn classify(&self, regions: &[DetectedRegion]) -> Result<Vec<ClassifiedRegion>, OcrError>;
}

/// Used when no layout model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl LayoutAnalyzer for NoLayout {
    fn detect_regions(&self, _image: &DynamicImage) -> Result<Vec<DetectedRegion>, OcrError> {
        Ok(Vec::new())
    }

    fn classify(&self, _regions: &[DetectedRegion]) -> Result<Vec<ClassifiedRegion>, OcrError> {
        Ok(Vec::new())
    }
}

/// Run detection then classification, flattening both into one result.
pub fn analyze(
    layout: &dyn LayoutAnalyzer,
    image: &DynamicImage,
) -> Result<Vec<ClassifiedRegion>, OcrError> {
    let detected = layout.detect_regions(image)?;
    if detected.is_empty() {
        return Ok(Vec::new());
    }
    layout.classify(&detected)
}

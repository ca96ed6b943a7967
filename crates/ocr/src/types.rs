use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle reported by a vision service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

// ── Raw recognition output ───────────────────────────────────────────────────

/// What a recognition backend returns for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionText {
    pub full_text: String,
    pub blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<VisionLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionLine {
    pub text: String,
    pub confidence: Option<f32>,
    pub bounding_box: Option<BoundingBox>,
    /// Word-level tokens. Empty when the backend does not segment words.
    pub elements: Vec<String>,
}

impl VisionText {
    /// Build a result from plain text. Blank lines separate blocks, and every
    /// line gets the same confidence.
    pub fn from_plain_text(text: &str, confidence: Option<f32>) -> Self {
        let mut blocks = Vec::new();
        let mut current = TextBlock::default();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.lines.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.lines.push(VisionLine {
                text: line.to_string(),
                confidence,
                bounding_box: None,
                elements: line.split_whitespace().map(str::to_string).collect(),
            });
        }
        if !current.lines.is_empty() {
            blocks.push(current);
        }

        Self { full_text: text.to_string(), blocks }
    }

    /// Character count used to compare recognition passes.
    pub fn char_len(&self) -> usize {
        self.full_text.chars().count()
    }
}

// ── Flattened recognition result ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    pub text: String,
    /// Recognition confidence in `[0, 1]`; 0.0 when the backend gave none.
    pub confidence: f32,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub full_text: String,
    pub lines: Vec<LineResult>,
    pub words: Vec<String>,
    pub block_count: usize,
}

impl RecognizedText {
    pub fn from_vision(vision: &VisionText) -> Self {
        let mut lines = Vec::new();
        let mut words = Vec::new();

        for line in vision.blocks.iter().flat_map(|b| &b.lines) {
            lines.push(LineResult {
                text: line.text.clone(),
                confidence: line.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
                bounding_box: line.bounding_box,
            });
            if line.elements.is_empty() {
                words.extend(line.text.split_whitespace().map(str::to_string));
            } else {
                words.extend(line.elements.iter().cloned());
            }
        }

        Self {
            full_text: vision.full_text.clone(),
            lines,
            words,
            block_count: vision.blocks.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn average_confidence(&self) -> f32 {
        if self.lines.is_empty() {
            return 0.0;
        }
        self.lines.iter().map(|l| l.confidence).sum::<f32>() / self.lines.len() as f32
    }
}

// ── Layout regions ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    Header,
    Items,
    Totals,
    Footer,
    Unknown,
}

/// A block found by layout detection, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub bounds: BoundingBox,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRegion {
    pub region_type: RegionType,
    pub text: String,
    pub bounds: Option<BoundingBox>,
}

// ── Orchestrator result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    pub text: RecognizedText,
    pub regions: Vec<ClassifiedRegion>,
}

impl OcrPage {
    pub fn has_regions(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Text of every region of `region_type`, newline-joined.
    pub fn text_in_region(&self, region_type: RegionType) -> String {
        self.regions
            .iter()
            .filter(|r| r.region_type == region_type)
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OcrOutcome {
    Success(OcrPage),
    Error { message: String },
}

impl OcrOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        OcrOutcome::Error { message: message.into() }
    }

    pub fn page(&self) -> Option<&OcrPage> {
        match self {
            OcrOutcome::Success(page) => Some(page),
            OcrOutcome::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            OcrOutcome::Error { message } => Some(message),
            OcrOutcome::Success(_) => None,
        }
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the recognition pipeline. Every field has a default, so an
/// empty TOML document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Longest allowed image side in pixels; larger images are scaled down.
    pub max_dimension: u32,
    /// Run the enhancement step before the second recognition pass.
    pub enhance: bool,
    pub detect_regions: bool,
    pub tesseract: TesseractConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1920,
            enhance: true,
            detect_regions: true,
            tesseract: TesseractConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    pub data_path: Option<String>,
    pub language: String,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self { data_path: None, language: "eng".to_string() }
    }
}

impl OcrConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: OcrConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::Invalid("max_dimension must be greater than 0".into()));
        }
        if self.tesseract.language.trim().is_empty() {
            return Err(ConfigError::Invalid("tesseract.language cannot be empty".into()));
        }
        Ok(())
    }
}

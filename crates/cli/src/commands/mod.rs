pub mod export_lines;
pub mod parse;
pub mod scan;

use receipto_core::ParseOutcome;
use serde::Serialize;

/// JSON document printed by `parse` and `scan`.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    #[serde(flatten)]
    pub outcome: ParseOutcome,
    /// Failure message, present only for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_sum: Option<String>,
}

impl ParseReport {
    pub fn new(outcome: ParseOutcome) -> Self {
        let message = outcome.failure_reason().map(|r| r.to_string());
        let confidence = outcome.data().map_or(0.0, |d| d.confidence());
        let items_sum = outcome.data().map(|d| d.items_sum().to_string());
        Self { outcome, message, confidence, items_sum }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipto_core::ParseFailure;
    use receipto_ocr::ReceiptParser;

    #[test]
    fn failure_report_carries_message() {
        let report = ParseReport::new(ParseOutcome::failure(ParseFailure::EmptyText));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "empty_text");
        assert_eq!(json["message"], "Empty text provided");
        assert_eq!(json["confidence"], 0.0);
        assert!(json.get("items_sum").is_none());
    }

    #[test]
    fn success_report_has_confidence_and_sum() {
        let outcome = ReceiptParser::parse(
            "SuperMart\n123 Main St\n01/15/2025\nMilk 3.99\nBread 2.50\nTOTAL 6.49",
        );
        let json: serde_json::Value =
            serde_json::from_str(&ParseReport::new(outcome).to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["confidence"], 0.9);
        assert_eq!(json["items_sum"], "$6.49");
        assert!(json.get("message").is_none());
        assert_eq!(json["data"]["store_name"], "SuperMart");
    }
}

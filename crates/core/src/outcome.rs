use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::receipt::ReceiptData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailure {
    #[error("Empty text provided")]
    EmptyText,
    #[error("No readable lines found")]
    NoReadableLines,
    #[error("Insufficient data extracted")]
    InsufficientData,
}

/// Result of one parse call. Exactly one variant is produced; a failure never
/// carries a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    Success {
        data: ReceiptData,
    },
    PartialSuccess {
        data: ReceiptData,
        warnings: Vec<String>,
    },
    Failure {
        reason: ParseFailure,
    },
}

impl ParseOutcome {
    /// Classify an assembled record: invalid records fail, records with missing
    /// tracked fields are partial, everything else succeeds.
    pub fn classify(data: ReceiptData) -> Self {
        if !data.is_valid() {
            return ParseOutcome::Failure { reason: ParseFailure::InsufficientData };
        }

        let warnings: Vec<String> = data
            .missing_fields()
            .into_iter()
            .map(|field| field.warning().to_string())
            .collect();

        if warnings.is_empty() {
            ParseOutcome::Success { data }
        } else {
            ParseOutcome::PartialSuccess { data, warnings }
        }
    }

    pub fn failure(reason: ParseFailure) -> Self {
        ParseOutcome::Failure { reason }
    }

    pub fn data(&self) -> Option<&ReceiptData> {
        match self {
            ParseOutcome::Success { data } | ParseOutcome::PartialSuccess { data, .. } => Some(data),
            ParseOutcome::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<ReceiptData> {
        match self {
            ParseOutcome::Success { data } | ParseOutcome::PartialSuccess { data, .. } => Some(data),
            ParseOutcome::Failure { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ParseOutcome::PartialSuccess { warnings, .. } => warnings,
            _ => &[],
        }
    }

    pub fn failure_reason(&self) -> Option<ParseFailure> {
        match self {
            ParseOutcome::Failure { reason } => Some(*reason),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success { .. })
    }
}

use crate::models::{Utility, YearMonth};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fatal errors. Any of these aborts the run before charts are produced.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The range could not be fetched from its source.
    #[error("Failed to fetch range {range}: {message}")]
    Fetch { range: String, message: String },

    /// A data row does not have as many cells as the header row.
    #[error("Malformed row {row} in {table}: expected {expected} cells, found {found}")]
    MalformedRow {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A date cell does not match the configured date format.
    #[error("Invalid date '{value}' in row {row} (expected format {format})")]
    InvalidDate {
        row: usize,
        value: String,
        format: String,
    },

    /// A value cell is neither empty nor a number.
    #[error("Invalid number '{value}' in row {row}, column {column}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    /// A required column is not present in the header row.
    #[error("Column {column} not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Non-fatal conditions. The affected values degrade (missing, zero or
/// dropped) and the run continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// Fewer than two known readings; the series stays all-missing.
    InsufficientData { utility: Utility, known_points: usize },
    /// A consumption month without a tariff; dropped from the cost output.
    MissingTariffMonth { utility: Utility, month: YearMonth },
    /// Cumulative reading went down, most likely a meter reset.
    NegativeDelta {
        utility: Utility,
        date: NaiveDate,
        delta: f64,
    },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::InsufficientData {
                utility,
                known_points,
            } => write!(
                f,
                "{}: only {} known reading(s), cannot interpolate",
                utility, known_points
            ),
            PipelineWarning::MissingTariffMonth { utility, month } => {
                write!(f, "{}: no tariff for {}, month dropped from costs", utility, month)
            }
            PipelineWarning::NegativeDelta {
                utility,
                date,
                delta,
            } => write!(f, "{}: negative delta {:.3} on {}", utility, delta, date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_display() {
        let err = PipelineError::MalformedRow {
            table: "A1:D100".to_string(),
            row: 3,
            expected: 4,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Malformed row 3 in A1:D100: expected 4 cells, found 2"
        );
    }

    #[test]
    fn test_invalid_date_display() {
        let err = PipelineError::InvalidDate {
            row: 1,
            value: "2022-01-01".to_string(),
            format: "%d.%m.%Y".to_string(),
        };
        assert!(err.to_string().contains("2022-01-01"));
        assert!(err.to_string().contains("%d.%m.%Y"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PipelineError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_warning_display() {
        let warning = PipelineWarning::MissingTariffMonth {
            utility: Utility::Gas,
            month: YearMonth::new(2022, 5),
        };
        assert_eq!(
            warning.to_string(),
            "gas: no tariff for 2022-05, month dropped from costs"
        );
    }
}

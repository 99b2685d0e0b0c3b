//! Error types for the price_forecast crate

use polars::prelude::PolarsError;
use price_clean::CleanError;
use price_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Not enough observations for the requested operation
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from chart rendering
    #[error("Plot error: {0}")]
    PlotError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV export
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON export
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from reading a spreadsheet source
    #[error("Source error: {0}")]
    SourceError(CleanError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<CleanError> for ForecastError {
    fn from(err: CleanError) -> Self {
        match err {
            CleanError::SourceNotFound(path) => ForecastError::FileNotFound(path),
            other => ForecastError::SourceError(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_becomes_file_not_found() {
        let err =
            ForecastError::from(CleanError::SourceNotFound(PathBuf::from("sahkon_hinta.xlsx")));
        assert!(
            matches!(err, ForecastError::FileNotFound(ref p) if p.ends_with("sahkon_hinta.xlsx"))
        );
        assert_eq!(err.to_string(), "File not found: sahkon_hinta.xlsx");
    }

    #[test]
    fn test_other_source_errors_are_wrapped() {
        let err = ForecastError::from(CleanError::MissingColumn("pvm".to_string()));
        assert!(matches!(err, ForecastError::SourceError(CleanError::MissingColumn(_))));
    }
}

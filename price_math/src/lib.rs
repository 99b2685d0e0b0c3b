//! # Price Math
//!
//! Numerical building blocks shared by the spot price pipelines.
//! This crate provides differencing operators, a bounded Nelder-Mead
//! optimizer and forecast error metrics.

use thiserror::Error;

pub mod diff;
pub mod metrics;
pub mod optimization;

pub use diff::{apply_operator, difference_operator, integrate_operator, poly_mul};
pub use metrics::{
    forecast_accuracy, mean_absolute_error, mean_squared_error, root_mean_squared_error,
    ForecastAccuracy,
};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for price math operations
pub type Result<T> = std::result::Result<T, MathError>;

//! Accuracy metrics for comparing forecasts against actual values

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

fn check_lengths(actual: &[f64], forecast: &[f64]) -> Result<()> {
    if actual.is_empty() || actual.len() != forecast.len() {
        return Err(MathError::InvalidInput(format!(
            "Forecast and actual must have the same non-zero length (actual {}, forecast {})",
            actual.len(),
            forecast.len()
        )));
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    check_lengths(actual, forecast)?;
    let sum: f64 = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| (a - f).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Mean squared error
pub fn mean_squared_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    check_lengths(actual, forecast)?;
    let sum: f64 = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root mean squared error, `sqrt(mean_squared_error)`
pub fn root_mean_squared_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    mean_squared_error(actual, forecast).map(f64::sqrt)
}

/// Calculate all accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(actual: &[f64], forecast: &[f64]) -> Result<ForecastAccuracy> {
    let mae = mean_absolute_error(actual, forecast)?;
    let mse = mean_squared_error(actual, forecast)?;
    let n = actual.len() as f64;

    // Zero actuals are skipped but still count towards n
    let mape = actual
        .iter()
        .zip(forecast)
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &f)| ((a - f).abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(forecast)
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

//! Hold-out evaluation of forecasts

use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use crate::series::HourlySeries;
use price_math::{forecast_accuracy, ForecastAccuracy};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of one forecasting run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Model name, e.g. `ARIMA(5,1,0)`
    pub model: String,
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: ForecastAccuracy,
    pub aic: f64,
    pub bic: f64,
    /// Where the chart was written
    pub chart: PathBuf,
}

impl EvaluationReport {
    /// Write the report as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.model)?;
        writeln!(f, "  Train/test: {}/{}", self.train_size, self.test_size)?;
        writeln!(f, "  AIC: {:.3}, BIC: {:.3}", self.aic, self.bic)?;
        write!(f, "{}", self.accuracy)
    }
}

/// Compare a forecast with the held-out hours it was made for
pub fn evaluate_forecast(
    test: &HourlySeries,
    forecast: &ForecastResult,
) -> Result<ForecastAccuracy> {
    if test.timestamps() != forecast.timestamps() {
        return Err(ForecastError::ValidationError(format!(
            "Forecast of {} hours is not aligned with {} test hours",
            forecast.horizons(),
            test.len()
        )));
    }

    Ok(forecast_accuracy(test.values(), forecast.values())?)
}

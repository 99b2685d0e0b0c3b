//! Forecasting models for hourly price series

use crate::error::{ForecastError, Result};
use crate::series::HourlySeries;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::{self, File};
use std::path::Path;

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecasted values
    pub(crate) values: Vec<f64>,
    /// Prediction intervals (optional)
    pub(crate) intervals: Option<Vec<(f64, f64)>>,
    /// Hour of each forecast
    pub(crate) timestamps: Vec<NaiveDateTime>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, timestamps: Vec<NaiveDateTime>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match timestamps length ({})",
                values.len(),
                timestamps.len()
            )));
        }

        Ok(Self {
            values,
            intervals: None,
            timestamps,
        })
    }

    /// Create a new forecast result with prediction intervals
    pub fn new_with_intervals(
        values: Vec<f64>,
        timestamps: Vec<NaiveDateTime>,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        let mut result = Self::new(values, timestamps)?;
        result.intervals = Some(intervals);
        Ok(result)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// Get the prediction intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// (timestamp, value) pairs
    pub fn points(&self) -> Vec<(NaiveDateTime, f64)> {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }

    /// Serialize the forecast as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `aika,ennuste[,toteutunut]` rows to a CSV file
    ///
    /// `actual` is written alongside the forecast when it covers the same hours.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P, actual: Option<&HourlySeries>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let actual = match actual {
            Some(series) if series.timestamps() == self.timestamps() => Some(series.values()),
            Some(_) => {
                return Err(ForecastError::ValidationError(
                    "Actual values are not aligned with the forecast".to_string(),
                ))
            }
            None => None,
        };

        let mut writer = csv::Writer::from_writer(File::create(path)?);
        if actual.is_some() {
            writer.write_record(["aika", "ennuste", "toteutunut"])?;
        } else {
            writer.write_record(["aika", "ennuste"])?;
        }
        for (i, (ts, value)) in self.timestamps.iter().zip(&self.values).enumerate() {
            let mut record = vec![ts.format("%Y-%m-%d %H:%M:%S").to_string(), value.to_string()];
            if let Some(actual) = actual {
                record.push(actual[i].to_string());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for the hours following the training data
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// Forecast with symmetric prediction intervals at `level` (e.g. 0.95)
    fn forecast_with_intervals(&self, horizons: usize, level: f64) -> Result<ForecastResult>;

    /// One-step residuals over the training data
    fn residuals(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on an hourly series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on an hourly series
    fn train(&self, data: &HourlySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
pub mod estimation;
pub mod sarimax;

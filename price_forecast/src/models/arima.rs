//! ARIMA models for hourly price forecasting

use crate::error::{ForecastError, Result};
use crate::models::estimation::{Coefficients, CssFit, ModelOrder};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::HourlySeries;
use crate::utils::future_timestamps;
use chrono::NaiveDateTime;
use tracing::info;

/// ARIMA model (AutoRegressive Integrated Moving Average)
///
/// An undifferenced model (`d == 0`) carries a constant term; differenced
/// models do not.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Estimated model
    fit: CssFit,
    /// Last training hour
    last_timestamp: NaiveDateTime,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        ModelOrder::non_seasonal(p, d, q).validate()?;
        Ok(Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        })
    }

    /// (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, data: &HourlySeries) -> Result<TrainedArimaModel> {
        let last_timestamp = data
            .last_timestamp()
            .ok_or(ForecastError::InsufficientData { needed: 1, got: 0 })?;

        info!("Fitting {} on {} hourly observations", self.name, data.len());
        let fit = CssFit::fit(ModelOrder::non_seasonal(self.p, self.d, self.q), data.values())?;

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            fit,
            last_timestamp,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    pub fn coefficients(&self) -> &Coefficients {
        self.fit.coefficients()
    }

    pub fn sigma2(&self) -> f64 {
        self.fit.sigma2()
    }

    pub fn aic(&self) -> f64 {
        self.fit.aic()
    }

    pub fn bic(&self) -> f64 {
        self.fit.bic()
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let values = self.fit.forecast(horizon)?;
        ForecastResult::new(values, future_timestamps(self.last_timestamp, horizon))
    }

    fn forecast_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastResult> {
        let (values, intervals) = self.fit.forecast_with_intervals(horizon, level)?;
        ForecastResult::new_with_intervals(
            values,
            future_timestamps(self.last_timestamp, horizon),
            intervals,
        )
    }

    fn residuals(&self) -> &[f64] {
        self.fit.residuals()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Seasonal ARIMA models
//!
//! No exogenous regressors are used, so the model is a SARIMA(p,d,q)(P,D,Q)s
//! fitted by conditional sum of squares.

use crate::error::{ForecastError, Result};
use crate::models::estimation::{Coefficients, CssFit, ModelOrder};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::HourlySeries;
use crate::utils::future_timestamps;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Seasonal part (P, D, Q, period) of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }
}

impl Default for SeasonalOrder {
    /// Daily seasonality of hourly data
    fn default() -> Self {
        Self::new(1, 1, 1, 24)
    }
}

/// Seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct SarimaxModel {
    name: String,
    order: ModelOrder,
}

/// Trained seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarimaxModel {
    name: String,
    fit: CssFit,
    last_timestamp: NaiveDateTime,
}

impl SarimaxModel {
    /// Create a model with non-seasonal order (p, d, q) and a seasonal order
    pub fn new((p, d, q): (usize, usize, usize), seasonal: SeasonalOrder) -> Result<Self> {
        let order = ModelOrder::seasonal(
            (p, d, q),
            (seasonal.p, seasonal.d, seasonal.q, seasonal.period),
        );
        order.validate()?;

        Ok(Self {
            name: format!(
                "SARIMAX({},{},{})({},{},{},{})",
                p, d, q, seasonal.p, seasonal.d, seasonal.q, seasonal.period
            ),
            order,
        })
    }

    pub fn order(&self) -> &ModelOrder {
        &self.order
    }
}

impl ForecastModel for SarimaxModel {
    type Trained = TrainedSarimaxModel;

    fn train(&self, data: &HourlySeries) -> Result<TrainedSarimaxModel> {
        let last_timestamp = data
            .last_timestamp()
            .ok_or(ForecastError::InsufficientData { needed: 1, got: 0 })?;

        info!("Fitting {} on {} hourly observations", self.name, data.len());
        let fit = CssFit::fit(self.order, data.values())?;

        Ok(TrainedSarimaxModel {
            name: self.name.clone(),
            fit,
            last_timestamp,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaxModel {
    pub fn coefficients(&self) -> &Coefficients {
        self.fit.coefficients()
    }

    pub fn sigma2(&self) -> f64 {
        self.fit.sigma2()
    }

    pub fn log_likelihood(&self) -> f64 {
        self.fit.log_likelihood()
    }

    pub fn aic(&self) -> f64 {
        self.fit.aic()
    }

    pub fn bic(&self) -> f64 {
        self.fit.bic()
    }
}

impl TrainedForecastModel for TrainedSarimaxModel {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_model_name() {
        let model = SarimaxModel::new((2, 1, 2), SeasonalOrder::default()).unwrap();
        assert_eq!(model.name(), "SARIMAX(2,1,2)(1,1,1,24)");
        assert_eq!(model.order().ar_lag(), 26);
        assert!(!model.order().includes_mean());
    }

    #[test]
    fn test_rejects_degenerate_period() {
        assert!(SarimaxModel::new((1, 0, 0), SeasonalOrder::new(1, 0, 0, 1)).is_err());
    }

    #[test]
    fn test_seasonal_forecast_tracks_daily_profile() {
        let start =
            NaiveDateTime::parse_from_str("2024-06-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let n = 24 * 14;
        let profile = |h: usize| 8.0 + 4.0 * ((h % 24) as f64 / 24.0 * std::f64::consts::TAU).sin();
        let series = HourlySeries::new(
            (0..n as i64).map(|h| start + Duration::hours(h)).collect(),
            (0..n).map(profile).collect(),
        )
        .unwrap();

        let model = SarimaxModel::new((1, 0, 0), SeasonalOrder::new(0, 1, 1, 24)).unwrap();
        let forecast = model.train(&series).unwrap().forecast(24).unwrap();

        for (h, v) in forecast.values().iter().enumerate() {
            assert!((v - profile(n + h)).abs() < 1e-6);
        }
    }
}

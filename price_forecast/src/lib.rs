//! # Price Forecast
//!
//! Hourly spot price forecasting with ARIMA and seasonal ARIMA models.
//!
//! ## Features
//!
//! - Loading price series from CSV (polars) and spreadsheets (calamine)
//! - Strict hourly regularization with forward fill
//! - One-week hold-out split
//! - ARIMA(p,d,q) and SARIMA(p,d,q)(P,D,Q)s fitted by conditional sum of squares
//! - Prediction intervals from the model's psi weights
//! - RMSE/MAE evaluation and forecast charts (PNG or SVG)
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_forecast::data::DataLoader;
//! use price_forecast::models::arima::ArimaModel;
//! use price_forecast::models::{ForecastModel, TrainedForecastModel};
//! use price_forecast::utils::train_test_split;
//!
//! let series = DataLoader::from_csv("clean/sahkon_hinta_clean.csv", "aika", "hinta_alv0")?;
//! let (train, test) = train_test_split(&series, 168)?;
//!
//! let trained = ArimaModel::new(5, 1, 0)?.train(&train)?;
//! let forecast = trained.forecast(test.len())?;
//! println!("First forecast hour: {:?}", forecast.timestamps().first());
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod plot;
pub mod series;
pub mod utils;

pub use error::{ForecastError, Result};
pub use evaluation::{evaluate_forecast, EvaluationReport};
pub use models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use pipeline::{run_arima, run_sarimax, ArimaConfig, SarimaxConfig};
pub use series::HourlySeries;

//! End-to-end forecasting runs
//!
//! Each run loads a series, holds out the final `horizon` hours, fits a model
//! on the rest, forecasts the held-out hours, prints the error summary and
//! saves a chart.

use crate::data::DataLoader;
use crate::error::{ForecastError, Result};
use crate::evaluation::{evaluate_forecast, EvaluationReport};
use crate::models::arima::ArimaModel;
use crate::models::sarimax::{SarimaxModel, SeasonalOrder};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::plot::draw_forecast_comparison;
use crate::series::HourlySeries;
use crate::utils::train_test_split;
use price_clean::SheetLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// One week of hourly data
pub const DEFAULT_HORIZON: usize = 168;

/// Settings for the ARIMA run on the cleaned CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// Cleaned price CSV
    pub input: PathBuf,
    pub time_column: String,
    pub price_column: String,
    /// (p, d, q)
    pub order: [usize; 3],
    /// Hours held out and forecast
    pub horizon: usize,
    /// Training hours shown before the forecast on the chart
    pub history_points: usize,
    pub figures_dir: PathBuf,
    /// Optional CSV export of forecast and actuals
    pub forecast_csv: Option<PathBuf>,
    /// Optional JSON export of the evaluation report
    pub report_json: Option<PathBuf>,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("clean/sahkon_hinta_clean.csv"),
            time_column: "aika".to_string(),
            price_column: "hinta_alv0".to_string(),
            order: [5, 1, 0],
            horizon: DEFAULT_HORIZON,
            history_points: 200,
            figures_dir: PathBuf::from("figures"),
            forecast_csv: None,
            report_json: None,
        }
    }
}

impl ArimaConfig {
    /// Chart file named after the model order
    pub fn chart_path(&self) -> PathBuf {
        let [p, d, q] = self.order;
        self.figures_dir
            .join(format!("arima_ennuste_p{}_d{}_q{}.png", p, d, q))
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::ValidationError(
                "arima.horizon must be positive".to_string(),
            ));
        }
        let [p, d, q] = self.order;
        ArimaModel::new(p, d, q).map(|_| ())
    }
}

/// Settings for the seasonal run on the price spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarimaxConfig {
    /// Price spreadsheet
    pub input: PathBuf,
    /// Zero-based header row
    pub header_row: u32,
    pub time_column: String,
    pub price_column: String,
    /// (p, d, q)
    pub order: [usize; 3],
    /// (P, D, Q, period)
    pub seasonal_order: [usize; 4],
    pub horizon: usize,
    /// Hours of actual data shown on the chart
    pub plot_hours: usize,
    /// Hours printed from the start of the series
    pub preview_rows: usize,
    pub chart: PathBuf,
    pub forecast_csv: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

impl Default for SarimaxConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sahkon_hinta.xlsx"),
            header_row: 0,
            time_column: "pvm".to_string(),
            price_column: "hinta".to_string(),
            order: [2, 1, 2],
            seasonal_order: [1, 1, 1, 24],
            horizon: DEFAULT_HORIZON,
            plot_hours: 336,
            preview_rows: 5,
            chart: PathBuf::from("figures/sarimax_ennuste.png"),
            forecast_csv: None,
            report_json: None,
        }
    }
}

impl SarimaxConfig {
    pub fn seasonal(&self) -> SeasonalOrder {
        let [p, d, q, period] = self.seasonal_order;
        SeasonalOrder::new(p, d, q, period)
    }

    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            header_row: self.header_row,
            time_column: self.time_column.clone(),
            price_column: self.price_column.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::ValidationError(
                "sarimax.horizon must be positive".to_string(),
            ));
        }
        if self.seasonal_order[3] < 2 {
            return Err(ForecastError::ValidationError(format!(
                "sarimax seasonal period must be at least 2, got {}",
                self.seasonal_order[3]
            )));
        }
        let [p, d, q] = self.order;
        SarimaxModel::new((p, d, q), self.seasonal()).map(|_| ())
    }
}

/// Fit ARIMA on the cleaned CSV and evaluate it on the final week
pub fn run_arima(config: &ArimaConfig) -> Result<EvaluationReport> {
    config.validate()?;
    let series = DataLoader::from_csv(&config.input, &config.time_column, &config.price_column)?;
    info!(
        "Loaded {} hourly prices from {}",
        series.len(),
        config.input.display()
    );

    let (train, test) = train_test_split(&series, config.horizon)?;
    println!("Training set size: {}", train.len());
    println!("Test set size: {}", test.len());

    let [p, d, q] = config.order;
    let model = ArimaModel::new(p, d, q)?;
    let trained = model.train(&train)?;
    let forecast = trained.forecast(test.len())?;

    let accuracy = evaluate_forecast(&test, &forecast)?;
    println!("RMSE: {:.4}", accuracy.rmse);
    println!("MAE: {:.4}", accuracy.mae);

    let chart = config.chart_path();
    draw_forecast_comparison(
        &chart,
        &format!("ARIMA({},{},{}) forecast vs actual prices", p, d, q),
        Some(&train.tail(config.history_points)),
        &test,
        &forecast,
    )?;
    println!("Chart saved to {}", chart.display());

    let report = EvaluationReport {
        model: model.name().to_string(),
        train_size: train.len(),
        test_size: test.len(),
        accuracy,
        aic: trained.aic(),
        bic: trained.bic(),
        chart,
    };
    export(
        &report,
        &forecast,
        &test,
        config.forecast_csv.as_deref(),
        config.report_json.as_deref(),
    )?;

    Ok(report)
}

/// Fit the seasonal model on the price spreadsheet and evaluate it on the final week
pub fn run_sarimax(config: &SarimaxConfig) -> Result<EvaluationReport> {
    config.validate()?;
    let series = DataLoader::from_spreadsheet(&config.input, &config.layout())?;
    info!(
        "Loaded {} hourly prices from {}",
        series.len(),
        config.input.display()
    );
    if config.preview_rows > 0 {
        println!("{}", preview(&series, config.preview_rows));
    }

    let (train, test) = train_test_split(&series, config.horizon)?;
    println!("Training set size: {}", train.len());
    println!("Test set size: {}", test.len());

    let [p, d, q] = config.order;
    let model = SarimaxModel::new((p, d, q), config.seasonal())?;
    println!("Fitting {} (this can take a while)...", model.name());
    let trained = model.train(&train)?;
    let forecast = trained.forecast(test.len())?;
    println!("Forecast of {} hours done.", forecast.horizons());

    let accuracy = evaluate_forecast(&test, &forecast)?;
    println!("RMSE: {:.2}", accuracy.rmse);

    draw_forecast_comparison(
        &config.chart,
        &format!("{} forecast vs actual prices", model.name()),
        None,
        &series.tail(config.plot_hours),
        &forecast,
    )?;
    println!("Chart saved to {}", config.chart.display());

    println!("Searching for better SARIMAX orders is slow and is not run here.");

    let report = EvaluationReport {
        model: model.name().to_string(),
        train_size: train.len(),
        test_size: test.len(),
        accuracy,
        aic: trained.aic(),
        bic: trained.bic(),
        chart: config.chart.clone(),
    };
    export(
        &report,
        &forecast,
        &test,
        config.forecast_csv.as_deref(),
        config.report_json.as_deref(),
    )?;

    Ok(report)
}

fn export(
    report: &EvaluationReport,
    forecast: &ForecastResult,
    test: &HourlySeries,
    forecast_csv: Option<&Path>,
    report_json: Option<&Path>,
) -> Result<()> {
    if let Some(path) = forecast_csv {
        forecast.write_csv(path, Some(test))?;
        info!("Wrote forecast to {}", path.display());
    }
    if let Some(path) = report_json {
        report.write_json(path)?;
        info!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn preview(series: &HourlySeries, rows: usize) -> String {
    let head = series.head(rows);
    let mut out = format!("First {} hours:\n", head.len());
    for (ts, value) in head.points() {
        out.push_str(&format!("{}  {:>10.4}\n", ts.format("%Y-%m-%d %H:%M:%S"), value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_chart_path() {
        let config = ArimaConfig::default();
        assert_eq!(config.chart_path(), PathBuf::from("figures/arima_ennuste_p5_d1_q0.png"));
    }

    #[test]
    fn test_default_orders_are_valid() {
        assert!(ArimaConfig::default().validate().is_ok());
        assert!(SarimaxConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let config = ArimaConfig {
            horizon: 0,
            ..ArimaConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SarimaxConfig {
            seasonal_order: [1, 1, 1, 0],
            ..SarimaxConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_inputs_are_reported() {
        let dir = tempfile::tempdir().unwrap();

        let arima = ArimaConfig {
            input: dir.path().join("missing.csv"),
            figures_dir: dir.path().join("figures"),
            ..ArimaConfig::default()
        };
        assert!(matches!(run_arima(&arima), Err(ForecastError::FileNotFound(_))));
        assert!(!arima.figures_dir.exists());

        let sarimax = SarimaxConfig {
            input: dir.path().join("missing.xlsx"),
            chart: dir.path().join("figures").join("s.png"),
            ..SarimaxConfig::default()
        };
        assert!(matches!(run_sarimax(&sarimax), Err(ForecastError::FileNotFound(_))));
    }
}

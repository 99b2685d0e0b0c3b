//! # Spot Forecast
//!
//! Command line front end for the `price_clean` and `price_forecast` crates.
//! Each subcommand runs one pipeline once with settings from an optional TOML
//! file and command line overrides.

use anyhow::Result;
use price_clean::CleanError;
use price_forecast::ForecastError;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod cli;
pub mod config;

pub use cli::{Cli, Commands};
pub use config::AppConfig;

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "spot_forecast=info,price_clean=info,price_forecast=info";

/// Load configuration for `cli` and run the selected pipeline
pub fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    cli.command.apply(&mut config);
    config.validate()?;

    match &cli.command {
        Commands::Clean(_) => {
            let summary = price_clean::run_cleaner(&config.cleaner)?;
            info!(
                "Cleaned {} hours ({} .. {}) into {}",
                summary.rows,
                summary.first_hour,
                summary.last_hour,
                summary.output.display()
            );
        }
        Commands::Arima(_) => {
            let report = price_forecast::run_arima(&config.arima)?;
            info!("{} done, RMSE {:.4}", report.model, report.accuracy.rmse);
        }
        Commands::Sarimax(_) => {
            let report = price_forecast::run_sarimax(&config.sarimax)?;
            info!("{} done, RMSE {:.2}", report.model, report.accuracy.rmse);
        }
    }

    Ok(())
}

/// The input file a failed run could not find, if that is why it failed
pub fn missing_input(err: &anyhow::Error) -> Option<PathBuf> {
    if let Some(CleanError::SourceNotFound(path)) = err.downcast_ref::<CleanError>() {
        return Some(path.clone());
    }
    if let Some(ForecastError::FileNotFound(path)) = err.downcast_ref::<ForecastError>() {
        return Some(path.clone());
    }
    None
}

/// Message shown when an input file is missing
pub fn missing_input_message(path: &Path) -> String {
    format!(
        "File '{}' was not found. Make sure it is in the expected folder.",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_detected() {
        let err =
            anyhow::Error::new(ForecastError::FileNotFound(PathBuf::from("sahkon_hinta.xlsx")));
        assert_eq!(missing_input(&err), Some(PathBuf::from("sahkon_hinta.xlsx")));

        let err = anyhow::Error::new(CleanError::SourceNotFound(PathBuf::from("raw.xlsx")));
        assert_eq!(missing_input(&err), Some(PathBuf::from("raw.xlsx")));

        let err = anyhow::Error::new(ForecastError::DataError("bad".to_string()));
        assert_eq!(missing_input(&err), None);
    }

    #[test]
    fn test_message_names_file() {
        let message = missing_input_message(Path::new("clean/sahkon_hinta_clean.csv"));
        assert!(message.contains("clean/sahkon_hinta_clean.csv"));
    }
}

//! CLI argument definitions using clap.

use crate::config::AppConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "spot-forecast")]
#[command(author, version, about = "Clean and forecast hourly electricity spot prices")]
#[command(
    long_about = "Clean a raw spot price spreadsheet into an hourly CSV and evaluate\n\
    ARIMA and seasonal ARIMA forecasts on the final week of data.\n\
    \nExamples:\n  \
    spot-forecast clean\n  \
    spot-forecast arima --p 5 --d 1 --q 0\n  \
    spot-forecast --config spot.toml sarimax"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resample the raw spreadsheet to hourly prices and remove VAT
    Clean(CleanArgs),

    /// Fit ARIMA(p,d,q) on the cleaned CSV and forecast the last week
    Arima(ArimaArgs),

    /// Fit the seasonal model on the price spreadsheet and forecast the last week
    Sarimax(SarimaxArgs),
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Raw spreadsheet
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Destination CSV
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ArimaArgs {
    /// AR order
    #[arg(long)]
    pub p: Option<usize>,

    /// Differencing order
    #[arg(long)]
    pub d: Option<usize>,

    /// MA order
    #[arg(long)]
    pub q: Option<usize>,

    /// Cleaned price CSV
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SarimaxArgs {
    /// Price spreadsheet
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Chart destination (.png or .svg)
    #[arg(long)]
    pub chart: Option<PathBuf>,
}

impl Commands {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        match self {
            Commands::Clean(args) => {
                if let Some(source) = &args.source {
                    config.cleaner.source = source.clone();
                }
                if let Some(output) = &args.output {
                    config.cleaner.output = output.clone();
                }
            }
            Commands::Arima(args) => {
                let [p, d, q] = &mut config.arima.order;
                *p = args.p.unwrap_or(*p);
                *d = args.d.unwrap_or(*d);
                *q = args.q.unwrap_or(*q);
                if let Some(input) = &args.input {
                    config.arima.input = input.clone();
                }
            }
            Commands::Sarimax(args) => {
                if let Some(input) = &args.input {
                    config.sarimax.input = input.clone();
                }
                if let Some(chart) = &args.chart {
                    config.sarimax.chart = chart.clone();
                }
            }
        }
    }
}

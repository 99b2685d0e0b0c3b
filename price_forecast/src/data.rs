//! Loading hourly price series from CSV files and spreadsheets

use crate::error::{ForecastError, Result};
use crate::series::HourlySeries;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::{CsvReader, DataFrame, DataType, SerReader};
use price_clean::raw::{parse_timestamp_text, read_spreadsheet};
use price_clean::SheetLayout;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Data loader for hourly price series
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price series from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        time_column: &str,
        price_column: &str,
    ) -> Result<HourlySeries> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        info!("Loaded {} rows from {}", df.height(), path.display());
        Self::from_dataframe(&df, time_column, price_column)
    }

    /// Build a price series from two columns of an existing DataFrame
    pub fn from_dataframe(
        df: &DataFrame,
        time_column: &str,
        price_column: &str,
    ) -> Result<HourlySeries> {
        let times = df
            .column(time_column)
            .map_err(|_| ForecastError::DataError(format!("Column '{}' not found", time_column)))?
            .cast(&DataType::Utf8)?;
        let prices = df
            .column(price_column)
            .map_err(|_| ForecastError::DataError(format!("Column '{}' not found", price_column)))?
            .cast(&DataType::Float64)?;

        let mut observations = Vec::with_capacity(df.height());
        for (time, price) in times.utf8()?.into_iter().zip(prices.f64()?.into_iter()) {
            let text = time.ok_or_else(|| {
                ForecastError::DataError(format!("Missing value in column '{}'", time_column))
            })?;
            let timestamp = parse_csv_timestamp(text)
                .ok_or_else(|| ForecastError::DataError(format!("Invalid timestamp '{}'", text)))?;
            observations.push((timestamp, price));
        }

        HourlySeries::from_observations(observations)
    }

    /// Load a price series from the first worksheet of a spreadsheet
    pub fn from_spreadsheet<P: AsRef<Path>>(path: P, layout: &SheetLayout) -> Result<HourlySeries> {
        let observations = read_spreadsheet(path, layout)?;
        HourlySeries::from_observations(
            observations
                .into_iter()
                .map(|obs| (obs.timestamp, Some(obs.price)))
                .collect(),
        )
    }
}

/// Parse the timestamp formats found in cleaned price files
fn parse_csv_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| parse_timestamp_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_csv_selects_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "aika,hinta,hinta_alv0").unwrap();
        writeln!(file, "2024-01-01 00:00:00,12.4,10.0").unwrap();
        writeln!(file, "2024-01-01 01:00:00,24.8,20.0").unwrap();
        writeln!(file, "2024-01-01 03:00:00,37.2,30.0").unwrap();

        let series = DataLoader::from_csv(file.path(), "aika", "hinta_alv0").unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series.values(), &[10.0, 20.0, 20.0, 30.0]);
    }

    #[test]
    fn test_from_csv_missing_file() {
        let result = DataLoader::from_csv("does/not/exist.csv", "aika", "hinta_alv0");
        assert!(matches!(result, Err(ForecastError::FileNotFound(_))));
    }

    #[test]
    fn test_from_csv_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "aika,hinta").unwrap();
        writeln!(file, "2024-01-01 00:00:00,12.4").unwrap();

        let result = DataLoader::from_csv(file.path(), "aika", "hinta_alv0");
        assert!(matches!(result, Err(ForecastError::DataError(msg)) if msg.contains("hinta_alv0")));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(7, 0, 0).unwrap();
        assert_eq!(parse_csv_timestamp("2024-05-06 07:00:00"), Some(expected));
        assert_eq!(parse_csv_timestamp("2024-05-06T07:00:00"), Some(expected));
        assert_eq!(parse_csv_timestamp("06/05/2024 07:00:00"), Some(expected));
        assert_eq!(parse_csv_timestamp("yesterday"), None);
    }
}

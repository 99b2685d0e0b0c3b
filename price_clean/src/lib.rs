//! # Price Clean
//!
//! `price_clean` turns a raw spot price spreadsheet into an hourly price
//! series with VAT removed.
//!
//! ## Pipeline
//!
//! - Read timestamped prices from the first worksheet
//! - Drop everything at or after the cutoff (the quarter-hour tariff period)
//! - Average into hourly buckets and forward-fill empty hours
//! - Remove VAT using the ordered [`VatRuleTable`]
//! - Write `aika,hinta,hinta_alv0` rows to CSV
//!
//! ## Usage Example
//!
//! ```no_run
//! use price_clean::{run_cleaner, CleanerConfig};
//!
//! let summary = run_cleaner(&CleanerConfig::default()).unwrap();
//! println!("Wrote {} hours to {}", summary.rows, summary.output.display());
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub mod output;
pub mod raw;
pub mod resample;
pub mod vat;

pub use output::{format_preview, read_csv, write_csv, HourlyPrice};
pub use raw::{read_spreadsheet, RawObservation, SheetLayout};
pub use resample::{forward_fill, resample_hourly, HourlyBucket};
pub use vat::{VatCondition, VatRule, VatRuleTable, VatTreatment};

/// Errors that can occur while cleaning price data
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Column '{0}' not found in header row")]
    MissingColumn(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No observations before cutoff {0}")]
    NoData(NaiveDateTime),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cleaning operations
pub type Result<T> = std::result::Result<T, CleanError>;

/// Settings for a cleaning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Raw spreadsheet to read
    pub source: PathBuf,
    #[serde(flatten)]
    pub layout: SheetLayout,
    /// Observations at or after this instant are dropped
    pub cutoff: NaiveDateTime,
    /// Destination of the cleaned CSV
    pub output: PathBuf,
    /// Rows shown from each end of the result
    pub preview_rows: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("raw/sahkon-hinta-010121-061025.xlsx"),
            layout: SheetLayout::default(),
            cutoff: NaiveDate::from_ymd_opt(2025, 10, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            output: PathBuf::from("clean/sahkon_hinta_clean.csv"),
            preview_rows: 5,
        }
    }
}

/// Outcome of a cleaning run
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSummary {
    /// Hourly rows written
    pub rows: usize,
    pub first_hour: NaiveDateTime,
    pub last_hour: NaiveDateTime,
    pub output: PathBuf,
}

/// Turn raw observations into cleaned hourly rows
///
/// Observations at or after `cutoff` are ignored. Hours without data are
/// forward-filled before VAT is removed.
pub fn clean_observations(
    observations: &[RawObservation],
    cutoff: NaiveDateTime,
    rules: &VatRuleTable,
) -> Result<Vec<HourlyPrice>> {
    let kept: Vec<RawObservation> = observations
        .iter()
        .filter(|obs| obs.timestamp < cutoff)
        .copied()
        .collect();

    if kept.is_empty() {
        return Err(CleanError::NoData(cutoff));
    }
    info!(
        "Kept {} of {} observations before {}",
        kept.len(),
        observations.len(),
        cutoff
    );

    let buckets = resample_hourly(&kept)?;
    let rows = forward_fill(&buckets)
        .into_iter()
        .map(|(aika, hinta)| HourlyPrice {
            aika,
            hinta,
            hinta_alv0: rules.vat_free_price(aika, hinta),
        })
        .collect();

    Ok(rows)
}

/// Run the whole cleaning pipeline once
pub fn run_cleaner(config: &CleanerConfig) -> Result<CleanSummary> {
    let observations = read_spreadsheet(&config.source, &config.layout)?;
    let rows = clean_observations(&observations, config.cutoff, &VatRuleTable::default())?;

    let (first_hour, last_hour) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.aika, last.aika),
        _ => return Err(CleanError::NoData(config.cutoff)),
    };

    if config.preview_rows > 0 {
        println!("{}", format_preview(&rows, config.preview_rows));
    }

    write_csv(&config.output, &rows)?;
    info!(
        "Wrote {} hourly rows ({} .. {}) to {}",
        rows.len(),
        first_hour,
        last_hour,
        config.output.display()
    );

    Ok(CleanSummary {
        rows: rows.len(),
        first_hour,
        last_hour,
        output: config.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(s: &str, price: f64) -> RawObservation {
        RawObservation {
            timestamp: NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap(),
            price,
        }
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let config = CleanerConfig::default();
        let observations = vec![
            obs("2025-09-30 23:00", 12.55),
            obs("2025-10-01 00:00", 99.0),
            obs("2025-10-01 00:15", 99.0),
        ];

        let rows =
            clean_observations(&observations, config.cutoff, &VatRuleTable::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_relative_eq!(rows[0].hinta_alv0, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gap_filled_before_vat() {
        let observations = vec![obs("2024-08-31 22:00", 12.4), obs("2024-09-01 01:00", 12.55)];
        let cutoff = CleanerConfig::default().cutoff;

        let rows = clean_observations(&observations, cutoff, &VatRuleTable::default()).unwrap();

        assert_eq!(rows.len(), 4);
        // 23:00 is filled with 12.4 and still in the 24% period
        assert_relative_eq!(rows[1].hinta_alv0, 10.0, epsilon = 1e-12);
        // 00:00 on 2024-09-01 carries 12.4 but falls under 25.5%
        assert_eq!(rows[2].hinta, 12.4);
        assert_relative_eq!(rows[2].hinta_alv0, 12.4 / 1.255, epsilon = 1e-12);
        assert_relative_eq!(rows[3].hinta_alv0, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nothing_before_cutoff() {
        let observations = vec![obs("2025-11-01 00:00", 1.0)];
        let result = clean_observations(
            &observations,
            CleanerConfig::default().cutoff,
            &VatRuleTable::default(),
        );
        assert!(matches!(result, Err(CleanError::NoData(_))));
    }

    #[test]
    fn test_missing_source_produces_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = CleanerConfig {
            source: dir.path().join("missing.xlsx"),
            output: dir.path().join("out.csv"),
            ..CleanerConfig::default()
        };

        assert!(matches!(run_cleaner(&config), Err(CleanError::SourceNotFound(_))));
        assert!(!config.output.exists());
    }
}

//! Cleaned hourly price rows and their CSV representation

use crate::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs::{self, File};
use std::path::Path;

/// Timestamp format of the `aika` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One cleaned hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyPrice {
    /// Start of the hour
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub aika: NaiveDateTime,
    /// Hourly mean price including VAT (c/kWh)
    pub hinta: f64,
    /// Hourly mean price with VAT removed (c/kWh)
    pub hinta_alv0: f64,
}

fn serialize_timestamp<S: Serializer>(
    ts: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}

/// Write rows to a CSV file, creating the parent directory if needed
pub fn write_csv<P: AsRef<Path>>(path: P, rows: &[HourlyPrice]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read rows previously written by [`write_csv`]
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<HourlyPrice>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Text table of the first and last `count` rows
pub fn format_preview(rows: &[HourlyPrice], count: usize) -> String {
    fn table(rows: &[HourlyPrice]) -> String {
        let mut out = format!("{:<20} {:>10} {:>12}\n", "aika", "hinta", "hinta_alv0");
        for row in rows {
            out.push_str(&format!(
                "{:<20} {:>10.4} {:>12.4}\n",
                row.aika.format(TIMESTAMP_FORMAT),
                row.hinta,
                row.hinta_alv0
            ));
        }
        out
    }

    let head = &rows[..count.min(rows.len())];
    let tail = &rows[rows.len().saturating_sub(count)..];

    format!(
        "First {} hours:\n{}\nLast {} hours:\n{}",
        head.len(),
        table(head),
        tail.len(),
        table(tail)
    )
}

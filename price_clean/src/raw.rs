//! Reading raw spot price spreadsheets

use crate::{CleanError, Result};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Text formats accepted for timestamp cells, tried in order
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%d/%m/%Y %H:%M.%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// One price observation as read from the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// Where the data lives inside the worksheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Zero-based row holding the column names
    pub header_row: u32,
    /// Header of the timestamp column
    pub time_column: String,
    /// Header of the price column
    pub price_column: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 3,
            time_column: "Aika".to_string(),
            price_column: "Hinta (snt/kWh)".to_string(),
        }
    }
}

/// Read all observations from the first worksheet of a spreadsheet file
pub fn read_spreadsheet<P: AsRef<Path>>(
    path: P,
    layout: &SheetLayout,
) -> Result<Vec<RawObservation>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CleanError::SourceNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();
    let first = sheet_names
        .first()
        .ok_or_else(|| CleanError::InvalidData("No sheets found in workbook".to_string()))?
        .clone();

    info!("Reading worksheet '{}' from {}", first, path.display());
    let range = workbook.worksheet_range(&first)?;
    observations_from_range(&range, layout)
}

/// Extract observations from an in-memory worksheet range
///
/// Rows whose timestamp or price cannot be parsed are skipped.
pub fn observations_from_range(
    range: &Range<Data>,
    layout: &SheetLayout,
) -> Result<Vec<RawObservation>> {
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let header_offset = layout
        .header_row
        .checked_sub(start_row)
        .ok_or_else(|| CleanError::InvalidData(format!(
            "Header row {} lies above the used worksheet area (starts at row {})",
            layout.header_row, start_row
        )))? as usize;

    let header = range
        .rows()
        .nth(header_offset)
        .ok_or_else(|| CleanError::InvalidData(format!(
            "Worksheet has no row {}",
            layout.header_row
        )))?;

    let time_idx = find_column(header, &layout.time_column)?;
    let price_idx = find_column(header, &layout.price_column)?;
    debug!(time_idx, price_idx, "Located price table columns");

    let mut observations = Vec::new();
    let mut skipped = 0usize;

    for row in range.rows().skip(header_offset + 1) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let timestamp = row.get(time_idx).and_then(parse_timestamp);
        let price = row.get(price_idx).and_then(parse_price);

        match (timestamp, price) {
            (Some(timestamp), Some(price)) => {
                observations.push(RawObservation { timestamp, price })
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} rows with unreadable timestamp or price", skipped);
    }
    info!("Read {} raw price observations", observations.len());

    Ok(observations)
}

fn find_column(header: &[Data], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|cell| match cell {
            Data::String(s) => s.trim().eq_ignore_ascii_case(name.trim()),
            _ => false,
        })
        .ok_or_else(|| CleanError::MissingColumn(name.to_string()))
}

/// Parse a timestamp from a text or native date-time cell
pub fn parse_timestamp(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::String(text) => parse_timestamp_text(text),
        Data::Empty => None,
        other => other.as_datetime(),
    }
}

/// Parse a timestamp string in one of the supported formats
pub fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn parse_price(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        // Decimal comma is common in Finnish exports
        Data::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(rows: &[Vec<Data>]) -> Range<Data> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn preamble() -> Vec<Vec<Data>> {
        vec![
            vec![text("Sähkön hinta"), Data::Empty],
            vec![Data::Empty, Data::Empty],
            vec![text("Lähde: pörssi"), Data::Empty],
            vec![text("Aika"), text("Hinta (snt/kWh)")],
        ]
    }

    #[test]
    fn test_reads_rows_below_header() {
        let mut rows = preamble();
        rows.push(vec![text("01/01/2021 00:00.00"), Data::Float(4.5)]);
        rows.push(vec![text("01/01/2021 01:00.00"), text("5,25")]);
        rows.push(vec![text("01/01/2021 02:00.00"), Data::Int(-1)]);

        let observations = observations_from_range(&sheet(&rows), &SheetLayout::default()).unwrap();

        assert_eq!(observations.len(), 3);
        assert_eq!(
            observations[1].timestamp,
            parse_timestamp_text("01/01/2021 01:00.00").unwrap()
        );
        assert_eq!(observations[1].price, 5.25);
        assert_eq!(observations[2].price, -1.0);
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let mut rows = preamble();
        rows.push(vec![text("not a date"), Data::Float(1.0)]);
        rows.push(vec![text("02/01/2021 00:00.00"), text("n/a")]);
        rows.push(vec![Data::Empty, Data::Empty]);
        rows.push(vec![text("02/01/2021 01:00.00"), Data::Float(2.0)]);

        let observations = observations_from_range(&sheet(&rows), &SheetLayout::default()).unwrap();

        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].price, 2.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let rows = vec![vec![text("Aika"), text("Price")]];
        let layout = SheetLayout {
            header_row: 0,
            ..SheetLayout::default()
        };

        let result = observations_from_range(&sheet(&rows), &layout);
        assert!(
            matches!(result, Err(CleanError::MissingColumn(name)) if name == "Hinta (snt/kWh)")
        );
    }

    #[test]
    fn test_timestamp_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2022-03-04 05:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        for input in [
            "04/03/2022 05:00.00",
            "04/03/2022 05:00:00",
            "04/03/2022 05:00",
            "2022-03-04 05:00:00",
        ] {
            assert_eq!(parse_timestamp_text(input), Some(expected), "{input}");
        }
        assert_eq!(parse_timestamp(&Data::Empty), None);
    }

    #[test]
    fn test_missing_file() {
        let result = read_spreadsheet("definitely/not/here.xlsx", &SheetLayout::default());
        assert!(matches!(result, Err(CleanError::SourceNotFound(_))));
    }
}

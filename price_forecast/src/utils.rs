//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use crate::series::HourlySeries;
use chrono::{Duration, NaiveDateTime};

/// Hold out the last `horizon` hours as the test set
///
/// Training keeps everything before the cut point, so `train ++ test` is the
/// input series. At least one training hour has to remain.
pub fn train_test_split(
    series: &HourlySeries,
    horizon: usize,
) -> Result<(HourlySeries, HourlySeries)> {
    if horizon == 0 {
        return Err(ForecastError::ValidationError(
            "Forecast horizon must be positive".to_string(),
        ));
    }
    if series.len() <= horizon {
        return Err(ForecastError::InsufficientData {
            needed: horizon + 1,
            got: series.len(),
        });
    }

    Ok(series.split_at(series.len() - horizon))
}

/// Hourly timestamps following `last_timestamp`
pub fn future_timestamps(last_timestamp: NaiveDateTime, horizon: usize) -> Vec<NaiveDateTime> {
    (1..=horizon as i64)
        .map(|h| last_timestamp + Duration::hours(h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn series(n: usize) -> HourlySeries {
        let start =
            NaiveDateTime::parse_from_str("2024-03-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        HourlySeries::new(
            (0..n as i64).map(|h| start + Duration::hours(h)).collect(),
            (0..n).map(|v| v as f64).collect(),
        )
        .unwrap()
    }

    #[rstest]
    #[case(169, 1)]
    #[case(500, 332)]
    #[case(24 * 365, 24 * 365 - 168)]
    fn test_split_holds_out_one_week(#[case] n: usize, #[case] train_len: usize) {
        let data = series(n);
        let (train, test) = train_test_split(&data, 168).unwrap();

        assert_eq!(test.len(), 168);
        assert_eq!(train.len(), train_len);

        let mut joined = train.values().to_vec();
        joined.extend_from_slice(test.values());
        assert_eq!(joined, data.values());
    }

    #[rstest]
    #[case(168)]
    #[case(10)]
    fn test_split_needs_a_training_point(#[case] n: usize) {
        assert!(matches!(
            train_test_split(&series(n), 168),
            Err(ForecastError::InsufficientData { needed: 169, .. })
        ));
    }

    #[test]
    fn test_future_timestamps() {
        let last =
            NaiveDateTime::parse_from_str("2024-03-01 23:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let future = future_timestamps(last, 3);
        assert_eq!(future.len(), 3);
        assert_eq!(future[0] - last, Duration::hours(1));
        assert_eq!(future[2] - last, Duration::hours(3));
    }
}

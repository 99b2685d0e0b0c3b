//! Strictly hourly price series

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDateTime};
use tracing::debug;

/// An ascending, gap-free series with exactly one value per hour
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl HourlySeries {
    /// Create a series from aligned vectors
    ///
    /// Timestamps must be exactly one hour apart and every value must be finite.
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }
        if let Some(pair) = timestamps.windows(2).find(|w| w[1] - w[0] != Duration::hours(1)) {
            return Err(ForecastError::DataError(format!(
                "Series is not hourly between {} and {}",
                pair[0], pair[1]
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite value at {}",
                timestamps[pos]
            )));
        }

        Ok(Self { timestamps, values })
    }

    /// Regularize raw observations onto an hourly grid
    ///
    /// The grid starts at the earliest timestamp and steps one hour until the
    /// latest. Only observations landing exactly on a grid point are kept, and
    /// missing grid points (or missing prices) take the previous value. Grid
    /// points before the first known price are dropped. Duplicate timestamps
    /// are rejected.
    pub fn from_observations(mut observations: Vec<(NaiveDateTime, Option<f64>)>) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }
        observations.sort_by_key(|(ts, _)| *ts);

        if let Some(pair) = observations.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ForecastError::DataError(format!(
                "Duplicate timestamp {}",
                pair[0].0
            )));
        }

        let origin = observations[0].0;
        let end = observations[observations.len() - 1].0;
        let step = Duration::hours(1);

        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        let mut last: Option<f64> = None;
        let mut filled = 0usize;
        let mut source = observations.iter().peekable();
        let mut current = origin;

        while current <= end {
            // Observations between grid points are discarded
            while source.next_if(|(ts, _)| *ts < current).is_some() {}

            let on_grid = source
                .next_if(|(ts, _)| *ts == current)
                .and_then(|(_, price)| price.filter(|p| p.is_finite()));

            match (on_grid, last) {
                (Some(price), _) => {
                    last = Some(price);
                    timestamps.push(current);
                    values.push(price);
                }
                (None, Some(previous)) => {
                    filled += 1;
                    timestamps.push(current);
                    values.push(previous);
                }
                (None, None) => {}
            }
            current += step;
        }

        if values.is_empty() {
            return Err(ForecastError::DataError(
                "No price values found in the series".to_string(),
            ));
        }
        debug!(
            "Regularized {} observations to {} hours ({} forward-filled)",
            observations.len(),
            values.len(),
            filled
        );

        Ok(Self { timestamps, values })
    }

    /// Number of hours in the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Hour timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Prices
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// The last `n` hours (or the whole series when shorter)
    pub fn tail(&self, n: usize) -> HourlySeries {
        let start = self.len().saturating_sub(n);
        HourlySeries {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// The first `n` hours (or the whole series when shorter)
    pub fn head(&self, n: usize) -> HourlySeries {
        let end = n.min(self.len());
        HourlySeries {
            timestamps: self.timestamps[..end].to_vec(),
            values: self.values[..end].to_vec(),
        }
    }

    /// Split into `[..at]` and `[at..]`
    pub fn split_at(&self, at: usize) -> (HourlySeries, HourlySeries) {
        let at = at.min(self.len());
        (
            HourlySeries {
                timestamps: self.timestamps[..at].to_vec(),
                values: self.values[..at].to_vec(),
            },
            HourlySeries {
                timestamps: self.timestamps[at..].to_vec(),
                values: self.values[at..].to_vec(),
            },
        )
    }

    /// (timestamp, value) pairs
    pub fn points(&self) -> Vec<(NaiveDateTime, f64)> {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }
}

//! Hourly resampling of raw observations

use crate::raw::RawObservation;
use crate::{CleanError, Result};
use chrono::{Duration, DurationRound, NaiveDateTime};
use std::collections::BTreeMap;

/// Mean price of one hour bucket, `None` when the hour had no observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyBucket {
    pub hour: NaiveDateTime,
    pub mean: Option<f64>,
}

/// Truncate a timestamp to the start of its hour
pub fn floor_to_hour(timestamp: NaiveDateTime) -> Result<NaiveDateTime> {
    timestamp
        .duration_trunc(Duration::hours(1))
        .map_err(|e| CleanError::InvalidData(format!("Cannot truncate {}: {}", timestamp, e)))
}

/// Average observations into contiguous hourly buckets
///
/// The output covers every hour from the first to the last observed hour,
/// empty hours included.
pub fn resample_hourly(observations: &[RawObservation]) -> Result<Vec<HourlyBucket>> {
    let mut sums: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let entry = sums.entry(floor_to_hour(obs.timestamp)?).or_insert((0.0, 0));
        entry.0 += obs.price;
        entry.1 += 1;
    }

    let (first, last) = match (sums.keys().next(), sums.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(Vec::new()),
    };

    let mut buckets = Vec::with_capacity(((last - first).num_hours() + 1) as usize);
    let mut hour = first;
    while hour <= last {
        let mean = sums.get(&hour).map(|(sum, count)| sum / *count as f64);
        buckets.push(HourlyBucket { hour, mean });
        hour += Duration::hours(1);
    }

    Ok(buckets)
}

/// Fill empty buckets with the most recent known mean
///
/// Buckets before the first known value are dropped.
pub fn forward_fill(buckets: &[HourlyBucket]) -> Vec<(NaiveDateTime, f64)> {
    let mut last = None;
    buckets
        .iter()
        .filter_map(|bucket| {
            if bucket.mean.is_some() {
                last = bucket.mean;
            }
            last.map(|value| (bucket.hour, value))
        })
        .collect()
}

//! Timestamped sample sequences as handed over by the parsing stage.
//!
//! Sampling may be irregular. A sample whose value is missing or non-finite
//! stays in the series as a placeholder so it can be counted by
//! `missing_pct`; every metric calculator drops such samples before
//! computing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// A single (timestamp, value) reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Sample { timestamp, value }
    }

    pub fn is_missing(&self) -> bool {
        !self.value.is_finite()
    }
}

/// Samples in non-decreasing timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Builds a series, stably sorting by timestamp. Input that already
    /// honours the non-decreasing contract is left untouched.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        TimeSeries { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Values of all samples that carry a finite reading.
    pub fn finite_values(&self) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|s| !s.is_missing())
            .map(|s| s.value)
            .collect()
    }

    /// Number of samples with a finite reading.
    pub fn finite_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_missing()).count()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Finite samples with `start <= timestamp <= end`.
    pub fn finite_count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
        self.samples
            .iter()
            .filter(|s| !s.is_missing() && s.timestamp >= start && s.timestamp <= end)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Series helpers
// ---------------------------------------------------------------------------

/// Percentage of samples whose value is missing or non-finite.
///
/// Returns 0.0 for an empty series.
pub fn missing_pct(series: &TimeSeries) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let missing = series.len() - series.finite_count();
    (missing as f64 / series.len() as f64) * 100.0
}

/// Pairs the values of two series at timestamps present in both, keeping
/// only pairs where both values are finite. Output follows `a`'s order.
///
/// When a timestamp repeats within `b`, the last reading wins.
pub fn align_by_timestamp(a: &TimeSeries, b: &TimeSeries) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<DateTime<Utc>, f64> = b
        .samples()
        .iter()
        .filter(|s| !s.is_missing())
        .map(|s| (s.timestamp, s.value))
        .collect();

    a.samples()
        .iter()
        .filter(|s| !s.is_missing())
        .filter_map(|s| lookup.get(&s.timestamp).map(|&other| (s.value, other)))
        .unzip()
}

/// Number of rows a logger sampling every `interval_minutes` should record
/// between `start` and `end` inclusive.
///
/// Returns 0 when the window is inverted or the interval is zero.
pub fn expected_rows(start: DateTime<Utc>, end: DateTime<Utc>, interval_minutes: u32) -> usize {
    if end < start || interval_minutes == 0 {
        return 0;
    }
    let span = end - start;
    let step = Duration::minutes(i64::from(interval_minutes));
    (span.num_seconds() / step.num_seconds()) as usize + 1
}

/// Trapezoidal integral of a flow series over time, in flow units × seconds.
///
/// Intervals with a missing endpoint contribute nothing. Returns 0.0 for
/// fewer than two samples.
pub fn flow_volume(series: &TimeSeries) -> f64 {
    series
        .samples()
        .windows(2)
        .filter(|pair| !pair[0].is_missing() && !pair[1].is_missing())
        .map(|pair| {
            let dt = (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64 / 1000.0;
            (pair[0].value + pair[1].value) / 2.0 * dt
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

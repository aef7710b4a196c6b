//! Storm event segmentation for rain gauge intensity series.
//!
//! A single forward pass groups rain-positive samples into bursts. A burst
//! ends when the gap to the next rain-positive sample is strictly longer
//! than the configured dry gap. Dry, zero, and missing samples never open,
//! extend, or close a storm on their own.
//!
//! The segmentation state is an explicit `Closed | Open` enum, and the only
//! way to obtain results is `Segmentation::finish`, which finalises a storm
//! still open at the end of the series.

use chrono::{DateTime, Utc};

use crate::model::{StormEvent, StormSignificance};
use crate::series::{Sample, TimeSeries};

/// Default minimum quiet interval between two storms.
pub const DEFAULT_DRY_GAP_HOURS: f64 = 6.0;

/// A storm deeper than this is significant.
pub const SIGNIFICANT_DEPTH_MM: f64 = 5.0;

/// A storm peaking at or above this intensity is significant.
pub const SIGNIFICANT_PEAK_INTENSITY: f64 = 6.0;

// ---------------------------------------------------------------------------
// Segmentation state
// ---------------------------------------------------------------------------

/// Accumulator for the storm currently being built.
#[derive(Debug)]
struct OpenStorm {
    id: u32,
    start_time: DateTime<Utc>,
    /// Also the timestamp of the last rain-positive sample seen.
    end_time: DateTime<Utc>,
    peak_intensity: f64,
    values: Vec<f64>,
}

impl OpenStorm {
    fn begin(id: u32, sample: &Sample) -> Self {
        OpenStorm {
            id,
            start_time: sample.timestamp,
            end_time: sample.timestamp,
            peak_intensity: sample.value,
            values: vec![sample.value],
        }
    }

    fn extend(&mut self, sample: &Sample) {
        self.values.push(sample.value);
        self.end_time = sample.timestamp;
        self.peak_intensity = self.peak_intensity.max(sample.value);
    }

    fn finalize(self) -> StormEvent {
        let depth_mm: f64 = self.values.iter().sum();
        let duration_minutes = (self.end_time - self.start_time).num_minutes();
        StormEvent {
            id: self.id,
            start_time: self.start_time,
            end_time: self.end_time,
            depth_mm,
            peak_intensity: self.peak_intensity,
            duration_minutes,
            significance: significance(depth_mm, self.peak_intensity),
        }
    }
}

#[derive(Debug)]
enum StormState {
    Closed,
    Open(OpenStorm),
}

/// In-progress segmentation of one series.
#[derive(Debug)]
pub struct Segmentation {
    dry_gap_hours: f64,
    storms: Vec<StormEvent>,
    state: StormState,
}

impl Segmentation {
    pub fn new(dry_gap_hours: f64) -> Self {
        Segmentation {
            dry_gap_hours,
            storms: Vec::new(),
            state: StormState::Closed,
        }
    }

    fn next_id(&self) -> u32 {
        self.storms.len() as u32 + 1
    }

    /// Feeds the next sample. Samples must arrive in ascending time order.
    pub fn push(&mut self, sample: &Sample) {
        if !is_rain(sample) {
            return;
        }
        let state = std::mem::replace(&mut self.state, StormState::Closed);
        self.state = match state {
            StormState::Closed => StormState::Open(OpenStorm::begin(self.next_id(), sample)),
            StormState::Open(mut storm) => {
                if hours_between(storm.end_time, sample.timestamp) > self.dry_gap_hours {
                    self.storms.push(storm.finalize());
                    StormState::Open(OpenStorm::begin(self.next_id(), sample))
                } else {
                    storm.extend(sample);
                    StormState::Open(storm)
                }
            }
        };
    }

    /// Finalises any open storm and returns all storms in id order.
    pub fn finish(mut self) -> Vec<StormEvent> {
        if let StormState::Open(storm) = self.state {
            self.storms.push(storm.finalize());
        }
        self.storms
    }
}

fn is_rain(sample: &Sample) -> bool {
    sample.value.is_finite() && sample.value > 0.0
}

fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// Significant if deeper than 5 mm or peaking at 6 or more.
pub fn significance(depth_mm: f64, peak_intensity: f64) -> StormSignificance {
    if depth_mm > SIGNIFICANT_DEPTH_MM || peak_intensity >= SIGNIFICANT_PEAK_INTENSITY {
        StormSignificance::Significant
    } else {
        StormSignificance::Minor
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Segments storms using a fixed dry gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StormSegmenter {
    pub dry_gap_hours: f64,
}

impl Default for StormSegmenter {
    fn default() -> Self {
        StormSegmenter {
            dry_gap_hours: DEFAULT_DRY_GAP_HOURS,
        }
    }
}

impl StormSegmenter {
    pub fn new(dry_gap_hours: f64) -> Self {
        StormSegmenter { dry_gap_hours }
    }

    pub fn segment(&self, series: &TimeSeries) -> Vec<StormEvent> {
        segment_storms(series, self.dry_gap_hours)
    }
}

/// Partitions the rain-positive samples of `series` into storm events.
///
/// Returns an empty list for an empty or entirely dry series.
pub fn segment_storms(series: &TimeSeries, dry_gap_hours: f64) -> Vec<StormEvent> {
    let mut segmentation = Segmentation::new(dry_gap_hours);
    for sample in series.samples() {
        segmentation.push(sample);
    }
    segmentation.finish()
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Total rainfall depth across all storms, 0.0 when there are none.
pub fn total_depth_mm(storms: &[StormEvent]) -> f64 {
    // Folding from +0.0: `Sum for f64` starts at -0.0.
    storms.iter().fold(0.0, |acc, s| acc + s.depth_mm)
}

pub fn significant_count(storms: &[StormEvent]) -> usize {
    storms
        .iter()
        .filter(|s| s.significance == StormSignificance::Significant)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

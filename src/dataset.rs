//! Survey data handed over by the parsing stage.
//!
//! Industry export formats are converted upstream; this service receives a
//! JSON document of already-parsed series keyed by monitor and gauge id:
//!
//! ```json
//! {
//!   "monitors": [
//!     { "id": "FM01",
//!       "flow":  [{ "timestamp": "2024-08-01T00:00:00Z", "value": 12.4 }],
//!       "depth": [{ "timestamp": "2024-08-01T00:00:00Z", "value": null }] }
//!   ],
//!   "rain_gauges": [
//!     { "id": "RG01",
//!       "intensity": [{ "timestamp": "2024-08-01T00:00:00Z", "value": 0.0 }] }
//!   ]
//! }
//! ```
//!
//! A `null` value marks a missing reading; it is kept as a NaN placeholder so
//! it counts towards `missing_pct` and is dropped by the calculators.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::model::QaError;
use crate::qa::assessment::MonitorSeries;
use crate::series::{Sample, TimeSeries};

// ---------------------------------------------------------------------------
// Wire structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawSample {
    timestamp: DateTime<Utc>,
    value: Option<f64>,
}

fn to_series(raw: Vec<RawSample>) -> TimeSeries {
    TimeSeries::from_samples(
        raw.into_iter()
            .map(|r| Sample::new(r.timestamp, r.value.unwrap_or(f64::NAN)))
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct RawMonitor {
    id: String,
    flow: Option<Vec<RawSample>>,
    depth: Option<Vec<RawSample>>,
    velocity: Option<Vec<RawSample>>,
}

#[derive(Debug, Deserialize)]
struct RawGauge {
    id: String,
    #[serde(default)]
    intensity: Vec<RawSample>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    monitors: Vec<RawMonitor>,
    #[serde(default)]
    rain_gauges: Vec<RawGauge>,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorData {
    pub id: String,
    pub series: MonitorSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RainGaugeData {
    pub id: String,
    pub intensity: TimeSeries,
}

/// All parsed series for one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyDataset {
    pub monitors: Vec<MonitorData>,
    pub rain_gauges: Vec<RainGaugeData>,
}

impl SurveyDataset {
    /// First entry for `id`. Later entries with the same id are ignored.
    pub fn monitor(&self, id: &str) -> Option<&MonitorData> {
        self.monitors.iter().find(|m| m.id == id)
    }

    pub fn rain_gauge(&self, id: &str) -> Option<&RainGaugeData> {
        self.rain_gauges.iter().find(|g| g.id == id)
    }

    /// Monitor ids that appear more than once, each reported once.
    pub fn duplicate_monitor_ids(&self) -> Vec<&str> {
        repeated_ids(self.monitors.iter().map(|m| m.id.as_str()))
    }

    /// Rain gauge ids that appear more than once, each reported once.
    pub fn duplicate_rain_gauge_ids(&self) -> Vec<&str> {
        repeated_ids(self.rain_gauges.iter().map(|g| g.id.as_str()))
    }
}

fn repeated_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for id in ids {
        if !seen.insert(id) && !repeated.contains(&id) {
            repeated.push(id);
        }
    }
    repeated
}

impl RawDataset {
    fn into_dataset(self) -> SurveyDataset {
        SurveyDataset {
            monitors: self
                .monitors
                .into_iter()
                .map(|m| MonitorData {
                    id: m.id,
                    series: MonitorSeries {
                        flow: m.flow.map(to_series),
                        depth: m.depth.map(to_series),
                        velocity: m.velocity.map(to_series),
                    },
                })
                .collect(),
            rain_gauges: self
                .rain_gauges
                .into_iter()
                .map(|g| RainGaugeData {
                    id: g.id,
                    intensity: to_series(g.intensity),
                })
                .collect(),
        }
    }
}

/// Parses survey data from JSON text.
pub fn parse_dataset(json: &str) -> Result<SurveyDataset, QaError> {
    let raw: RawDataset =
        serde_json::from_str(json).map_err(|e| QaError::DataParse(e.to_string()))?;
    Ok(raw.into_dataset())
}

/// Reads and parses a survey data file.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<SurveyDataset, QaError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| QaError::DataRead(format!("{}: {}", path.display(), e)))?;
    parse_dataset(&text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_monitor_and_gauge() {
        let json = r#"{
            "monitors": [{
                "id": "FM01",
                "flow": [
                    { "timestamp": "2024-08-01T00:15:00Z", "value": 2.0 },
                    { "timestamp": "2024-08-01T00:00:00Z", "value": 1.0 }
                ]
            }],
            "rain_gauges": [{
                "id": "RG01",
                "intensity": [{ "timestamp": "2024-08-01T00:00:00Z", "value": 0.4 }]
            }]
        }"#;
        let data = parse_dataset(json).expect("valid dataset should parse");
        let fm01 = data.monitor("FM01").expect("FM01 should be present");
        let flow = fm01.series.flow.as_ref().expect("flow channel should be present");
        // Sorted on construction.
        assert_eq!(flow.finite_values(), vec![1.0, 2.0]);
        assert!(fm01.series.depth.is_none());
        assert_eq!(data.rain_gauge("RG01").map(|g| g.intensity.len()), Some(1));
    }

    #[test]
    fn test_null_value_becomes_missing_sample() {
        let json = r#"{ "monitors": [{ "id": "FM01", "depth": [
            { "timestamp": "2024-08-01T00:00:00Z", "value": null },
            { "timestamp": "2024-08-01T00:15:00Z", "value": 0.3 }
        ]}]}"#;
        let data = parse_dataset(json).expect("null values should be accepted");
        let depth = data.monitors[0].series.depth.as_ref().unwrap();
        assert_eq!(depth.len(), 2);
        assert_eq!(depth.finite_count(), 1);
        assert!(depth.samples()[0].is_missing());
    }

    #[test]
    fn test_duplicate_ids_are_reported_and_first_entry_wins() {
        let json = r#"{
            "monitors": [
                { "id": "FM01", "flow": [{ "timestamp": "2024-08-01T00:00:00Z", "value": 1.0 }] },
                { "id": "FM02" },
                { "id": "FM01", "flow": [{ "timestamp": "2024-08-01T00:00:00Z", "value": 9.0 }] },
                { "id": "FM01" }
            ],
            "rain_gauges": [{ "id": "RG01" }, { "id": "RG01" }, { "id": "RG02" }]
        }"#;
        let data = parse_dataset(json).expect("duplicates should still parse");
        assert_eq!(data.duplicate_monitor_ids(), vec!["FM01"]);
        assert_eq!(data.duplicate_rain_gauge_ids(), vec!["RG01"]);
        let flow = data.monitor("FM01").and_then(|m| m.series.flow.as_ref());
        assert_eq!(flow.map(|f| f.finite_values()), Some(vec![1.0]));
    }

    #[test]
    fn test_unique_ids_have_no_duplicates() {
        let data = parse_dataset(r#"{ "monitors": [{ "id": "FM01" }, { "id": "FM02" }] }"#)
            .expect("valid dataset should parse");
        assert!(data.duplicate_monitor_ids().is_empty());
        assert!(data.duplicate_rain_gauge_ids().is_empty());
    }

    #[test]
    fn test_empty_document_is_empty_dataset() {
        assert_eq!(parse_dataset("{}"), Ok(SurveyDataset::default()));
    }

    #[test]
    fn test_bad_timestamp_is_a_parse_error() {
        let json = r#"{ "rain_gauges": [{ "id": "RG01", "intensity": [
            { "timestamp": "yesterday", "value": 1.0 }
        ]}]}"#;
        assert!(matches!(parse_dataset(json), Err(QaError::DataParse(_))));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        assert!(matches!(
            load_dataset("/nonexistent/survey_data.json"),
            Err(QaError::DataRead(_))
        ));
    }
}

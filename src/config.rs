//! Survey configuration loading.
//!
//! A survey is described by a single TOML file: an optional `[analysis]`
//! table of tuning options followed by the `[[monitors]]` and
//! `[[rain_gauges]]` registries (see `survey`). Every analysis option has a
//! default, so a file listing only sites is valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::model::QaError;
use crate::qa::metrics::DEFAULT_DROPOUT_FLOOR;
use crate::rainfall::storms::DEFAULT_DRY_GAP_HOURS;
use crate::survey::SurveyConfig;

/// Default logger sampling interval for sewer flow surveys.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Default risk threshold. Reserved; no algorithm reads it yet.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.8;

// ---------------------------------------------------------------------------
// Analysis options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum quiet interval separating two storms.
    pub dry_gap_hours: f64,
    /// Readings below this value count as dropouts.
    pub dropout_floor_threshold: f64,
    /// Reserved for future risk scoring.
    pub risk_threshold: f64,
    /// Logger sampling interval, used to derive expected row counts.
    pub expected_interval_minutes: u32,
    /// Survey window for completeness. Both ends or neither must be set;
    /// without a window the span of each monitor's own series is used.
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            dry_gap_hours: DEFAULT_DRY_GAP_HOURS,
            dropout_floor_threshold: DEFAULT_DROPOUT_FLOOR,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            expected_interval_minutes: DEFAULT_INTERVAL_MINUTES,
            period_start: None,
            period_end: None,
        }
    }
}

impl AnalysisConfig {
    /// The configured survey window, if both ends are set.
    pub fn survey_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), QaError> {
        if !self.dry_gap_hours.is_finite() || self.dry_gap_hours < 0.0 {
            return Err(QaError::InvalidSurvey(format!(
                "dry_gap_hours must be a non-negative number, got {}",
                self.dry_gap_hours
            )));
        }
        if !self.dropout_floor_threshold.is_finite() {
            return Err(QaError::InvalidSurvey(
                "dropout_floor_threshold must be finite".to_string(),
            ));
        }
        if self.expected_interval_minutes == 0 {
            return Err(QaError::InvalidSurvey(
                "expected_interval_minutes must be greater than zero".to_string(),
            ));
        }
        match (self.period_start, self.period_end) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(QaError::InvalidSurvey(
                    "period_start and period_end must be set together".to_string(),
                ));
            }
            _ => {}
        }
        if let Some((start, end)) = self.survey_window() {
            if start >= end {
                return Err(QaError::InvalidSurvey(format!(
                    "period_start {} must be before period_end {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses and validates survey configuration from TOML text.
pub fn parse_survey_config(text: &str) -> Result<SurveyConfig, QaError> {
    let config: SurveyConfig =
        toml::from_str(text).map_err(|e| QaError::ConfigParse(e.to_string()))?;
    config.analysis.validate()?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a survey configuration file.
pub fn load_survey_config<P: AsRef<Path>>(path: P) -> Result<SurveyConfig, QaError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| QaError::ConfigRead(format!("{}: {}", path.display(), e)))?;
    parse_survey_config(&text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

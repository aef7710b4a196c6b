//! Core data types for the sewer flow QA service.
//!
//! This module defines the shared domain model imported by all other modules:
//! the per-monitor metrics record and its derived status, storm events, and
//! the error type used at the configuration and data-loading boundaries.
//! It contains no logic beyond small conversions and formatting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Monitor QA types
// ---------------------------------------------------------------------------

/// Data quality metrics for a single flow monitor over one analysis run.
///
/// No field is clamped: completeness and volume imbalance exceed 100 when the
/// actual figure exceeds the expected one, and imbalance is negative when
/// downstream volume is lower than upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorMetrics {
    pub completeness_pct: f64,
    pub dropout_pct: f64,
    pub diurnal_cv: f64,
    pub qh_correlation: f64,
    pub volume_imbalance_pct: f64,
}

/// A metrics record in which any field may be absent.
///
/// This is what the RAG classifier consumes. Absent fields fall back to
/// values that never raise a flag (see `qa::rag::RAG_CHECKS`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialMetrics {
    pub completeness_pct: Option<f64>,
    pub dropout_pct: Option<f64>,
    pub diurnal_cv: Option<f64>,
    pub qh_correlation: Option<f64>,
    pub volume_imbalance_pct: Option<f64>,
}

impl From<&MonitorMetrics> for PartialMetrics {
    fn from(m: &MonitorMetrics) -> Self {
        PartialMetrics {
            completeness_pct: Some(m.completeness_pct),
            dropout_pct: Some(m.dropout_pct),
            diurnal_cv: Some(m.diurnal_cv),
            qh_correlation: Some(m.qh_correlation),
            volume_imbalance_pct: Some(m.volume_imbalance_pct),
        }
    }
}

/// Three-band RAG status derived from the number of violated QA checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MonitorStatus {
    Good,
    Moderate,
    Bad,
}

impl MonitorStatus {
    /// 0 flags → GOOD, 1–2 → MODERATE, 3 or more → BAD.
    pub fn from_flag_count(flags: usize) -> Self {
        match flags {
            0 => MonitorStatus::Good,
            1 | 2 => MonitorStatus::Moderate,
            _ => MonitorStatus::Bad,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MonitorStatus::Good => "GOOD",
            MonitorStatus::Moderate => "MODERATE",
            MonitorStatus::Bad => "BAD",
        }
    }
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Storm types
// ---------------------------------------------------------------------------

/// Whether a storm is large enough to matter for hydraulic analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StormSignificance {
    Significant,
    Minor,
}

impl StormSignificance {
    pub fn as_str(self) -> &'static str {
        match self {
            StormSignificance::Significant => "Significant",
            StormSignificance::Minor => "Minor",
        }
    }
}

impl std::fmt::Display for StormSignificance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discrete storm segmented out of a rain gauge's intensity series.
///
/// `start_time` and `end_time` are the first and last rain-positive samples
/// of the burst, so `duration_minutes` excludes any dry tail and undercounts
/// wall-clock storm length when the burst contains intermittent dry samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormEvent {
    /// Sequential, starting at 1 for each segmentation run.
    pub id: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Sum of the rain-positive sample values in the burst.
    pub depth_mm: f64,
    pub peak_intensity: f64,
    pub duration_minutes: i64,
    pub significance: StormSignificance,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when loading survey configuration or survey data.
///
/// The numeric core never produces these; degenerate inputs there return
/// documented sentinel values instead.
#[derive(Debug, PartialEq)]
pub enum QaError {
    /// The configuration file could not be read.
    ConfigRead(String),
    /// The configuration file is not valid TOML for the expected schema.
    ConfigParse(String),
    /// The configuration parsed but describes an inconsistent survey.
    InvalidSurvey(String),
    /// The survey data file could not be read.
    DataRead(String),
    /// The survey data file is not valid JSON for the expected schema.
    DataParse(String),
}

impl std::fmt::Display for QaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QaError::ConfigRead(msg) => write!(f, "Config read error: {}", msg),
            QaError::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
            QaError::InvalidSurvey(msg) => write!(f, "Invalid survey: {}", msg),
            QaError::DataRead(msg) => write!(f, "Data read error: {}", msg),
            QaError::DataParse(msg) => write!(f, "Data parse error: {}", msg),
        }
    }
}

impl std::error::Error for QaError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

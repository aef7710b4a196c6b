//! Monitor and rain gauge registry for a flow survey.
//!
//! The registry is the single source of truth for site identifiers: the
//! analysis only assesses monitors and gauges listed here, and upstream
//! links between monitors (used for volume balance) must reference other
//! registered monitors.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::model::QaError;

// ---------------------------------------------------------------------------
// Site metadata
// ---------------------------------------------------------------------------

/// A flow monitor installed in the sewer network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSite {
    /// Survey identifier, e.g. "FM01".
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Monitors whose flow drains into this one.
    #[serde(default)]
    pub upstream: Vec<String>,
}

/// A tipping-bucket rain gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainGaugeSite {
    /// Survey identifier, e.g. "RG01".
    pub id: String,
    pub name: String,
}

/// A complete survey definition as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub monitors: Vec<MonitorSite>,
    #[serde(default)]
    pub rain_gauges: Vec<RainGaugeSite>,
}

impl SurveyConfig {
    /// Looks up a monitor by id. Returns `None` if not registered.
    pub fn find_monitor(&self, id: &str) -> Option<&MonitorSite> {
        self.monitors.iter().find(|m| m.id == id)
    }

    pub fn find_rain_gauge(&self, id: &str) -> Option<&RainGaugeSite> {
        self.rain_gauges.iter().find(|g| g.id == id)
    }

    /// Monitors that list `id` as upstream, i.e. the ones it drains into.
    pub fn downstream_of(&self, id: &str) -> Vec<&MonitorSite> {
        self.monitors
            .iter()
            .filter(|m| m.upstream.iter().any(|u| u == id))
            .collect()
    }

    /// Checks identifier uniqueness and upstream references.
    pub fn validate(&self) -> Result<(), QaError> {
        let mut seen = HashSet::new();
        for monitor in &self.monitors {
            if monitor.id.trim().is_empty() {
                return Err(QaError::InvalidSurvey(format!(
                    "monitor '{}' has an empty id",
                    monitor.name
                )));
            }
            if !seen.insert(monitor.id.as_str()) {
                return Err(QaError::InvalidSurvey(format!(
                    "duplicate monitor id '{}'",
                    monitor.id
                )));
            }
        }

        for monitor in &self.monitors {
            for up in &monitor.upstream {
                if up == &monitor.id {
                    return Err(QaError::InvalidSurvey(format!(
                        "monitor '{}' lists itself as upstream",
                        monitor.id
                    )));
                }
                if !seen.contains(up.as_str()) {
                    return Err(QaError::InvalidSurvey(format!(
                        "monitor '{}' references unknown upstream monitor '{}'",
                        monitor.id, up
                    )));
                }
            }
        }

        let mut gauges = HashSet::new();
        for gauge in &self.rain_gauges {
            if gauge.id.trim().is_empty() {
                return Err(QaError::InvalidSurvey(format!(
                    "rain gauge '{}' has an empty id",
                    gauge.name
                )));
            }
            if !gauges.insert(gauge.id.as_str()) {
                return Err(QaError::InvalidSurvey(format!(
                    "duplicate rain gauge id '{}'",
                    gauge.id
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

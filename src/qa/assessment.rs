//! Per-monitor assessment and portfolio summary.
//!
//! Which channel feeds which metric:
//! - completeness and diurnal flatness use flow, falling back to depth and
//!   then velocity;
//! - dropout uses depth, falling back to flow and then velocity;
//! - coherence pairs flow and depth readings sharing a timestamp;
//! - volume imbalance compares this monitor's flow volume against the sum of
//!   its upstream monitors' volumes.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::model::{MonitorMetrics, MonitorStatus, PartialMetrics};
use crate::qa::metrics::{
    completeness, diurnal_flatness, dropout_rate, hydraulic_coherence, volume_imbalance,
};
use crate::qa::rag::{classify, violated_checks};
use crate::series::{align_by_timestamp, expected_rows, flow_volume, missing_pct, TimeSeries};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The parsed channels of one monitor. Any channel may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSeries {
    pub flow: Option<TimeSeries>,
    pub depth: Option<TimeSeries>,
    pub velocity: Option<TimeSeries>,
}

impl MonitorSeries {
    /// Flow if recorded, otherwise depth, otherwise velocity.
    fn primary(&self) -> Option<&TimeSeries> {
        self.flow
            .as_ref()
            .or(self.depth.as_ref())
            .or(self.velocity.as_ref())
    }

    /// Depth if recorded, otherwise flow, otherwise velocity.
    fn dropout_channel(&self) -> Option<&TimeSeries> {
        self.depth
            .as_ref()
            .or(self.flow.as_ref())
            .or(self.velocity.as_ref())
    }

    /// Integrated flow volume, 0.0 without a flow channel.
    pub fn volume(&self) -> f64 {
        self.flow.as_ref().map(flow_volume).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// Metrics and derived status for one monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorAssessment {
    pub monitor_id: String,
    pub metrics: MonitorMetrics,
    /// Share of primary-channel samples that were missing or non-finite.
    pub missing_pct: f64,
    pub status: MonitorStatus,
    /// Names of the violated QA checks.
    pub flags: Vec<String>,
}

impl MonitorAssessment {
    /// Derives status and flags from `metrics`.
    pub fn from_metrics(monitor_id: &str, metrics: MonitorMetrics, missing_pct: f64) -> Self {
        let partial = PartialMetrics::from(&metrics);
        MonitorAssessment {
            monitor_id: monitor_id.to_string(),
            metrics,
            missing_pct,
            status: classify(&partial),
            flags: violated_checks(&partial)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

fn completeness_of(series: Option<&TimeSeries>, config: &AnalysisConfig) -> f64 {
    let interval = config.expected_interval_minutes;
    match (config.survey_window(), series) {
        (Some((start, end)), Some(s)) => completeness(
            s.finite_count_between(start, end),
            expected_rows(start, end, interval),
        ),
        (Some((start, end)), None) => completeness(0, expected_rows(start, end, interval)),
        (None, Some(s)) => match (s.first_timestamp(), s.last_timestamp()) {
            (Some(start), Some(end)) => {
                completeness(s.finite_count(), expected_rows(start, end, interval))
            }
            _ => 0.0,
        },
        (None, None) => 0.0,
    }
}

/// Computes every metric for one monitor.
///
/// `upstream_volume` is the summed flow volume of the monitors draining into
/// this one, or `None` when it has no upstream links.
pub fn assess_monitor(
    monitor_id: &str,
    series: &MonitorSeries,
    upstream_volume: Option<f64>,
    config: &AnalysisConfig,
) -> MonitorAssessment {
    let primary = series.primary();

    let dropout_pct = series
        .dropout_channel()
        .map(|s| dropout_rate(&s.finite_values(), config.dropout_floor_threshold))
        .unwrap_or(0.0);

    let diurnal_cv = primary
        .map(|s| diurnal_flatness(&s.finite_values()))
        .unwrap_or(0.0);

    let qh_correlation = match (&series.flow, &series.depth) {
        (Some(flow), Some(depth)) => {
            let (q, h) = align_by_timestamp(flow, depth);
            hydraulic_coherence(&q, &h)
        }
        _ => 0.0,
    };

    let volume_imbalance_pct = upstream_volume
        .map(|upstream| volume_imbalance(upstream, series.volume()))
        .unwrap_or(0.0);

    let metrics = MonitorMetrics {
        completeness_pct: completeness_of(primary, config),
        dropout_pct,
        diurnal_cv,
        qh_correlation,
        volume_imbalance_pct,
    };

    MonitorAssessment::from_metrics(monitor_id, metrics, primary.map(missing_pct).unwrap_or(0.0))
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// Status counts across all assessed monitors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub total: usize,
    pub good: usize,
    pub moderate: usize,
    pub bad: usize,
}

impl PortfolioSummary {
    pub fn from_assessments(assessments: &[MonitorAssessment]) -> Self {
        let mut summary = PortfolioSummary::default();
        for a in assessments {
            summary.total += 1;
            match a.status {
                MonitorStatus::Good => summary.good += 1,
                MonitorStatus::Moderate => summary.moderate += 1,
                MonitorStatus::Bad => summary.bad += 1,
            }
        }
        summary
    }

    pub fn count(&self, status: MonitorStatus) -> usize {
        match status {
            MonitorStatus::Good => self.good,
            MonitorStatus::Moderate => self.moderate,
            MonitorStatus::Bad => self.bad,
        }
    }

    /// Share of monitors in `status`, in percent. 0.0 for an empty portfolio.
    pub fn share_pct(&self, status: MonitorStatus) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.count(status) as f64 / self.total as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()
    }

    /// One reading every 15 minutes starting at `t0`.
    fn every_15_min(values: &[f64]) -> TimeSeries {
        TimeSeries::from_samples(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(t0() + Duration::minutes(15 * i as i64), v))
                .collect(),
        )
    }

    /// A flow signal with a clear day/night swing and depth tracking it.
    fn healthy_monitor() -> MonitorSeries {
        let flow: Vec<f64> = (0..96)
            .map(|i| 10.0 + 5.0 * (i as f64 * std::f64::consts::PI / 48.0).sin())
            .collect();
        let depth: Vec<f64> = flow.iter().map(|q| 0.05 * q + 0.1).collect();
        MonitorSeries {
            flow: Some(every_15_min(&flow)),
            depth: Some(every_15_min(&depth)),
            velocity: None,
        }
    }

    // --- Single monitor -----------------------------------------------------

    #[test]
    fn test_healthy_monitor_is_good() {
        let a = assess_monitor("FM02", &healthy_monitor(), None, &AnalysisConfig::default());
        assert_eq!(a.metrics.completeness_pct, 100.0);
        assert_eq!(a.metrics.dropout_pct, 0.0);
        assert!(a.metrics.diurnal_cv > 0.05);
        assert!(a.metrics.qh_correlation > 0.99);
        assert_eq!(a.metrics.volume_imbalance_pct, 0.0);
        assert_eq!(a.status, MonitorStatus::Good);
        assert!(a.flags.is_empty());
    }

    #[test]
    fn test_flatlined_disconnected_monitor_is_bad() {
        // Flow stuck at zero, depth stuck at zero: dropout, flatness and
        // coherence all flag.
        let series = MonitorSeries {
            flow: Some(every_15_min(&[0.0; 96])),
            depth: Some(every_15_min(&[0.0; 96])),
            velocity: None,
        };
        let a = assess_monitor("FM01", &series, None, &AnalysisConfig::default());
        assert_eq!(a.metrics.dropout_pct, 100.0);
        assert_eq!(a.status, MonitorStatus::Bad);
        assert_eq!(
            a.flags,
            vec!["dropout", "diurnal_flatness", "hydraulic_coherence"]
        );
    }

    #[test]
    fn test_survey_window_drives_completeness() {
        // 96 readings cover one day; a two-day window is ~50% complete.
        let config = AnalysisConfig {
            period_start: Some(t0()),
            period_end: Some(t0() + Duration::days(2) - Duration::minutes(15)),
            ..AnalysisConfig::default()
        };
        let a = assess_monitor("FM03", &healthy_monitor(), None, &config);
        assert_eq!(a.metrics.completeness_pct, 50.0);
        assert!(a.flags.contains(&"completeness".to_string()));
        assert_eq!(a.status, MonitorStatus::Moderate);
    }

    #[test]
    fn test_missing_samples_reduce_completeness_and_are_reported() {
        let mut flow = vec![10.0, 12.0, 14.0, 12.0];
        flow[1] = f64::NAN;
        let series = MonitorSeries {
            flow: Some(every_15_min(&flow)),
            ..MonitorSeries::default()
        };
        let a = assess_monitor("FM04", &series, None, &AnalysisConfig::default());
        assert_eq!(a.missing_pct, 25.0);
        assert_eq!(a.metrics.completeness_pct, 75.0);
    }

    #[test]
    fn test_monitor_without_data_is_bad() {
        let a = assess_monitor(
            "FM05",
            &MonitorSeries::default(),
            None,
            &AnalysisConfig::default(),
        );
        assert_eq!(a.metrics.completeness_pct, 0.0);
        assert_eq!(a.metrics.dropout_pct, 0.0);
        assert_eq!(a.missing_pct, 0.0);
        // No data also leaves flatness and coherence at their 0.0 sentinels.
        assert_eq!(
            a.flags,
            vec!["diurnal_flatness", "hydraulic_coherence", "completeness"]
        );
        assert_eq!(a.status, MonitorStatus::Bad);
    }

    #[test]
    fn test_velocity_only_monitor_uses_velocity_channel() {
        let velocity: Vec<f64> = (0..96)
            .map(|i| 0.5 + 0.2 * (i as f64 * std::f64::consts::PI / 48.0).sin())
            .collect();
        let series = MonitorSeries {
            velocity: Some(every_15_min(&velocity)),
            ..MonitorSeries::default()
        };
        let a = assess_monitor("FM07", &series, None, &AnalysisConfig::default());
        assert_eq!(a.metrics.completeness_pct, 100.0);
        assert_eq!(a.metrics.dropout_pct, 0.0);
        assert!(a.metrics.diurnal_cv > 0.05);
        // Coherence still needs flow and depth.
        assert_eq!(a.flags, vec!["hydraulic_coherence"]);
        assert_eq!(a.status, MonitorStatus::Moderate);
    }

    #[test]
    fn test_upstream_volume_yields_imbalance() {
        let series = MonitorSeries {
            flow: Some(every_15_min(&[2.0, 2.0])),
            ..MonitorSeries::default()
        };
        // Own volume: 2.0 × 900 s = 1800.
        assert_eq!(series.volume(), 1800.0);
        let a = assess_monitor("FM06", &series, Some(1500.0), &AnalysisConfig::default());
        assert_eq!(a.metrics.volume_imbalance_pct, 20.0);
        let zero_upstream = assess_monitor("FM06", &series, Some(0.0), &AnalysisConfig::default());
        assert_eq!(zero_upstream.metrics.volume_imbalance_pct, 100.0);
    }

    // --- Portfolio ----------------------------------------------------------

    fn assessment_with(status_flags: usize) -> MonitorAssessment {
        let mut metrics = MonitorMetrics {
            completeness_pct: 100.0,
            dropout_pct: 0.0,
            diurnal_cv: 1.0,
            qh_correlation: 1.0,
            volume_imbalance_pct: 0.0,
        };
        if status_flags >= 1 {
            metrics.dropout_pct = 50.0;
        }
        if status_flags >= 2 {
            metrics.diurnal_cv = 0.0;
        }
        if status_flags >= 3 {
            metrics.qh_correlation = 0.0;
        }
        MonitorAssessment::from_metrics("FM", metrics, 0.0)
    }

    #[test]
    fn test_portfolio_counts_and_shares() {
        let assessments = vec![
            assessment_with(0),
            assessment_with(1),
            assessment_with(2),
            assessment_with(3),
        ];
        let summary = PortfolioSummary::from_assessments(&assessments);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.good, 1);
        assert_eq!(summary.moderate, 2);
        assert_eq!(summary.bad, 1);
        assert_eq!(summary.share_pct(MonitorStatus::Moderate), 50.0);
    }

    #[test]
    fn test_empty_portfolio_shares_are_zero() {
        let summary = PortfolioSummary::from_assessments(&[]);
        assert_eq!(summary.share_pct(MonitorStatus::Good), 0.0);
    }
}

//! Analysis run orchestration.
//!
//! Ties the registry, the parsed dataset, and the pure QA / storm engines
//! together for one analysis run. Only configured sites are analysed; data
//! for unregistered ids is reported and skipped, and when an id repeats in
//! the data only its first entry is used.

use serde::Serialize;
use std::collections::HashMap;

use crate::dataset::SurveyDataset;
use crate::logging::{self, Component};
use crate::model::StormEvent;
use crate::qa::assessment::{
    assess_monitor, MonitorAssessment, MonitorSeries, PortfolioSummary,
};
use crate::rainfall::storms::StormSegmenter;
use crate::survey::SurveyConfig;

/// Storms found at one rain gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeStorms {
    pub gauge_id: String,
    pub storms: Vec<StormEvent>,
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub monitors: Vec<MonitorAssessment>,
    pub portfolio: PortfolioSummary,
    pub rain_gauges: Vec<GaugeStorms>,
}

impl AnalysisReport {
    pub fn monitor(&self, id: &str) -> Option<&MonitorAssessment> {
        self.monitors.iter().find(|m| m.monitor_id == id)
    }

    pub fn storms_for(&self, gauge_id: &str) -> Option<&[StormEvent]> {
        self.rain_gauges
            .iter()
            .find(|g| g.gauge_id == gauge_id)
            .map(|g| g.storms.as_slice())
    }
}

/// Warns about data entries that will not be analysed.
fn check_data_ids(config: &SurveyConfig, data: &SurveyDataset) {
    for monitor in &data.monitors {
        if config.find_monitor(&monitor.id).is_none() {
            logging::warn(
                Component::Config,
                Some(monitor.id.as_str()),
                "data for unregistered monitor ignored",
            );
        }
    }
    for gauge in &data.rain_gauges {
        if config.find_rain_gauge(&gauge.id).is_none() {
            logging::warn(
                Component::Config,
                Some(gauge.id.as_str()),
                "data for unregistered rain gauge ignored",
            );
        }
    }
    for id in data.duplicate_monitor_ids() {
        logging::warn(
            Component::Monitor,
            Some(id),
            "monitor listed more than once in data; later entries ignored",
        );
    }
    for id in data.duplicate_rain_gauge_ids() {
        logging::warn(
            Component::RainGauge,
            Some(id),
            "rain gauge listed more than once in data; later entries ignored",
        );
    }
}

/// Runs monitor QA and storm segmentation for every configured site.
pub fn run_analysis(config: &SurveyConfig, data: &SurveyDataset) -> AnalysisReport {
    check_data_ids(config, data);

    let empty = MonitorSeries::default();
    let series_by_id: HashMap<&str, &MonitorSeries> = config
        .monitors
        .iter()
        .map(|site| {
            let series = match data.monitor(&site.id) {
                Some(m) => &m.series,
                None => {
                    logging::warn(
                        Component::Monitor,
                        Some(site.id.as_str()),
                        "no data supplied",
                    );
                    &empty
                }
            };
            (site.id.as_str(), series)
        })
        .collect();

    let monitors: Vec<MonitorAssessment> = config
        .monitors
        .iter()
        .map(|site| {
            let upstream_volume: Option<f64> = if site.upstream.is_empty() {
                None
            } else {
                Some(
                    site.upstream
                        .iter()
                        .filter_map(|up| series_by_id.get(up.as_str()))
                        .map(|s| s.volume())
                        .sum(),
                )
            };
            let series = series_by_id.get(site.id.as_str()).copied().unwrap_or(&empty);
            let assessment = assess_monitor(&site.id, series, upstream_volume, &config.analysis);
            logging::log_monitor_status(&assessment);
            assessment
        })
        .collect();

    let portfolio = PortfolioSummary::from_assessments(&monitors);
    logging::log_portfolio_summary(&portfolio);

    let segmenter = StormSegmenter::new(config.analysis.dry_gap_hours);
    let rain_gauges: Vec<GaugeStorms> = config
        .rain_gauges
        .iter()
        .map(|site| {
            let storms = match data.rain_gauge(&site.id) {
                Some(gauge) => segmenter.segment(&gauge.intensity),
                None => {
                    logging::warn(
                        Component::RainGauge,
                        Some(site.id.as_str()),
                        "no data supplied",
                    );
                    Vec::new()
                }
            };
            logging::log_storm_summary(&site.id, &storms);
            GaugeStorms {
                gauge_id: site.id.clone(),
                storms,
            }
        })
        .collect();

    AnalysisReport {
        monitors,
        portfolio,
        rain_gauges,
    }
}

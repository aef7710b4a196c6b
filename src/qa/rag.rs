//! RAG (GOOD / MODERATE / BAD) status classification.
//!
//! Each QA check is an entry in `RAG_CHECKS`: a named predicate over one
//! metric plus the value assumed when that metric is absent. The defaults
//! never trigger their own predicate, so a missing metric cannot make a
//! monitor look worse. Checks are evaluated independently and the number of
//! violations alone decides the band.

use crate::model::{MonitorStatus, PartialMetrics};

/// A single threshold check against one field of a metrics record.
pub struct QaCheck {
    pub name: &'static str,
    /// Value used when the metric is absent. Must not violate the check.
    pub innocent_default: f64,
    field: fn(&PartialMetrics) -> Option<f64>,
    violated_by: fn(f64) -> bool,
}

impl QaCheck {
    /// Returns `true` if the record violates this check.
    pub fn is_violated(&self, metrics: &PartialMetrics) -> bool {
        let value = (self.field)(metrics).unwrap_or(self.innocent_default);
        (self.violated_by)(value)
    }
}

fn dropout_pct(m: &PartialMetrics) -> Option<f64> {
    m.dropout_pct
}

fn diurnal_cv(m: &PartialMetrics) -> Option<f64> {
    m.diurnal_cv
}

fn qh_correlation(m: &PartialMetrics) -> Option<f64> {
    m.qh_correlation
}

fn completeness_pct(m: &PartialMetrics) -> Option<f64> {
    m.completeness_pct
}

fn dropout_too_high(v: f64) -> bool {
    v > 20.0
}

fn signal_too_flat(v: f64) -> bool {
    v < 0.05
}

fn coherence_too_low(v: f64) -> bool {
    v < 0.3
}

fn record_incomplete(v: f64) -> bool {
    v < 95.0
}

/// The QA checks contributing to the RAG flag count, in reporting order.
pub static RAG_CHECKS: &[QaCheck] = &[
    QaCheck {
        name: "dropout",
        innocent_default: 0.0,
        field: dropout_pct,
        violated_by: dropout_too_high,
    },
    QaCheck {
        name: "diurnal_flatness",
        innocent_default: 1.0,
        field: diurnal_cv,
        violated_by: signal_too_flat,
    },
    QaCheck {
        name: "hydraulic_coherence",
        innocent_default: 1.0,
        field: qh_correlation,
        violated_by: coherence_too_low,
    },
    QaCheck {
        name: "completeness",
        innocent_default: 100.0,
        field: completeness_pct,
        violated_by: record_incomplete,
    },
];

/// Names of the checks the record violates, in `RAG_CHECKS` order.
pub fn violated_checks(metrics: &PartialMetrics) -> Vec<&'static str> {
    RAG_CHECKS
        .iter()
        .filter(|check| check.is_violated(metrics))
        .map(|check| check.name)
        .collect()
}

pub fn count_flags(metrics: &PartialMetrics) -> usize {
    RAG_CHECKS.iter().filter(|check| check.is_violated(metrics)).count()
}

/// Classifies a metrics record into a RAG band.
pub fn classify(metrics: &PartialMetrics) -> MonitorStatus {
    MonitorStatus::from_flag_count(count_flags(metrics))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> PartialMetrics {
        PartialMetrics {
            completeness_pct: Some(99.0),
            dropout_pct: Some(2.0),
            diurnal_cv: Some(0.5),
            qh_correlation: Some(0.9),
            volume_imbalance_pct: Some(4.0),
        }
    }

    // --- Defaults -----------------------------------------------------------

    #[test]
    fn test_empty_record_is_good() {
        assert_eq!(classify(&PartialMetrics::default()), MonitorStatus::Good);
        assert_eq!(count_flags(&PartialMetrics::default()), 0);
    }

    #[test]
    fn test_innocent_defaults_never_violate_their_own_check() {
        for check in RAG_CHECKS {
            assert!(
                !(check.violated_by)(check.innocent_default),
                "default for '{}' must not raise a flag",
                check.name
            );
        }
    }

    // --- Single flags -------------------------------------------------------

    #[test]
    fn test_single_dropout_flag_is_moderate() {
        let metrics = PartialMetrics {
            dropout_pct: Some(25.0),
            diurnal_cv: Some(0.5),
            qh_correlation: Some(0.5),
            completeness_pct: Some(99.0),
            volume_imbalance_pct: None,
        };
        assert_eq!(count_flags(&metrics), 1);
        assert_eq!(violated_checks(&metrics), vec!["dropout"]);
        assert_eq!(classify(&metrics), MonitorStatus::Moderate);
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly on each threshold: none flags.
        let metrics = PartialMetrics {
            dropout_pct: Some(20.0),
            diurnal_cv: Some(0.05),
            qh_correlation: Some(0.3),
            completeness_pct: Some(95.0),
            volume_imbalance_pct: None,
        };
        assert_eq!(classify(&metrics), MonitorStatus::Good);
    }

    #[test]
    fn test_volume_imbalance_does_not_contribute_flags() {
        let metrics = PartialMetrics {
            volume_imbalance_pct: Some(500.0),
            ..healthy()
        };
        assert_eq!(classify(&metrics), MonitorStatus::Good);
    }

    // --- Bands --------------------------------------------------------------

    #[test]
    fn test_two_flags_is_moderate() {
        let metrics = PartialMetrics {
            diurnal_cv: Some(0.01),
            completeness_pct: Some(80.0),
            ..healthy()
        };
        assert_eq!(violated_checks(&metrics), vec!["diurnal_flatness", "completeness"]);
        assert_eq!(classify(&metrics), MonitorStatus::Moderate);
    }

    #[test]
    fn test_three_flags_is_bad() {
        let metrics = PartialMetrics {
            dropout_pct: Some(80.0),
            qh_correlation: Some(0.12),
            completeness_pct: Some(20.1),
            ..healthy()
        };
        assert_eq!(classify(&metrics), MonitorStatus::Bad);
    }

    #[test]
    fn test_all_four_flags_is_bad() {
        let metrics = PartialMetrics {
            dropout_pct: Some(80.0),
            diurnal_cv: Some(0.0),
            qh_correlation: Some(0.0),
            completeness_pct: Some(0.0),
            volume_imbalance_pct: None,
        };
        assert_eq!(count_flags(&metrics), 4);
        assert_eq!(classify(&metrics), MonitorStatus::Bad);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let metrics = PartialMetrics {
            dropout_pct: Some(21.0),
            ..healthy()
        };
        assert_eq!(classify(&metrics), classify(&metrics));
    }
}

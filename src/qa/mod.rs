//! Monitor data quality assessment.
//!
//! Submodules:
//! - `metrics`: pure metric calculators (completeness, dropout, flatness,
//!   coherence, volume imbalance).
//! - `rag`: flag counting and GOOD / MODERATE / BAD classification.
//! - `assessment`: per-monitor assessment and portfolio summary.

pub mod assessment;
pub mod metrics;
pub mod rag;

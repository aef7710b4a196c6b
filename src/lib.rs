//! Sewer flow survey QA service.
//!
//! Evaluates the data quality of flow monitors (completeness, dropout,
//! diurnal flatness, flow/depth coherence, volume balance), classifies each
//! monitor GOOD / MODERATE / BAD, and segments rain gauge records into
//! storm events.
//!
//! Modules:
//! - `model`: shared domain types and the boundary error type.
//! - `series`: timestamped series and series helpers.
//! - `qa`: metric calculators, RAG classification, monitor assessment.
//! - `rainfall`: storm segmentation.
//! - `config` / `survey`: TOML survey configuration and site registry.
//! - `dataset`: JSON survey data input.
//! - `analysis`: runs a full analysis over config + data.
//! - `logging`: structured console/file logging.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod model;
pub mod qa;
pub mod rainfall;
pub mod series;
pub mod survey;

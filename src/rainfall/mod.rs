//! Rainfall analysis for the sewer flow QA service.
//!
//! Submodules:
//! - `storms`: segments rain gauge intensity series into storm events.

pub mod storms;

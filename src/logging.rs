//! Structured logging for the sewer flow QA service
//!
//! Provides context-rich logging with monitor/gauge identifiers,
//! timestamps, and severity levels. Supports both console output
//! and file-based logging for batch runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::{MonitorStatus, StormEvent};
use crate::qa::assessment::{MonitorAssessment, PortfolioSummary};
use crate::rainfall::storms::{significant_count, total_depth_mm};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name, case-insensitively. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Monitor,
    RainGauge,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Monitor => write!(f, "MONITOR"),
            Component::RainGauge => write!(f, "RAIN"),
            Component::Config => write!(f, "CFG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        // A poisoned lock only means another thread panicked mid-log.
        let mut guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(logger);
    }

    fn format_entry(
        level: LogLevel,
        component: &Component,
        site_id: Option<&str>,
        message: &str,
    ) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, site_part, message)
    }

    fn log(&self, level: LogLevel, component: &Component, site_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, site_id, message);
        let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, site_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, site_part, message),
                LogLevel::Info => println!("   {}{}: {}", component, site_part, message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", component, site_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, site_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, site_id, message);
        }
    }
}

pub fn info(component: Component, site_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, site_id, message);
}

pub fn warn(component: Component, site_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, site_id, message);
}

pub fn error(component: Component, site_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, site_id, message);
}

pub fn debug(component: Component, site_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, site_id, message);
}

// ---------------------------------------------------------------------------
// Domain Logging
// ---------------------------------------------------------------------------

/// Level at which a monitor's status is reported.
pub fn status_level(status: MonitorStatus) -> LogLevel {
    match status {
        MonitorStatus::Good => LogLevel::Info,
        MonitorStatus::Moderate => LogLevel::Warning,
        MonitorStatus::Bad => LogLevel::Error,
    }
}

pub fn format_monitor_status(assessment: &MonitorAssessment) -> String {
    let m = &assessment.metrics;
    let mut message = format!(
        "{} (completeness {:.1}%, dropout {:.1}%, cv {:.3}, r {:.2})",
        assessment.status, m.completeness_pct, m.dropout_pct, m.diurnal_cv, m.qh_correlation
    );
    if !assessment.flags.is_empty() {
        message.push_str(&format!(" flags: {}", assessment.flags.join(", ")));
    }
    message
}

/// Log a monitor's RAG status: GOOD as info, MODERATE as warning, BAD as error
pub fn log_monitor_status(assessment: &MonitorAssessment) {
    dispatch(
        status_level(assessment.status),
        Component::Monitor,
        Some(assessment.monitor_id.as_str()),
        &format_monitor_status(assessment),
    );
}

/// Log the storms found at one rain gauge
pub fn log_storm_summary(gauge_id: &str, storms: &[StormEvent]) {
    let message = format!(
        "{} storm(s), {} significant, {:.1} mm total",
        storms.len(),
        significant_count(storms),
        total_depth_mm(storms)
    );
    info(Component::RainGauge, Some(gauge_id), &message);
}

/// Log the portfolio health summary
pub fn log_portfolio_summary(summary: &PortfolioSummary) {
    let message = format!(
        "Portfolio: {} monitors, {} GOOD, {} MODERATE, {} BAD",
        summary.total, summary.good, summary.moderate, summary.bad
    );

    if summary.bad > 0 {
        error(Component::System, None, &message);
    } else if summary.moderate > 0 {
        warn(Component::System, None, &message);
    } else {
        info(Component::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonitorMetrics;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" warn "), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_status_level_escalates_with_status() {
        assert_eq!(status_level(MonitorStatus::Good), LogLevel::Info);
        assert_eq!(status_level(MonitorStatus::Moderate), LogLevel::Warning);
        assert_eq!(status_level(MonitorStatus::Bad), LogLevel::Error);
    }

    #[test]
    fn test_monitor_status_message_lists_flags() {
        let metrics = MonitorMetrics {
            completeness_pct: 20.1,
            dropout_pct: 80.0,
            diurnal_cv: 0.4,
            qh_correlation: 0.12,
            volume_imbalance_pct: 0.0,
        };
        let assessment = MonitorAssessment::from_metrics("FM01", metrics, 0.0);
        let message = format_monitor_status(&assessment);
        assert!(message.starts_with("BAD"), "got {}", message);
        assert!(message.contains("flags: dropout, hydraulic_coherence, completeness"));
    }

    #[test]
    fn test_entry_format_includes_component_and_site() {
        let entry =
            Logger::format_entry(LogLevel::Warning, &Component::Monitor, Some("FM03"), "low r");
        assert!(entry.ends_with("WARN MONITOR [FM03]: low r"), "got {}", entry);
    }

    #[test]
    fn test_logging_before_init_is_a_no_op() {
        // Must not panic whether or not another test initialised the logger.
        debug(Component::System, None, "probe");
    }
}

//! Command-line entry point for the sewer flow QA service.
//!
//! Usage: sewer_qa [survey.toml] [survey_data.json] [--json]
//!
//! Paths fall back to SEWER_QA_CONFIG / SEWER_QA_DATA (a `.env` file is
//! honoured), then to `survey.toml` / `survey_data.json` in the working
//! directory. SEWER_QA_LOG_LEVEL and SEWER_QA_LOG_FILE control logging.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use sewer_qa_service::analysis::{run_analysis, AnalysisReport};
use sewer_qa_service::config::load_survey_config;
use sewer_qa_service::dataset::load_dataset;
use sewer_qa_service::logging::{self, Component, LogLevel};
use sewer_qa_service::model::MonitorStatus;
use sewer_qa_service::survey::SurveyConfig;

#[derive(Parser, Debug)]
#[command(name = "sewer_qa")]
#[command(about = "Data quality assessment and storm segmentation for sewer flow surveys")]
struct Args {
    /// Survey definition (TOML)
    #[arg(env = "SEWER_QA_CONFIG", default_value = "survey.toml")]
    config: PathBuf,

    /// Parsed survey data (JSON)
    #[arg(env = "SEWER_QA_DATA", default_value = "survey_data.json")]
    data: PathBuf,

    /// Print the full report as JSON instead of the console summary
    #[arg(long)]
    json: bool,

    /// Minimum log level: debug, info, warn or error
    #[arg(long, env = "SEWER_QA_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    log_level: LogLevel,

    /// Also append log entries to this file
    #[arg(long, env = "SEWER_QA_LOG_FILE")]
    log_file: Option<String>,
}

fn parse_level(name: &str) -> Result<LogLevel, String> {
    LogLevel::parse(name).ok_or_else(|| format!("unknown log level '{}'", name))
}

fn main() -> Result<(), Box<dyn Error>> {
    // Load .env before parsing so its values feed the env fallbacks.
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Keep stdout clean for the JSON report.
    let level = if args.json {
        args.log_level.max(LogLevel::Warning)
    } else {
        args.log_level
    };
    logging::init_logger(level, args.log_file.as_deref(), false);

    logging::debug(
        Component::Config,
        None,
        &format!("loading survey from {}", args.config.display()),
    );
    let config = load_survey_config(&args.config)?;
    logging::debug(
        Component::Config,
        None,
        &format!("loading data from {}", args.data.display()),
    );
    let data = load_dataset(&args.data)?;

    let report = run_analysis(&config, &data);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&config, &report);
    }
    Ok(())
}

fn print_summary(config: &SurveyConfig, report: &AnalysisReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 SEWER FLOW SURVEY QA SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!(
        "{:<8} {:>13} {:>9} {:>8} {:>7} {:>10}  {:<9} Drains to",
        "Monitor", "Completeness", "Dropout", "CV", "r(Q,H)", "Imbalance", "Status"
    );
    for a in &report.monitors {
        let m = &a.metrics;
        let drains_to: Vec<&str> = config
            .downstream_of(&a.monitor_id)
            .iter()
            .map(|site| site.id.as_str())
            .collect();
        println!(
            "{:<8} {:>12.1}% {:>8.1}% {:>8.3} {:>7.2} {:>9.1}%  {:<9} {}",
            a.monitor_id,
            m.completeness_pct,
            m.dropout_pct,
            m.diurnal_cv,
            m.qh_correlation,
            m.volume_imbalance_pct,
            a.status.as_str(),
            drains_to.join(", ")
        );
    }

    let p = &report.portfolio;
    println!();
    println!("Total Monitors: {}", p.total);
    for status in [MonitorStatus::Good, MonitorStatus::Moderate, MonitorStatus::Bad] {
        println!(
            "  {:<9} {} ({:.1}%)",
            status.as_str(),
            p.count(status),
            p.share_pct(status)
        );
    }

    for gauge in &report.rain_gauges {
        println!();
        println!("🌧  Rain gauge {}: {} storm(s)", gauge.gauge_id, gauge.storms.len());
        for s in &gauge.storms {
            println!(
                "  #{:<3} {} → {}  {:>6.1} mm  peak {:>5.1}  {:>5} min  {}",
                s.id,
                s.start_time.format("%Y-%m-%d %H:%M"),
                s.end_time.format("%Y-%m-%d %H:%M"),
                s.depth_mm,
                s.peak_intensity,
                s.duration_minutes,
                s.significance
            );
        }
    }
    println!("═══════════════════════════════════════════════════════════");
}

//! Report generation
//!
//! Renders an analysis as JSON (full time series) or as a plain-text signal
//! table, and builds the payload handed to an external diagnostic tool.

use anyhow::Result;
use can_log_synth::{Analysis, DiagnosticRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    generator: &'static str,
    #[serde(flatten)]
    analysis: &'a Analysis,
}

/// Full analysis as JSON, stamped with the generation time
pub fn render_json(
    analysis: &Analysis,
    generated_at: DateTime<Utc>,
    pretty: bool,
) -> Result<String> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        generator: concat!("can-log-cli ", env!("CARGO_PKG_VERSION")),
        analysis,
    };
    Ok(if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    })
}

/// Signal metadata in the shape the diagnostic collaborator expects
pub fn render_diagnostics_request(analysis: &Analysis, pretty: bool) -> Result<String> {
    let request = DiagnosticRequest::from_analysis(analysis);
    Ok(if pretty {
        serde_json::to_string_pretty(&request)?
    } else {
        serde_json::to_string(&request)?
    })
}

/// Per-signal table followed by a short summary
pub fn render_txt(analysis: &Analysis, generated_at: DateTime<Utc>) -> String {
    let name_width = analysis
        .signals
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Signal".len());

    let mut out = String::new();
    let rule = "=".repeat(name_width + 82);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  Signal Report: {}", analysis.file_name);
    let _ = writeln!(out, "  Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:<nw$}  {:<8}  {:>21}  {:>10}  {:>10}  {:>10}  {:>10}",
        "Signal",
        "Unit",
        "Range",
        "Min",
        "Max",
        "Avg",
        "StdDev",
        nw = name_width
    );
    let _ = writeln!(out, "{}", "-".repeat(name_width + 82));

    for signal in &analysis.signals {
        let range = format!("[{}|{}]", signal.min, signal.max);
        match signal.stats {
            Some(stats) => {
                let _ = writeln!(
                    out,
                    "{:<nw$}  {:<8}  {:>21}  {:>10.2}  {:>10.2}  {:>10.2}  {:>10.2}",
                    signal.name,
                    signal.unit,
                    range,
                    stats.min,
                    stats.max,
                    stats.avg,
                    stats.std_dev,
                    nw = name_width
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{:<nw$}  {:<8}  {:>21}  {:>10}  {:>10}  {:>10}  {:>10}",
                    signal.name, signal.unit, range, "-", "-", "-", "-",
                    nw = name_width
                );
            }
        }
    }

    let duration = analysis.data.last().map(|p| p.timestamp).unwrap_or(0.0);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Source:   {}", analysis.source);
    let _ = writeln!(out, "  Signals:  {}", analysis.signals.len());
    let _ = writeln!(out, "  Samples:  {}", analysis.data.len());
    let _ = writeln!(out, "  Duration: {:.1} s", duration);
    out
}

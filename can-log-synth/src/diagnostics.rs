//! Diagnostic collaborator contract
//!
//! The diagnostic step runs outside this crate (typically a language-model
//! call). This module only defines what is sent to it and what comes back.

use crate::types::{Analysis, Result};
use serde::{Deserialize, Serialize};

/// Per-signal metadata handed to the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSummary {
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub std_dev: f64,
}

/// Input to the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRequest {
    pub file_name: String,
    pub signals: Vec<SignalSummary>,
}

impl DiagnosticRequest {
    /// Build the request from an analysis; signals without statistics report zeros
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let signals = analysis
            .signals
            .iter()
            .map(|s| {
                let stats = s.stats.unwrap_or_default();
                SignalSummary {
                    name: s.name.clone(),
                    unit: s.unit.clone(),
                    min: stats.min,
                    max: stats.max,
                    avg: stats.avg,
                    std_dev: stats.std_dev,
                }
            })
            .collect();

        Self {
            file_name: analysis.file_name.clone(),
            signals,
        }
    }
}

/// Output of the collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub summary: String,
    pub anomalies: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Anything that can turn signal metadata into a diagnostic report
pub trait Diagnostician {
    fn diagnose(&self, request: &DiagnosticRequest) -> Result<DiagnosticReport>;
}

impl<F> Diagnostician for F
where
    F: Fn(&DiagnosticRequest) -> Result<DiagnosticReport>,
{
    fn diagnose(&self, request: &DiagnosticRequest) -> Result<DiagnosticReport> {
        self(request)
    }
}

/// Send an analysis to a diagnostician, propagating its failure unchanged
pub fn diagnose(
    analysis: &Analysis,
    diagnostician: &dyn Diagnostician,
) -> Result<DiagnosticReport> {
    let request = DiagnosticRequest::from_analysis(analysis);
    log::info!(
        "Requesting diagnostics for {} ({} signals)",
        request.file_name,
        request.signals.len()
    );
    let report = diagnostician.diagnose(&request)?;
    log::debug!("Diagnostics returned {} anomalies", report.anomalies.len());
    Ok(report)
}

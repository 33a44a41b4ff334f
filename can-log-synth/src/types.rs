//! Core types for the signal synthesis library
//!
//! This module defines the descriptors produced by discovery, the row-oriented
//! time series handed to consumers, and the error type shared by every stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Unit assigned when discovery could not find one
pub const UNIT_PLACEHOLDER: &str = "-";

/// Unit carried by the synthetic fallback channels
pub const UNIT_RAW: &str = "raw";

/// Errors that can occur while analyzing a log
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Diagnostic collaborator failed: {0}")]
    Diagnostic(String),
}

/// Summary statistics attached to a descriptor once its series exists
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub std_dev: f64,
}

/// A discovered signal and its physical metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    /// Signal name, unique within one discovery result
    pub name: String,
    /// Engineering unit (e.g. "km/h", "°C", "V")
    pub unit: String,
    /// Minimum physical value (`0` together with `max == 0` means undeclared)
    pub min: f64,
    /// Maximum physical value
    pub max: f64,
    /// Scale factor from raw to physical value
    pub factor: f64,
    /// Offset added after scaling
    pub offset: f64,
    /// Display tag, opaque to the engine
    pub color: String,
    /// Statistics over the produced series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SignalStats>,
}

impl SignalDescriptor {
    /// Create a descriptor with undeclared range, unit scaling and placeholder unit
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: UNIT_PLACEHOLDER.to_string(),
            min: 0.0,
            max: 0.0,
            factor: 1.0,
            offset: 0.0,
            color: String::new(),
            stats: None,
        }
    }

    /// Builder method: set the unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Builder method: set the declared physical range
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Builder method: set factor and offset
    pub fn with_scaling(mut self, factor: f64, offset: f64) -> Self {
        self.factor = factor;
        self.offset = offset;
        self
    }

    /// True if the range is the "undeclared" sentinel.
    ///
    /// Only `[0|0]` with a factor of exactly 1 counts; a zero range with any other
    /// factor is taken at face value.
    pub fn has_degenerate_range(&self) -> bool {
        self.min == 0.0 && self.max == 0.0 && self.factor == 1.0
    }

    /// True if the unit was never declared
    pub fn has_placeholder_unit(&self) -> bool {
        self.unit.is_empty() || self.unit == UNIT_PLACEHOLDER
    }
}

/// One time step of the output series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Seconds since the start of the series
    pub timestamp: f64,
    /// One value per discovered signal
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl DataPoint {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Value of a signal at this step
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Which discovery strategy produced the signal set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    /// Parsed from a signal description file
    DescriptionFile,
    /// Printable strings scanned out of a binary blob
    BinaryScan,
    /// Fixed list of generic channels
    Fallback,
    /// Header row of a delimited text export (values are measured, not synthesized)
    DelimitedText,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverySource::DescriptionFile => write!(f, "description file"),
            DiscoverySource::BinaryScan => write!(f, "binary string scan"),
            DiscoverySource::Fallback => write!(f, "synthetic fallback"),
            DiscoverySource::DelimitedText => write!(f, "delimited text"),
        }
    }
}

/// Complete result of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Name of the analyzed file
    pub file_name: String,
    /// Strategy that produced the signal set
    pub source: DiscoverySource,
    /// Descriptors with statistics attached
    pub signals: Vec<SignalDescriptor>,
    /// Row-oriented time series
    pub data: Vec<DataPoint>,
}

impl Analysis {
    /// Look up a descriptor by name
    pub fn signal(&self, name: &str) -> Option<&SignalDescriptor> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Extract one signal's column from the row-oriented data
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        self.signal(name)?;
        Some(self.data.iter().filter_map(|p| p.get(name)).collect())
    }

    /// Timestamps of every row
    pub fn timestamps(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.timestamp).collect()
    }
}

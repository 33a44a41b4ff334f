//! Pipeline configuration
//!
//! Every constant the pipeline depends on (simulation length, sample rate,
//! discovery limits, display palette) lives here so that tests can run with
//! smaller cycles and callers can tune limits without touching the engine.

use crate::types::{Result, SynthError};
use serde::{Deserialize, Serialize};

/// Upper bound on samples per drive cycle (a day at 10 Hz fits)
pub const MAX_POINT_COUNT: usize = 1_000_000;

/// Configuration for one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Length of the simulated drive cycle in seconds
    #[serde(default = "default_duration")]
    pub duration_secs: f64,

    /// Time step between samples in seconds
    #[serde(default = "default_interval")]
    pub sample_interval_secs: f64,

    /// Seed of the drive-cycle generator
    #[serde(default = "default_drive_seed")]
    pub drive_seed: u32,

    /// Display tags assigned to signals in discovery order
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Maximum number of bytes read from a binary input
    #[serde(default = "default_scan_limit")]
    pub binary_scan_limit: usize,

    /// Shortest printable run accepted as a signal name
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,

    /// Longest printable run accepted as a signal name
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,

    /// Cap on names kept from a binary scan
    #[serde(default = "default_max_binary_signals")]
    pub max_binary_signals: usize,

    /// A binary scan yielding fewer names than this falls back to generic channels
    #[serde(default = "default_min_binary_signals")]
    pub min_binary_signals: usize,

    /// Number of generic channels in the fallback list
    #[serde(default = "default_fallback_count")]
    pub fallback_signal_count: usize,

    /// Maximum number of data rows parsed from delimited text
    #[serde(default = "default_max_rows")]
    pub max_delimited_rows: usize,
}

fn default_duration() -> f64 {
    120.0
}

fn default_interval() -> f64 {
    0.1
}

fn default_drive_seed() -> u32 {
    20_240_611
}

fn default_palette() -> Vec<String> {
    [
        "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
        "#f97316", "#6366f1",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn default_scan_limit() -> usize {
    5 * 1024 * 1024
}

fn default_min_token_len() -> usize {
    4
}

fn default_max_token_len() -> usize {
    64
}

fn default_max_binary_signals() -> usize {
    40
}

fn default_min_binary_signals() -> usize {
    6
}

fn default_fallback_count() -> usize {
    10
}

fn default_max_rows() -> usize {
    20_000
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            sample_interval_secs: default_interval(),
            drive_seed: default_drive_seed(),
            palette: default_palette(),
            binary_scan_limit: default_scan_limit(),
            min_token_len: default_min_token_len(),
            max_token_len: default_max_token_len(),
            max_binary_signals: default_max_binary_signals(),
            min_binary_signals: default_min_binary_signals(),
            fallback_signal_count: default_fallback_count(),
            max_delimited_rows: default_max_rows(),
        }
    }
}

impl SynthConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the drive-cycle duration
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Builder method: set the sampling interval
    pub fn with_sample_interval(mut self, secs: f64) -> Self {
        self.sample_interval_secs = secs;
        self
    }

    /// Builder method: set the drive-cycle seed
    pub fn with_drive_seed(mut self, seed: u32) -> Self {
        self.drive_seed = seed;
        self
    }

    /// Builder method: replace the display palette
    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    /// Builder method: set the binary read budget
    pub fn with_binary_scan_limit(mut self, bytes: usize) -> Self {
        self.binary_scan_limit = bytes;
        self
    }

    /// Builder method: cap the number of delimited rows
    pub fn with_max_delimited_rows(mut self, rows: usize) -> Self {
        self.max_delimited_rows = rows;
        self
    }

    /// Number of samples in the drive cycle
    pub fn point_count(&self) -> usize {
        (self.duration_secs / self.sample_interval_secs).round() as usize
    }

    /// Display tag for the signal at `index`
    pub fn color_for(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return String::new();
        }
        self.palette[index % self.palette.len()].clone()
    }

    /// Check that the simulation parameters make sense
    pub fn validate(&self) -> Result<()> {
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if !(self.sample_interval_secs.is_finite() && self.sample_interval_secs > 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "sample interval must be positive, got {}",
                self.sample_interval_secs
            )));
        }
        let points = (self.duration_secs / self.sample_interval_secs).round();
        if points > MAX_POINT_COUNT as f64 {
            return Err(SynthError::InvalidConfig(format!(
                "{}s at {}s intervals is {} samples, the limit is {}",
                self.duration_secs, self.sample_interval_secs, points, MAX_POINT_COUNT
            )));
        }
        if self.min_token_len > self.max_token_len {
            return Err(SynthError::InvalidConfig(format!(
                "min token length {} exceeds max token length {}",
                self.min_token_len, self.max_token_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SynthConfig::new()
            .with_duration(10.0)
            .with_sample_interval(0.5)
            .with_drive_seed(7)
            .with_max_delimited_rows(100);

        assert_eq!(config.point_count(), 20);
        assert_eq!(config.drive_seed, 7);
        assert_eq!(config.max_delimited_rows, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_point_count() {
        assert_eq!(SynthConfig::default().point_count(), 1200);
    }

    #[test]
    fn test_palette_wraps() {
        let config = SynthConfig::new().with_palette(vec!["a".into(), "b".into()]);
        assert_eq!(config.color_for(0), "a");
        assert_eq!(config.color_for(3), "b");

        let empty = SynthConfig::new().with_palette(Vec::new());
        assert_eq!(empty.color_for(5), "");
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        assert!(SynthConfig::new().with_duration(0.0).validate().is_err());
        assert!(SynthConfig::new().with_sample_interval(-1.0).validate().is_err());
        assert!(SynthConfig::new().with_sample_interval(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_cycle() {
        let err = SynthConfig::new().with_duration(1e15).validate().unwrap_err();
        assert!(matches!(err, SynthError::InvalidConfig(_)));
        assert!(SynthConfig::new()
            .with_duration(1.0)
            .with_sample_interval(1e-12)
            .validate()
            .is_err());

        let day = SynthConfig::new().with_duration(86_400.0).with_sample_interval(0.1);
        assert!(day.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: SynthConfig = serde_json::from_str(r#"{"duration_secs": 30.0}"#).unwrap();
        assert_eq!(config.duration_secs, 30.0);
        assert_eq!(config.sample_interval_secs, 0.1);
        assert_eq!(config.fallback_signal_count, 10);
    }
}

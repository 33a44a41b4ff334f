//! Statistics aggregation
//!
//! Min, max, mean and population standard deviation per series, rounded to
//! two decimals, plus the unit backfill applied before results leave the engine.

use crate::signals::heuristics;
use crate::types::{SignalDescriptor, SignalStats};

/// Round `value` to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Summarize a series. An empty series summarizes to all zeros.
pub fn summarize(series: &[f64]) -> SignalStats {
    if series.is_empty() {
        return SignalStats::default();
    }

    let n = series.len() as f64;
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    SignalStats {
        min: round_to(min, 2),
        max: round_to(max, 2),
        avg: round_to(mean, 2),
        std_dev: round_to(variance.sqrt(), 2),
    }
}

/// Attach statistics to a descriptor and backfill a placeholder unit from its name
pub fn attach(descriptor: &mut SignalDescriptor, series: &[f64]) {
    descriptor.stats = Some(summarize(series));
    backfill_unit(descriptor);
}

/// Replace a placeholder unit with the one implied by the signal name, if any
pub fn backfill_unit(descriptor: &mut SignalDescriptor) {
    if descriptor.has_placeholder_unit() {
        if let Some(unit) = heuristics::unit_hint(&descriptor.name) {
            descriptor.unit = unit.to_string();
        }
    }
}

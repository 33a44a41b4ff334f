//! Name-based signal heuristics
//!
//! Signals discovered without metadata only have a name. This module holds the
//! keyword matcher used by every name cascade in the crate and the table that
//! infers a physical range, unit and resolution from a name.

use crate::types::SignalDescriptor;

/// Case-insensitive keyword predicate over a signal name
#[derive(Debug, Clone, Copy)]
pub struct NamePattern {
    /// Any of these substrings selects the pattern
    pub any_of: &'static [&'static str],
    /// Any of these substrings vetoes the pattern
    pub none_of: &'static [&'static str],
}

impl NamePattern {
    pub const fn new(any_of: &'static [&'static str], none_of: &'static [&'static str]) -> Self {
        Self { any_of, none_of }
    }

    /// Match against a name that is already lowercased
    pub fn matches_lower(&self, lower: &str) -> bool {
        self.any_of.iter().any(|k| lower.contains(k))
            && !self.none_of.iter().any(|k| lower.contains(k))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.matches_lower(&name.to_lowercase())
    }
}

/// Range, unit and resolution inferred from a name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeHint {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
    pub factor: f64,
}

const fn hint(min: f64, max: f64, unit: &'static str, factor: f64) -> RangeHint {
    RangeHint {
        min,
        max,
        unit,
        factor,
    }
}

/// Ordered, first match wins
const RANGE_RULES: &[(NamePattern, RangeHint)] = &[
    (NamePattern::new(&["counter", "cnt", "alive", "rolling"], &[]), hint(0.0, 15.0, "", 1.0)),
    (NamePattern::new(&["state", "status", "mode", "flag"], &[]), hint(0.0, 7.0, "", 1.0)),
    (NamePattern::new(&["gear"], &["ratio"]), hint(0.0, 6.0, "", 1.0)),
    (NamePattern::new(&["wiper", "light", "lamp"], &[]), hint(0.0, 1.0, "", 1.0)),
    (
        NamePattern::new(&["rpm", "enginespeed", "engine_speed", "engspd", "eng_spd"], &[]),
        hint(0.0, 8000.0, "rpm", 1.0),
    ),
    (NamePattern::new(&["speed", "spd", "velocity"], &[]), hint(0.0, 250.0, "km/h", 0.01)),
    (NamePattern::new(&["temp", "tmp", "coolant"], &[]), hint(-40.0, 110.0, "°C", 0.1)),
    (NamePattern::new(&["volt", "batt", "vbat", "supply"], &[]), hint(0.0, 16.0, "V", 0.01)),
    (NamePattern::new(&["current", "amp"], &[]), hint(-200.0, 200.0, "A", 0.1)),
    (NamePattern::new(&["press", "boost", "prs"], &[]), hint(0.0, 1000.0, "kPa", 0.1)),
    (NamePattern::new(&["torque", "trq"], &[]), hint(-500.0, 500.0, "Nm", 0.1)),
    (NamePattern::new(&["yaw"], &[]), hint(-100.0, 100.0, "deg/s", 0.01)),
    (NamePattern::new(&["steer"], &[]), hint(-540.0, 540.0, "deg", 0.1)),
    (
        NamePattern::new(&["throttle", "pedal", "brake", "load", "pos"], &[]),
        hint(0.0, 100.0, "%", 0.1),
    ),
    (NamePattern::new(&["accel", "lat", "lon"], &[]), hint(-20.0, 20.0, "m/s²", 0.01)),
];

const DEFAULT_HINT: RangeHint = hint(0.0, 100.0, "", 0.1);

/// Infer range, unit and resolution from a signal name
pub fn range_hint(name: &str) -> RangeHint {
    let lower = name.to_lowercase();
    RANGE_RULES
        .iter()
        .find(|(pattern, _)| pattern.matches_lower(&lower))
        .map(|(_, hint)| *hint)
        .unwrap_or(DEFAULT_HINT)
}

/// Fill in range, resolution and unit for a descriptor whose range is undeclared.
///
/// The unit is only replaced when it is a placeholder. Returns true if the
/// descriptor was changed.
pub fn apply_range_hint(descriptor: &mut SignalDescriptor) -> bool {
    if !descriptor.has_degenerate_range() {
        return false;
    }
    let hint = range_hint(&descriptor.name);
    log::trace!(
        "Substituting heuristic range [{}|{}] for '{}'",
        hint.min,
        hint.max,
        descriptor.name
    );
    descriptor.min = hint.min;
    descriptor.max = hint.max;
    descriptor.factor = hint.factor;
    if descriptor.has_placeholder_unit() && !hint.unit.is_empty() {
        descriptor.unit = hint.unit.to_string();
    }
    true
}

/// Unit inferred from the name alone, if the table knows one
pub fn unit_hint(name: &str) -> Option<&'static str> {
    let unit = range_hint(name).unit;
    (!unit.is_empty()).then_some(unit)
}

//! Signal synthesis
//!
//! Turns a descriptor into a value series. A signal whose name identifies a
//! drive-cycle channel is aliased straight onto it; anything else is classified
//! into an archetype with its own generation rule. Every value is then clamped
//! to the declared range and snapped onto the `factor`/`offset` grid.

use crate::drive_cycle::{DriveChannel, DriveCycle, MAX_RPM, MAX_STEERING_DEG, MIN_RPM};
use crate::rng::SeededRng;
use crate::signals::heuristics::{self, NamePattern};
use crate::stats::round_to;
use crate::types::SignalDescriptor;
use std::f64::consts::PI;
use std::fmt;

/// Output precision never exceeds this many decimals
pub const MAX_DECIMALS: u32 = 6;

/// Rolling radius used to turn road speed into wheel rpm, metres
const WHEEL_RADIUS_M: f64 = 0.32;

/// Engine speed above which the alternator lifts the supply to its charging level
const CHARGING_RPM: f64 = 1000.0;

/// Names mapped directly onto drive-cycle channels. Ordered, first match wins.
const ALIASES: &[(NamePattern, DriveChannel)] = &[
    (
        NamePattern::new(
            &["rpm", "enginespeed", "engine_speed", "engspd", "eng_spd"],
            &["fan", "pump", "turbo", "wheel", "whl", "motor", "limit", "target"],
        ),
        DriveChannel::Rpm,
    ),
    (
        NamePattern::new(
            &["speed", "spd", "velocity"],
            &["wheel", "whl", "fan", "pump", "wiper", "engine", "eng", "motor", "limit", "target"],
        ),
        DriveChannel::Speed,
    ),
    (
        NamePattern::new(&["throttle", "pedal", "tps"], &["brake"]),
        DriveChannel::Throttle,
    ),
    (
        NamePattern::new(&["brake", "brk"], &["light", "lamp", "temp", "wear", "fluid"]),
        DriveChannel::Brake,
    ),
    (NamePattern::new(&["gear"], &["ratio", "temp"]), DriveChannel::Gear),
    (NamePattern::new(&["wiper"], &[]), DriveChannel::Wipers),
    (NamePattern::new(&["light", "lamp"], &[]), DriveChannel::Lights),
];

/// Synthesis rule class chosen from a signal name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Counter,
    State,
    WheelSpeed,
    Torque,
    Temperature,
    Voltage,
    Steering,
    YawRate,
    Pressure,
    Generic,
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Archetype::Counter => "counter",
            Archetype::State => "state",
            Archetype::WheelSpeed => "wheel speed",
            Archetype::Torque => "torque",
            Archetype::Temperature => "temperature",
            Archetype::Voltage => "voltage",
            Archetype::Steering => "steering",
            Archetype::YawRate => "yaw rate",
            Archetype::Pressure => "pressure",
            Archetype::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// Ordered, first match wins; unmatched names are generic
const ARCHETYPES: &[(NamePattern, Archetype)] = &[
    (NamePattern::new(&["counter", "cnt", "alive", "rolling"], &[]), Archetype::Counter),
    (NamePattern::new(&["state", "status", "mode", "flag"], &[]), Archetype::State),
    (NamePattern::new(&["wheel", "whl"], &["steer"]), Archetype::WheelSpeed),
    (NamePattern::new(&["torque", "trq"], &[]), Archetype::Torque),
    (NamePattern::new(&["temp", "tmp", "coolant"], &[]), Archetype::Temperature),
    (NamePattern::new(&["volt", "batt", "vbat", "supply"], &[]), Archetype::Voltage),
    (NamePattern::new(&["steer"], &[]), Archetype::Steering),
    (NamePattern::new(&["yaw"], &[]), Archetype::YawRate),
    (NamePattern::new(&["press", "boost", "prs"], &[]), Archetype::Pressure),
];

/// How a signal will be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Copied from a drive-cycle channel
    Alias(DriveChannel),
    /// Generated by an archetype rule
    Archetype(Archetype),
}

/// Classify a signal by name: drive-cycle aliases first, then archetypes
pub fn classify(name: &str) -> Classification {
    let lower = name.to_lowercase();
    if let Some((_, channel)) = ALIASES.iter().find(|(p, _)| p.matches_lower(&lower)) {
        return Classification::Alias(*channel);
    }
    let archetype = ARCHETYPES
        .iter()
        .find(|(p, _)| p.matches_lower(&lower))
        .map(|(_, a)| *a)
        .unwrap_or(Archetype::Generic);
    Classification::Archetype(archetype)
}

/// A generated series together with the metadata it was generated against
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedSignal {
    /// Descriptor after heuristic range substitution
    pub descriptor: SignalDescriptor,
    pub values: Vec<f64>,
}

/// Generates series against one shared drive cycle
pub struct Synthesizer<'a> {
    cycle: &'a DriveCycle,
}

impl<'a> Synthesizer<'a> {
    pub fn new(cycle: &'a DriveCycle) -> Self {
        Self { cycle }
    }

    /// Generate the series for one descriptor.
    ///
    /// Output depends only on the descriptor and the drive cycle; the random
    /// stream is seeded from the signal name.
    pub fn synthesize(&self, descriptor: &SignalDescriptor) -> SynthesizedSignal {
        let mut descriptor = descriptor.clone();
        heuristics::apply_range_hint(&mut descriptor);

        let mut rng = SeededRng::from_name(&descriptor.name);
        let classification = classify(&descriptor.name);
        log::debug!("Signal '{}' classified as {:?}", descriptor.name, classification);

        let raw = match classification {
            Classification::Alias(channel) => self.cycle.channel(channel).to_vec(),
            Classification::Archetype(archetype) => self.generate(archetype, &descriptor, &mut rng),
        };

        let decimals = output_decimals(&descriptor);
        let values = raw.into_iter().map(|v| finalize(v, &descriptor, decimals)).collect();

        SynthesizedSignal { descriptor, values }
    }

    fn generate(
        &self,
        archetype: Archetype,
        d: &SignalDescriptor,
        rng: &mut SeededRng,
    ) -> Vec<f64> {
        let c = self.cycle;
        let n = c.len();
        let dt = c.time_step;
        let lo = d.min.min(d.max);
        let hi = d.min.max(d.max);
        let span = hi - lo;

        match archetype {
            Archetype::Counter => {
                let modulus = (hi.floor() as i64).saturating_add(1).max(1);
                (0..n).map(|i| (i as i64 % modulus) as f64).collect()
            }

            Archetype::State => {
                let mut out = Vec::with_capacity(n);
                let mut level = lo;
                let mut dwell = 0usize;
                for _ in 0..n {
                    if dwell == 0 {
                        level = rng.range(lo, hi + 1.0).floor().min(hi);
                        dwell = (rng.range(2.0, 10.0) / dt).ceil() as usize;
                    }
                    dwell -= 1;
                    out.push(level);
                }
                out
            }

            Archetype::WheelSpeed => {
                let slip = rng.range(-0.01, 0.01);
                let as_rpm = d.name.to_lowercase().contains("rpm")
                    || d.unit.to_lowercase().contains("rpm");
                c.speed
                    .iter()
                    .map(|&speed| {
                        if speed < 0.5 {
                            return 0.0;
                        }
                        let kmh = speed * (1.0 + slip) + rng.range(-0.2, 0.2);
                        if as_rpm {
                            kmh / 3.6 / (2.0 * PI * WHEEL_RADIUS_M) * 60.0
                        } else {
                            kmh
                        }
                    })
                    .collect()
            }

            Archetype::Torque => (0..n)
                .map(|i| {
                    let base = if c.throttle[i] > 0.0 {
                        hi * c.load[i] / 100.0
                    } else if c.brake[i] > 0.0 && lo < 0.0 {
                        lo * 0.3 * c.brake[i] / 100.0
                    } else {
                        lo.max(0.0) + span * 0.02
                    };
                    base + rng.range(-1.0, 1.0) * span * 0.005
                })
                .collect(),

            Archetype::Temperature => {
                let ambient = 20.0f64.clamp(lo, hi.max(lo));
                let target = 0.85 * hi;
                let tau = (n as f64 * dt / 4.0).max(dt);
                (0..n)
                    .map(|i| {
                        let t = i as f64 * dt;
                        target + (ambient - target) * (-t / tau).exp()
                            + c.load[i] / 100.0 * span * 0.03
                            + rng.range(-0.5, 0.5) * span * 0.002
                    })
                    .collect()
            }

            Archetype::Voltage => {
                let running_level = lo + span * 0.88;
                let resting_level = lo + span * 0.78;
                let mut v = resting_level;
                (0..n)
                    .map(|i| {
                        let target = if c.rpm[i] > CHARGING_RPM {
                            running_level
                        } else {
                            resting_level
                        };
                        v += (target - v) * 0.05;
                        v - c.load[i] / 100.0 * span * 0.01
                            + rng.range(-1.0, 1.0) * span * 0.002
                    })
                    .collect()
            }

            Archetype::Steering => {
                let limit = lo.abs().max(hi.abs());
                let scale = if limit > 0.0 && limit < MAX_STEERING_DEG {
                    limit / MAX_STEERING_DEG
                } else {
                    1.0
                };
                c.steering.iter().map(|s| s * scale).collect()
            }

            Archetype::YawRate => (0..n)
                .map(|i| {
                    if i == 0 {
                        return 0.0;
                    }
                    let steer_rate = (c.steering[i] - c.steering[i - 1]) / dt;
                    steer_rate * (c.speed[i] / 3.6) * 0.01 + rng.range(-0.05, 0.05)
                })
                .collect(),

            Archetype::Pressure => (0..n)
                .map(|i| {
                    let frac = ((c.rpm[i] - MIN_RPM) / (MAX_RPM - MIN_RPM)).clamp(0.0, 1.0);
                    lo + span * (0.15 + 0.75 * frac)
                        + c.throttle[i] / 100.0 * span * 0.05
                        + rng.range(-1.0, 1.0) * span * 0.01
                })
                .collect(),

            Archetype::Generic => {
                let mid = (lo + hi) / 2.0;
                let amplitude = span * 0.3;
                let period = rng.range(5.0, 30.0);
                let phase = rng.range(0.0, 2.0 * PI);
                let damping = rng.range(20.0, 60.0);
                (0..n)
                    .map(|i| {
                        let t = i as f64 * dt;
                        let envelope = 0.4 + 0.6 * (-t / damping).exp();
                        mid + amplitude * envelope * (2.0 * PI * t / period + phase).sin()
                            + rng.range(-1.0, 1.0) * span * 0.03
                    })
                    .collect()
            }
        }
    }
}

/// Snap `value` onto the grid `offset + k * factor`
pub fn quantize(value: f64, factor: f64, offset: f64) -> f64 {
    ((value - offset) / factor).round() * factor + offset
}

/// Decimal places implied by a number's scientific form, capped at [`MAX_DECIMALS`].
///
/// `0.01` is `1e-2` and needs two places; `1.25e-1` needs three.
pub fn decimals_of(x: f64) -> u32 {
    if x == 0.0 || !x.is_finite() {
        return 0;
    }
    let sci = format!("{:e}", x.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return 0;
    };
    let frac_digits = mantissa.split_once('.').map(|(_, f)| f.len()).unwrap_or(0) as i32;
    let exponent: i32 = exponent.parse().unwrap_or(0);
    (frac_digits - exponent).clamp(0, MAX_DECIMALS as i32) as u32
}

/// Output precision for a descriptor's grid
pub fn output_decimals(d: &SignalDescriptor) -> u32 {
    decimals_of(d.factor).max(decimals_of(d.offset))
}

/// Clamp, quantize and round one generated value.
///
/// Clamping only happens for a real range (`max > min`). A grid point pushed
/// outside the range by quantization is stepped back inside.
pub fn finalize(value: f64, d: &SignalDescriptor, decimals: u32) -> f64 {
    let bounded = d.max > d.min;
    let mut v = if bounded { value.clamp(d.min, d.max) } else { value };

    if d.factor != 0.0 && d.factor.is_finite() {
        v = quantize(v, d.factor, d.offset);
        if bounded {
            let step = d.factor.abs();
            // Ignore float noise from the grid multiplication
            let tolerance = step * 1e-9;
            if v > d.max + tolerance && v - step >= d.min {
                v -= step;
            } else if v < d.min - tolerance && v + step <= d.max {
                v += step;
            }
        }
    }

    round_to(v, decimals)
}

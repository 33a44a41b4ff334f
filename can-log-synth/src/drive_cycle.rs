//! Drive-cycle simulation
//!
//! A four-state machine (idle, accelerate, cruise, decelerate) drives a simple
//! longitudinal vehicle model. One pass produces nine time-aligned channels
//! that act as the physical ground truth for every correlated signal.
//!
//! State transitions and the per-step physics are separate functions so each
//! can be exercised on its own.

use crate::config::SynthConfig;
use crate::rng::SeededRng;
use std::fmt;

/// Hard limits of the vehicle model
pub const MAX_SPEED_KMH: f64 = 240.0;
pub const MIN_RPM: f64 = 600.0;
pub const MAX_RPM: f64 = 7000.0;
pub const IDLE_RPM: f64 = 800.0;
pub const MAX_STEERING_DEG: f64 = 540.0;

/// Steering only wanders above this speed
const STEERING_SPEED_THRESHOLD: f64 = 5.0;
const STEERING_STEP_DEG: f64 = 6.0;
const STEERING_DECAY: f64 = 0.98;

/// Acceleration magnitude (m/s²) below which the vehicle is coasting
const COAST_BAND: f64 = 0.1;

/// Engine speed per km/h in each gear
const GEAR_RATIOS: [f64; 6] = [110.0, 65.0, 45.0, 35.0, 28.0, 23.0];

/// Upper speed bound (km/h, exclusive) of gears 0..=5; anything faster is 6th
const GEAR_SHIFT_SPEEDS: [f64; 6] = [0.5, 15.0, 30.0, 50.0, 75.0, 100.0];

/// Scripted switch windows as fractions of the cycle
const WIPER_WINDOWS: &[(f64, f64)] = &[(0.25, 0.40), (0.70, 0.80)];
const LIGHT_WINDOWS: &[(f64, f64)] = &[(0.55, 1.0)];

/// Phase of the drive cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    Idle,
    Accel,
    Cruise,
    Decel,
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveState::Idle => write!(f, "IDLE"),
            DriveState::Accel => write!(f, "ACCEL"),
            DriveState::Cruise => write!(f, "CRUISE"),
            DriveState::Decel => write!(f, "DECEL"),
        }
    }
}

/// Outcome of a state transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: DriveState,
    /// Dwell time in the new state, seconds
    pub timer_secs: f64,
    /// Speed the new state steers toward, km/h
    pub target_kmh: f64,
}

/// Advance the state machine once the current state's timer has expired
pub fn transition(state: DriveState, target_kmh: f64, rng: &mut SeededRng) -> Transition {
    match state {
        DriveState::Idle => Transition {
            state: DriveState::Accel,
            target_kmh: rng.range(30.0, 120.0),
            timer_secs: rng.range(5.0, 12.0),
        },
        DriveState::Accel => Transition {
            state: DriveState::Cruise,
            target_kmh,
            timer_secs: rng.range(8.0, 20.0),
        },
        DriveState::Cruise => {
            if rng.chance(0.5) {
                Transition {
                    state: DriveState::Decel,
                    target_kmh: 0.0,
                    timer_secs: rng.range(6.0, 12.0),
                }
            } else {
                Transition {
                    state: DriveState::Accel,
                    target_kmh: rng.range(30.0, 130.0),
                    timer_secs: rng.range(5.0, 10.0),
                }
            }
        }
        DriveState::Decel => Transition {
            state: DriveState::Idle,
            target_kmh: 0.0,
            timer_secs: rng.range(2.0, 6.0),
        },
    }
}

/// Proportional control law per state, returns m/s²
pub fn acceleration(state: DriveState, speed_kmh: f64, target_kmh: f64, t: f64) -> f64 {
    let error = target_kmh - speed_kmh;
    match state {
        DriveState::Idle => (-speed_kmh * 0.5).clamp(-3.0, 0.0),
        DriveState::Accel => (error * 0.15).clamp(-1.0, 3.0),
        DriveState::Cruise => (error * 0.05).clamp(-0.5, 0.5) + 0.1 * (t * 0.3).sin(),
        DriveState::Decel => (error * 0.2).clamp(-4.0, 0.0),
    }
}

/// Gear engaged at a given speed (0 only when stopped)
pub fn gear_for_speed(speed_kmh: f64) -> u8 {
    GEAR_SHIFT_SPEEDS
        .iter()
        .position(|&limit| speed_kmh < limit)
        .unwrap_or(GEAR_SHIFT_SPEEDS.len()) as u8
}

/// Throttle, brake and load (all %) implied by the current acceleration
pub fn pedal_split(accel: f64, speed_kmh: f64) -> (f64, f64, f64) {
    if accel > COAST_BAND {
        let throttle = (10.0 + accel / 3.0 * 80.0).min(100.0);
        let load = (throttle * 0.8 + speed_kmh * 0.1).min(100.0);
        (throttle, 0.0, load)
    } else if accel < -COAST_BAND {
        let brake = (-accel / 4.0 * 100.0).min(100.0);
        (0.0, brake, 0.0)
    } else {
        (0.0, 0.0, (speed_kmh * 0.3).min(100.0))
    }
}

/// Engine speed from road speed and gear
pub fn engine_rpm(speed_kmh: f64, gear: u8, accel: f64, throttle: f64, rng: &mut SeededRng) -> f64 {
    let rpm = if gear == 0 {
        IDLE_RPM + rng.range(-20.0, 20.0) + throttle * 25.0
    } else {
        let mut rpm = speed_kmh * GEAR_RATIOS[gear as usize - 1];
        if accel > 1.5 {
            rpm += (accel - 1.5) * 400.0;
        }
        rpm.max(IDLE_RPM)
    };
    rpm.clamp(MIN_RPM, MAX_RPM)
}

fn in_windows(index: usize, len: usize, windows: &[(f64, f64)]) -> bool {
    let pos = index as f64 / len.max(1) as f64;
    windows.iter().any(|&(start, end)| pos >= start && pos < end)
}

/// Channels of the drive cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveChannel {
    Speed,
    Rpm,
    Throttle,
    Brake,
    Gear,
    Load,
    Steering,
    Wipers,
    Lights,
}

impl DriveChannel {
    pub const ALL: [DriveChannel; 9] = [
        DriveChannel::Speed,
        DriveChannel::Rpm,
        DriveChannel::Throttle,
        DriveChannel::Brake,
        DriveChannel::Gear,
        DriveChannel::Load,
        DriveChannel::Steering,
        DriveChannel::Wipers,
        DriveChannel::Lights,
    ];
}

/// Nine parallel, equal-length channels sampled on a shared time base starting at 0
#[derive(Debug, Clone, PartialEq)]
pub struct DriveCycle {
    /// Seconds between samples
    pub time_step: f64,
    /// km/h
    pub speed: Vec<f64>,
    pub rpm: Vec<f64>,
    /// %
    pub throttle: Vec<f64>,
    /// %
    pub brake: Vec<f64>,
    pub gear: Vec<f64>,
    /// %
    pub load: Vec<f64>,
    /// degrees, positive left
    pub steering: Vec<f64>,
    /// 0/1
    pub wipers: Vec<f64>,
    /// 0/1
    pub lights: Vec<f64>,
}

impl DriveCycle {
    /// Run the simulation for the configured duration and sample rate
    pub fn simulate(config: &SynthConfig) -> Self {
        let n = config.point_count();
        let dt = config.sample_interval_secs;
        let mut rng = SeededRng::new(config.drive_seed);

        let mut cycle = DriveCycle::with_capacity(n, dt);

        let mut state = DriveState::Idle;
        let mut timer = 2.0;
        let mut target = 0.0;
        let mut speed: f64 = 0.0;
        let mut steering: f64 = 0.0;

        for i in 0..n {
            let t = i as f64 * dt;

            timer -= dt;
            if timer <= 0.0 {
                let next = transition(state, target, &mut rng);
                log::trace!(
                    "t={:.1}s {} -> {} (target {:.0} km/h)",
                    t,
                    state,
                    next.state,
                    next.target_kmh
                );
                state = next.state;
                timer = next.timer_secs;
                target = next.target_kmh;
            }

            let accel = acceleration(state, speed, target, t);
            speed = (speed + accel * dt * 3.6).clamp(0.0, MAX_SPEED_KMH);

            if speed > STEERING_SPEED_THRESHOLD {
                steering += rng.range(-1.0, 1.0) * STEERING_STEP_DEG;
            }
            steering = (steering * STEERING_DECAY).clamp(-MAX_STEERING_DEG, MAX_STEERING_DEG);

            let (throttle, brake, load) = pedal_split(accel, speed);
            let gear = gear_for_speed(speed);
            let rpm = engine_rpm(speed, gear, accel, throttle, &mut rng);

            cycle.speed.push(speed);
            cycle.rpm.push(rpm);
            cycle.throttle.push(throttle);
            cycle.brake.push(brake);
            cycle.gear.push(gear as f64);
            cycle.load.push(load);
            cycle.steering.push(steering);
            cycle.wipers.push(if in_windows(i, n, WIPER_WINDOWS) { 1.0 } else { 0.0 });
            cycle.lights.push(if in_windows(i, n, LIGHT_WINDOWS) { 1.0 } else { 0.0 });
        }

        log::debug!("Simulated drive cycle: {} samples at {}s", n, dt);
        cycle
    }

    fn with_capacity(n: usize, time_step: f64) -> Self {
        Self {
            time_step,
            speed: Vec::with_capacity(n),
            rpm: Vec::with_capacity(n),
            throttle: Vec::with_capacity(n),
            brake: Vec::with_capacity(n),
            gear: Vec::with_capacity(n),
            load: Vec::with_capacity(n),
            steering: Vec::with_capacity(n),
            wipers: Vec::with_capacity(n),
            lights: Vec::with_capacity(n),
        }
    }

    /// Number of samples per channel
    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    /// Borrow one channel
    pub fn channel(&self, channel: DriveChannel) -> &[f64] {
        match channel {
            DriveChannel::Speed => &self.speed,
            DriveChannel::Rpm => &self.rpm,
            DriveChannel::Throttle => &self.throttle,
            DriveChannel::Brake => &self.brake,
            DriveChannel::Gear => &self.gear,
            DriveChannel::Load => &self.load,
            DriveChannel::Steering => &self.steering,
            DriveChannel::Wipers => &self.wipers,
            DriveChannel::Lights => &self.lights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> DriveCycle {
        DriveCycle::simulate(&SynthConfig::default())
    }

    #[test]
    fn test_channels_share_length() {
        let cycle = cycle();
        assert_eq!(cycle.len(), 1200);
        for channel in DriveChannel::ALL {
            assert_eq!(cycle.channel(channel).len(), cycle.len(), "{:?}", channel);
        }
    }

    #[test]
    fn test_simulation_is_reproducible() {
        assert_eq!(cycle(), cycle());
    }

    #[test]
    fn test_physical_bounds() {
        let cycle = cycle();
        assert!(cycle.speed.iter().all(|v| (0.0..=MAX_SPEED_KMH).contains(v)));
        assert!(cycle.rpm.iter().all(|v| (MIN_RPM..=MAX_RPM).contains(v)));
        assert!(cycle.gear.iter().all(|g| g.fract() == 0.0 && (0.0..=6.0).contains(g)));
        assert!(cycle.steering.iter().all(|v| v.abs() <= MAX_STEERING_DEG));
        let mut pedals = cycle.throttle.iter().chain(&cycle.brake).chain(&cycle.load);
        assert!(pedals.all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_vehicle_actually_drives() {
        let cycle = cycle();
        let top = cycle.speed.iter().copied().fold(0.0, f64::max);
        assert!(top > 20.0, "top speed {}", top);
        assert_eq!(cycle.speed[0], 0.0);
    }

    #[test]
    fn test_gear_zero_only_when_stopped() {
        let cycle = cycle();
        for (speed, gear) in cycle.speed.iter().zip(&cycle.gear) {
            assert_eq!(*gear == 0.0, *speed < 0.5);
        }
    }

    #[test]
    fn test_brake_and_throttle_exclusive() {
        let cycle = cycle();
        for (t, b) in cycle.throttle.iter().zip(&cycle.brake) {
            assert!(*t == 0.0 || *b == 0.0);
        }
    }

    #[test]
    fn test_scripted_switches() {
        let cycle = DriveCycle::simulate(&SynthConfig::new().with_duration(10.0));
        assert_eq!(cycle.len(), 100);
        assert_eq!(cycle.wipers[0], 0.0);
        assert_eq!(cycle.wipers[30], 1.0);
        assert_eq!(cycle.wipers[50], 0.0);
        assert_eq!(cycle.lights[54], 0.0);
        assert_eq!(cycle.lights[99], 1.0);
    }

    #[test]
    fn test_transition_sequence() {
        let mut rng = SeededRng::new(1);
        let t = transition(DriveState::Idle, 0.0, &mut rng);
        assert_eq!(t.state, DriveState::Accel);
        assert!((30.0..120.0).contains(&t.target_kmh));

        let cruise = transition(DriveState::Accel, 77.0, &mut rng);
        assert_eq!(cruise.state, DriveState::Cruise);
        assert_eq!(cruise.target_kmh, 77.0);

        let idle = transition(DriveState::Decel, 0.0, &mut rng);
        assert_eq!(idle.state, DriveState::Idle);
        assert_eq!(idle.target_kmh, 0.0);
    }

    #[test]
    fn test_cruise_branches() {
        let mut rng = SeededRng::new(3);
        let mut seen_decel = false;
        let mut seen_accel = false;
        for _ in 0..50 {
            let t = transition(DriveState::Cruise, 80.0, &mut rng);
            match t.state {
                DriveState::Decel => {
                    seen_decel = true;
                    assert_eq!(t.target_kmh, 0.0);
                }
                DriveState::Accel => seen_accel = true,
                other => panic!("unexpected transition to {}", other),
            }
        }
        assert!(seen_decel && seen_accel);
    }

    #[test]
    fn test_control_law_directions() {
        assert!(acceleration(DriveState::Accel, 0.0, 100.0, 0.0) > 0.0);
        assert!(acceleration(DriveState::Decel, 80.0, 0.0, 0.0) < 0.0);
        assert_eq!(acceleration(DriveState::Decel, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(acceleration(DriveState::Accel, 0.0, 1000.0, 0.0), 3.0);
    }

    #[test]
    fn test_gear_table() {
        assert_eq!(gear_for_speed(0.0), 0);
        assert_eq!(gear_for_speed(10.0), 1);
        assert_eq!(gear_for_speed(60.0), 4);
        assert_eq!(gear_for_speed(200.0), 6);
    }

    #[test]
    fn test_pedal_split_regions() {
        let (t, b, l) = pedal_split(2.0, 50.0);
        assert!(t > 0.0 && b == 0.0 && l > 0.0);
        let (t, b, l) = pedal_split(-2.0, 50.0);
        assert!(t == 0.0 && b == 50.0 && l == 0.0);
        let (t, b, l) = pedal_split(0.0, 50.0);
        assert!(t == 0.0 && b == 0.0 && l == 15.0);
    }

    #[test]
    fn test_idle_rpm_rises_with_throttle() {
        let mut rng = SeededRng::new(9);
        let idle = engine_rpm(0.0, 0, 0.0, 0.0, &mut rng);
        assert!((780.0..=820.0).contains(&idle));
        let revved = engine_rpm(0.0, 0, 0.0, 40.0, &mut rng);
        assert!(revved > 1700.0);
    }
}

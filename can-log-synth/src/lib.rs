//! CAN Log Synthesis Library
//!
//! A stateless library that turns a vehicle log (or just its signal
//! description) into a deterministic, plausible set of per-signal time series.
//!
//! # Architecture
//!
//! - Discovers signal names from a DBC description file, by scanning a binary
//!   log for identifier-like strings, or from the header of a delimited export
//! - Simulates one reference drive cycle (speed, RPM, pedals, gear, steering)
//! - Synthesizes every discovered signal from the cycle or from a name-based
//!   archetype, clamped and quantized to its declared raw grid
//! - Computes summary statistics per signal
//!
//! The library does NOT:
//! - Decode real CAN frames from the log payload
//! - Talk to the diagnostic collaborator itself (see [`diagnostics`])
//! - Render reports
//!
//! Output formatting and batch processing live in the application layer
//! (can-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use can_log_synth::{Engine, SynthConfig};
//! use std::path::Path;
//!
//! let config = SynthConfig::new()
//!     .with_duration(60.0)
//!     .with_sample_interval(0.1);
//!
//! let engine = Engine::with_config(config);
//! let analysis = engine
//!     .analyze_file(Path::new("trace.blf"), Some(Path::new("powertrain.dbc")))
//!     .unwrap();
//!
//! for signal in &analysis.signals {
//!     if let Some(stats) = signal.stats {
//!         println!("{} [{}] avg {}", signal.name, signal.unit, stats.avg);
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod diagnostics;
pub mod drive_cycle;
pub mod engine;
pub mod rng;
pub mod signals;
pub mod stats;
pub mod synthesizer;
pub mod types;

// Re-export main types for convenience
pub use config::SynthConfig;
pub use diagnostics::{DiagnosticReport, DiagnosticRequest, Diagnostician};
pub use drive_cycle::DriveCycle;
pub use engine::{Engine, InputKind};
pub use types::{
    Analysis, DataPoint, DiscoverySource, Result, SignalDescriptor, SignalStats, SynthError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an unrecognizable input still yields the fallback channels
        let engine = Engine::with_config(SynthConfig::new().with_duration(1.0));
        let analysis = engine.analyze_bytes("empty.bin", &[], None).unwrap();
        assert_eq!(analysis.source, DiscoverySource::Fallback);
        assert_eq!(analysis.data.len(), 10);
    }
}

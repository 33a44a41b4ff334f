//! Signal discovery
//!
//! Three independent strategies turn raw input into signal descriptors:
//! a description file parser, a binary string scanner and a delimited text
//! header parser. The first two form a cascade ending in a fixed list of
//! generic channels; delimited text is handled on its own path.

pub mod binary;
pub mod dbc;
pub mod delimited;
pub mod heuristics;

use crate::config::SynthConfig;
use crate::types::{DiscoverySource, SignalDescriptor, UNIT_RAW};

pub use delimited::{parse_delimited, DelimitedLog};

/// Signals found in one input, and the strategy that found them
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub source: DiscoverySource,
    pub signals: Vec<SignalDescriptor>,
}

/// Run the discovery cascade over a non-delimited input.
///
/// The description file is tried first when present; an empty result moves on
/// to scanning `primary` for strings, and a scan with too few names produces
/// the generic fallback list. Colors are assigned in final order.
pub fn discover(primary: &[u8], description: Option<&[u8]>, config: &SynthConfig) -> Discovery {
    let mut discovery = run_cascade(primary, description, config);
    for (i, signal) in discovery.signals.iter_mut().enumerate() {
        signal.color = config.color_for(i);
    }
    log::info!(
        "Discovered {} signals via {}",
        discovery.signals.len(),
        discovery.source
    );
    discovery
}

fn run_cascade(primary: &[u8], description: Option<&[u8]>, config: &SynthConfig) -> Discovery {
    if let Some(bytes) = description {
        let signals = dbc::parse_description(&dbc::decode_text(bytes));
        if !signals.is_empty() {
            return Discovery {
                source: DiscoverySource::DescriptionFile,
                signals,
            };
        }
        log::debug!("Description file yielded no signals, scanning for strings");
    }

    let names = binary::scan_names(primary, binary::ScanLimits::from(config));
    if names.len() >= config.min_binary_signals {
        return Discovery {
            source: DiscoverySource::BinaryScan,
            signals: names.into_iter().map(SignalDescriptor::new).collect(),
        };
    }

    log::debug!(
        "Binary scan found only {} names (need {}), using fallback channels",
        names.len(),
        config.min_binary_signals
    );
    Discovery {
        source: DiscoverySource::Fallback,
        signals: fallback_signals(config.fallback_signal_count),
    }
}

/// Generic channel list used when nothing better can be discovered
pub fn fallback_signals(count: usize) -> Vec<SignalDescriptor> {
    (0..count)
        .map(|i| {
            let can_id = 0x100 + i * 0x10;
            SignalDescriptor::new(format!("CAN_ID_0x{:X}_Signal_{}", can_id, i)).with_unit(UNIT_RAW)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SynthConfig {
        SynthConfig::default()
    }

    #[test]
    fn test_description_file_wins() {
        let dbc = br#" SG_ VehicleSpeed : 0|16@1+ (0.01,0) [0|250] "km/h" X"#;
        let discovery = discover(b"", Some(&dbc[..]), &config());
        assert_eq!(discovery.source, DiscoverySource::DescriptionFile);
        assert_eq!(discovery.signals.len(), 1);
        assert_eq!(discovery.signals[0].color, config().palette[0]);
    }

    #[test]
    fn test_empty_description_falls_through_to_scan() {
        let mut blob = Vec::new();
        let names = [
            "EngineSpeed",
            "VehicleSpeed",
            "CoolantTemp",
            "OilPressure",
            "BattVolt",
            "GearPos",
        ];
        for name in names {
            blob.extend_from_slice(name.as_bytes());
            blob.push(0);
        }
        let discovery = discover(&blob, Some(&b"VERSION \"\"\n"[..]), &config());
        assert_eq!(discovery.source, DiscoverySource::BinaryScan);
        assert_eq!(discovery.signals.len(), 6);
        assert_eq!(discovery.signals[0].name, "EngineSpeed");
    }

    #[test]
    fn test_sparse_binary_uses_fallback() {
        let discovery = discover(b"\x00\x01Speed\x00\xFFLOGG\x02", None, &config());
        assert_eq!(discovery.source, DiscoverySource::Fallback);
        assert_eq!(discovery.signals.len(), config().fallback_signal_count);
        assert!(discovery.signals.iter().all(|s| s.unit == UNIT_RAW));
        assert_eq!(discovery.signals[0].name, "CAN_ID_0x100_Signal_0");
        assert_eq!(discovery.signals[1].name, "CAN_ID_0x110_Signal_1");
    }

    #[test]
    fn test_colors_wrap_palette() {
        let config = config().with_palette(vec!["red".into(), "blue".into()]);
        let discovery = discover(b"", None, &config);
        assert_eq!(discovery.signals[2].color, "red");
        assert_eq!(discovery.signals[3].color, "blue");
    }
}

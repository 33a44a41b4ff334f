//! Binary string scanner
//!
//! Pulls plausible signal names out of a binary blob with no known layout.
//! Payload bytes are never decoded; only printable ASCII runs are inspected,
//! and only identifiers that look like channel names survive.

use crate::config::SynthConfig;
use std::collections::HashSet;

/// Marker around names embedded as AUTOSAR XML fragments
const XML_OPEN: &str = "<SHORT-NAME>";
const XML_CLOSE: &str = "</SHORT-NAME>";

/// Format and vendor banner fragments that are never channel names (lowercase)
const NOISE: &[&str] = &[
    "logg", "vector", "canoe", "canalyzer", "canape", "blf", "mdf", "asam", "xml", "http", "www.",
    "copyright", "version", "windows", "microsoft", "encoding", "schema", "autosar", "utf-8",
    "header", "reserved",
];

/// Limits applied while scanning
#[derive(Debug, Clone, Copy)]
pub struct ScanLimits {
    pub byte_budget: usize,
    pub min_len: usize,
    pub max_len: usize,
    pub max_names: usize,
}

impl From<&SynthConfig> for ScanLimits {
    fn from(config: &SynthConfig) -> Self {
        Self {
            byte_budget: config.binary_scan_limit,
            min_len: config.min_token_len,
            max_len: config.max_token_len,
            max_names: config.max_binary_signals,
        }
    }
}

/// Scan `bytes` for candidate signal names, in order of first appearance
pub fn scan_names(bytes: &[u8], limits: ScanLimits) -> Vec<String> {
    let window = &bytes[..bytes.len().min(limits.byte_budget)];
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for run in printable_runs(window, limits.min_len) {
        let Some(name) = candidate(run, &limits) else {
            continue;
        };
        if seen.insert(name.clone()) {
            log::trace!("Accepted binary token '{}'", name);
            names.push(name);
            if names.len() >= limits.max_names {
                break;
            }
        }
    }

    log::debug!("Binary scan of {} bytes found {} candidate names", window.len(), names.len());
    names
}

/// Maximal runs of printable ASCII (32..=126) at least `min_len` bytes long
fn printable_runs(bytes: &[u8], min_len: usize) -> impl Iterator<Item = &str> {
    bytes
        .split(|b| !(32..=126).contains(b))
        .filter(move |run| run.len() >= min_len)
        // Printable ASCII is always valid UTF-8
        .filter_map(|run| std::str::from_utf8(run).ok())
}

/// Turn a printable run into a signal name, if it looks like one
fn candidate(run: &str, limits: &ScanLimits) -> Option<String> {
    let token = match run.find(XML_OPEN) {
        Some(start) => {
            let inner = &run[start + XML_OPEN.len()..];
            let end = inner.find(XML_CLOSE).or_else(|| inner.find('<')).unwrap_or(inner.len());
            let inner = inner[..end].trim();
            if inner.is_empty() || inner.parse::<f64>().is_ok() {
                return None;
            }
            inner
        }
        None => {
            if !is_identifier(run) {
                return None;
            }
            run
        }
    };

    if token.len() < limits.min_len || token.len() > limits.max_len || is_noise(token) {
        return None;
    }
    Some(token.to_string())
}

/// `^[A-Za-z][A-Za-z0-9_.-]+$`
fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn is_noise(token: &str) -> bool {
    let lower = token.to_lowercase();
    NOISE.iter().any(|n| lower.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ScanLimits {
        ScanLimits::from(&SynthConfig::default())
    }

    fn blob(parts: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for part in parts {
            out.extend_from_slice(part);
            out.extend_from_slice(&[0x00, 0xFF, 0x01]);
        }
        out
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_identifier("Engine_Speed"));
        assert!(is_identifier("Wheel.FL-Speed"));
        assert!(!is_identifier("1Engine"));
        assert!(!is_identifier("Engine Speed"));
        assert!(!is_identifier("E"));
    }

    #[test]
    fn test_scan_extracts_names_in_order() {
        let data = blob(&[b"EngineSpeed", b"abc", b"VehicleSpeed", b"EngineSpeed", b"12345678"]);
        let names = scan_names(&data, limits());
        assert_eq!(names, vec!["EngineSpeed", "VehicleSpeed"]);
    }

    #[test]
    fn test_noise_filtered() {
        let data = blob(&[b"LOGG", b"Vector_BLF_Writer", b"CANoe.Version", b"BrakePressure"]);
        let names = scan_names(&data, limits());
        assert_eq!(names, vec!["BrakePressure"]);
    }

    #[test]
    fn test_xml_short_name_extracted() {
        let data = blob(&[
            b"<SHORT-NAME>Coolant_Temp</SHORT-NAME>",
            b"<SHORT-NAME>42</SHORT-NAME>",
        ]);
        let names = scan_names(&data, limits());
        assert_eq!(names, vec!["Coolant_Temp"]);
    }

    #[test]
    fn test_length_bounds() {
        let long = "A".repeat(65);
        let data = blob(&[long.as_bytes(), b"Ok_Name"]);
        let names = scan_names(&data, limits());
        assert_eq!(names, vec!["Ok_Name"]);
    }

    #[test]
    fn test_byte_budget_respected() {
        let data = blob(&[b"FirstSignal", b"SecondSignal"]);
        let mut tight = limits();
        tight.byte_budget = 14;
        assert_eq!(scan_names(&data, tight), vec!["FirstSignal"]);
    }

    #[test]
    fn test_name_cap() {
        let owned: Vec<String> = (0..10).map(|i| format!("Signal_{i}")).collect();
        let parts: Vec<&[u8]> = owned.iter().map(|s| s.as_bytes()).collect();
        let mut capped = limits();
        capped.max_names = 3;
        assert_eq!(scan_names(&blob(&parts), capped).len(), 3);
    }
}

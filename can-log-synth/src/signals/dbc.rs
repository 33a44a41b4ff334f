//! Description file parser
//!
//! Reads signal definitions from DBC-style description files. The parser is
//! line-oriented and lenient: only `SG_` lines are considered, only the name,
//! `(factor,offset)`, `[min|max]` and `"unit"` parts are consumed, and a line
//! that cannot be understood is skipped rather than failing the whole file.
//!
//! ```text
//! SG_ <Name> [multiplexor] : <bits> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers>
//! ```

use crate::types::{SignalDescriptor, UNIT_PLACEHOLDER};
use std::collections::HashSet;

/// Keyword that starts a signal definition line
const SIGNAL_KEYWORD: &str = "SG_";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode text input, falling back to Latin-1 for non-UTF-8 bytes.
///
/// A leading UTF-8 byte order mark is dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::warn!("Input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// Parse every signal definition in `text`.
///
/// Names are deduplicated; the first definition of a name wins.
pub fn parse_description(text: &str) -> Vec<SignalDescriptor> {
    let mut seen = HashSet::new();
    let mut signals = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.split_whitespace().next() != Some(SIGNAL_KEYWORD) {
            continue;
        }

        let Some(signal) = parse_signal_line(trimmed) else {
            log::debug!(
                "Skipping malformed signal definition at line {}: {}",
                line_no + 1,
                trimmed
            );
            continue;
        };

        if seen.insert(signal.name.clone()) {
            signals.push(signal);
        } else {
            log::debug!(
                "Ignoring duplicate definition of '{}' at line {}",
                signal.name,
                line_no + 1
            );
        }
    }

    log::info!("Parsed {} signal definitions from description file", signals.len());
    signals
}

/// Parse a single `SG_` line, or `None` if no name can be extracted
fn parse_signal_line(line: &str) -> Option<SignalDescriptor> {
    let (name_section, metadata) = line.split_once(':')?;

    // Token 0 is the keyword; a multiplexor marker may follow the name and is ignored
    let name = name_section.split_whitespace().nth(1)?;

    let (factor, offset) = extract_scaling(metadata).unwrap_or((1.0, 0.0));
    let (min, max) = extract_range(metadata).unwrap_or((0.0, 0.0));
    let unit = extract_unit(metadata)
        .filter(|u| !u.is_empty())
        .unwrap_or(UNIT_PLACEHOLDER);

    Some(
        SignalDescriptor::new(name)
            .with_unit(unit)
            .with_range(min, max)
            .with_scaling(factor, offset),
    )
}

/// Text between the first `open` and the next `close` after it
fn delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)? + open.len_utf8();
    let len = text[start..].find(close)?;
    Some(&text[start..start + len])
}

/// Two numbers separated by `sep`, both required to parse
fn number_pair(text: &str, sep: char) -> Option<(f64, f64)> {
    let (a, b) = text.split_once(sep)?;
    let a = a.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let b = b.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((a, b))
}

/// `(factor,offset)` in decimal or scientific notation
fn extract_scaling(metadata: &str) -> Option<(f64, f64)> {
    number_pair(delimited(metadata, '(', ')')?, ',')
}

/// `[min|max]`
fn extract_range(metadata: &str) -> Option<(f64, f64)> {
    number_pair(delimited(metadata, '[', ']')?, '|')
}

/// First double-quoted string
fn extract_unit(metadata: &str) -> Option<&str> {
    delimited(metadata, '"', '"')
}

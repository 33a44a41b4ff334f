//! Delimited text parser
//!
//! Parses CSV-like exports (comma, semicolon or tab separated) that already
//! contain measured values. This path bypasses synthesis: descriptors come from
//! the header row and statistics are computed from the parsed columns.

use crate::stats;
use crate::types::{DataPoint, SignalDescriptor, UNIT_PLACEHOLDER};
use std::collections::HashSet;

/// Header names recognized as the time column (compared case-insensitively)
const TIME_COLUMNS: &[&str] = &[
    "time", "timestamp", "t", "ts", "time_s", "time[s]", "time (s)", "time_ms", "seconds", "sec",
    "elapsed", "zeit",
];

/// Prefixes of lines that carry no data
const COMMENT_PREFIXES: &[&str] = &["//", "#", "Begin"];

/// Spreadsheet exports often start with a UTF-8 BOM
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parsed delimited log: descriptors (with statistics) and time-sorted rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelimitedLog {
    pub signals: Vec<SignalDescriptor>,
    pub data: Vec<DataPoint>,
}

impl DelimitedLog {
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Field delimiter sniffed from the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    /// Prefer comma unless semicolon or tab strictly dominates
    pub fn sniff(line: &str) -> Self {
        let commas = line.matches(',').count();
        let semicolons = line.matches(';').count();
        let tabs = line.matches('\t').count();

        if semicolons > commas && semicolons > tabs {
            Delimiter::Semicolon
        } else if tabs > commas && tabs > semicolons {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }

    /// Semicolon-separated exports come from locales that write decimal commas
    pub fn decimal_comma(self) -> bool {
        self == Delimiter::Semicolon
    }
}

/// Parse a delimited export.
///
/// `fallback_interval` spaces rows when no time column exists; at most
/// `max_rows` data rows are read. Fewer than two usable lines yield an empty log.
pub fn parse_delimited(text: &str, fallback_interval: f64, max_rows: usize) -> DelimitedLog {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    // Lines are kept untrimmed: leading or trailing delimiters mark empty columns
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.is_empty() && !COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if lines.len() < 2 {
        log::warn!("Delimited input has {} usable lines, nothing to parse", lines.len());
        return DelimitedLog::default();
    }

    let delimiter = Delimiter::sniff(lines[0]);
    let decimal_comma = delimiter.decimal_comma();
    log::debug!("Delimiter {:?}, decimal comma: {}", delimiter, decimal_comma);

    let headers: Vec<String> = lines[0]
        .split(delimiter.as_char())
        .map(strip_quotes)
        .map(str::to_string)
        .collect();

    let time_col = headers
        .iter()
        .position(|h| TIME_COLUMNS.iter().any(|t| h.eq_ignore_ascii_case(t)));

    // (column index, unique name) for every value column
    let mut seen = HashSet::new();
    let columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != time_col)
        .map(|(i, h)| (i, if h.is_empty() { format!("Column_{}", i + 1) } else { h.clone() }))
        .filter(|(_, name)| seen.insert(name.clone()))
        .collect();

    let mut rows: Vec<DataPoint> = Vec::new();
    let mut time_zero: Option<f64> = None;

    for (row_idx, line) in lines[1..].iter().take(max_rows).enumerate() {
        let fields: Vec<&str> = line.split(delimiter.as_char()).collect();
        let field = |i: usize| fields.get(i).map(|f| parse_number(f, decimal_comma)).unwrap_or(0.0);

        let timestamp = match time_col {
            Some(col) => {
                let raw = field(col);
                let zero = *time_zero.get_or_insert(raw);
                raw - zero
            }
            None => row_idx as f64 * fallback_interval,
        };

        let mut point = DataPoint::new(timestamp);
        for (col, name) in &columns {
            point.values.insert(name.clone(), field(*col));
        }
        rows.push(point);
    }

    rows.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let signals = columns
        .iter()
        .map(|(_, name)| {
            let series: Vec<f64> = rows.iter().filter_map(|p| p.get(name)).collect();
            let summary = stats::summarize(&series);
            let mut descriptor = SignalDescriptor::new(name.clone())
                .with_unit(UNIT_PLACEHOLDER)
                .with_range(summary.min, summary.max);
            descriptor.stats = Some(summary);
            descriptor
        })
        .collect::<Vec<_>>();

    log::info!(
        "Parsed {} rows x {} signals from delimited text (time column: {:?})",
        rows.len(),
        signals.len(),
        time_col.map(|i| headers[i].as_str())
    );

    DelimitedLog {
        signals,
        data: rows,
    }
}

fn strip_quotes(field: &str) -> &str {
    field.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Locale-flexible number parser.
///
/// Boolean-like tokens map to 1/0, thousands separators are removed according
/// to the decimal convention, and anything unparsable becomes 0.
pub fn parse_number(field: &str, decimal_comma: bool) -> f64 {
    let token = strip_quotes(field);
    match token.to_ascii_lowercase().as_str() {
        "true" | "on" => return 1.0,
        "false" | "off" => return 0.0,
        _ => {}
    }

    let normalized: String = if decimal_comma {
        token
            .chars()
            .filter(|c| *c != '.' && *c != ' ')
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        token.chars().filter(|c| *c != ',' && *c != ' ').collect()
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_basic() {
        let log = parse_delimited("time,a,b\n0,1,2\n1,3,4\n", 0.1, 100);
        assert_eq!(log.data.len(), 2);
        assert_eq!(log.data[0].timestamp, 0.0);
        assert_eq!(log.data[1].timestamp, 1.0);
        assert_eq!(log.data[0].get("a"), Some(1.0));
        assert_eq!(log.data[1].get("a"), Some(3.0));
        assert_eq!(log.data[0].get("b"), Some(2.0));
        assert_eq!(log.data[1].get("b"), Some(4.0));

        let a = log.signals.iter().find(|s| s.name == "a").unwrap();
        let stats = a.stats.unwrap();
        assert_eq!((stats.min, stats.max, stats.avg, stats.std_dev), (1.0, 3.0, 2.0, 1.0));
        assert!(log.data[0].get("time").is_none());
    }

    #[test]
    fn test_delimiter_sniffing() {
        assert_eq!(Delimiter::sniff("a,b,c"), Delimiter::Comma);
        assert_eq!(Delimiter::sniff("a;b;c"), Delimiter::Semicolon);
        assert_eq!(Delimiter::sniff("a\tb\tc"), Delimiter::Tab);
        assert_eq!(Delimiter::sniff("a;b,c"), Delimiter::Comma);
        assert_eq!(Delimiter::sniff("a;b\tc"), Delimiter::Comma);
    }

    #[test]
    fn test_decimal_comma_and_thousands() {
        assert_eq!(parse_number("1.234,5", true), 1234.5);
        assert_eq!(parse_number("1,234.5", false), 1234.5);
        assert_eq!(parse_number("\"3,25\"", true), 3.25);
    }

    #[test]
    fn test_boolean_tokens_and_garbage() {
        assert_eq!(parse_number("TRUE", false), 1.0);
        assert_eq!(parse_number("on", false), 1.0);
        assert_eq!(parse_number("Off", false), 0.0);
        assert_eq!(parse_number("n/a", false), 0.0);
        assert_eq!(parse_number("", false), 0.0);
    }

    #[test]
    fn test_semicolon_export_with_comments() {
        let text = "// exported\n# channel list\nBegin Triggerblock\n\
                    \"Zeit\";\"Drehzahl\"\n10,0;800,5\n10,5;900\n";
        let log = parse_delimited(text, 0.1, 100);
        assert_eq!(log.signals.len(), 1);
        assert_eq!(log.signals[0].name, "Drehzahl");
        assert_eq!(log.data[0].timestamp, 0.0);
        assert!((log.data[1].timestamp - 0.5).abs() < 1e-9);
        assert_eq!(log.data[0].get("Drehzahl"), Some(800.5));
    }

    #[test]
    fn test_missing_time_column_synthesizes_timestamps() {
        let log = parse_delimited("x\ty\n1\t2\n3\t4\n5\t6\n", 0.1, 100);
        let ts: Vec<f64> = log.data.iter().map(|p| p.timestamp).collect();
        assert_eq!(ts.len(), 3);
        assert!((ts[2] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_rows_sorted_and_zeroed() {
        let log = parse_delimited("Timestamp,v\n5,1\n7,3\n6,2\n", 0.1, 100);
        let values: Vec<f64> = log.data.iter().filter_map(|p| p.get("v")).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(log.data[2].timestamp, 2.0);
    }

    #[test]
    fn test_short_input_is_empty() {
        assert!(parse_delimited("time,a\n", 0.1, 100).is_empty());
        assert!(parse_delimited("# only a comment\n\n", 0.1, 100).is_empty());
    }

    #[test]
    fn test_row_cap_and_short_rows() {
        let log = parse_delimited("time,a,b\n0,1\n1,2,3\n2,3,4\n", 0.1, 2);
        assert_eq!(log.data.len(), 2);
        assert_eq!(log.data[0].get("b"), Some(0.0));
    }

    #[test]
    fn test_leading_tab_keeps_columns_aligned() {
        // Index column without a header name, as written by dataframe exports
        let log = parse_delimited("\ttime\tb\n0\t10\t7\n1\t11\t8\n", 0.1, 100);
        let names: Vec<_> = log.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Column_1", "b"]);

        let b: Vec<f64> = log.data.iter().filter_map(|p| p.get("b")).collect();
        assert_eq!(b, vec![7.0, 8.0]);
        let index: Vec<f64> = log.data.iter().filter_map(|p| p.get("Column_1")).collect();
        assert_eq!(index, vec![0.0, 1.0]);
        assert_eq!(log.data[1].timestamp, 1.0);
    }

    #[test]
    fn test_trailing_empty_column_kept() {
        let log = parse_delimited("time\ta\t\n0\t1\t\n1\t2\t\n", 0.1, 100);
        let names: Vec<_> = log.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "Column_3"]);
        assert_eq!(log.data[1].get("a"), Some(2.0));
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let log = parse_delimited("\u{feff}time,a\n5,1\n6,3\n", 0.1, 100);
        let names: Vec<_> = log.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
        let ts: Vec<f64> = log.data.iter().map(|p| p.timestamp).collect();
        assert_eq!(ts, vec![0.0, 1.0]);
    }

    #[test]
    fn test_duplicate_headers_keep_first() {
        let log = parse_delimited("time,a,a\n0,1,9\n1,2,9\n", 0.1, 100);
        assert_eq!(log.signals.len(), 1);
        assert_eq!(log.data[1].get("a"), Some(2.0));
    }
}

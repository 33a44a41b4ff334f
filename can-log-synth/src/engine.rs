//! Main pipeline API
//!
//! The [`Engine`] is the entry point: it classifies the input, runs discovery,
//! simulates the drive cycle, synthesizes every signal and attaches statistics.
//! Each call is independent; nothing is cached between requests.

use crate::config::SynthConfig;
use crate::drive_cycle::DriveCycle;
use crate::signals::{self, dbc, delimited, Discovery};
use crate::stats;
use crate::synthesizer::Synthesizer;
use crate::types::{Analysis, DataPoint, DiscoverySource, Result, SynthError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How an input file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Signal description file (DBC)
    Description,
    /// Delimited text export with measured values
    Delimited,
    /// Opaque binary; some log formats accept a companion description file
    Binary { accepts_companion: bool },
}

impl InputKind {
    /// Classify by file extension
    pub fn from_file_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("dbc") => InputKind::Description,
            Some("csv") | Some("tsv") | Some("txt") | Some("asc") => InputKind::Delimited,
            Some("blf") | Some("mf4") | Some("mdf") => InputKind::Binary {
                accepts_companion: true,
            },
            _ => InputKind::Binary { accepts_companion: false },
        }
    }
}

/// The analysis engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: SynthConfig,
}

impl Engine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: SynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Analyze a log file on disk.
    ///
    /// Binary inputs are read only up to the configured scan budget. Failing to
    /// read either file is the only fatal condition.
    ///
    /// # Example
    /// ```no_run
    /// use can_log_synth::Engine;
    /// use std::path::Path;
    ///
    /// let engine = Engine::new();
    /// let analysis = engine
    ///     .analyze_file(Path::new("trace.blf"), Some(Path::new("powertrain.dbc")))
    ///     .unwrap();
    /// println!("{} signals, {} rows", analysis.signals.len(), analysis.data.len());
    /// ```
    pub fn analyze_file(&self, path: &Path, companion: Option<&Path>) -> Result<Analysis> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SynthError::UnsupportedInput(format!("No file name in {:?}", path)))?;

        log::info!("Analyzing log file: {:?}", path);

        let bytes = match InputKind::from_file_name(file_name) {
            InputKind::Binary { .. } => read_prefix(path, self.config.binary_scan_limit)?,
            _ => std::fs::read(path)?,
        };

        let companion_bytes = match companion {
            Some(p) => {
                log::info!("Loading description file: {:?}", p);
                Some(std::fs::read(p)?)
            }
            None => None,
        };

        self.analyze_bytes(file_name, &bytes, companion_bytes.as_deref())
    }

    /// Analyze in-memory content; `file_name` selects the input kind
    pub fn analyze_bytes(
        &self,
        file_name: &str,
        bytes: &[u8],
        companion: Option<&[u8]>,
    ) -> Result<Analysis> {
        self.config.validate()?;

        let kind = InputKind::from_file_name(file_name);
        log::debug!("Input {} classified as {:?}", file_name, kind);

        let description = match kind {
            InputKind::Delimited => {
                if companion.is_some() {
                    log::warn!("Ignoring description file for delimited input {}", file_name);
                }
                return Ok(self.analyze_delimited(file_name, bytes));
            }
            InputKind::Description => Some(bytes),
            InputKind::Binary { accepts_companion: true } => companion,
            InputKind::Binary { accepts_companion: false } => {
                if companion.is_some() {
                    log::warn!(
                        "Description file is only used with BLF/MF4 logs, ignoring it for {}",
                        file_name
                    );
                }
                None
            }
        };

        let discovery = signals::discover(bytes, description, &self.config);
        Ok(self.synthesize(file_name, discovery))
    }

    fn analyze_delimited(&self, file_name: &str, bytes: &[u8]) -> Analysis {
        let text = dbc::decode_text(bytes);
        let mut parsed = delimited::parse_delimited(
            &text,
            self.config.sample_interval_secs,
            self.config.max_delimited_rows,
        );

        for (i, signal) in parsed.signals.iter_mut().enumerate() {
            signal.color = self.config.color_for(i);
            stats::backfill_unit(signal);
        }

        Analysis {
            file_name: file_name.to_string(),
            source: DiscoverySource::DelimitedText,
            signals: parsed.signals,
            data: parsed.data,
        }
    }

    fn synthesize(&self, file_name: &str, discovery: Discovery) -> Analysis {
        let cycle = DriveCycle::simulate(&self.config);
        let synthesizer = Synthesizer::new(&cycle);

        let mut data: Vec<DataPoint> = (0..cycle.len())
            .map(|i| DataPoint::new(stats::round_to(i as f64 * cycle.time_step, 6)))
            .collect();

        let mut signals = Vec::with_capacity(discovery.signals.len());
        for descriptor in &discovery.signals {
            let synthesized = synthesizer.synthesize(descriptor);
            let mut descriptor = synthesized.descriptor;
            stats::attach(&mut descriptor, &synthesized.values);

            for (point, value) in data.iter_mut().zip(&synthesized.values) {
                point.values.insert(descriptor.name.clone(), *value);
            }
            signals.push(descriptor);
        }

        log::info!(
            "Synthesized {} signals x {} samples for {}",
            signals.len(),
            data.len(),
            file_name
        );

        Analysis {
            file_name: file_name.to_string(),
            source: discovery.source,
            signals,
            data,
        }
    }
}

/// Read at most `limit` bytes from the start of a file
fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)?.take(limit as u64).read_to_end(&mut bytes)?;
    Ok(bytes)
}

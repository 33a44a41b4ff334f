//! CAN Log Synth CLI Application
//!
//! This is the command-line interface for the can-log-synth library.
//! It adds:
//! - TOML configuration with command-line overrides
//! - Parallel analysis of several log files
//! - JSON and TXT reports
//! - Export of the diagnostic request payload

use anyhow::{bail, Context, Result};
use can_log_synth::{Analysis, Engine};
use chrono::Utc;
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// CAN Log Synth - Discover signals in a vehicle log and synthesize a drive cycle
#[derive(Parser, Debug)]
#[command(name = "can-log-cli")]
#[command(about = "Discover signals in vehicle logs and synthesize plausible time series")]
#[command(long_about = None)]
#[command(version)]
struct Args {
    /// Log file to analyze (DBC, BLF, MF4, CSV, ...; can be repeated)
    #[arg(short, long, value_name = "FILE")]
    log: Vec<PathBuf>,

    /// Description file used for BLF/MF4 logs
    #[arg(long, value_name = "FILE")]
    dbc: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory for report files (default: stdout)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Simulated drive length in seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<f64>,

    /// Sample interval in seconds
    #[arg(long, value_name = "SECS")]
    interval: Option<f64>,

    /// Emit the diagnostic request payload instead of the report
    #[arg(long)]
    diagnostics_request: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Log Synth CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using synthesis library v{}", can_log_synth::VERSION);

    if args.log.is_empty() {
        println!("CAN Log Synth - No input specified");
        println!("\nQuick Start:");
        println!("  can-log-cli --log powertrain.dbc");
        println!("  can-log-cli --log trace.blf --dbc powertrain.dbc --format txt");
        println!("  can-log-cli --log a.csv --log b.mf4 --output reports/");
        println!("\nUse --help for more options");
        return Ok(());
    }

    let config = resolve_config(&args)?;
    run(&args, &config)
}

/// Load the config file (if any) and apply command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(duration) = args.duration {
        config.simulation = config.simulation.with_duration(duration);
    }
    if let Some(interval) = args.interval {
        config.simulation = config.simulation.with_sample_interval(interval);
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(dir) = &args.output {
        config.output.output_dir = Some(dir.clone());
    }

    config.simulation.validate().context("Invalid simulation settings")?;
    Ok(config)
}

/// Analyze every log in parallel, then write reports in input order
fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let engine = Engine::with_config(config.simulation.clone());
    let companion = args.dbc.as_deref();

    let results: Vec<(&PathBuf, can_log_synth::Result<Analysis>)> = args
        .log
        .par_iter()
        .map(|path| (path, engine.analyze_file(path, companion)))
        .collect();

    if let Some(dir) = &config.output.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(analysis) => {
                log::info!(
                    "{}: {} signals via {}",
                    analysis.file_name,
                    analysis.signals.len(),
                    analysis.source
                );
                emit(&analysis, path, args.diagnostics_request, config)?;
            }
            Err(e) => {
                log::error!("Failed to analyze {:?}: {}", path, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} log files could not be analyzed", failures, args.log.len());
    }
    Ok(())
}

/// Render one analysis and write it to the output directory or stdout
fn emit(
    analysis: &Analysis,
    source: &Path,
    diagnostics_request: bool,
    config: &AppConfig,
) -> Result<()> {
    let (content, extension) = if diagnostics_request {
        (
            report::render_diagnostics_request(analysis, config.output.pretty)?,
            "request.json",
        )
    } else {
        let now = Utc::now();
        let content = match config.output.format {
            OutputFormat::Json => report::render_json(analysis, now, config.output.pretty)?,
            OutputFormat::Txt => report::render_txt(analysis, now),
        };
        (content, config.output.format.extension())
    };

    match &config.output.output_dir {
        Some(dir) => {
            let target = dir.join(report_file_name(source, extension));
            fs::write(&target, content)
                .with_context(|| format!("Failed to write report: {:?}", target))?;
            log::info!("Report written to {:?}", target);
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// `trace.blf` becomes `trace.blf.<extension>` so inputs sharing a stem do not collide
fn report_file_name(source: &Path, extension: &str) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analysis".to_string());
    format!("{}.{}", name, extension)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name_keeps_extension() {
        assert_eq!(report_file_name(Path::new("/logs/trace.blf"), "json"), "trace.blf.json");
        assert_eq!(report_file_name(Path::new("a.csv"), "request.json"), "a.csv.request.json");
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let args = Args::parse_from([
            "can-log-cli",
            "--log",
            "trace.blf",
            "--duration",
            "30",
            "--format",
            "txt",
            "--output",
            "out",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.simulation.duration_secs, 30.0);
        assert_eq!(config.output.format, OutputFormat::Txt);
        assert_eq!(config.output.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let args = Args::parse_from(["can-log-cli", "--log", "x.bin", "--interval", "0"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_run_writes_reports() {
        let dir = tempfile::TempDir::new().unwrap();
        let dbc = dir.path().join("body.dbc");
        fs::write(&dbc, " SG_ WiperStatus : 0|1@1+ (1,0) [0|1] \"\" X\n").unwrap();
        let out = dir.path().join("reports");

        let args = Args::parse_from([
            "can-log-cli",
            "--log",
            dbc.to_str().unwrap(),
            "--duration",
            "5",
            "--output",
            out.to_str().unwrap(),
        ]);
        let config = resolve_config(&args).unwrap();
        run(&args, &config).unwrap();

        let written = fs::read_to_string(out.join("body.dbc.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["data"].as_array().unwrap().len(), 50);
        assert_eq!(value["signals"][0]["name"], "WiperStatus");
    }
}

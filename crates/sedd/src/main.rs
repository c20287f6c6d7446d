//! SEDD CLI
//!
//! Scan 0/1 outcome streams for concept drift with the spectral entropy
//! drift detector.
//!
//! # Commands
//!
//! - `sedd scan [INPUT]`: run the detector over a stream and report every
//!   drift point. Reads stdin when INPUT is omitted or `-`.
//! - `sedd config`: print the effective configuration as TOML.
//!
//! Samples are numbers separated by whitespace, commas or newlines. Exit
//! code is 0 on success and 1 on any error.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

use sedd_core::logging::{LogConfig, LogFormat, init_logging};
use sedd_core::{ConfigError, DetectorSnapshot, DriftPoint, SeddConfig, SpectralDriftDetector};

/// SEDD - spectral entropy drift detection for binary outcome streams
#[derive(Parser)]
#[command(name = "sedd")]
#[command(version)]
#[command(about = "Detect concept drift in 0/1 outcome streams via spectral entropy")]
#[command(propagate_version = true)]
struct Cli {
    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SEDD_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detector over a stream of outcomes
    Scan {
        /// Input file; omit or pass `-` to read stdin
        input: Option<PathBuf>,

        #[command(flatten)]
        detector: DetectorArgs,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        detector: DetectorArgs,
    },
}

/// Detector parameters; flags override the config file.
#[derive(Args)]
struct DetectorArgs {
    /// TOML file with bit_width, window_size and magnitude
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Shift register width (4-32)
    #[arg(long)]
    bit_width: Option<u32>,

    /// Window length; power of two in 32-1024
    #[arg(long)]
    window_size: Option<usize>,

    /// Entropy range that signals drift (0.01-1.0)
    #[arg(long)]
    magnitude: Option<f64>,
}

impl DetectorArgs {
    fn resolve(&self) -> Result<SeddConfig> {
        let mut config = match &self.config {
            Some(path) => SeddConfig::load(path)?,
            None => SeddConfig::default(),
        };
        if let Some(bit_width) = self.bit_width {
            config.bit_width = bit_width;
        }
        if let Some(window_size) = self.window_size {
            config.window_size = window_size;
        }
        if let Some(magnitude) = self.magnitude {
            config.magnitude = magnitude;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ScanReport {
    samples: usize,
    drifts: Vec<DriftPoint>,
    detector: DetectorSnapshot,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.log_level.clone(),
        format: if cli.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
        file: cli.log_file.clone(),
    };
    if let Err(err) = init_logging(&log_config) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = remediation(&err) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn remediation(err: &anyhow::Error) -> Option<String> {
    if let Some(e) = err.downcast_ref::<sedd_core::Error>() {
        return Some(e.remediation());
    }
    err.downcast_ref::<ConfigError>().map(ConfigError::remediation)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Scan {
            input,
            detector,
            format,
        } => {
            let config = detector.resolve()?;
            let raw = read_input(input.as_deref())?;
            let samples = parse_samples(&raw)?;
            let report = scan(config, &samples)?;
            print_report(&report, format)
        }
        Commands::Config { detector } => {
            let config = detector.resolve()?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read input file {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_samples(raw: &str) -> Result<Vec<f64>> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<f64>()
                .with_context(|| format!("invalid sample {token:?} at position {i}"))
        })
        .collect()
}

fn scan(config: SeddConfig, samples: &[f64]) -> Result<ScanReport> {
    let mut detector = SpectralDriftDetector::new(config)?;
    info!(
        samples = samples.len(),
        window_size = config.window_size,
        bit_width = config.bit_width,
        magnitude = config.magnitude,
        "scan started"
    );

    let mut drifts = Vec::new();
    for (index, &value) in samples.iter().enumerate() {
        detector.push(value);
        if detector.drift_detected() {
            drifts.push(DriftPoint {
                index,
                upper_bound: detector.upper_bound(),
                lower_bound: detector.lower_bound(),
                entropy: detector.last_entropy().unwrap_or(f64::NAN),
            });
        }
    }

    debug!(drifts = drifts.len(), "scan finished");
    Ok(ScanReport {
        samples: samples.len(),
        drifts,
        detector: detector.snapshot(),
    })
}

fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            for point in &report.drifts {
                println!(
                    "drift at index {}: upper={:.6} lower={:.6} entropy={:.6}",
                    point.index, point.upper_bound, point.lower_bound, point.entropy
                );
            }
            println!(
                "samples: {}, drifts: {}, phase: {}",
                report.samples,
                report.drifts.len(),
                report.detector.phase
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mixed_separators() {
        let samples = parse_samples("0 1,1\n0\t1 ,, \n").unwrap();
        assert_eq!(samples, vec![0.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_samples("  \n").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_garbage_with_position() {
        let err = parse_samples("0 1 x 1").unwrap_err();
        assert!(format!("{err:#}").contains("position 2"), "{err:#}");
    }

    #[test]
    fn flags_override_defaults() {
        let args = DetectorArgs {
            config: None,
            bit_width: Some(8),
            window_size: Some(64),
            magnitude: None,
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.bit_width, 8);
        assert_eq!(config.window_size, 64);
        assert_eq!(config.magnitude, SeddConfig::default().magnitude);
    }

    #[test]
    fn invalid_override_has_hint() {
        let args = DetectorArgs {
            config: None,
            bit_width: None,
            window_size: Some(100),
            magnitude: None,
        };
        let err = args.resolve().unwrap_err();
        let hint = remediation(&err).unwrap();
        assert!(hint.contains("power of two"), "{hint}");
    }

    #[test]
    fn scan_counts_drifts() {
        let mut samples = vec![0.0; 74];
        samples.extend((0..64).map(|i| f64::from(i % 2)));
        let config = SeddConfig {
            window_size: 64,
            ..SeddConfig::default()
        };
        let report = scan(config, &samples).unwrap();
        assert_eq!(report.samples, 138);
        assert_eq!(report.drifts.len(), 1);
        assert_eq!(report.detector.drifts_detected, 1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

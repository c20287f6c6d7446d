//! Detector configuration.
//!
//! Three parameters fixed at construction: the Bernoulli register width,
//! the sliding window length and the entropy-range threshold. Values can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! bit_width = 32
//! window_size = 128
//! magnitude = 0.37
//! ```
//!
//! Every key is optional; missing keys take the defaults.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default Bernoulli shift register width in bits.
pub const DEFAULT_BIT_WIDTH: u32 = 32;

/// Default sliding window length in samples.
pub const DEFAULT_WINDOW_SIZE: usize = 128;

/// Default entropy-range threshold.
pub const DEFAULT_MAGNITUDE: f64 = 0.37;

/// Accepted register widths.
pub const BIT_WIDTH_RANGE: RangeInclusive<u32> = 4..=32;

/// Accepted window lengths (additionally restricted to powers of two).
pub const WINDOW_SIZE_RANGE: RangeInclusive<usize> = 32..=1024;

/// Accepted entropy-range thresholds.
pub const MAGNITUDE_RANGE: RangeInclusive<f64> = 0.01..=1.0;

/// Configuration for [`SpectralDriftDetector`](crate::detector::SpectralDriftDetector).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeddConfig {
    /// Width of the Bernoulli shift register (4-32). Default: 32.
    pub bit_width: u32,
    /// Samples per window; power of two in 32-1024. Default: 128.
    pub window_size: usize,
    /// Entropy range at which drift is signalled (0.01-1.0). Default: 0.37.
    pub magnitude: f64,
}

impl Default for SeddConfig {
    fn default() -> Self {
        Self {
            bit_width: DEFAULT_BIT_WIDTH,
            window_size: DEFAULT_WINDOW_SIZE,
            magnitude: DEFAULT_MAGNITUDE,
        }
    }
}

impl SeddConfig {
    /// Validate every parameter, including the power-of-two window length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BIT_WIDTH_RANGE.contains(&self.bit_width) {
            return Err(ConfigError::ValidationError(format!(
                "bit_width must be in {}..={}, got {}",
                BIT_WIDTH_RANGE.start(),
                BIT_WIDTH_RANGE.end(),
                self.bit_width
            )));
        }
        if !WINDOW_SIZE_RANGE.contains(&self.window_size) {
            return Err(ConfigError::ValidationError(format!(
                "window_size must be in {}..={}, got {}",
                WINDOW_SIZE_RANGE.start(),
                WINDOW_SIZE_RANGE.end(),
                self.window_size
            )));
        }
        if !self.window_size.is_power_of_two() {
            return Err(ConfigError::ValidationError(format!(
                "window_size must be a power of two, got {}",
                self.window_size
            )));
        }
        // RangeInclusive::contains is false for NaN, which covers non-finite input.
        if !MAGNITUDE_RANGE.contains(&self.magnitude) {
            return Err(ConfigError::ValidationError(format!(
                "magnitude must be in {}..={}, got {}",
                MAGNITUDE_RANGE.start(),
                MAGNITUDE_RANGE.end(),
                self.magnitude
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(s).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::SerializeFailed(e.to_string()))
    }

    /// `2^bit_width`, the divisor that maps the register into `[0, 1)`.
    #[must_use]
    pub fn bernoulli_factor(&self) -> u64 {
        1u64 << self.bit_width
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format: {s}. Expected one of: pretty, json")),
        }
    }
}

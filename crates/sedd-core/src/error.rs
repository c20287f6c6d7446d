//! Error types for sedd-core

use thiserror::Error;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sedd-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// FFT length precondition violated (radix-2 needs a power of two)
    #[error("FFT size {size} is not a power of two >= {min}")]
    InvalidFftSize {
        /// Requested transform length
        size: usize,
        /// Smallest accepted length
        min: usize,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// One-line guidance for resolving the error
    #[must_use]
    pub fn remediation(&self) -> String {
        match self {
            Self::Config(err) => err.remediation(),
            Self::InvalidFftSize { size, .. } => {
                let lower = size.checked_next_power_of_two().map_or(0, |p| p / 2);
                let upper = size.checked_next_power_of_two().unwrap_or(0);
                format!("Use a power-of-two window size; nearest candidates are {lower} and {upper}.")
            }
            Self::Json(_) => "Check that the snapshot was produced by a compatible version.".into(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadFailed(String, String),

    #[error("Failed to parse config: {0}")]
    ParseFailed(String),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ConfigError {
    #[must_use]
    pub fn remediation(&self) -> String {
        match self {
            Self::ReadFailed(path, _) => {
                format!("Failed to read config file: {path}. Check the path and permissions.")
            }
            Self::ParseFailed(_) => {
                "Fix the TOML syntax; accepted keys are bit_width, window_size and magnitude."
                    .into()
            }
            Self::SerializeFailed(_) => "Report this as a bug with the offending config.".into(),
            Self::ValidationError(_) => {
                "Keep bit_width in 4..=32, window_size a power of two in 32..=1024 and magnitude in 0.01..=1.0."
                    .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: Error = ConfigError::ValidationError("bad".into()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn fft_size_remediation_suggests_neighbours() {
        let err = Error::InvalidFftSize { size: 100, min: 4 };
        let hint = err.remediation();
        assert!(hint.contains("64"), "{hint}");
        assert!(hint.contains("128"), "{hint}");
    }

    #[test]
    fn validation_remediation_names_ranges() {
        let hint = ConfigError::ValidationError("x".into()).remediation();
        assert!(hint.contains("power of two"));
    }
}

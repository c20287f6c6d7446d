//! sedd-core: Spectral Entropy Drift Detection
//!
//! Streaming concept-drift detection over a 0/1 outcome stream (for
//! example a classifier's correct/incorrect sequence). Outcomes are encoded
//! by a Bernoulli shift register, buffered in a sliding window, and each
//! full window is scored by the normalized Shannon entropy of its power
//! spectrum. Drift is signalled when entropy falls far enough below its
//! most recent peak.
//!
//! # Architecture
//!
//! ```text
//! outcome → BernoulliEncoder → SlidingWindow → FftEngine → SpectralEntropy
//!                                                                 ↓
//!                          drift flag ← SpectralDriftDetector ← EntropyBounds
//! ```
//!
//! # Modules
//!
//! - `fft`: in-place radix-2 FFT with power spectrum and half-band sums
//! - `entropy`: normalized spectral entropy of a window
//! - `encoder`: Bernoulli shift register
//! - `window`: fixed-capacity sliding window with an FFT scratch buffer
//! - `bounds`: running entropy range and the drift test
//! - `detector`: the streaming detector and the `ChangeDetector` contract
//! - `config`: detector parameters and TOML loading
//! - `logging`: tracing subscriber setup
//! - `error`: error types
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod bounds;
pub mod config;
pub mod detector;
pub mod encoder;
pub mod entropy;
pub mod error;
pub mod fft;
pub mod logging;
pub mod window;

pub use config::SeddConfig;
pub use detector::{
    ChangeDetector, DetectorPhase, DetectorSnapshot, DriftPoint, SpectralDriftDetector,
    scan_stream,
};
pub use error::{ConfigError, Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

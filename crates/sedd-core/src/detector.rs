//! Spectral Entropy Drift Detection (SEDD) over a 0/1 outcome stream.
//!
//! Each input bit is encoded by a Bernoulli shift register, appended to a
//! sliding window, and once the window is full every further input first
//! scores the current window by spectral entropy. Drift is raised when the
//! entropy has fallen at least `magnitude` below its latest peak.
//!
//! # Pipeline
//!
//! ```text
//! bit ──► BernoulliEncoder ──► SlidingWindow ──(full)──► FFT ──► entropy
//!                                                                  │
//!          drift flag ◄── range ≥ magnitude ◄── EntropyBounds ◄────┘
//! ```
//!
//! # Lifecycle
//!
//! - Construction validates the config and builds the FFT engine; nothing
//!   else is allocated until the first [`push`](SpectralDriftDetector::push).
//! - Filling: the first `window_size` samples after a reset only fill the
//!   window.
//! - Sliding: every later sample evaluates the full window *before* the
//!   sample is admitted, updates the bounds, then evicts the oldest sample.
//! - Once the flag is raised, the next push resets register, fill index and
//!   bounds before it is processed. The window arena keeps its stale values.
//!
//! Not thread-safe; run one detector per stream.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::bounds::EntropyBounds;
use crate::config::SeddConfig;
use crate::encoder::BernoulliEncoder;
use crate::entropy::SpectralEntropy;
use crate::error::Result;
use crate::window::SlidingWindow;

// =============================================================================
// Change detector contract
// =============================================================================

/// Contract shared by streaming change detectors: feed one value per step,
/// then poll.
pub trait ChangeDetector {
    /// Feed one observation.
    fn input(&mut self, value: f64);

    /// Whether a change was signalled by the last input.
    fn change_detected(&self) -> bool;

    /// Whether the detector is in a warning level.
    fn warning_zone(&self) -> bool {
        false
    }

    /// Current statistic the detector tracks.
    fn estimation(&self) -> f64;

    /// Estimated delay between the change and its detection, in samples.
    fn delay(&self) -> f64 {
        0.0
    }

    /// Drop all learned state.
    fn reset(&mut self);
}

// =============================================================================
// Phase / snapshot
// =============================================================================

/// Where the detector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorPhase {
    /// No sample seen yet; buffers not allocated.
    Uninitialized,
    /// Window not yet full; no entropy is computed.
    Filling,
    /// Window full; every push evaluates entropy.
    Sliding,
}

impl std::fmt::Display for DetectorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Filling => write!(f, "filling"),
            Self::Sliding => write!(f, "sliding"),
        }
    }
}

/// Point-in-time view of a detector, for diagnostics and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSnapshot {
    pub config: SeddConfig,
    pub phase: DetectorPhase,
    /// Valid samples currently held in the window.
    pub window_len: usize,
    pub upper_bound: f64,
    pub lower_bound: f64,
    /// Last computed entropy; `None` before the first evaluation, after a
    /// reset, or when the value was not finite.
    pub last_entropy: Option<f64>,
    pub drift_detected: bool,
    /// Pushes since construction.
    pub samples_seen: u64,
    /// Drift episodes since construction.
    pub drifts_detected: u64,
}

impl DetectorSnapshot {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot previously written by [`to_json`](Self::to_json).
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

// =============================================================================
// Detector
// =============================================================================

/// Buffers allocated on first input.
#[derive(Debug, Clone)]
struct StreamState {
    encoder: BernoulliEncoder,
    window: SlidingWindow,
}

impl StreamState {
    fn new(config: &SeddConfig) -> Self {
        Self {
            encoder: BernoulliEncoder::new(config.bit_width),
            window: SlidingWindow::new(config.window_size),
        }
    }
}

/// Spectral entropy drift detector for one binary stream.
#[derive(Debug, Clone)]
pub struct SpectralDriftDetector {
    config: SeddConfig,
    calculator: SpectralEntropy,
    state: Option<StreamState>,
    bounds: EntropyBounds,
    drift: bool,
    last_entropy: Option<f64>,
    samples_seen: u64,
    drifts_detected: u64,
}

impl SpectralDriftDetector {
    /// Validate `config` and build the detector.
    ///
    /// This is the only fallible step; a window size that is not a power of
    /// two is rejected here.
    pub fn new(config: SeddConfig) -> Result<Self> {
        config.validate()?;
        let calculator = SpectralEntropy::new(config.window_size)?;
        Ok(Self {
            config,
            calculator,
            state: None,
            bounds: EntropyBounds::new(),
            drift: false,
            last_entropy: None,
            samples_seen: 0,
            drifts_detected: 0,
        })
    }

    /// Detector with the default configuration (32 bits, 128 samples, 0.37).
    pub fn with_defaults() -> Result<Self> {
        Self::new(SeddConfig::default())
    }

    /// Push one observation. Only its truncation toward zero is used;
    /// callers are expected to pass 0 or 1.
    pub fn push(&mut self, value: f64) {
        if self.drift {
            self.reset_learning();
        }
        self.samples_seen += 1;

        let config = &self.config;
        let state = self.state.get_or_insert_with(|| StreamState::new(config));
        let sample = state.encoder.encode(value);

        if state.window.is_full() {
            let entropy = self.calculator.compute(state.window.scratch_mut());
            let accepted = self.bounds.update(entropy);
            self.last_entropy = Some(entropy);
            trace!(entropy, accepted, "window entropy");

            if self.bounds.exceeds(self.config.magnitude) {
                self.drift = true;
                self.drifts_detected += 1;
                info!(
                    upper_bound = self.bounds.upper(),
                    lower_bound = self.bounds.lower(),
                    range = self.bounds.range(),
                    magnitude = self.config.magnitude,
                    samples = self.samples_seen,
                    "spectral entropy drift detected"
                );
            }

            state.window.slide(sample);
        } else {
            state.window.push(sample);
            if state.window.is_full() {
                debug!(
                    window_size = self.config.window_size,
                    samples = self.samples_seen,
                    "window full; entropy tracking starts with the next sample"
                );
            }
        }
    }

    /// Whether the last push raised drift.
    #[must_use]
    pub fn drift_detected(&self) -> bool {
        self.drift
    }

    /// Clear register, fill index and bounds. The window arena is reused
    /// as-is and overwritten as filling resumes; counters are kept.
    pub fn reset_learning(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.encoder.reset();
            state.window.reset();
        }
        self.bounds.reset();
        self.drift = false;
        self.last_entropy = None;
        debug!(samples = self.samples_seen, "detector reset");
    }

    #[must_use]
    pub fn config(&self) -> &SeddConfig {
        &self.config
    }

    #[must_use]
    pub fn bounds(&self) -> &EntropyBounds {
        &self.bounds
    }

    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.bounds.upper()
    }

    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.bounds.lower()
    }

    /// Raw entropy of the last evaluated window, including non-finite values.
    #[must_use]
    pub fn last_entropy(&self) -> Option<f64> {
        self.last_entropy
    }

    /// Whether the first sample has arrived and buffers are allocated.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> DetectorPhase {
        match &self.state {
            None => DetectorPhase::Uninitialized,
            Some(state) if state.window.is_full() => DetectorPhase::Sliding,
            Some(_) => DetectorPhase::Filling,
        }
    }

    /// Valid samples currently in the window.
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.window.len())
    }

    /// Encoded samples currently in the window, oldest first.
    #[must_use]
    pub fn window_samples(&self) -> &[f64] {
        self.state.as_ref().map_or(&[] as &[f64], |s| s.window.samples())
    }

    #[must_use]
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    #[must_use]
    pub fn drifts_detected(&self) -> u64 {
        self.drifts_detected
    }

    #[must_use]
    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            config: self.config,
            phase: self.phase(),
            window_len: self.window_len(),
            upper_bound: self.bounds.upper(),
            lower_bound: self.bounds.lower(),
            last_entropy: self.last_entropy.filter(|e| e.is_finite()),
            drift_detected: self.drift,
            samples_seen: self.samples_seen,
            drifts_detected: self.drifts_detected,
        }
    }
}

impl ChangeDetector for SpectralDriftDetector {
    fn input(&mut self, value: f64) {
        self.push(value);
    }

    fn change_detected(&self) -> bool {
        self.drift
    }

    fn estimation(&self) -> f64 {
        self.last_entropy.unwrap_or(0.0)
    }

    fn reset(&mut self) {
        self.reset_learning();
    }
}

// =============================================================================
// Stream helper
// =============================================================================

/// A position in a stream at which drift was raised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftPoint {
    /// Zero-based index of the input that raised the flag.
    pub index: usize,
    pub upper_bound: f64,
    pub lower_bound: f64,
    /// Entropy of the window evaluated at that input.
    pub entropy: f64,
}

/// Run a fresh detector over `values` and collect every drift point.
pub fn scan_stream<I>(config: SeddConfig, values: I) -> Result<Vec<DriftPoint>>
where
    I: IntoIterator<Item = f64>,
{
    let mut detector = SpectralDriftDetector::new(config)?;
    let mut points = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        detector.push(value);
        if detector.drift_detected() {
            points.push(DriftPoint {
                index,
                upper_bound: detector.upper_bound(),
                lower_bound: detector.lower_bound(),
                entropy: detector.last_entropy().unwrap_or(f64::NAN),
            });
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn config(window_size: usize) -> SeddConfig {
        SeddConfig {
            window_size,
            ..SeddConfig::default()
        }
    }

    /// Zeros until well past warm-up, then 0,1,0,1,... Returns the number of
    /// alternating samples needed to raise drift.
    fn steps_to_drift(detector: &mut SpectralDriftDetector, window_size: usize) -> Option<usize> {
        for _ in 0..window_size + 10 {
            detector.push(0.0);
            assert!(!detector.drift_detected());
        }
        (0..3 * window_size).find_map(|i| {
            detector.push((i % 2) as f64);
            detector.drift_detected().then_some(i + 1)
        })
    }

    #[test]
    fn rejects_non_power_of_two_window() {
        for size in [100, 130, 1000] {
            let err = SpectralDriftDetector::new(config(size)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "size {size}");
        }
    }

    #[test]
    fn accepts_power_of_two_windows() {
        for size in [32, 64, 128, 256, 512, 1024] {
            assert!(SpectralDriftDetector::new(config(size)).is_ok(), "size {size}");
        }
    }

    #[test]
    fn lazy_initialization() {
        let mut d = SpectralDriftDetector::with_defaults().unwrap();
        assert!(!d.is_initialized());
        assert_eq!(d.phase(), DetectorPhase::Uninitialized);
        assert_eq!(d.window_len(), 0);
        d.push(1.0);
        assert!(d.is_initialized());
        assert_eq!(d.phase(), DetectorPhase::Filling);
        assert_eq!(d.window_len(), 1);
    }

    #[test]
    fn no_entropy_while_filling() {
        let mut d = SpectralDriftDetector::new(config(32)).unwrap();
        for i in 0..32 {
            d.push((i % 2) as f64);
            assert!(d.last_entropy().is_none());
        }
        assert_eq!(d.phase(), DetectorPhase::Sliding);
        d.push(1.0);
        assert!(d.last_entropy().is_some());
        assert_eq!(d.window_len(), 32);
    }

    #[test]
    fn window_holds_encoded_samples_in_order() {
        let mut d = SpectralDriftDetector::new(SeddConfig {
            bit_width: 4,
            window_size: 32,
            magnitude: 1.0,
        })
        .unwrap();
        for bit in [1.0, 0.0, 1.0] {
            d.push(bit);
        }
        assert_eq!(d.window_samples(), &[1.0 / 16.0, 2.0 / 16.0, 5.0 / 16.0]);
    }

    #[test]
    fn sliding_evicts_oldest_sample() {
        let mut d = SpectralDriftDetector::new(SeddConfig {
            bit_width: 4,
            window_size: 32,
            magnitude: 1.0,
        })
        .unwrap();
        d.push(1.0);
        for _ in 0..31 {
            d.push(0.0);
        }
        assert_eq!(d.window_samples()[0], 1.0 / 16.0);
        d.push(0.0);
        assert_eq!(d.window_samples()[0], 2.0 / 16.0);
        assert_eq!(d.window_samples()[31], 0.0);
    }

    #[test]
    fn all_zero_stream_never_drifts() {
        let mut d = SpectralDriftDetector::with_defaults().unwrap();
        for _ in 0..1000 {
            d.push(0.0);
            assert!(!d.drift_detected());
        }
        assert!(d.last_entropy().is_some_and(f64::is_nan));
        assert_eq!((d.upper_bound(), d.lower_bound()), (0.0, 0.0));
        assert_eq!(d.snapshot().last_entropy, None);
    }

    #[test]
    fn all_ones_stream_does_not_drift_at_default_window() {
        let mut d = SpectralDriftDetector::with_defaults().unwrap();
        for _ in 0..640 {
            d.push(1.0);
            assert!(!d.drift_detected());
        }
    }

    #[test]
    fn alternation_after_zeros_raises_drift() {
        for size in [64, 128, 256] {
            let mut d = SpectralDriftDetector::new(config(size)).unwrap();
            let steps = steps_to_drift(&mut d, size).expect("drift should fire");
            assert!(steps <= size, "window {size}: drift after {steps} steps");
            assert!(d.upper_bound() - d.lower_bound() >= 0.37);
            assert_eq!(d.drifts_detected(), 1);
        }
    }

    #[test]
    fn reset_on_push_after_drift() {
        let mut d = SpectralDriftDetector::with_defaults().unwrap();
        steps_to_drift(&mut d, 128).expect("drift should fire");
        d.push(1.0);
        assert!(!d.drift_detected());
        assert_eq!(d.upper_bound(), 0.0);
        assert_eq!(d.lower_bound(), 0.0);
        assert_eq!(d.phase(), DetectorPhase::Filling);
        assert_eq!(d.window_len(), 1);
        // The register restarted from zero before the bit was shifted in.
        assert_eq!(d.window_samples(), &[1.0 / 4_294_967_296.0]);
    }

    #[test]
    fn explicit_reset_keeps_counters() {
        let mut d = SpectralDriftDetector::with_defaults().unwrap();
        steps_to_drift(&mut d, 128).expect("drift should fire");
        let seen = d.samples_seen();
        d.reset_learning();
        assert!(!d.drift_detected());
        assert_eq!(d.window_len(), 0);
        assert_eq!(d.samples_seen(), seen);
        assert_eq!(d.drifts_detected(), 1);
    }

    #[test]
    fn change_detector_contract() {
        let mut d = SpectralDriftDetector::new(config(64)).unwrap();
        let det: &mut dyn ChangeDetector = &mut d;
        assert_eq!(det.estimation(), 0.0);
        assert!(!det.warning_zone());
        assert_eq!(det.delay(), 0.0);
        for _ in 0..74 {
            det.input(0.0);
        }
        let mut fired = false;
        for i in 0..64 {
            det.input((i % 2) as f64);
            fired |= det.change_detected();
            if fired {
                break;
            }
        }
        assert!(fired);
        assert!(det.estimation() > 0.0);
        det.reset();
        assert!(!det.change_detected());
        assert_eq!(det.estimation(), 0.0);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut d = SpectralDriftDetector::new(config(32)).unwrap();
        for i in 0..40 {
            d.push((i % 2) as f64);
        }
        let snap = d.snapshot();
        assert_eq!(snap.phase, DetectorPhase::Sliding);
        assert_eq!(snap.window_len, 32);
        assert_eq!(snap.samples_seen, 40);
        assert_eq!(snap.config.window_size, 32);
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"phase\": \"sliding\""), "{json}");
        let parsed = DetectorSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed.phase, DetectorPhase::Sliding);
        assert_eq!(parsed.samples_seen, 40);
    }

    #[test]
    fn snapshot_from_bad_json_is_json_error() {
        let err = DetectorSnapshot::from_json("{\"phase\": 3}").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn scan_stream_reports_indices() {
        let mut stream = vec![0.0; 138];
        stream.extend((0..128).map(|i| (i % 2) as f64));
        let points = scan_stream(SeddConfig::default(), stream).unwrap();
        assert!(!points.is_empty());
        let first = points[0];
        assert!(first.index >= 138 && first.index < 138 + 128, "{first:?}");
        assert!(first.upper_bound - first.lower_bound >= 0.37);
        assert!(first.entropy > 0.0 && first.entropy < 1.0);
    }

    #[test]
    fn scan_stream_rejects_bad_config() {
        assert!(scan_stream(config(100), vec![0.0; 10]).is_err());
    }

    #[test]
    fn phase_display() {
        assert_eq!(DetectorPhase::Uninitialized.to_string(), "uninitialized");
        assert_eq!(DetectorPhase::Filling.to_string(), "filling");
        assert_eq!(DetectorPhase::Sliding.to_string(), "sliding");
    }
}

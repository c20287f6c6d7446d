//! Normalized spectral entropy of a window.
//!
//! The power spectrum is folded into a single-sided distribution: DC keeps
//! its own share, bins `1..=N/2` are doubled to absorb their mirrored
//! negative-frequency twins. The Shannon entropy of that distribution is
//! divided by `ln(N/2)`:
//!
//! ```text
//! P   = Σ|X[k]|²  (all N bins)
//! p₀  = |X[0]|² / P
//! pₖ  = 2|X[k]|² / P          for 1 ≤ k ≤ N/2, |X[k]|² > 0
//! H   = -(p₀ ln p₀ + Σ pₖ ln pₖ) / ln(N/2)
//! ```
//!
//! The Nyquist bin is doubled as well, so the shares add up to slightly more
//! than one. For smooth, DC-dominated windows `H` stays inside `[0, 1]`;
//! impulse-like windows overshoot 1, Nyquist-dominated ones can go negative,
//! and an all-zero window yields NaN. Callers filter on `(0, 1)`.

use crate::error::{Error, Result};
use crate::fft::{Complex, FftEngine};

/// Smallest window for which `ln(N/2)` is positive.
pub const MIN_ENTROPY_SIZE: usize = 4;

/// Spectral entropy calculator bound to one window length.
#[derive(Debug, Clone)]
pub struct SpectralEntropy {
    engine: FftEngine,
    log_norm: f64,
}

impl SpectralEntropy {
    /// Create a calculator for windows of `size` samples.
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_ENTROPY_SIZE {
            return Err(Error::InvalidFftSize {
                size,
                min: MIN_ENTROPY_SIZE,
            });
        }
        let engine = FftEngine::new(size)?;
        Ok(Self {
            engine,
            log_norm: ((size / 2) as f64).ln(),
        })
    }

    /// Window length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.engine.size()
    }

    /// Power spectrum of the most recent window.
    #[must_use]
    pub fn power_spectrum(&self) -> &[f64] {
        self.engine.power_spectrum()
    }

    /// Entropy of `window`, which is transformed in place.
    ///
    /// May return a non-finite or out-of-range value for degenerate windows.
    ///
    /// # Panics
    ///
    /// Panics if `window.len()` differs from [`size`](Self::size).
    pub fn compute(&mut self, window: &mut [Complex]) -> f64 {
        let spectrum = self.engine.transform(window);
        let total = spectrum.half_sums.total();
        let bins = spectrum.bins;

        // DC share enters unconditionally; 0/0 and 0·ln 0 both give NaN.
        let p_dc = bins[0] / total;
        let mut acc = p_dc * p_dc.ln();

        for &power in &bins[1..=bins.len() / 2] {
            if power > 0.0 {
                let p = 2.0 * power / total;
                acc += p * p.ln();
            }
        }

        -acc / self.log_norm
    }
}

/// One-shot entropy of a real-valued window; allocates its own engine.
pub fn spectral_entropy(samples: &[f64]) -> Result<f64> {
    let mut calc = SpectralEntropy::new(samples.len())?;
    let mut window: Vec<Complex> = samples.iter().map(|&x| Complex::real(x)).collect();
    Ok(calc.compute(&mut window))
}

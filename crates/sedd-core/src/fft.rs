//! In-place radix-2 Cooley-Tukey FFT with a power-spectrum side output.
//!
//! The engine owns its twiddle table and power buffer, so a transform never
//! allocates. Besides the per-bin power `|X[k]|²` it returns the sums over
//! the lower and upper halves of the spectrum, gathered during the last
//! butterfly stage so callers can normalise without a second pass.
//!
//! ```text
//! buffer ──► bit-reverse ──► stages 2,4,…,N ──► |X[k]|² + (Σ lower, Σ upper)
//! ```

use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Smallest transform length the engine accepts.
pub const MIN_FFT_SIZE: usize = 2;

/// Complex sample, `re + i·im`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Real sample with zero imaginary part.
    #[must_use]
    pub const fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// Squared magnitude.
    #[must_use]
    pub fn mag_sq(self) -> f64 {
        self.re.mul_add(self.re, self.im * self.im)
    }
}

impl std::ops::Add for Complex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl std::ops::Sub for Complex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl std::ops::Mul for Complex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re.mul_add(rhs.re, -(self.im * rhs.im)),
            self.re.mul_add(rhs.im, self.im * rhs.re),
        )
    }
}

/// Spectral power split at `N/2`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HalfSums {
    /// Σ power over bins `0..N/2`.
    pub lower: f64,
    /// Σ power over bins `N/2..N`.
    pub upper: f64,
}

impl HalfSums {
    /// Total power over all `N` bins.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lower + self.upper
    }
}

/// Result of one transform: borrowed per-bin power plus the half sums.
#[derive(Debug, Clone, Copy)]
pub struct PowerSpectrum<'a> {
    pub bins: &'a [f64],
    pub half_sums: HalfSums,
}

/// Reusable radix-2 FFT for one fixed length.
#[derive(Debug, Clone)]
pub struct FftEngine {
    size: usize,
    bits: u32,
    /// `exp(-2πik/N)` for `k < N/2`; stage `L` uses every `N/L`-th entry.
    twiddles: Vec<Complex>,
    power: Vec<f64>,
}

impl FftEngine {
    /// Build an engine for transforms of exactly `size` points.
    ///
    /// Fails with [`Error::InvalidFftSize`] unless `size` is a power of two
    /// of at least [`MIN_FFT_SIZE`]; this is the only failure mode.
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_FFT_SIZE || !size.is_power_of_two() {
            return Err(Error::InvalidFftSize {
                size,
                min: MIN_FFT_SIZE,
            });
        }
        let twiddles = (0..size / 2)
            .map(|k| {
                let theta = -2.0 * PI * k as f64 / size as f64;
                Complex::new(theta.cos(), theta.sin())
            })
            .collect();
        Ok(Self {
            size,
            bits: size.trailing_zeros(),
            twiddles,
            power: vec![0.0; size],
        })
    }

    /// Transform length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Power spectrum of the most recent transform (zeros before the first).
    #[must_use]
    pub fn power_spectrum(&self) -> &[f64] {
        &self.power
    }

    /// Transform `buffer` in place and return its power spectrum.
    ///
    /// # Panics
    ///
    /// Panics if `buffer.len()` differs from the engine size.
    pub fn transform(&mut self, buffer: &mut [Complex]) -> PowerSpectrum<'_> {
        let n = self.size;
        assert_eq!(buffer.len(), n, "buffer length must equal FFT size");

        for i in 1..n {
            let j = bit_reverse(i, self.bits);
            if i < j {
                buffer.swap(i, j);
            }
        }

        let mut half_sums = HalfSums::default();
        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let stride = n / len;
            let last_stage = len == n;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let even_idx = start + k;
                    let odd_idx = even_idx + half;
                    let even = buffer[even_idx];
                    let odd = buffer[odd_idx] * self.twiddles[k * stride];
                    buffer[even_idx] = even + odd;
                    buffer[odd_idx] = even - odd;

                    // Earlier stages would be overwritten; only the final one is kept.
                    if last_stage {
                        let p_even = buffer[even_idx].mag_sq();
                        let p_odd = buffer[odd_idx].mag_sq();
                        self.power[even_idx] = p_even;
                        self.power[odd_idx] = p_odd;
                        half_sums.lower += p_even;
                        half_sums.upper += p_odd;
                    }
                }
            }
            len <<= 1;
        }

        PowerSpectrum {
            bins: &self.power,
            half_sums,
        }
    }
}

/// Reverse the low `bits` bits of `n`.
fn bit_reverse(n: usize, bits: u32) -> usize {
    n.reverse_bits() >> (usize::BITS - bits)
}

//! Fixed-capacity sliding window of encoded samples.
//!
//! Two parallel arenas of the same capacity: `samples` keeps the real
//! values in time order, `scratch` is the complex buffer handed to the FFT,
//! which overwrites it in place. Eviction is a left shift by one that
//! rebuilds `scratch` from `samples`, so the transform always sees a
//! linear, oldest-first buffer. Neither arena is reallocated after
//! construction; [`reset`](SlidingWindow::reset) only rewinds the fill
//! index and leaves stale values to be overwritten.

use crate::fft::Complex;

/// Oldest-first window with a fill index.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: Vec<f64>,
    scratch: Vec<Complex>,
    len: usize,
}

impl SlidingWindow {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            scratch: vec![Complex::ZERO; capacity],
            len: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of valid samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.samples.len()
    }

    /// Valid samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples[..self.len]
    }

    /// Complex buffer for an in-place transform. Only meaningful when full.
    pub fn scratch_mut(&mut self) -> &mut [Complex] {
        &mut self.scratch
    }

    /// Append during the filling phase.
    ///
    /// # Panics
    ///
    /// Panics if the window is already full; use [`slide`](Self::slide).
    pub fn push(&mut self, value: f64) {
        assert!(!self.is_full(), "push on a full window; slide instead");
        self.samples[self.len] = value;
        self.scratch[self.len] = Complex::real(value);
        self.len += 1;
    }

    /// Evict the oldest sample and append `value` at the end.
    ///
    /// Every slot of the complex buffer is rewritten from `samples` with a
    /// zero imaginary part, undoing whatever the last transform left there.
    ///
    /// # Panics
    ///
    /// Panics unless the window is full.
    pub fn slide(&mut self, value: f64) {
        assert!(self.is_full(), "slide on a window that is still filling");
        let last = self.samples.len() - 1;
        self.samples.copy_within(1.., 0);
        self.samples[last] = value;
        for (slot, &x) in self.scratch.iter_mut().zip(&self.samples) {
            *slot = Complex::real(x);
        }
    }

    /// Rewind to empty without touching stored values.
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

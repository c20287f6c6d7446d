//! Running entropy range and the drift decision.
//!
//! Only entropies strictly inside `(0, 1)` are admitted; NaN, infinities and
//! the out-of-range values produced by degenerate windows fail both
//! comparisons and leave the bounds untouched.
//!
//! A new maximum collapses the lower bound onto it, so the range measures
//! how far entropy has fallen since its most recent peak. The two checks
//! run in sequence: the lower-bound test sees the freshly collapsed value.

use serde::{Deserialize, Serialize};

/// Running max/min of admitted entropy samples since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntropyBounds {
    upper: f64,
    lower: f64,
}

impl EntropyBounds {
    /// Bounds at `0.0 / 0.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one entropy sample in. Returns whether it was admitted.
    pub fn update(&mut self, entropy: f64) -> bool {
        if !(entropy > 0.0 && entropy < 1.0) {
            return false;
        }
        if entropy > self.upper {
            self.upper = entropy;
            self.lower = self.upper;
        }
        if entropy < self.lower {
            self.lower = entropy;
        }
        true
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// `upper - lower`.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Drift condition: `range >= magnitude`.
    #[must_use]
    pub fn exceeds(&self, magnitude: f64) -> bool {
        self.range() >= magnitude
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

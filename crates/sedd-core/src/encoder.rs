//! Bernoulli-shift encoder.
//!
//! A `bit_width`-bit shift register fed one input per step, read back as
//! the binary fraction `register / 2^bit_width` in `[0, 1)`. The newest bit
//! lands in the least significant position, so the value is a finite
//! expansion of the recent history under the Bernoulli shift map.

use crate::config::BIT_WIDTH_RANGE;

/// Fixed-width shift register producing values in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct BernoulliEncoder {
    bit_width: u32,
    mask: u64,
    factor: f64,
    register: u64,
}

impl BernoulliEncoder {
    /// Create an encoder with an empty register.
    ///
    /// - `bit_width`: register width, clamped to 4..=32.
    #[must_use]
    pub fn new(bit_width: u32) -> Self {
        let bit_width = bit_width.clamp(*BIT_WIDTH_RANGE.start(), *BIT_WIDTH_RANGE.end());
        let modulus = 1u64 << bit_width;
        Self {
            bit_width,
            mask: modulus - 1,
            factor: modulus as f64,
            register: 0,
        }
    }

    /// Shift in `value` and return the encoded sample.
    ///
    /// Only `value` truncated toward zero is used. Anything other than 0 or
    /// 1 is added into the low-order bits unchecked (with two's-complement
    /// wrap for negatives) before masking.
    pub fn encode(&mut self, value: f64) -> f64 {
        let bit = value as i64;
        self.register = (self.register << 1).wrapping_add(bit as u64) & self.mask;
        self.value()
    }

    /// Current encoded sample without shifting.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.register as f64 / self.factor
    }

    /// Raw register contents.
    #[must_use]
    pub fn register(&self) -> u64 {
        self.register
    }

    #[must_use]
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Clear the register.
    pub fn reset(&mut self) {
        self.register = 0;
    }
}

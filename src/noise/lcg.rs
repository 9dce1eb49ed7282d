//! Seeded linear congruential generator.
//!
//! Spoofed values must be reproducible: a page that reads the same
//! parameter twice has to see the same jitter, or the inconsistency
//! itself becomes a fingerprint. This generator trades statistical
//! quality for exact, cheap reproducibility. It is never used for
//! anything security-sensitive.

use super::seed::NoiseSeed;

/// LCG multiplier (same family as the classic C library generator).
const MULTIPLIER: u32 = 1_103_515_245;
/// LCG increment.
const INCREMENT: u32 = 12_345;
/// State and outputs are reduced modulo 2^31.
const MODULUS_MASK: u32 = 0x7fff_ffff;

/// Deterministic pseudo-random stream for one spoofing operation.
pub struct NoiseRng {
    state: u32,
    /// Cached second Box-Muller output.
    spare_gaussian: Option<f64>,
}

impl NoiseRng {
    /// Creates a generator whose entire output is fixed by `seed`.
    pub fn new(seed: NoiseSeed) -> Self {
        Self {
            state: seed.value() & MODULUS_MASK,
            spare_gaussian: None,
        }
    }

    /// Advances the generator and returns the new 31-bit state.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MODULUS_MASK;
        self.state
    }

    /// Returns a uniform value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (1u64 << 31) as f64
    }

    /// Returns a standard normal deviate via Box-Muller.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(spare) = self.spare_gaussian.take() {
            return spare;
        }

        // Box-Muller needs u > 0 for the logarithm.
        let u = self.next_f64().max(f64::MIN_POSITIVE);
        let v = self.next_f64();

        let radius = (-2.0 * u.ln()).sqrt();
        let angle = 2.0 * std::f64::consts::PI * v;

        self.spare_gaussian = Some(radius * angle.sin());
        radius * angle.cos()
    }
}

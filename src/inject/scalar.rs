//! Scalar parameter jitter.
//!
//! Numeric fingerprint surfaces (measured text widths, analyser
//! magnitudes, timing-adjacent values) get a bounded deterministic
//! delta instead of field noise.

use crate::noise::{NoiseRng, NoiseSeed};

/// Magnitude scale applied to integer parameter deltas.
pub const INT_NOISE_SCALE: f64 = 100.0;

/// Adds a deterministic delta in +/-`noise_level` to a float value.
///
/// A non-positive `noise_level` returns the value unchanged.
pub fn inject_scalar_noise(value: f64, noise_level: f64, seed: NoiseSeed) -> f64 {
    if noise_level <= 0.0 {
        return value;
    }

    let mut rng = NoiseRng::new(seed);
    value + (rng.next_f64() - 0.5) * 2.0 * noise_level
}

/// Adds a deterministic delta in +/-`noise_level * INT_NOISE_SCALE` to
/// an integer value.
pub fn inject_scalar_noise_i64(value: i64, noise_level: f64, seed: NoiseSeed) -> i64 {
    if noise_level <= 0.0 {
        return value;
    }

    let mut rng = NoiseRng::new(seed);
    let delta = (rng.next_f64() - 0.5) * 2.0 * noise_level * INT_NOISE_SCALE;
    value + delta as i64
}

//! RGBA pixel-buffer noise.
//!
//! Perturbs the colour channels of interleaved RGBA data with a smooth
//! noise field. The alpha channel is never touched: pages compare
//! alpha against known-opaque values, and transparency changes break
//! compositing in visible ways.

use crate::noise::{NoiseSeed, SmoothNoise};

/// Bytes per interleaved pixel group.
pub const RGBA_CHANNELS: usize = 4;

/// Applies smooth noise to the colour channels of RGBA data.
///
/// The field is sampled in pixel coordinates scaled by `frequency`,
/// and the sample is scaled by `amplitude * noise_level` before being
/// truncated to an integer delta, so the default field at noise level
/// 0.1 shifts a channel by at most +/-1.
pub struct PixelNoiseInjector {
    /// Spatial frequency of the field, in 1/pixels.
    frequency: f64,
    /// Channel delta at noise level 1.0.
    amplitude: f64,
}

impl PixelNoiseInjector {
    /// Creates an injector with the stock field parameters.
    pub fn new() -> Self {
        Self {
            frequency: 0.1,
            amplitude: 10.0,
        }
    }

    /// Creates an injector with custom field parameters.
    pub fn with_field(frequency: f64, amplitude: f64) -> Self {
        Self { frequency, amplitude }
    }

    /// Perturbs R, G and B of each complete 4-byte group in place.
    ///
    /// `width` is the true row width in pixels and must be supplied by
    /// the caller; it is never inferred from the buffer length.
    /// Trailing bytes short of a complete group are left untouched, as
    /// is the whole buffer when it is empty, `width` is zero, or
    /// `noise_level` is zero or below. Returns the number of pixel
    /// groups written.
    pub fn apply(
        &self,
        pixels: &mut [u8],
        width: u32,
        noise_level: f64,
        seed: NoiseSeed,
    ) -> usize {
        if noise_level <= 0.0 || pixels.is_empty() || width == 0 {
            return 0;
        }

        let field = SmoothNoise::new(seed);
        let width = width as usize;
        let complete = pixels.len() / RGBA_CHANNELS;

        for index in 0..complete {
            let x = (index % width) as f64;
            let y = (index / width) as f64;

            let sample = field.sample(x * self.frequency, y * self.frequency);
            let delta = (sample * noise_level * self.amplitude) as i32;

            let base = index * RGBA_CHANNELS;
            for channel in &mut pixels[base..base + 3] {
                *channel = (i32::from(*channel) + delta).clamp(0, 255) as u8;
            }
        }

        complete
    }
}

impl Default for PixelNoiseInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seed(n: u32) -> NoiseSeed {
        NoiseSeed::from_raw(n)
    }

    #[test]
    fn test_zero_level_is_noop() {
        let mut pixels = vec![10, 20, 30, 40, 50, 60, 70, 80];
        let before = pixels.clone();

        let written = PixelNoiseInjector::new().apply(&mut pixels, 2, 0.0, seed(1));

        assert_eq!(written, 0);
        assert_eq!(pixels, before);
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let mut pixels: Vec<u8> = Vec::new();
        assert_eq!(PixelNoiseInjector::new().apply(&mut pixels, 4, 0.5, seed(1)), 0);
    }

    #[test]
    fn test_zero_width_is_noop() {
        let mut pixels = vec![10, 20, 30, 40];
        let before = pixels.clone();

        PixelNoiseInjector::new().apply(&mut pixels, 0, 0.5, seed(1));

        assert_eq!(pixels, before);
    }

    #[test]
    fn test_deterministic_and_changes_pixels() {
        let mut a = vec![128u8; 16 * 16 * RGBA_CHANNELS];
        let mut b = a.clone();
        let before = a.clone();
        let injector = PixelNoiseInjector::new();

        let written = injector.apply(&mut a, 16, 1.0, seed(7));
        injector.apply(&mut b, 16, 1.0, seed(7));

        assert_eq!(written, 256);
        assert_eq!(a, b);
        assert_ne!(a, before);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = vec![128u8; 16 * 16 * RGBA_CHANNELS];
        let mut b = a.clone();
        let injector = PixelNoiseInjector::new();

        injector.apply(&mut a, 16, 1.0, seed(1));
        injector.apply(&mut b, 16, 1.0, seed(2));

        assert_ne!(a, b);
    }

    #[test]
    fn test_single_pixel_alpha_preserved() {
        let mut pixels = vec![100, 150, 200, 255];

        let written = PixelNoiseInjector::new().apply(&mut pixels, 1, 0.1, seed(42));

        assert_eq!(written, 1);
        assert_eq!(pixels[3], 255);
    }

    proptest! {
        #[test]
        fn prop_alpha_and_tail_preserved(
            data in prop::collection::vec(any::<u8>(), 0..512),
            width in 1u32..64,
            level in 0.0f64..1.0,
            raw_seed in any::<u32>(),
        ) {
            let mut noised = data.clone();
            PixelNoiseInjector::new().apply(&mut noised, width, level, seed(raw_seed));

            let tail_start = data.len() / RGBA_CHANNELS * RGBA_CHANNELS;
            for (i, (&before, &after)) in data.iter().zip(noised.iter()).enumerate() {
                if i % RGBA_CHANNELS == 3 || i >= tail_start {
                    prop_assert_eq!(before, after);
                }
            }
        }

        #[test]
        fn prop_apply_is_deterministic(
            data in prop::collection::vec(any::<u8>(), 0..256),
            width in 1u32..32,
            raw_seed in any::<u32>(),
        ) {
            let mut a = data.clone();
            let mut b = data;
            let injector = PixelNoiseInjector::new();

            injector.apply(&mut a, width, 0.5, seed(raw_seed));
            injector.apply(&mut b, width, 0.5, seed(raw_seed));

            prop_assert_eq!(a, b);
        }
    }
}

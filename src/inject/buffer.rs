//! Raw byte and audio sample noise.
//!
//! WebGL readbacks and texture uploads are byte soup rather than
//! structured RGBA, and analyser output is blocks of float samples;
//! both get per-element deltas from the seeded LCG stream.

use crate::noise::{NoiseRng, NoiseSeed};

/// Perturbs every byte by a delta in +/-`noise_level * 255`, clamped to
/// [0, 255].
///
/// Empty buffers and non-positive noise levels are no-ops. Returns the
/// number of bytes written.
pub fn inject_byte_noise(buffer: &mut [u8], noise_level: f64, seed: NoiseSeed) -> usize {
    if noise_level <= 0.0 || buffer.is_empty() {
        return 0;
    }

    let mut rng = NoiseRng::new(seed);
    for byte in buffer.iter_mut() {
        let delta = ((rng.next_f64() - 0.5) * 2.0 * noise_level * 255.0) as i32;
        *byte = (i32::from(*byte) + delta).clamp(0, 255) as u8;
    }

    buffer.len()
}

/// Perturbs audio samples with Gaussian deltas scaled by
/// `noise_level`.
///
/// Empty slices and non-positive noise levels are no-ops. Returns the
/// number of samples written.
pub fn inject_audio_noise(samples: &mut [f32], noise_level: f64, seed: NoiseSeed) -> usize {
    if noise_level <= 0.0 || samples.is_empty() {
        return 0;
    }

    let mut rng = NoiseRng::new(seed);
    for sample in samples.iter_mut() {
        *sample += (rng.next_gaussian() * noise_level) as f32;
    }

    samples.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(n: u32) -> NoiseSeed {
        NoiseSeed::from_raw(n)
    }

    #[test]
    fn test_byte_noise_noop_cases() {
        let mut empty: Vec<u8> = Vec::new();
        assert_eq!(inject_byte_noise(&mut empty, 0.5, seed(1)), 0);

        let mut data = vec![1, 2, 3];
        let before = data.clone();
        assert_eq!(inject_byte_noise(&mut data, 0.0, seed(1)), 0);
        assert_eq!(data, before);
    }

    #[test]
    fn test_byte_noise_deterministic_and_changes() {
        let mut a = vec![128u8; 256];
        let mut b = a.clone();
        let before = a.clone();

        assert_eq!(inject_byte_noise(&mut a, 0.5, seed(3)), 256);
        inject_byte_noise(&mut b, 0.5, seed(3));

        assert_eq!(a, b);
        assert_ne!(a, before);
    }

    #[test]
    fn test_byte_noise_delta_bounded() {
        // Level 0.1 bounds the delta at 0.1 * 255, truncated to 25.
        let mut data = vec![128u8; 256];
        inject_byte_noise(&mut data, 0.1, seed(5));

        assert!(data.iter().all(|&v| (103..=153).contains(&v)));
    }

    #[test]
    fn test_audio_noise_noop_cases() {
        let mut empty: Vec<f32> = Vec::new();
        assert_eq!(inject_audio_noise(&mut empty, 0.1, seed(1)), 0);

        let mut samples = vec![0.25f32; 8];
        let before = samples.clone();
        assert_eq!(inject_audio_noise(&mut samples, -1.0, seed(1)), 0);
        assert_eq!(samples, before);
    }

    #[test]
    fn test_audio_noise_deterministic_and_changes() {
        let mut a = vec![0.5f32; 256];
        let mut b = a.clone();
        let before = a.clone();

        assert_eq!(inject_audio_noise(&mut a, 0.01, seed(11)), 256);
        inject_audio_noise(&mut b, 0.01, seed(11));

        assert_eq!(a, b);
        assert_ne!(a, before);
    }
}

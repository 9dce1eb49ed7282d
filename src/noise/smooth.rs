//! Smooth two-dimensional gradient noise.
//!
//! Canvas pixel spoofing cannot use independent per-pixel randomness:
//! white noise over a rendered image is trivially isolated by
//! differencing two reads. A continuous gradient field gives
//! neighbouring pixels correlated, smoothly varying deltas instead.

use super::seed::NoiseSeed;

/// Lattice coordinate spreading constants.
const MIX_X: u32 = 73_856_093;
const MIX_Y: u32 = 19_349_663;
/// Avalanche multiplier for the corner hash.
const AVALANCHE: u32 = 0x45d9_f3b;

/// Seeded continuous noise field over the plane.
///
/// Output is approximately in [-1, 1] and exactly reproducible for a
/// given (seed, x, y). The field is zero at integer lattice points and
/// varies smoothly between them.
pub struct SmoothNoise {
    seed: u32,
}

impl SmoothNoise {
    /// Creates a field keyed by `seed`.
    pub fn new(seed: NoiseSeed) -> Self {
        Self { seed: seed.value() }
    }

    /// Samples the field at (x, y).
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let xi = x.floor() as i64;
        let yi = y.floor() as i64;
        let xf = x - xi as f64;
        let yf = y - yi as f64;

        let u = fade(xf);
        let v = fade(yf);

        // Hash the four surrounding lattice corners.
        let aa = self.corner(xi, yi);
        let ba = self.corner(xi + 1, yi);
        let ab = self.corner(xi, yi + 1);
        let bb = self.corner(xi + 1, yi + 1);

        let x1 = lerp(u, grad(aa, xf, yf), grad(ba, xf - 1.0, yf));
        let x2 = lerp(u, grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0));

        lerp(v, x1, x2)
    }

    /// Integer hash of one lattice corner, folded with the seed.
    fn corner(&self, xi: i64, yi: i64) -> u32 {
        let mut h = self.seed;
        h ^= (xi as u32).wrapping_mul(MIX_X) ^ (yi as u32).wrapping_mul(MIX_Y);
        h = ((h >> 16) ^ h).wrapping_mul(AVALANCHE);
        h = ((h >> 16) ^ h).wrapping_mul(AVALANCHE);
        (h >> 16) ^ h
    }
}

/// Quintic smoothstep: t^3 (t (6t - 15) + 10).
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Projects (x, y) onto a gradient direction chosen by the low four
/// bits of `hash`.
fn grad(hash: u32, x: f64, y: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        0.0
    };

    let su = if h & 1 == 0 { u } else { -u };
    let sv = if h & 2 == 0 { v } else { -v };
    su + sv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(seed: u32) -> SmoothNoise {
        SmoothNoise::new(NoiseSeed::from_raw(seed))
    }

    #[test]
    fn test_deterministic_for_fixed_inputs() {
        let f = field(1234);

        for i in 0..32 {
            let x = i as f64 * 0.37;
            let y = i as f64 * 0.19;
            assert_eq!(f.sample(x, y).to_bits(), f.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_zero_at_lattice_points() {
        let f = field(77);

        assert_eq!(f.sample(0.0, 0.0), 0.0);
        assert_eq!(f.sample(3.0, 5.0), 0.0);
        assert_eq!(f.sample(-2.0, 4.0), 0.0);
    }

    #[test]
    fn test_output_bounded() {
        let f = field(0xABCD);

        for ix in 0..50 {
            for iy in 0..50 {
                let v = f.sample(ix as f64 * 0.13, iy as f64 * 0.07);
                assert!(v.abs() <= 2.0, "sample {v} out of bounds");
            }
        }
    }

    #[test]
    fn test_continuity() {
        let f = field(42);
        let eps = 1e-4;

        for i in 1..20 {
            let x = i as f64 * 0.31;
            let y = i as f64 * 0.17;
            let step = (f.sample(x, y) - f.sample(x + eps, y)).abs();
            assert!(step < 0.01, "discontinuity {step} at ({x}, {y})");
        }
    }

    #[test]
    fn test_seed_changes_field() {
        let a = field(1);
        let b = field(2);

        let differs = (0..20).any(|i| {
            let x = 0.3 + i as f64 * 0.41;
            let y = 0.7 + i as f64 * 0.23;
            a.sample(x, y) != b.sample(x, y)
        });

        assert!(differs);
    }
}

//! Deterministic noise primitives.
//!
//! Everything the spoofing paths add to an observable value comes from
//! here: a linear congruential generator for per-value jitter, a
//! smooth gradient-noise field for pixel data, and seed derivation
//! binding both to a context identity.

mod lcg;
mod seed;
mod smooth;

pub use lcg::NoiseRng;
pub use seed::{NoiseSeed, SeedDeriver};
pub use smooth::SmoothNoise;

//! Noise application to observable values.
//!
//! Takes deterministic noise from [`crate::noise`] and applies it to
//! the concrete surfaces a page can read: RGBA pixel buffers, raw byte
//! buffers, audio sample blocks, and scalar parameters. All clamping
//! and no-op rules live here.

mod buffer;
mod pixel;
mod scalar;

pub use buffer::{inject_audio_noise, inject_byte_noise};
pub use pixel::{PixelNoiseInjector, RGBA_CHANNELS};
pub use scalar::{inject_scalar_noise, inject_scalar_noise_i64, INT_NOISE_SCALE};

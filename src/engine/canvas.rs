//! Canvas 2D entry points.
//!
//! Pixel readbacks get content-keyed field noise; text measurement
//! gets a bounded multiplicative offset. Operations are recorded for
//! pattern detection before any config gate, so probes are observed
//! even on surfaces whose spoofing is switched off.

use tracing::trace;

use super::FingerprintEngine;
use crate::context::ContextId;
use crate::metrics::counter;
use crate::noise::NoiseRng;

/// Content prefix hashed into the noise seed. Readbacks of the same
/// drawing must perturb identically, so the seed is keyed on what the
/// buffer holds, not on when it was read.
const CANVAS_SAMPLE_BYTES: usize = 1024;

/// Peak relative offset applied to measured text widths (+/-0.5%).
const TEXT_METRICS_JITTER: f64 = 0.01;

impl FingerprintEngine {
    /// Perturbs an RGBA readback in place. Returns whether noise was
    /// applied.
    pub fn protect_image_data(
        &self,
        ctx: Option<ContextId>,
        pixels: &mut [u8],
        width: u32,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "getImageData");
        }
        if pixels.is_empty() || width == 0 {
            self.note_skipped("malformed image data");
            return false;
        }
        let config = self.config_for(ctx);
        let canvas = &config.canvas;
        if !config.enabled || !canvas.enabled || !canvas.add_noise || !canvas.protect_image_data {
            return false;
        }
        self.apply_canvas_noise(ctx, pixels, width, canvas.noise_level)
    }

    /// Perturbs the RGBA data backing a `toDataURL` / `toBlob` export.
    /// Returns whether noise was applied.
    pub fn protect_canvas_export(
        &self,
        ctx: Option<ContextId>,
        pixels: &mut [u8],
        width: u32,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "toDataURL");
        }
        if pixels.is_empty() || width == 0 {
            self.note_skipped("malformed export buffer");
            return false;
        }
        let config = self.config_for(ctx);
        let canvas = &config.canvas;
        if !config.enabled || !canvas.enabled || !canvas.add_noise || !canvas.protect_data_url {
            return false;
        }
        self.apply_canvas_noise(ctx, pixels, width, canvas.noise_level)
    }

    /// Returns a jittered text width for `measureText`.
    ///
    /// The offset is a function of context, text and font, so repeated
    /// measurement of the same string is stable while the reported
    /// width still differs from the real one.
    pub fn spoof_text_metrics(
        &self,
        ctx: Option<ContextId>,
        text: &str,
        font: &str,
        measured_width: f64,
    ) -> f64 {
        if !self.is_enabled() {
            return measured_width;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "measureText");
        }
        if !measured_width.is_finite() || measured_width <= 0.0 {
            return measured_width;
        }
        let config = self.config_for(ctx);
        let canvas = &config.canvas;
        if !config.enabled || !canvas.enabled || !canvas.spoof_text_metrics {
            return measured_width;
        }

        // Separator keeps ("ab", "c") and ("a", "bc") on distinct
        // noise streams.
        let mut key = Vec::with_capacity(text.len() + font.len() + 1);
        key.extend_from_slice(text.as_bytes());
        key.push(0);
        key.extend_from_slice(font.as_bytes());

        let mut rng = NoiseRng::new(self.seeds.derive_with(ctx, &key));
        let factor = 1.0 + (rng.next_f64() - 0.5) * TEXT_METRICS_JITTER;
        self.stats.increment(counter::CANVAS_OPERATIONS_SPOOFED);
        measured_width * factor
    }

    fn apply_canvas_noise(
        &self,
        ctx: Option<ContextId>,
        pixels: &mut [u8],
        width: u32,
        noise_level: f64,
    ) -> bool {
        let sample_len = pixels.len().min(CANVAS_SAMPLE_BYTES);
        let seed = self.seeds.derive_with(ctx, &pixels[..sample_len]);
        let touched = self.injector.apply(pixels, width, noise_level, seed);
        if touched > 0 {
            self.stats.increment(counter::CANVAS_OPERATIONS_SPOOFED);
            trace!(pixels = touched, "canvas readback perturbed");
        }
        touched > 0
    }
}

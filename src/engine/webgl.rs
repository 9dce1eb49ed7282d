//! WebGL entry points.
//!
//! `getParameter`, extension enumeration and shader precision queries
//! all return values from configuration instead of the real driver;
//! buffer and texture uploads get byte noise so render-and-read-back
//! hashes vary per context. As with canvas, every operation is
//! recorded for detection before its config gate.

use super::FingerprintEngine;
use crate::context::ContextId;
use crate::inject::inject_byte_noise;
use crate::metrics::counter;

/// Extensions reported by every spoofed context, a plain desktop
/// Chrome set.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "ANGLE_instanced_arrays",
    "EXT_blend_minmax",
    "EXT_frag_depth",
    "EXT_shader_texture_lod",
    "EXT_texture_filter_anisotropic",
    "EXT_sRGB",
    "OES_element_index_uint",
    "OES_standard_derivatives",
    "OES_texture_float",
    "OES_texture_half_float",
    "OES_vertex_array_object",
    "WEBGL_color_buffer_float",
    "WEBGL_compressed_texture_s3tc",
    "WEBGL_depth_texture",
    "WEBGL_draw_buffers",
    "WEBGL_lose_context",
];

/// Extensions never reported, even when configured: they expose the
/// real GPU identity or shader internals.
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    "WEBGL_debug_renderer_info",
    "WEBGL_debug_shaders",
    "EXT_disjoint_timer_query",
];

/// Upload prefix hashed into the buffer noise seed.
const BUFFER_SAMPLE_BYTES: usize = 256;

/// A spoofed `getParameter` result.
#[derive(Debug, Clone, PartialEq)]
pub enum WebGlParameterValue {
    /// String-valued parameter (vendor, renderer, versions).
    Text(String),
    /// Integer-valued parameter (capability caps).
    Int(i64),
    /// Two-component integer parameter (viewport dims).
    IntPair([i64; 2]),
}

/// A spoofed `getShaderPrecisionFormat` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionFormat {
    /// Log2 of the minimum representable magnitude.
    pub range_min: i32,
    /// Log2 of the maximum representable magnitude.
    pub range_max: i32,
    /// Number of precision bits.
    pub precision: i32,
}

impl FingerprintEngine {
    /// Spoofed value for a `getParameter` query, or `None` for
    /// passthrough.
    ///
    /// Configured per-parameter overrides win over the built-in table;
    /// override values that parse as integers are reported numerically.
    pub fn spoof_webgl_parameter(
        &self,
        ctx: Option<ContextId>,
        parameter: &str,
    ) -> Option<WebGlParameterValue> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(ctx) = ctx {
            self.detector
                .record_with_param(ctx, "getParameter", Some(parameter));
        }
        let config = self.config_for(ctx);
        let webgl = &config.webgl;
        if !config.enabled || !webgl.enabled {
            return None;
        }

        let value = if let Some(raw) = webgl.parameters.get(parameter) {
            match raw.parse::<i64>() {
                Ok(number) => WebGlParameterValue::Int(number),
                Err(_) => WebGlParameterValue::Text(raw.clone()),
            }
        } else {
            match parameter {
                "VENDOR" | "UNMASKED_VENDOR_WEBGL" => {
                    WebGlParameterValue::Text(webgl.vendor.clone())
                }
                "RENDERER" | "UNMASKED_RENDERER_WEBGL" => {
                    WebGlParameterValue::Text(webgl.renderer.clone())
                }
                "VERSION" => WebGlParameterValue::Text(webgl.version.clone()),
                "SHADING_LANGUAGE_VERSION" => {
                    WebGlParameterValue::Text(webgl.shading_language_version.clone())
                }
                "MAX_TEXTURE_SIZE" | "MAX_CUBE_MAP_TEXTURE_SIZE" | "MAX_RENDERBUFFER_SIZE" => {
                    WebGlParameterValue::Int(16384)
                }
                "MAX_VERTEX_ATTRIBS" => WebGlParameterValue::Int(16),
                "MAX_VERTEX_UNIFORM_VECTORS" | "MAX_FRAGMENT_UNIFORM_VECTORS" => {
                    WebGlParameterValue::Int(1024)
                }
                "MAX_VARYING_VECTORS" => WebGlParameterValue::Int(30),
                "MAX_VIEWPORT_DIMS" => WebGlParameterValue::IntPair([16384, 16384]),
                _ => return None,
            }
        };

        self.stats.increment(counter::WEBGL_PARAMETERS_SPOOFED);
        Some(value)
    }

    /// Extension list to report, or `None` for passthrough.
    ///
    /// Configured extras are appended to the default set; anything in
    /// [`BLOCKED_EXTENSIONS`] is dropped no matter where it came from.
    pub fn spoofed_extensions(&self, ctx: Option<ContextId>) -> Option<Vec<String>> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "getSupportedExtensions");
        }
        let config = self.config_for(ctx);
        let webgl = &config.webgl;
        if !config.enabled || !webgl.enabled {
            return None;
        }

        let mut extensions: Vec<String> =
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
        for extra in &webgl.extensions {
            if !extensions.iter().any(|name| name == extra) {
                extensions.push(extra.clone());
            }
        }
        extensions.retain(|name| !BLOCKED_EXTENSIONS.contains(&name.as_str()));

        self.stats.increment(counter::WEBGL_PARAMETERS_SPOOFED);
        Some(extensions)
    }

    /// Spoofed shader precision, or `None` for passthrough.
    ///
    /// Float types report a standard IEEE single precision range;
    /// integer types a 32-bit range. Unrecognised type names report
    /// zeros rather than leaking the driver's answer.
    pub fn spoof_shader_precision(
        &self,
        ctx: Option<ContextId>,
        precision_type: &str,
    ) -> Option<PrecisionFormat> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "getShaderPrecisionFormat");
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.webgl.enabled {
            return None;
        }

        let format = if precision_type.ends_with("_FLOAT") {
            PrecisionFormat {
                range_min: 127,
                range_max: 127,
                precision: 23,
            }
        } else if precision_type.ends_with("_INT") {
            PrecisionFormat {
                range_min: 31,
                range_max: 30,
                precision: 0,
            }
        } else {
            PrecisionFormat {
                range_min: 0,
                range_max: 0,
                precision: 0,
            }
        };

        self.stats.increment(counter::WEBGL_PARAMETERS_SPOOFED);
        Some(format)
    }

    /// Perturbs a `readPixels` readback in place. Returns whether
    /// noise was applied.
    ///
    /// Render-and-read-back hashing is the WebGL equivalent of the
    /// canvas pixel probe; the seed is keyed on a content sample so
    /// reading the same framebuffer twice agrees.
    pub fn protect_readback(&self, ctx: Option<ContextId>, pixels: &mut [u8]) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "readPixels");
        }
        if pixels.is_empty() {
            self.note_skipped("empty readback");
            return false;
        }
        let config = self.config_for(ctx);
        let webgl = &config.webgl;
        if !config.enabled || !webgl.enabled || !webgl.add_noise_to_buffers {
            return false;
        }

        let sample_len = pixels.len().min(BUFFER_SAMPLE_BYTES);
        let seed = self.seeds.derive_with(ctx, &pixels[..sample_len]);
        inject_byte_noise(pixels, webgl.buffer_noise_level, seed) > 0
    }

    /// Perturbs a `bufferData` upload in place. Returns whether noise
    /// was applied.
    pub fn protect_buffer_upload(&self, ctx: Option<ContextId>, data: &mut [u8]) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "bufferData");
        }
        if data.is_empty() {
            self.note_skipped("empty buffer upload");
            return false;
        }
        let config = self.config_for(ctx);
        let webgl = &config.webgl;
        if !config.enabled || !webgl.enabled || !webgl.add_noise_to_buffers {
            return false;
        }

        let sample_len = data.len().min(BUFFER_SAMPLE_BYTES);
        let seed = self.seeds.derive_with(ctx, &data[..sample_len]);
        inject_byte_noise(data, webgl.buffer_noise_level, seed) > 0
    }

    /// Perturbs a `texImage2D` upload in place. Returns whether noise
    /// was applied.
    ///
    /// The seed is keyed on the texture dimensions, so re-uploading
    /// the same image produces the same bytes while differently sized
    /// textures diverge.
    pub fn protect_texture_upload(
        &self,
        ctx: Option<ContextId>,
        pixels: &mut [u8],
        width: u32,
        height: u32,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "texImage2D");
        }
        if pixels.is_empty() {
            self.note_skipped("empty texture upload");
            return false;
        }
        let config = self.config_for(ctx);
        let webgl = &config.webgl;
        if !config.enabled || !webgl.enabled || !webgl.add_noise_to_buffers {
            return false;
        }

        let mut dims = [0u8; 8];
        dims[..4].copy_from_slice(&width.to_le_bytes());
        dims[4..].copy_from_slice(&height.to_le_bytes());
        let seed = self.seeds.derive_with(ctx, &dims);
        inject_byte_noise(pixels, webgl.buffer_noise_level, seed) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_parameters_spoofed() {
        let engine = FingerprintEngine::new();

        let vendor = engine.spoof_webgl_parameter(None, "VENDOR").unwrap();
        assert_eq!(
            vendor,
            WebGlParameterValue::Text("Google Inc. (Intel)".to_string())
        );

        // Masked and unmasked queries see the same identity.
        let unmasked = engine
            .spoof_webgl_parameter(None, "UNMASKED_RENDERER_WEBGL")
            .unwrap();
        assert_eq!(engine.spoof_webgl_parameter(None, "RENDERER").unwrap(), unmasked);
        assert!(matches!(
            unmasked,
            WebGlParameterValue::Text(s) if s.contains("ANGLE")
        ));

        assert_eq!(
            engine.statistics().get(counter::WEBGL_PARAMETERS_SPOOFED),
            3
        );
    }

    #[test]
    fn test_numeric_limits_spoofed() {
        let engine = FingerprintEngine::new();

        assert_eq!(
            engine.spoof_webgl_parameter(None, "MAX_TEXTURE_SIZE"),
            Some(WebGlParameterValue::Int(16384))
        );
        assert_eq!(
            engine.spoof_webgl_parameter(None, "MAX_VERTEX_ATTRIBS"),
            Some(WebGlParameterValue::Int(16))
        );
        assert_eq!(
            engine.spoof_webgl_parameter(None, "MAX_VARYING_VECTORS"),
            Some(WebGlParameterValue::Int(30))
        );
        assert_eq!(
            engine.spoof_webgl_parameter(None, "MAX_VIEWPORT_DIMS"),
            Some(WebGlParameterValue::IntPair([16384, 16384]))
        );
    }

    #[test]
    fn test_parameter_override_wins_and_parses() {
        let engine = FingerprintEngine::new();
        let mut config = engine.config_for(None);
        config
            .webgl
            .parameters
            .insert("MAX_TEXTURE_SIZE".to_string(), "8192".to_string());
        config
            .webgl
            .parameters
            .insert("VENDOR".to_string(), "Custom Vendor".to_string());
        engine.set_default_config(config).unwrap();

        assert_eq!(
            engine.spoof_webgl_parameter(None, "MAX_TEXTURE_SIZE"),
            Some(WebGlParameterValue::Int(8192))
        );
        assert_eq!(
            engine.spoof_webgl_parameter(None, "VENDOR"),
            Some(WebGlParameterValue::Text("Custom Vendor".to_string()))
        );
    }

    #[test]
    fn test_unknown_parameter_passes_through_but_is_recorded() {
        let engine = FingerprintEngine::new();
        let ctx = engine.mint_context();

        for _ in 0..6 {
            assert!(engine
                .spoof_webgl_parameter(Some(ctx), "STENCIL_BITS")
                .is_none());
        }

        // Six straight queries with no render in between is a probe.
        assert!(engine.is_likely_fingerprinting(ctx));
    }

    #[test]
    fn test_extension_list_excludes_blocked() {
        let engine = FingerprintEngine::new();
        let mut config = engine.config_for(None);
        config.webgl.extensions = vec![
            "EXT_custom_vendor_thing".to_string(),
            "WEBGL_lose_context".to_string(),
            "WEBGL_debug_shaders".to_string(),
        ];
        engine.set_default_config(config).unwrap();

        let extensions = engine.spoofed_extensions(None).unwrap();

        assert!(extensions.iter().any(|e| e == "OES_texture_float"));
        assert!(extensions.iter().any(|e| e == "EXT_custom_vendor_thing"));
        for blocked in BLOCKED_EXTENSIONS {
            assert!(!extensions.iter().any(|e| e == blocked));
        }
        let repeats = extensions.iter().filter(|e| *e == "WEBGL_lose_context").count();
        assert_eq!(repeats, 1);
    }

    #[test]
    fn test_precision_format_table() {
        let engine = FingerprintEngine::new();

        let float = engine.spoof_shader_precision(None, "HIGH_FLOAT").unwrap();
        assert_eq!(
            float,
            PrecisionFormat {
                range_min: 127,
                range_max: 127,
                precision: 23
            }
        );

        let int = engine.spoof_shader_precision(None, "MEDIUM_INT").unwrap();
        assert_eq!(
            int,
            PrecisionFormat {
                range_min: 31,
                range_max: 30,
                precision: 0
            }
        );

        let unknown = engine.spoof_shader_precision(None, "BOGUS").unwrap();
        assert_eq!(
            unknown,
            PrecisionFormat {
                range_min: 0,
                range_max: 0,
                precision: 0
            }
        );
    }

    #[test]
    fn test_buffer_upload_noised_deterministically() {
        let engine = FingerprintEngine::new();
        let ctx = Some(engine.mint_context());
        let original = vec![128u8; 64];

        let mut first = original.clone();
        assert!(engine.protect_buffer_upload(ctx, &mut first));
        assert_ne!(first, original);

        let mut second = original.clone();
        engine.protect_buffer_upload(ctx, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_readback_noised_and_counts_as_read() {
        let engine = FingerprintEngine::new();
        let ctx = engine.mint_context();
        let original = vec![64u8; 128];

        let mut first = original.clone();
        assert!(engine.protect_readback(Some(ctx), &mut first));
        assert_ne!(first, original);

        let mut second = original.clone();
        engine.protect_readback(Some(ctx), &mut second);
        assert_eq!(first, second);

        // A readback with no draw calls in sight is a probe signature.
        assert!(engine.is_likely_fingerprinting(ctx));
    }

    #[test]
    fn test_texture_noise_keyed_on_dimensions() {
        let engine = FingerprintEngine::new();
        let ctx = Some(engine.mint_context());
        let original = vec![200u8; 64];

        let mut square = original.clone();
        let mut wide = original.clone();
        assert!(engine.protect_texture_upload(ctx, &mut square, 4, 4));
        assert!(engine.protect_texture_upload(ctx, &mut wide, 8, 2));

        assert_ne!(square, wide);
        // Uploads are silent protections; no counter advances.
        assert_eq!(
            engine.statistics().get(counter::WEBGL_PARAMETERS_SPOOFED),
            0
        );
    }

    #[test]
    fn test_disabled_webgl_passes_through() {
        let engine = FingerprintEngine::new();
        let mut config = engine.config_for(None);
        config.webgl.enabled = false;
        engine.set_default_config(config).unwrap();

        assert!(engine.spoof_webgl_parameter(None, "VENDOR").is_none());
        assert!(engine.spoofed_extensions(None).is_none());
        assert!(engine.spoof_shader_precision(None, "HIGH_FLOAT").is_none());

        let mut data = vec![1u8, 2, 3, 4];
        assert!(!engine.protect_buffer_upload(None, &mut data));
        assert_eq!(data, [1, 2, 3, 4]);
    }

    #[test]
    fn test_parameter_sweep_detected_through_spoofing() {
        let engine = FingerprintEngine::new();
        let ctx = engine.mint_context();

        engine.spoof_webgl_parameter(Some(ctx), "VENDOR");
        engine.spoof_webgl_parameter(Some(ctx), "RENDERER");
        assert!(!engine.is_likely_fingerprinting(ctx));

        engine.spoof_webgl_parameter(Some(ctx), "UNMASKED_RENDERER_WEBGL");
        assert!(engine.is_likely_fingerprinting(ctx));
    }
}

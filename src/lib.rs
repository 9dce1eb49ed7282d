//! Browser Fingerprint Shield
//!
//! A fingerprint spoofing and probe-detection engine for embedding in
//! rendering-engine bindings. Observable surfaces (canvas pixels,
//! WebGL identity, navigator properties, audio samples) report
//! configured or deterministically perturbed values instead of real
//! ones, and access patterns are analysed for fingerprinting probes.
//!
//! # Architecture
//!
//! Every interception follows the same path through the engine:
//!
//! ```text
//! binding → record (detection) → resolve config → spoof / inject
//!                  ↓                                    ↓
//!           usage analysis                    statistics + metrics
//! ```
//!
//! # Design Principles
//!
//! - **Never breaks rendering**: malformed input degrades to a skipped
//!   protection, reported through statistics and logging
//! - **Deterministic noise**: perturbation is a function of session,
//!   context and content, so repeated reads of the same data agree
//! - **Per-context identity**: each context gets isolated configuration
//!   and usage state, torn down on destruction
//! - **Detection is advisory**: verdicts inform the caller's policy,
//!   they never block an operation
//!
//! # Example
//!
//! ```no_run
//! use fingerprint_shield::{FingerprintEngine, WebGlParameterValue};
//!
//! let engine = FingerprintEngine::new();
//! let ctx = engine.mint_context();
//!
//! // Perturb a canvas readback before the page sees it.
//! let mut pixels = vec![0u8; 64 * 64 * 4];
//! engine.protect_image_data(Some(ctx), &mut pixels, 64);
//!
//! // Report the configured GPU identity instead of the real one.
//! if let Some(WebGlParameterValue::Text(vendor)) =
//!     engine.spoof_webgl_parameter(Some(ctx), "VENDOR")
//! {
//!     println!("reported vendor: {vendor}");
//! }
//!
//! // Heavy querying with no drawing marks the context as a probe.
//! if engine.is_likely_fingerprinting(ctx) {
//!     println!("{ctx} looks like a fingerprinter");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod detect;
pub mod engine;
pub mod inject;
pub mod metrics;
pub mod noise;

// Re-export commonly used types at crate root
pub use config::{DeviceProfile, FileConfig, FingerprintConfig, ProfileLibrary};
pub use context::ContextId;
pub use detect::{DetectionPolicy, SuspicionReason, UsagePatternDetector};
pub use engine::{FingerprintEngine, PrecisionFormat, WebGlParameterValue};
pub use inject::{inject_audio_noise, inject_byte_noise, inject_scalar_noise, PixelNoiseInjector};
pub use metrics::{Statistics, StatsAggregator};
pub use noise::{NoiseSeed, SeedDeriver};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

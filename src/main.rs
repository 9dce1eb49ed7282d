//! Fingerprint Shield CLI
//!
//! Command-line harness for exercising the protection engine against
//! a simulated fingerprinting script and inspecting the results.

use std::path::PathBuf;

use clap::Parser;
use fingerprint_shield::{FileConfig, FingerprintEngine, ProfileLibrary, WebGlParameterValue};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fingerprint-shield", version, about = "Fingerprint spoofing demo")]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bundled device profile to apply (see --list-profiles).
    #[arg(short, long)]
    profile: Option<String>,

    /// Print the bundled device profiles and exit.
    #[arg(long)]
    list_profiles: bool,

    /// Number of simulated fingerprinting passes.
    #[arg(short = 'n', long, default_value_t = 3)]
    passes: u32,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Fingerprint Shield v{}", fingerprint_shield::VERSION);

    let library = ProfileLibrary::bundled();
    if args.list_profiles {
        for name in library.names() {
            println!("{name}");
        }
        return;
    }

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    if let Some(name) = &args.profile {
        let device = library.get_or_default(name);
        info!("Applying device profile: {}", device.name);
        device.apply_to(&mut config.fingerprint);
    }

    let engine = FingerprintEngine::with_config(config);

    // An ordinary page first: draw-heavy, one readback, no identity sweep.
    let benign = engine.mint_context();
    for op in ["fillRect", "drawImage", "fillText"] {
        engine.record_operation(benign, op);
    }
    let mut thumbnail = test_pattern(16, 16);
    engine.protect_image_data(Some(benign), &mut thumbnail, 16);
    match engine.assess_context(benign) {
        Some(reason) => warn!("benign context flagged: {}", reason),
        None => info!("benign context: no probe pattern detected"),
    }
    engine.context_destroyed(benign);

    info!("Simulating fingerprinting script against {} contexts", args.passes);

    for pass in 0..args.passes {
        let ctx = engine.mint_context();

        // A real page draws before it reads back.
        engine.record_operation(ctx, "fillRect");
        engine.record_operation(ctx, "fillText");

        // Canvas readback: the classic hash-the-pixels probe.
        let mut pixels = test_pattern(64, 64);
        let original = blake3::hash(&pixels);
        engine.protect_image_data(Some(ctx), &mut pixels, 64);
        let spoofed = blake3::hash(&pixels);

        println!(
            "{ctx}: canvas hash {}.. -> {}..",
            &original.to_hex()[..16],
            &spoofed.to_hex()[..16],
        );

        // Identity sweep across the parameters probes always ask for.
        for parameter in ["VENDOR", "RENDERER", "UNMASKED_VENDOR_WEBGL"] {
            match engine.spoof_webgl_parameter(Some(ctx), parameter) {
                Some(WebGlParameterValue::Text(value)) => {
                    println!("{ctx}: {parameter} = {value}")
                }
                Some(value) => println!("{ctx}: {parameter} = {value:?}"),
                None => println!("{ctx}: {parameter} passed through"),
            }
        }

        let width = engine.spoof_text_metrics(
            Some(ctx),
            "How vexingly quick daft zebras jump",
            "14px monospace",
            280.0,
        );
        println!("{ctx}: measured text width 280.0 -> {width:.3}");

        let mut samples = vec![0.0f32; 512];
        engine.protect_audio_buffer(Some(ctx), &mut samples);

        match engine.assess_context(ctx) {
            Some(reason) => warn!("pass {}: flagged as probe: {}", pass, reason),
            None => info!("pass {}: usage looks benign", pass),
        }

        engine.context_destroyed(ctx);
    }

    println!("Protection statistics:");
    let stats = engine.statistics();
    for (name, value) in stats.iter() {
        println!("  {name}: {value}");
    }

    engine.shutdown();
}

/// Renders a deterministic RGBA gradient, standing in for the canvas
/// content a fingerprinting script would draw.
fn test_pattern(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width) as u8);
            pixels.push((y * 255 / height) as u8);
            pixels.push(((x + y) * 255 / (width + height)) as u8);
            pixels.push(255);
        }
    }
    pixels
}

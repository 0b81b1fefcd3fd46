//! Mask Inference
//!
//! Predicts foreground masks with trained attention residual U-Net weights.
//!
//! ## Usage
//!
//! ```bash
//! # Run inference on a single image
//! cargo run --bin inference -- weights.mpk image.jpg
//!
//! # Run inference on a directory of images
//! cargo run --bin inference -- weights.mpk input_dir/ --output output_dir/
//!
//! # Binary masks
//! cargo run --bin inference -- weights.mpk image.jpg --threshold 0.5
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use resunet_demos::{
    create_device, get_backend_name, init_tracing, load_model, run_inference, InferenceConfig,
    SelectedBackend,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the weights record (NamedMpk, full precision)
    weights: PathBuf,

    /// Path to the input image or directory
    input: PathBuf,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Square size images are resized to (multiple of 8)
    #[arg(long)]
    image_size: Option<usize>,

    /// Threshold for binary mask (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => InferenceConfig::from_file(path)?,
        None => InferenceConfig::default(),
    };

    // Apply command line overrides
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(image_size) = args.image_size {
        config.image_size = image_size;
    }
    if args.threshold.is_some() {
        config.threshold = args.threshold;
    }
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    let device = create_device();
    tracing::info!(backend = get_backend_name(), "using backend");

    let model = load_model::<SelectedBackend>(&config, &args.weights, &device)?;
    let written = run_inference(&model, &args.input, &config, &device)?;

    println!("Wrote {} mask(s) to {}", written.len(), config.output_path.display());
    Ok(())
}

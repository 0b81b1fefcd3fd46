//! Model Summary
//!
//! Prints the module tree of the attention residual U-Net, the shape of every
//! intermediate feature map for a given input size and the parameter count.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin summary
//! cargo run --bin summary -- --height 512 --width 384 --config model.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use attention_resunet::ResUNetConfig;
use burn::{config::Config, prelude::*};
use clap::Parser;
use resunet_demos::{create_device, get_backend_name, init_tracing, SelectedBackend};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input height (multiple of 8)
    #[arg(long, default_value = "256")]
    height: usize,

    /// Input width (multiple of 8)
    #[arg(long, default_value = "256")]
    width: usize,

    /// Batch size of the probe input
    #[arg(long, default_value = "1")]
    batch_size: usize,

    /// Model configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip printing the module tree
    #[arg(long)]
    no_tree: bool,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ResUNetConfig::load(path)
            .with_context(|| format!("Failed to load model config: {}", path.display()))?,
        None => ResUNetConfig::new(),
    };

    let device = create_device();
    tracing::info!(backend = get_backend_name(), "building model");

    let model = config.init::<SelectedBackend>(&device)?;
    let input = Tensor::<SelectedBackend, 4>::zeros(
        [args.batch_size, config.in_channels, args.height, args.width],
        &device,
    );
    config.check_input_dims(input.dims())?;

    if !args.no_tree {
        println!("{model}");
    }

    let features = model.forward_features(input.clone());
    let rows = [
        ("input", input.dims()),
        ("e1 (stem)", features.e1.dims()),
        ("c1 (spatial attention)", features.c1.dims()),
        ("e2 (encoder /2)", features.e2.dims()),
        ("e3 (encoder /4)", features.e3.dims()),
        ("e4 (encoder /8)", features.e4.dims()),
        ("b1 (dual attention)", features.bridge.dims()),
        ("d1 (decoder /4)", features.d1.dims()),
        ("d2 (decoder /2)", features.d2.dims()),
        ("d3 (decoder /1)", features.d3.dims()),
        ("logits", features.logits.dims()),
        ("mask", features.mask.dims()),
    ];

    println!("{:<24} shape", "layer");
    println!("{}", "-".repeat(48));
    for (name, dims) in rows {
        println!("{name:<24} {dims:?}");
    }
    println!("{}", "-".repeat(48));
    println!("Total params: {}", model.num_params());

    Ok(())
}

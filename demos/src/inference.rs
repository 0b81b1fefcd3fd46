//! Mask prediction for single images and directories.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use attention_resunet::ResUNet;
use burn::prelude::*;

use crate::{
    common::{apply_threshold, image::ImageUtils, resize_tensor},
    config::InferenceConfig,
};

/// Loads the network described by `config` and the weights at `weights`.
pub fn load_model<B: Backend>(
    config: &InferenceConfig,
    weights: &Path,
    device: &B::Device,
) -> Result<ResUNet<B>> {
    tracing::info!(path = %weights.display(), "loading model");

    let model = config
        .model
        .init::<B>(device)?
        .load_weights(weights, device)?;

    tracing::info!(params = model.num_params(), "model loaded successfully");
    Ok(model)
}

/// Runs inference on an image or every supported image in a directory.
///
/// Returns the paths of the masks written.
pub fn run_inference<B: Backend>(
    model: &ResUNet<B>,
    input: &Path,
    config: &InferenceConfig,
    device: &B::Device,
) -> Result<Vec<PathBuf>> {
    tracing::info!(
        input = %input.display(),
        output = %config.output_path.display(),
        image_size = config.image_size,
        threshold = ?config.threshold,
        "running inference",
    );

    fs::create_dir_all(&config.output_path).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_path.display()
        )
    })?;

    let mut written = Vec::new();
    if input.is_file() {
        written.push(process_single_image(model, input, config, device)?);
    } else if input.is_dir() {
        for path in collect_images(input)? {
            match process_single_image(model, &path, config, device) {
                Ok(output) => written.push(output),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "failed to process image");
                }
            }
        }
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }

    tracing::info!(count = written.len(), "inference completed");
    Ok(written)
}

/// Predicts the mask of one image and saves it as `<stem>_mask.png`.
pub fn process_single_image<B: Backend>(
    model: &ResUNet<B>,
    input_path: &Path,
    config: &InferenceConfig,
    device: &B::Device,
) -> Result<PathBuf> {
    tracing::info!(path = %input_path.display(), "processing image");

    let image = ImageUtils::load_image::<B, _>(input_path, device)?;
    let [_, _, height, width] = image.dims();

    let mask = predict_mask(model, image, config.image_size)?;
    let mask = resize_tensor(mask, height, width);
    let mask = match config.threshold {
        Some(threshold) => apply_threshold(mask, threshold),
        None => mask,
    };

    let file_stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_path = config.output_path.join(format!("{file_stem}_mask.png"));

    ImageUtils::mask_to_image(mask)?
        .save(&output_path)
        .with_context(|| format!("Failed to save mask: {}", output_path.display()))?;

    tracing::info!(path = %output_path.display(), "saved result");
    Ok(output_path)
}

/// Resizes `image` to `image_size x image_size` and predicts the soft mask.
///
/// The returned mask has the model size; the caller maps it back to the source size.
pub fn predict_mask<B: Backend>(
    model: &ResUNet<B>,
    image: Tensor<B, 4>,
    image_size: usize,
) -> Result<Tensor<B, 4>> {
    let image = resize_tensor(image, image_size, image_size);

    Ok(model.try_forward(image)?)
}

/// Supported image files directly inside `dir`, sorted by path.
fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && ImageUtils::is_supported_image_format(&path) {
            images.push(path);
        }
    }
    images.sort();

    Ok(images)
}

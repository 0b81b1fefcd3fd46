//! # Attention Residual U-Net
//!
//! This module defines the full segmentation network.
//!
//! ## Topology
//!
//! ```text
//! x ─ stem ─ e1 ─ SA ─ c1 ─ res/2 ─ e2 ─ res/2 ─ e3 ─ res/2 ─ e4 ─ dual ─ b1
//!            │                      │             │                      │
//!            │                      │             └──── stage 1 ◄────────┘
//!            │                      └──────────── stage 2 ◄── d1
//!            └─────────────────────────────────── stage 3 ◄── d2
//!                                                    d3 ─ SA ─ 1x1 ─ sigmoid
//! ```
//!
//! Each decoder stage gates the incoming map with the encoder map of the next
//! finer scale, upsamples it 2x, concatenates that same encoder map and fuses
//! both with a residual block.

use std::path::PathBuf;

use burn::{
    nn::conv::Conv2d,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::activation::sigmoid,
};
use burn_extra_ops::{Upsample2d, Upsample2dConfig};

use super::{
    conv2d_config, CrossScaleAttention, CrossScaleAttentionConfig, DualAttention,
    DualAttentionConfig, ResidualBlock, ResidualBlockConfig, SpatialAttention,
    SpatialAttentionConfig, StemBlock, StemBlockConfig,
};
use crate::{
    config::{check_input_dims, ResUNetConfig},
    error::{ResUNetError, ResUNetResult},
};

impl ResUNetConfig {
    /// Initializes a `ResUNet` model with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ResUNetResult<ResUNet<B>> {
        self.validate()?;

        let [f_stem, f_enc2, f_enc3, f_enc4] = self.encoder_filters;
        let [f_dec1, f_dec2, f_dec3] = self.decoder_filters;
        let spatial_attention =
            || SpatialAttentionConfig::new().with_kernel_size(self.spatial_kernel_size);

        let model = ResUNet {
            stem: StemBlockConfig::new(self.in_channels, f_stem).init(device),
            stem_attention: spatial_attention().init(device),
            encoder2: ResidualBlockConfig::new(f_stem, f_enc2)
                .with_stride(2)
                .init(device),
            encoder3: ResidualBlockConfig::new(f_enc2, f_enc3)
                .with_stride(2)
                .init(device),
            encoder4: ResidualBlockConfig::new(f_enc3, f_enc4)
                .with_stride(2)
                .init(device),
            bridge: DualAttentionConfig::new(f_enc4, self.bridge_filters)
                .with_reduction(self.attention_reduction)
                .init(device),
            decoder1: DecoderStageConfig::new(self.bridge_filters, f_enc3, f_dec1).init(device),
            decoder2: DecoderStageConfig::new(f_dec1, f_enc2, f_dec2).init(device),
            decoder3: DecoderStageConfig::new(f_dec2, f_stem, f_dec3).init(device),
            head_attention: spatial_attention().init(device),
            head: conv2d_config(f_dec3, self.out_channels, 1, 1).init(device),
            in_channels: self.in_channels,
        };

        tracing::debug!(
            encoder = ?self.encoder_filters,
            bridge = self.bridge_filters,
            decoder = ?self.decoder_filters,
            params = model.num_params(),
            "attention residual U-Net initialized",
        );

        Ok(model)
    }
}

/// Configuration for a `DecoderStage`.
#[derive(Config, Debug)]
pub struct DecoderStageConfig {
    /// Channels of the map coming up from the deeper stage.
    in_channels: usize,
    /// Channels of the encoder skip map.
    skip_channels: usize,
    /// Output channels of the fusing residual block.
    out_channels: usize,
}

impl DecoderStageConfig {
    /// Initializes a new `DecoderStage` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> DecoderStage<B> {
        DecoderStage {
            gate: CrossScaleAttentionConfig::new(self.skip_channels, self.in_channels)
                .init(device),
            upsample: Upsample2dConfig::new().init(),
            fuse: ResidualBlockConfig::new(self.in_channels + self.skip_channels, self.out_channels)
                .init(device),
        }
    }
}

/// One decoder scale: gate, upsample, concatenate the skip, fuse.
#[derive(Module, Debug)]
pub struct DecoderStage<B: Backend> {
    gate: CrossScaleAttention<B>,
    upsample: Upsample2d,
    fuse: ResidualBlock<B>,
}

impl<B: Backend> DecoderStage<B> {
    /// # Arguments
    ///
    /// * `x` - Map from the deeper stage `[batch_size, in_channels, height, width]`.
    /// * `skip` - Encoder map `[batch_size, skip_channels, 2 * height, 2 * width]`.
    ///
    /// # Returns
    ///
    /// `[batch_size, out_channels, 2 * height, 2 * width]`
    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.gate.forward(skip.clone(), x);
        let x = self.upsample.forward(x);
        // Upsampled map first, skip second. The fuse weights depend on this order.
        self.fuse.forward(Tensor::cat(vec![x, skip], 1))
    }
}

/// Every named intermediate of a forward pass.
#[derive(Debug, Clone)]
pub struct ResUNetFeatures<B: Backend> {
    /// Stem output.
    pub e1: Tensor<B, 4>,
    /// Stem output after spatial attention.
    pub c1: Tensor<B, 4>,
    /// Encoder stage 2 (1/2 resolution).
    pub e2: Tensor<B, 4>,
    /// Encoder stage 3 (1/4 resolution).
    pub e3: Tensor<B, 4>,
    /// Encoder stage 4 (1/8 resolution).
    pub e4: Tensor<B, 4>,
    /// Dual-attention bridge output.
    pub bridge: Tensor<B, 4>,
    /// Decoder stage 1 (1/4 resolution).
    pub d1: Tensor<B, 4>,
    /// Decoder stage 2 (1/2 resolution).
    pub d2: Tensor<B, 4>,
    /// Decoder stage 3 (full resolution).
    pub d3: Tensor<B, 4>,
    /// Head output before the sigmoid.
    pub logits: Tensor<B, 4>,
    /// Foreground probability mask.
    pub mask: Tensor<B, 4>,
}

/// The attention residual U-Net.
#[derive(Module, Debug)]
pub struct ResUNet<B: Backend> {
    stem: StemBlock<B>,
    stem_attention: SpatialAttention<B>,
    encoder2: ResidualBlock<B>,
    encoder3: ResidualBlock<B>,
    encoder4: ResidualBlock<B>,
    bridge: DualAttention<B>,
    decoder1: DecoderStage<B>,
    decoder2: DecoderStage<B>,
    decoder3: DecoderStage<B>,
    head_attention: SpatialAttention<B>,
    head: Conv2d<B>,
    in_channels: usize,
}

impl<B: Backend> ResUNet<B> {
    /// Runs the network and keeps every intermediate map.
    ///
    /// # Arguments
    ///
    /// * `x` - The input tensor of shape `[B, C, H, W]` with `H` and `W` divisible by 8.
    pub fn forward_features(&self, x: Tensor<B, 4>) -> ResUNetFeatures<B> {
        let e1 = self.stem.forward(x);
        let c1 = self.stem_attention.forward(e1.clone());

        let e2 = self.encoder2.forward(c1.clone());
        let e3 = self.encoder3.forward(e2.clone());
        let e4 = self.encoder4.forward(e3.clone());

        let bridge = self.bridge.forward(e4.clone());

        let d1 = self.decoder1.forward(bridge.clone(), e3.clone());
        let d2 = self.decoder2.forward(d1.clone(), e2.clone());
        let d3 = self.decoder3.forward(d2.clone(), e1.clone());

        let logits = self.head.forward(self.head_attention.forward(d3.clone()));
        let mask = sigmoid(logits.clone());

        ResUNetFeatures {
            e1,
            c1,
            e2,
            e3,
            e4,
            bridge,
            d1,
            d2,
            d3,
            logits,
            mask,
        }
    }

    /// Returns the pre-sigmoid head output `[B, out_channels, H, W]`.
    pub fn forward_logits(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.forward_features(x).logits
    }

    /// Predicts the foreground probability mask `[B, out_channels, H, W]`, values in `[0, 1]`.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.forward_features(x).mask
    }

    /// Same as [`Self::forward`] but rejects inputs the decoder could not align.
    ///
    /// # Errors
    ///
    /// Returns `Err(ResUNetError::InvalidTensorShape)` if the input channel count is
    /// wrong or a spatial dimension is not a non-zero multiple of 8.
    pub fn try_forward(&self, x: Tensor<B, 4>) -> ResUNetResult<Tensor<B, 4>> {
        check_input_dims(self.in_channels, x.dims())?;

        Ok(self.forward(x))
    }

    /// Loads a record saved with `NamedMpkFileRecorder<FullPrecisionSettings>`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ResUNetError::WeightLoadingFailed)` if the file cannot be read or
    /// does not match this network's structure.
    pub fn load_weights(self, path: impl Into<PathBuf>, device: &Device<B>) -> ResUNetResult<Self> {
        let path = path.into();
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();

        self.load_file(path.clone(), &recorder, device)
            .map_err(|e| ResUNetError::WeightLoadingFailed {
                reason: format!("{}: {e}", path.display()),
            })
    }

    /// Saves the weights with `NamedMpkFileRecorder<FullPrecisionSettings>`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ResUNetError::WeightSavingFailed)` if the record cannot be written.
    pub fn save_weights(self, path: impl Into<PathBuf>) -> ResUNetResult<()> {
        let path = path.into();
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();

        self.save_file(path.clone(), &recorder)
            .map_err(|e| ResUNetError::WeightSavingFailed {
                reason: format!("{}: {e}", path.display()),
            })
    }
}

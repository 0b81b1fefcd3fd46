//! # Attention Residual U-Net
//!
//! A residual U-Net for binary image segmentation, augmented with three attention
//! mechanisms: spatial attention gates on the stem and the head, a dual (position +
//! channel) attention bridge, and cross-scale attention on every skip connection.
//!
//! ```no_run
//! use attention_resunet::ResUNetConfig;
//! use burn::backend::NdArray;
//! use burn::prelude::*;
//!
//! let device = Default::default();
//! let model = ResUNetConfig::new().init::<NdArray>(&device).unwrap();
//! let image = Tensor::<NdArray, 4>::zeros([1, 3, 256, 256], &device);
//! let mask = model.forward(image); // [1, 1, 256, 256], values in [0, 1]
//! ```

mod config;
mod error;
mod models;

pub use config::{ResUNetConfig, DOWNSAMPLING_STAGES};
pub use error::{ResUNetError, ResUNetResult};
pub use models::{
    BnReluConv, BnReluConvConfig, ChannelAttention, ChannelAttentionConfig, ConvBnRelu,
    ConvBnReluConfig, CrossScaleAttention, CrossScaleAttentionConfig, DecoderStage,
    DecoderStageConfig, DualAttention, DualAttentionConfig, PositionAttention,
    PositionAttentionConfig, ResUNet, ResUNetFeatures, ResUNetRecord, ResidualBlock,
    ResidualBlockConfig, SpatialAttention, SpatialAttentionConfig, StemBlock, StemBlockConfig,
};

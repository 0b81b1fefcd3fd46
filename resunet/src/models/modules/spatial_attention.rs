//! # Spatial Attention Gate
//!
//! Re-weights every spatial location of a feature map with a single learned map.
//! The map is computed from the channel-wise mean and max of the input, so the gate
//! only decides *where* to look and leaves the channel mix untouched.

use burn::{nn::conv::Conv2d, prelude::*, tensor::activation::sigmoid};
use burn_extra_ops::TensorExtraOps;

use super::conv2d_config;

/// Configuration for the `SpatialAttention` module.
#[derive(Config, Debug)]
pub struct SpatialAttentionConfig {
    /// Kernel size of the map convolution. Must be odd to keep the resolution.
    #[config(default = "7")]
    kernel_size: usize,
}

impl SpatialAttentionConfig {
    /// Initializes a new `SpatialAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> SpatialAttention<B> {
        let conv = conv2d_config(2, 1, self.kernel_size, 1)
            .with_bias(false)
            .init(device);

        SpatialAttention { conv }
    }
}

/// Spatial attention gate.
#[derive(Module, Debug)]
pub struct SpatialAttention<B: Backend> {
    conv: Conv2d<B>,
}

impl<B: Backend> SpatialAttention<B> {
    /// Computes the per-location weights in `[0, 1]`.
    ///
    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, 1, height, width]`
    pub fn attention_map(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        sigmoid(self.conv.forward(x.channel_mean_max()))
    }

    /// Multiplies the input by its attention map, broadcast over channels.
    ///
    /// The output has the same shape as the input.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let map = self.attention_map(x.clone());
        x * map
    }
}

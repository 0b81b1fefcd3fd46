//! # Cross-Scale Attention
//!
//! Attention-gated skip connection for the decoder. The encoder feature map at the
//! finer scale is projected, pooled down to the decoder's resolution and added to
//! a projection of the decoder map; the fused signal then gates the decoder map
//! element-wise.

use burn::{
    nn::pool::{MaxPool2d, MaxPool2dConfig},
    prelude::*,
};

use super::{BnReluConv, BnReluConvConfig};
use crate::error::{ResUNetError, ResUNetResult};

/// Configuration for the `CrossScaleAttention` module.
#[derive(Config, Debug)]
pub struct CrossScaleAttentionConfig {
    /// Channels of the encoder (gating) feature map.
    encoder_channels: usize,
    /// Channels of the decoder feature map; also the width of every projection.
    decoder_channels: usize,
}

impl CrossScaleAttentionConfig {
    /// Initializes a new `CrossScaleAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> CrossScaleAttention<B> {
        CrossScaleAttention {
            encoder_conv: BnReluConvConfig::new(self.encoder_channels, self.decoder_channels)
                .init(device),
            encoder_pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            decoder_conv: BnReluConvConfig::new(self.decoder_channels, self.decoder_channels)
                .init(device),
            fuse_conv: BnReluConvConfig::new(self.decoder_channels, self.decoder_channels)
                .init(device),
            encoder_channels: self.encoder_channels,
            decoder_channels: self.decoder_channels,
        }
    }
}

/// Gates a decoder feature map with the encoder feature map one scale above it.
#[derive(Module, Debug)]
pub struct CrossScaleAttention<B: Backend> {
    encoder_conv: BnReluConv<B>,
    encoder_pool: MaxPool2d,
    decoder_conv: BnReluConv<B>,
    fuse_conv: BnReluConv<B>,
    encoder_channels: usize,
    decoder_channels: usize,
}

impl<B: Backend> CrossScaleAttention<B> {
    /// # Arguments
    ///
    /// * `g` - Encoder feature map `[batch_size, encoder_channels, 2 * height, 2 * width]`.
    /// * `x` - Decoder feature map `[batch_size, decoder_channels, height, width]`.
    ///
    /// # Returns
    ///
    /// The gated decoder map, same shape as `x`.
    pub fn forward(&self, g: Tensor<B, 4>, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let g = self.encoder_conv.forward(g);
        let g = self.encoder_pool.forward(g);

        let x_proj = self.decoder_conv.forward(x.clone());

        let gate = self.fuse_conv.forward(g + x_proj);
        gate * x
    }

    /// Same as [`Self::forward`] but checks the operand shapes first.
    ///
    /// # Errors
    ///
    /// Returns `Err(ResUNetError::InvalidTensorShape)` if either operand has the wrong
    /// channel count or `g` is not exactly twice the spatial size of `x`.
    pub fn try_forward(&self, g: Tensor<B, 4>, x: Tensor<B, 4>) -> ResUNetResult<Tensor<B, 4>> {
        let [g_batch, g_channels, g_height, g_width] = g.dims();
        let [x_batch, x_channels, x_height, x_width] = x.dims();

        if x_channels != self.decoder_channels {
            return Err(ResUNetError::InvalidTensorShape {
                expected: format!("decoder map with {} channels", self.decoder_channels),
                actual: format!("{:?}", x.dims()),
            });
        }

        let expected_g = [x_batch, self.encoder_channels, x_height * 2, x_width * 2];
        if [g_batch, g_channels, g_height, g_width] != expected_g {
            return Err(ResUNetError::InvalidTensorShape {
                expected: format!("encoder map {expected_g:?}"),
                actual: format!("{:?}", g.dims()),
            });
        }

        Ok(self.forward(g, x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type TestBackend = NdArray<f32>;

    fn random_input(shape: [usize; 4]) -> Tensor<TestBackend, 4> {
        Tensor::random(shape, Distribution::Normal(0.0, 1.0), &Default::default())
    }

    #[test]
    fn test_cross_scale_attention_keeps_decoder_shape() {
        let device = Default::default();
        let module = CrossScaleAttentionConfig::new(64, 128).init::<TestBackend>(&device);

        let output = module.forward(random_input([2, 64, 16, 12]), random_input([2, 128, 8, 6]));

        assert_eq!(output.dims(), [2, 128, 8, 6]);
    }

    #[test]
    fn test_try_forward_accepts_matching_scales() {
        let device = Default::default();
        let module = CrossScaleAttentionConfig::new(16, 64).init::<TestBackend>(&device);

        let result = module.try_forward(random_input([1, 16, 32, 32]), random_input([1, 64, 16, 16]));

        assert_eq!(result.unwrap().dims(), [1, 64, 16, 16]);
    }

    #[test]
    fn test_try_forward_rejects_same_scale_operands() {
        let device = Default::default();
        let module = CrossScaleAttentionConfig::new(16, 64).init::<TestBackend>(&device);

        let result = module.try_forward(random_input([1, 16, 16, 16]), random_input([1, 64, 16, 16]));

        match result {
            Err(ResUNetError::InvalidTensorShape { expected, .. }) => {
                assert!(expected.contains("encoder map"));
            }
            _ => panic!("Expected InvalidTensorShape error"),
        }
    }

    #[test]
    fn test_try_forward_rejects_wrong_decoder_channels() {
        let device = Default::default();
        let module = CrossScaleAttentionConfig::new(16, 64).init::<TestBackend>(&device);

        let result = module.try_forward(random_input([1, 16, 32, 32]), random_input([1, 32, 16, 16]));

        assert!(matches!(
            result,
            Err(ResUNetError::InvalidTensorShape { .. })
        ));
    }
}

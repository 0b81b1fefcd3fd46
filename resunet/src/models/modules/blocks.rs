//! # Residual Blocks
//!
//! Convolutional building blocks shared by the encoder, the bridge and the decoder.
//!
//! - `ConvBnRelu`: post-activation unit (`conv -> BN -> ReLU`).
//! - `BnReluConv`: pre-activation unit (`BN -> ReLU -> conv`).
//! - `StemBlock`: first feature extractor, a plain convolution followed by a
//!   pre-activation unit, with a projecting shortcut.
//! - `ResidualBlock`: two pre-activation units with a projecting shortcut.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Relu,
    },
    prelude::*,
};

use super::conv2d_config;

/// Configuration for the `ConvBnRelu` module.
#[derive(Config, Debug)]
pub struct ConvBnReluConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    #[config(default = "3")]
    kernel_size: usize,
}

impl ConvBnReluConfig {
    /// Initializes a new `ConvBnRelu` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ConvBnRelu<B> {
        ConvBnRelu {
            conv: conv2d_config(self.in_channels, self.out_channels, self.kernel_size, 1)
                .init(device),
            bn: BatchNormConfig::new(self.out_channels).init(device),
            relu: Relu::new(),
        }
    }
}

/// Convolution followed by batch normalization and ReLU.
#[derive(Module, Debug)]
pub struct ConvBnRelu<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
    relu: Relu,
}

impl<B: Backend> ConvBnRelu<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);
        self.relu.forward(x)
    }
}

/// Configuration for the `BnReluConv` module.
#[derive(Config, Debug)]
pub struct BnReluConvConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    #[config(default = "3")]
    kernel_size: usize,
    #[config(default = "1")]
    stride: usize,
}

impl BnReluConvConfig {
    /// Initializes a new `BnReluConv` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> BnReluConv<B> {
        BnReluConv {
            bn: BatchNormConfig::new(self.in_channels).init(device),
            relu: Relu::new(),
            conv: conv2d_config(
                self.in_channels,
                self.out_channels,
                self.kernel_size,
                self.stride,
            )
            .init(device),
        }
    }
}

/// Batch normalization and ReLU ahead of a convolution.
#[derive(Module, Debug)]
pub struct BnReluConv<B: Backend> {
    bn: BatchNorm<B, 2>,
    relu: Relu,
    conv: Conv2d<B>,
}

impl<B: Backend> BnReluConv<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.bn.forward(x);
        let x = self.relu.forward(x);
        self.conv.forward(x)
    }
}

/// 1x1 projection used on the shortcut path of both residual blocks.
fn shortcut_config(in_channels: usize, out_channels: usize, stride: usize) -> Conv2dConfig {
    conv2d_config(in_channels, out_channels, 1, stride)
}

/// Configuration for the `StemBlock` module.
#[derive(Config, Debug)]
pub struct StemBlockConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    /// Stride of the first convolution and of the shortcut.
    #[config(default = "1")]
    stride: usize,
}

impl StemBlockConfig {
    /// Initializes a new `StemBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> StemBlock<B> {
        let conv_in = conv2d_config(self.in_channels, self.out_channels, 3, self.stride)
            .init(device);
        let conv_out = BnReluConvConfig::new(self.out_channels, self.out_channels).init(device);
        let shortcut =
            shortcut_config(self.in_channels, self.out_channels, self.stride).init(device);

        StemBlock {
            conv_in,
            conv_out,
            shortcut,
        }
    }
}

/// Initial feature extraction block of the encoder.
///
/// `conv3x3(stride) -> BN -> ReLU -> conv3x3` added to a strided 1x1 projection of
/// the input. Unlike [`ResidualBlock`] the raw image is not normalized first.
#[derive(Module, Debug)]
pub struct StemBlock<B: Backend> {
    conv_in: Conv2d<B>,
    conv_out: BnReluConv<B>,
    shortcut: Conv2d<B>,
}

impl<B: Backend> StemBlock<B> {
    /// # Shapes
    /// - input: `[batch_size, in_channels, height, width]`
    /// - output: `[batch_size, out_channels, height / stride, width / stride]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let s = self.shortcut.forward(x.clone());
        let x = self.conv_in.forward(x);
        let x = self.conv_out.forward(x);
        x + s
    }
}

/// Configuration for the `ResidualBlock` module.
#[derive(Config, Debug)]
pub struct ResidualBlockConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    /// Stride of the first convolution and of the shortcut.
    #[config(default = "1")]
    stride: usize,
}

impl ResidualBlockConfig {
    /// Initializes a new `ResidualBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ResidualBlock<B> {
        let conv_in = BnReluConvConfig::new(self.in_channels, self.out_channels)
            .with_stride(self.stride)
            .init(device);
        let conv_out = BnReluConvConfig::new(self.out_channels, self.out_channels).init(device);
        let shortcut =
            shortcut_config(self.in_channels, self.out_channels, self.stride).init(device);

        ResidualBlock {
            conv_in,
            conv_out,
            shortcut,
        }
    }
}

/// Pre-activation residual block with a projecting shortcut.
///
/// Strided in the encoder to halve the resolution, stride 1 in the decoder to fuse
/// the concatenated skip features.
#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    conv_in: BnReluConv<B>,
    conv_out: BnReluConv<B>,
    shortcut: Conv2d<B>,
}

impl<B: Backend> ResidualBlock<B> {
    /// # Shapes
    /// - input: `[batch_size, in_channels, height, width]`
    /// - output: `[batch_size, out_channels, height / stride, width / stride]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let s = self.shortcut.forward(x.clone());
        let x = self.conv_in.forward(x);
        let x = self.conv_out.forward(x);
        x + s
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
    fn test_stem_block_keeps_resolution() {
        let device = Default::default();
        let block = StemBlockConfig::new(3, 16).init::<TestBackend>(&device);

        let output = block.forward(random_input([2, 3, 32, 32]));

        assert_eq!(output.dims(), [2, 16, 32, 32]);
    }

    #[test]
    fn test_strided_stem_block_halves_resolution() {
        let device = Default::default();
        let block = StemBlockConfig::new(3, 8)
            .with_stride(2)
            .init::<TestBackend>(&device);

        let output = block.forward(random_input([1, 3, 24, 40]));

        assert_eq!(output.dims(), [1, 8, 12, 20]);
    }

    #[test]
    fn test_residual_block_downsamples() {
        let device = Default::default();
        let block = ResidualBlockConfig::new(16, 32)
            .with_stride(2)
            .init::<TestBackend>(&device);

        let output = block.forward(random_input([1, 16, 32, 32]));

        assert_eq!(output.dims(), [1, 32, 16, 16]);
    }

    #[test]
    fn test_residual_block_projects_channels() {
        let device = Default::default();
        let block = ResidualBlockConfig::new(80, 32).init::<TestBackend>(&device);

        let output = block.forward(random_input([1, 80, 16, 8]));

        assert_eq!(output.dims(), [1, 32, 16, 8]);
    }

    #[test]
    fn test_conv_units_shapes() {
        let device = Default::default();
        let post = ConvBnReluConfig::new(4, 6).init::<TestBackend>(&device);
        let pre = BnReluConvConfig::new(4, 6)
            .with_kernel_size(1)
            .init::<TestBackend>(&device);

        let input = random_input([1, 4, 10, 10]);
        assert_eq!(post.forward(input.clone()).dims(), [1, 6, 10, 10]);
        assert_eq!(pre.forward(input).dims(), [1, 6, 10, 10]);
    }

    #[test]
    fn test_conv_bn_relu_is_non_negative() {
        let device = Default::default();
        let post = ConvBnReluConfig::new(3, 5).init::<TestBackend>(&device);

        let values = post
            .forward(random_input([1, 3, 8, 8]))
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        assert!(values.iter().all(|&v| v >= 0.0));
    }
}

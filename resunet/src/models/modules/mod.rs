//! Building blocks of the attention residual U-Net.

mod blocks;
mod cross_scale_attention;
mod dual_attention;
mod spatial_attention;

pub use blocks::*;
pub use cross_scale_attention::*;
pub use dual_attention::*;
pub use spatial_attention::*;

use burn::nn::{conv::Conv2dConfig, Initializer, PaddingConfig2d};

/// Square convolution padded by `kernel_size / 2` with Glorot-uniform weights.
///
/// With an odd kernel this keeps the resolution at stride 1 and halves an even
/// resolution at stride 2, matching "same" padding in either case.
pub(crate) fn conv2d_config(
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
) -> Conv2dConfig {
    let padding = kernel_size / 2;

    Conv2dConfig::new([in_channels, out_channels], [kernel_size, kernel_size])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(padding, padding))
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
}

//! # Dual Attention
//!
//! Bridge-stage attention combining a position attention branch (every location
//! attends to every other location) with a channel attention branch (every channel
//! attends to every other channel). Both branches start as identities: their
//! residual scales `gamma` are initialized to zero and learned during training.

use burn::{
    module::Param,
    nn::conv::Conv2d,
    prelude::*,
    tensor::activation::softmax,
};

use super::{conv2d_config, ConvBnRelu, ConvBnReluConfig};

/// Configuration for the `PositionAttention` module.
#[derive(Config, Debug)]
pub struct PositionAttentionConfig {
    /// Number of input (and output) channels.
    channels: usize,
    /// Channel reduction of the query and key projections.
    #[config(default = "8")]
    reduction: usize,
    /// Initial value of the residual scale.
    #[config(default = "0.0")]
    gamma_init: f64,
}

impl PositionAttentionConfig {
    /// Initializes a new `PositionAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> PositionAttention<B> {
        let inner = (self.channels / self.reduction).max(1);

        PositionAttention {
            query: conv2d_config(self.channels, inner, 1, 1).init(device),
            key: conv2d_config(self.channels, inner, 1, 1).init(device),
            value: conv2d_config(self.channels, self.channels, 1, 1).init(device),
            gamma: Param::from_tensor(Tensor::full([1], self.gamma_init, device)),
        }
    }
}

/// Self-attention over spatial positions.
#[derive(Module, Debug)]
pub struct PositionAttention<B: Backend> {
    query: Conv2d<B>,
    key: Conv2d<B>,
    value: Conv2d<B>,
    gamma: Param<Tensor<B, 1>>,
}

impl<B: Backend> PositionAttention<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, height, width] = x.dims();
        let positions = height * width;

        // [B, HW, C'] x [B, C', HW] -> [B, HW, HW]
        let query = self.query.forward(x.clone());
        let inner = query.dims()[1];
        let query = query.reshape([batch, inner, positions]).swap_dims(1, 2);
        let key = self.key.forward(x.clone()).reshape([batch, inner, positions]);
        let attn = softmax(query.matmul(key), 2);

        let value = self
            .value
            .forward(x.clone())
            .reshape([batch, channels, positions]);
        let out = value
            .matmul(attn.swap_dims(1, 2))
            .reshape([batch, channels, height, width]);

        self.gamma.val().reshape([1, 1, 1, 1]) * out + x
    }
}

/// Configuration for the `ChannelAttention` module.
#[derive(Config, Debug)]
pub struct ChannelAttentionConfig {
    /// Initial value of the residual scale.
    #[config(default = "0.0")]
    gamma_init: f64,
}

impl ChannelAttentionConfig {
    /// Initializes a new `ChannelAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ChannelAttention<B> {
        ChannelAttention {
            gamma: Param::from_tensor(Tensor::full([1], self.gamma_init, device)),
        }
    }
}

/// Self-attention over channels.
///
/// Has no projections; the only parameter is the residual scale. Each channel
/// is replaced by a softmax-weighted mix of all channels, weighted by similarity.
#[derive(Module, Debug)]
pub struct ChannelAttention<B: Backend> {
    gamma: Param<Tensor<B, 1>>,
}

impl<B: Backend> ChannelAttention<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, height, width] = x.dims();

        let flat = x.clone().reshape([batch, channels, height * width]);
        // [B, C, HW] x [B, HW, C] -> [B, C, C]
        let energy = flat.clone().matmul(flat.clone().transpose());
        let attn = softmax(energy, 2);

        let out = attn
            .matmul(flat)
            .reshape([batch, channels, height, width]);

        self.gamma.val().reshape([1, 1, 1, 1]) * out + x
    }
}

/// Configuration for the `DualAttention` module.
#[derive(Config, Debug)]
pub struct DualAttentionConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Width of both branches and of the output.
    filters: usize,
    /// Channel reduction of the position attention query/key projections.
    #[config(default = "8")]
    reduction: usize,
}

impl DualAttentionConfig {
    /// Initializes a new `DualAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> DualAttention<B> {
        let project_in = || ConvBnReluConfig::new(self.in_channels, self.filters).init(device);
        let refine = || ConvBnReluConfig::new(self.filters, self.filters).init(device);

        DualAttention {
            position_in: project_in(),
            position: PositionAttentionConfig::new(self.filters)
                .with_reduction(self.reduction)
                .init(device),
            position_out: refine(),
            channel_in: project_in(),
            channel: ChannelAttentionConfig::new().init(device),
            channel_out: refine(),
        }
    }
}

/// Position and channel attention branches applied in parallel and summed.
#[derive(Module, Debug)]
pub struct DualAttention<B: Backend> {
    position_in: ConvBnRelu<B>,
    position: PositionAttention<B>,
    position_out: ConvBnRelu<B>,
    channel_in: ConvBnRelu<B>,
    channel: ChannelAttention<B>,
    channel_out: ConvBnRelu<B>,
}

impl<B: Backend> DualAttention<B> {
    /// # Shapes
    /// - input: `[batch_size, in_channels, height, width]`
    /// - output: `[batch_size, filters, height, width]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let position = self.position_in.forward(x.clone());
        let position = self.position.forward(position);
        let position = self.position_out.forward(position);

        let channel = self.channel_in.forward(x);
        let channel = self.channel.forward(channel);
        let channel = self.channel_out.forward(channel);

        position + channel
    }
}

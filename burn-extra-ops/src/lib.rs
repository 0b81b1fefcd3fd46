//! Additional operations for the Burn deep learning framework
//!
//! This crate provides operations that are commonly used in deep learning but are not
//! yet available in the core Burn framework.

use burn::prelude::*;

mod channel_pool;
mod upsample;

// Convenient re-exports
pub use channel_pool::channel_pool;
pub use upsample::{Upsample2d, Upsample2dConfig};

/// Additional operations for Burn image tensors
pub trait TensorExtraOps<B: Backend> {
    /// Channel mean and channel max stacked as a two-channel map
    fn channel_mean_max(self) -> Self;
}

impl<B: Backend> TensorExtraOps<B> for Tensor<B, 4> {
    fn channel_mean_max(self) -> Self {
        channel_pool(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        tensor::Tensor,
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_tensor_extra_ops() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::random(
            [2, 3, 4, 5],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let pooled = tensor.channel_mean_max();
        assert_eq!(pooled.dims(), [2, 2, 4, 5]);
    }
}

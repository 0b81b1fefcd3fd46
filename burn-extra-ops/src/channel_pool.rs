//! Channel-axis pooling used by spatial attention gates.

use burn::prelude::*;

/// Pools a feature map across its channel axis.
///
/// Returns the per-pixel channel mean and channel max stacked as two channels.
///
/// # Shapes
/// - input: `[batch_size, channels, height, width]`
/// - output: `[batch_size, 2, height, width]`
pub fn channel_pool<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let mean = x.clone().mean_dim(1);
    let max = x.max_dim(1);

    Tensor::cat(vec![mean, max], 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        tensor::{Distribution, TensorData},
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn channel_pool_output_shape() {
        let device = Default::default();
        let input =
            Tensor::<TestBackend, 4>::random([3, 16, 8, 12], Distribution::Default, &device);

        assert_eq!(channel_pool(input).dims(), [3, 2, 8, 12]);
    }

    #[test]
    fn channel_pool_mean_then_max() {
        let device = Default::default();
        // Two channels over a 1x2 image: [[1, 5]], [[3, -1]].
        let input = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![1.0f32, 5.0, 3.0, -1.0], [1, 2, 1, 2]),
            &device,
        );

        let output = channel_pool(input).into_data().to_vec::<f32>().unwrap();

        assert_eq!(output, vec![2.0, 2.0, 3.0, 5.0]);
    }
}

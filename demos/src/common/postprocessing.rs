//! Post-processing utilities for predicted masks.

use burn::{
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

/// Apply threshold to create binary mask.
///
/// # Arguments
/// * `mask` - Input mask tensor with shape [N, 1, H, W]
/// * `threshold` - Threshold value (0.0 to 1.0)
///
/// # Returns
/// Binary mask tensor
pub fn apply_threshold<B: Backend>(mask: Tensor<B, 4>, threshold: f32) -> Tensor<B, 4> {
    mask.greater_elem(threshold).float()
}

/// Bilinearly resize a tensor to `[height, width]`; a no-op when the size already matches.
pub fn resize_tensor<B: Backend>(tensor: Tensor<B, 4>, height: usize, width: usize) -> Tensor<B, 4> {
    let [_, _, h, w] = tensor.dims();
    if (h, w) == (height, width) {
        return tensor;
    }

    interpolate(
        tensor,
        [height, width],
        InterpolateOptions::new(InterpolateMode::Bilinear),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::TensorData};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_apply_threshold() {
        let device = Default::default();
        let mask = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![0.1f32, 0.5, 0.51, 0.9], [1, 1, 2, 2]),
            &device,
        );

        let binary = apply_threshold(mask, 0.5).into_data().to_vec::<f32>().unwrap();

        assert_eq!(binary, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_resize_tensor() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::ones([1, 1, 10, 6], &device);

        let resized = resize_tensor(tensor.clone(), 16, 16);
        assert_eq!(resized.dims(), [1, 1, 16, 16]);

        let unchanged = resize_tensor(tensor, 10, 6);
        assert_eq!(unchanged.dims(), [1, 1, 10, 6]);
    }
}

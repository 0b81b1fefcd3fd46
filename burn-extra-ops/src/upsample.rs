//! # Nearest-Neighbour Upsampling
//!
//! Burn exposes interpolation as a free function only. `Upsample2d` wraps it as a
//! module with an integer scale factor, which is what Keras' `UpSampling2D` and
//! PyTorch's `nn.Upsample(mode="nearest")` provide.

use burn::{
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

/// Configuration for the `Upsample2d` module.
#[derive(Config, Debug)]
pub struct Upsample2dConfig {
    /// Integer factor applied to both spatial dimensions.
    #[config(default = "2")]
    pub scale_factor: usize,
}

impl Upsample2dConfig {
    /// Initializes a new `Upsample2d` module.
    pub fn init(&self) -> Upsample2d {
        assert!(self.scale_factor > 0, "scale_factor must be positive");

        Upsample2d {
            scale_factor: self.scale_factor,
        }
    }
}

/// Nearest-neighbour upsampling by an integer factor.
///
/// Every input pixel is repeated `scale_factor x scale_factor` times.
#[derive(Module, Clone, Debug)]
pub struct Upsample2d {
    scale_factor: usize,
}

impl Upsample2d {
    /// The factor applied to height and width.
    pub const fn scale_factor(&self) -> usize {
        self.scale_factor
    }

    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, channels, height * scale_factor, width * scale_factor]`
    pub fn forward<B: Backend>(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        if self.scale_factor == 1 {
            return x;
        }
        let [_, _, height, width] = x.dims();

        interpolate(
            x,
            [height * self.scale_factor, width * self.scale_factor],
            InterpolateOptions::new(InterpolateMode::Nearest),
        )
    }
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
    fn upsample_doubles_spatial_dims() {
        let device = Default::default();
        let upsample = Upsample2dConfig::new().init();
        let input =
            Tensor::<TestBackend, 4>::random([2, 5, 6, 10], Distribution::Default, &device);

        let output = upsample.forward(input);

        assert_eq!(output.dims(), [2, 5, 12, 20]);
    }

    #[test]
    fn upsample_repeats_each_pixel() {
        let device = Default::default();
        let upsample = Upsample2dConfig::new().init();
        let input = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![1.0f32, 2.0, 3.0, 4.0], [1, 1, 2, 2]),
            &device,
        );

        let output = upsample
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        #[rustfmt::skip]
        let expected = vec![
            1.0, 1.0, 2.0, 2.0,
            1.0, 1.0, 2.0, 2.0,
            3.0, 3.0, 4.0, 4.0,
            3.0, 3.0, 4.0, 4.0,
        ];
        assert_eq!(output, expected);
    }

    #[test]
    fn unit_scale_is_passthrough() {
        let device = Default::default();
        let upsample = Upsample2dConfig::new().with_scale_factor(1).init();
        let input = Tensor::<TestBackend, 4>::random([1, 3, 7, 9], Distribution::Default, &device);

        let output = upsample.forward(input.clone());

        assert_eq!(
            output.into_data().to_vec::<f32>().unwrap(),
            input.into_data().to_vec::<f32>().unwrap()
        );
    }

    #[test]
    fn gradient_flows_through_upsample() {
        let device = Default::default();
        let upsample = Upsample2dConfig::new().init();
        let input = Tensor::<TestBackend, 4>::random([1, 2, 3, 3], Distribution::Default, &device)
            .require_grad();

        let grads = upsample.forward(input.clone()).sum().backward();
        let grad = input.grad(&grads).unwrap();

        assert_eq!(grad.dims(), [1, 2, 3, 3]);
        // Each input pixel feeds four output pixels.
        for value in grad.into_data().to_vec::<f32>().unwrap() {
            assert!((value - 4.0).abs() < 1e-5);
        }
    }
}

//! Image/tensor conversion for the demo binaries.

use anyhow::{Context, Result};
use burn::tensor::{backend::Backend, DType, Tensor, TensorData};
use image::{buffer::ConvertBuffer, DynamicImage, GenericImageView, ImageBuffer, Luma};
use std::path::Path;

/// File extensions the inference binary picks up from a directory.
const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Image processing utilities
pub struct ImageUtils;

impl ImageUtils {
    /// Load image from file and convert to tensor
    ///
    /// # Returns
    /// Tensor of shape [1, 3, height, width] with values in range [0, 1]
    pub fn load_image<B: Backend, P: AsRef<Path>>(
        path: P,
        device: &B::Device,
    ) -> Result<Tensor<B, 4>> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image at {}", path.as_ref().display()))?;

        Ok(Self::dynamic_image_to_tensor(img, device))
    }

    /// Convert any image to an RGB tensor of shape [1, 3, height, width] in [0, 1]
    pub fn dynamic_image_to_tensor<B: Backend>(
        img: DynamicImage,
        device: &B::Device,
    ) -> Tensor<B, 4> {
        let (width, height) = img.dimensions();

        let buf = img.into_rgb32f().into_raw();
        let data =
            TensorData::new(buf, [height as usize, width as usize, 3]).convert::<B::FloatElem>();
        let tensor = Tensor::<B, 3>::from_data(data, device);

        // HWC -> CHW, then add the batch dimension
        tensor.permute([2, 0, 1]).unsqueeze::<4>()
    }

    /// Convert a single mask of shape [1, 1, height, width] in [0, 1] to an 8-bit
    /// grayscale image
    pub fn mask_to_image<B: Backend>(mask: Tensor<B, 4>) -> Result<DynamicImage> {
        let [batch, channels, height, width] = mask.dims();

        if batch != 1 || channels != 1 {
            anyhow::bail!(
                "Expected a single-channel mask of batch size 1, got [{batch}, {channels}, {height}, {width}]"
            );
        }

        let data = mask
            .clamp(0.0, 1.0)
            .into_data()
            .convert_dtype(DType::F32)
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Failed to convert tensor to f32: {e:?}"))?;

        let f32_buffer = ImageBuffer::<Luma<f32>, _>::from_raw(width as u32, height as u32, data)
            .context("Failed to create grayscale f32 image buffer")?;
        let u8_buffer: ImageBuffer<Luma<u8>, Vec<u8>> = f32_buffer.convert();

        Ok(DynamicImage::ImageLuma8(u8_buffer))
    }

    /// Whether the file extension is one of the supported image formats
    pub fn is_supported_image_format(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
            })
    }
}

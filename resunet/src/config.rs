//! Configuration for the attention residual U-Net.
//!
//! Filter widths are grouped by the part of the network they shape. The defaults
//! reproduce the reference network: a 16-channel stem, three stride-2 encoder
//! stages widening to 128 channels, a 128-channel dual-attention bridge and a
//! decoder narrowing back to 32 channels before the mask head.

use burn::prelude::*;

use crate::error::{ResUNetError, ResUNetResult};

/// Number of stride-2 stages in the encoder. Each one is mirrored by a 2x
/// upsample in the decoder.
pub const DOWNSAMPLING_STAGES: u32 = 3;

/// Top-level configuration of the network.
#[derive(Config, Debug)]
pub struct ResUNetConfig {
    /// Channels of the input image.
    #[config(default = "3")]
    pub in_channels: usize,
    /// Channels of the predicted mask.
    #[config(default = "1")]
    pub out_channels: usize,
    /// Output widths of the stem and of encoder stages 2, 3 and 4.
    #[config(default = "[16, 32, 64, 128]")]
    pub encoder_filters: [usize; 4],
    /// Output width of the dual-attention bridge.
    #[config(default = "128")]
    pub bridge_filters: usize,
    /// Output widths of decoder stages 1, 2 and 3 (deepest first).
    #[config(default = "[128, 64, 32]")]
    pub decoder_filters: [usize; 3],
    /// Kernel size of the convolution inside each spatial attention gate.
    #[config(default = "7")]
    pub spatial_kernel_size: usize,
    /// Channel reduction of the query/key projections in position attention.
    #[config(default = "8")]
    pub attention_reduction: usize,
}

impl ResUNetConfig {
    /// Total spatial reduction between the input and the bridge.
    pub const fn downsampling_factor(&self) -> usize {
        2usize.pow(DOWNSAMPLING_STAGES)
    }

    /// Validate the configuration and return appropriate errors for invalid settings.
    ///
    /// # Errors
    ///
    /// Returns `Err(ResUNetError::InvalidConfiguration)` if any width is zero, the
    /// spatial kernel is not a positive odd number, or the attention reduction does
    /// not leave at least one query/key channel.
    pub fn validate(&self) -> ResUNetResult<()> {
        let widths = [
            ("in_channels", self.in_channels),
            ("out_channels", self.out_channels),
            ("bridge_filters", self.bridge_filters),
        ]
        .into_iter()
        .chain(
            self.encoder_filters
                .iter()
                .map(|&width| ("encoder_filters", width)),
        )
        .chain(
            self.decoder_filters
                .iter()
                .map(|&width| ("decoder_filters", width)),
        );

        for (name, width) in widths {
            if width == 0 {
                return Err(ResUNetError::InvalidConfiguration {
                    reason: format!("{name} must be non-zero"),
                });
            }
        }

        if self.spatial_kernel_size == 0 || self.spatial_kernel_size % 2 == 0 {
            return Err(ResUNetError::InvalidConfiguration {
                reason: format!(
                    "spatial_kernel_size must be a positive odd number, got {}",
                    self.spatial_kernel_size
                ),
            });
        }

        if self.attention_reduction == 0 || self.attention_reduction > self.bridge_filters {
            return Err(ResUNetError::InvalidConfiguration {
                reason: format!(
                    "attention_reduction must be in [1, {}], got {}",
                    self.bridge_filters, self.attention_reduction
                ),
            });
        }

        Ok(())
    }

    /// Check that an input of shape `[batch, channels, height, width]` can pass
    /// through the encoder and come back out of the decoder at the same size.
    ///
    /// # Errors
    ///
    /// Returns `Err(ResUNetError::InvalidTensorShape)` if the channel count does not
    /// match `in_channels` or a spatial dimension is not a non-zero multiple of
    /// [`Self::downsampling_factor`].
    pub fn check_input_dims(&self, dims: [usize; 4]) -> ResUNetResult<()> {
        check_input_dims(self.in_channels, dims)
    }
}

/// Shared by [`ResUNetConfig::check_input_dims`] and `ResUNet::try_forward`.
pub(crate) fn check_input_dims(in_channels: usize, dims: [usize; 4]) -> ResUNetResult<()> {
    let [_, channels, height, width] = dims;
    let factor = 2usize.pow(DOWNSAMPLING_STAGES);

    if channels != in_channels {
        return Err(ResUNetError::InvalidTensorShape {
            expected: format!("[N, {in_channels}, H, W]"),
            actual: format!("{dims:?}"),
        });
    }

    let aligned = |size: usize| size > 0 && size % factor == 0;
    if !aligned(height) || !aligned(width) {
        return Err(ResUNetError::InvalidTensorShape {
            expected: format!("height and width divisible by {factor}"),
            actual: format!("{dims:?}"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = ResUNetConfig::new();

        assert!(config.validate().is_ok());
        assert_eq!(config.encoder_filters, [16, 32, 64, 128]);
        assert_eq!(config.decoder_filters, [128, 64, 32]);
        assert_eq!(config.downsampling_factor(), 8);
    }

    #[test]
    fn test_zero_width_rejected() {
        let config = ResUNetConfig::new().with_decoder_filters([128, 0, 32]);

        match config.validate() {
            Err(ResUNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("decoder_filters"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_even_spatial_kernel_rejected() {
        let config = ResUNetConfig::new().with_spatial_kernel_size(4);

        match config.validate() {
            Err(ResUNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("spatial_kernel_size"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_reduction_larger_than_bridge_rejected() {
        let config = ResUNetConfig::new()
            .with_bridge_filters(4)
            .with_attention_reduction(8);

        let result = config.validate();
        assert!(result.is_err());
        match result.unwrap_err() {
            ResUNetError::InvalidConfiguration { reason } => {
                assert!(reason.contains("attention_reduction"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_input_dims_check() {
        let config = ResUNetConfig::new();

        assert!(config.check_input_dims([2, 3, 256, 256]).is_ok());
        assert!(config.check_input_dims([1, 3, 64, 40]).is_ok());
        assert!(matches!(
            config.check_input_dims([1, 3, 100, 256]),
            Err(ResUNetError::InvalidTensorShape { .. })
        ));
        assert!(matches!(
            config.check_input_dims([1, 1, 256, 256]),
            Err(ResUNetError::InvalidTensorShape { .. })
        ));
        assert!(matches!(
            config.check_input_dims([1, 3, 0, 8]),
            Err(ResUNetError::InvalidTensorShape { .. })
        ));
    }

    #[test]
    fn test_saved_config_loads_with_same_widths() {
        let config = ResUNetConfig::new()
            .with_encoder_filters([8, 16, 24, 32])
            .with_bridge_filters(48);
        let path = std::env::temp_dir().join(format!("resunet-config-{}.json", std::process::id()));

        config.save(&path).unwrap();
        let restored = ResUNetConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.encoder_filters, [8, 16, 24, 32]);
        assert_eq!(restored.bridge_filters, 48);
        assert_eq!(restored.decoder_filters, config.decoder_filters);
        assert_eq!(restored.spatial_kernel_size, config.spatial_kernel_size);
    }
}

//! Runtime configuration for the demo binaries.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use attention_resunet::ResUNetConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the inference binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Network configuration; must match the one the weights were trained with.
    pub model: ResUNetConfig,
    /// Square size images are resized to before the forward pass. Must be a
    /// multiple of 8.
    pub image_size: usize,
    /// Output directory for masks.
    pub output_path: PathBuf,
    /// Threshold for a binary mask (None for a soft mask).
    pub threshold: Option<f32>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: ResUNetConfig::new(),
            image_size: 256,
            output_path: PathBuf::from("outputs"),
            threshold: None,
        }
    }
}

impl InferenceConfig {
    /// Reads a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Checks the runtime settings against the network's constraints.
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;

        let factor = self.model.downsampling_factor();
        if self.image_size == 0 || self.image_size % factor != 0 {
            anyhow::bail!(
                "image_size must be a positive multiple of {factor}, got {}",
                self.image_size
            );
        }

        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("threshold must be within [0, 1], got {threshold}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(InferenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_misaligned_image_size_rejected() {
        let config = InferenceConfig {
            image_size: 250,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("multiple of 8"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = InferenceConfig {
            threshold: Some(1.5),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "model": {
                "in_channels": 3,
                "out_channels": 1,
                "encoder_filters": [8, 16, 32, 64],
                "bridge_filters": 64,
                "decoder_filters": [64, 32, 16],
                "spatial_kernel_size": 7,
                "attention_reduction": 8
            },
            "image_size": 128,
            "output_path": "masks",
            "threshold": 0.5
        }"#;

        let config: InferenceConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.model.encoder_filters, [8, 16, 32, 64]);
        assert_eq!(config.image_size, 128);
        assert_eq!(config.threshold, Some(0.5));
        assert!(config.validate().is_ok());
    }
}

use thiserror::Error;

/// The error type for attention residual U-Net operations.
///
/// Covers configuration problems detected before a network is built, input tensors
/// that cannot flow through the encoder/decoder symmetrically, and record loading.
#[derive(Error, Debug)]
pub enum ResUNetError {
    /// Error for when an invalid model configuration is provided.
    #[error("Invalid model configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Error for when loading model weights fails.
    #[error("Failed to load weights: {reason}")]
    WeightLoadingFailed {
        /// The reason for the weight loading failure.
        reason: String,
    },

    /// Error for when saving model weights fails.
    #[error("Failed to save weights: {reason}")]
    WeightSavingFailed {
        /// The reason for the weight saving failure.
        reason: String,
    },
}

/// A specialized `Result` type for attention residual U-Net operations.
pub type ResUNetResult<T> = Result<T, ResUNetError>;

//! Attention Residual U-Net Demos
//!
//! Command-line tools around the `attention-resunet` model crate.
//!
//! ## Available Binaries
//!
//! - `summary`: print the module tree, every intermediate shape and the parameter count
//! - `inference`: predict masks for an image or a directory of images
//!
//! ## Usage
//!
//! ```bash
//! # Inspect the default network on a 256x256 input
//! cargo run --bin summary -- --height 256 --width 256
//!
//! # Predict masks with trained weights
//! cargo run --bin inference -- weights.mpk image.jpg --output masks/ --threshold 0.5
//! ```

pub mod common;
pub mod config;
pub mod inference;

// Re-export commonly used items
pub use common::{
    apply_threshold, create_device, get_backend_name, init_tracing, resize_tensor,
    SelectedBackend, SelectedDevice,
};
pub use config::InferenceConfig;
pub use inference::{load_model, predict_mask, process_single_image, run_inference};

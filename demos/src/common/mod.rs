//! Common utilities for the demo binaries.
//!
//! This module provides backend selection, image/tensor conversion,
//! mask post-processing and logging setup shared by the binaries.

pub mod backend;
pub mod image;
pub mod logging;
pub mod postprocessing;

// Re-export commonly used items
pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};
pub use logging::init_tracing;
pub use postprocessing::{apply_threshold, resize_tensor};

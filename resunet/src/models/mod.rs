//! # Model Architectures
//!
//! - `modules`: residual blocks and the three attention mechanisms.
//! - `resunet`: the encoder-bridge-decoder network that wires them together.

pub mod modules;
pub mod resunet;

pub use modules::*;
pub use resunet::*;

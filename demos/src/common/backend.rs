//! Backend the `summary` and `inference` binaries run the network on.
//!
//! `cuda` wins over `wgpu`; with neither feature enabled the network runs on the
//! ndarray CPU backend, which is also what the library tests use.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "cuda")] {
        use burn::backend::cuda::{Cuda, CudaDevice};

        /// Backend the network is instantiated on.
        pub type SelectedBackend = Cuda;
        /// Device weights and images are placed on.
        pub type SelectedDevice = CudaDevice;

        /// Default device of the selected backend.
        pub fn create_device() -> SelectedDevice {
            CudaDevice::default()
        }

        /// Human-readable backend name, logged at startup.
        pub const fn get_backend_name() -> &'static str {
            "CUDA (NVIDIA GPU)"
        }
    } else if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        /// Backend the network is instantiated on.
        pub type SelectedBackend = Wgpu;
        /// Device weights and images are placed on.
        pub type SelectedDevice = WgpuDevice;

        /// Default device of the selected backend.
        pub fn create_device() -> SelectedDevice {
            WgpuDevice::default()
        }

        /// Human-readable backend name, logged at startup.
        pub const fn get_backend_name() -> &'static str {
            "WGPU (GPU)"
        }
    } else {
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        /// Backend the network is instantiated on.
        pub type SelectedBackend = NdArray;
        /// Device weights and images are placed on.
        pub type SelectedDevice = NdArrayDevice;

        /// Default device of the selected backend.
        pub fn create_device() -> SelectedDevice {
            NdArrayDevice::default()
        }

        /// Human-readable backend name, logged at startup.
        pub const fn get_backend_name() -> &'static str {
            "NdArray (CPU)"
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::PathBuf;

/// Where to find the CUDA libraries and which device to bind.
#[derive(Debug, Clone)]
pub struct CudaConfig {
	/// CUDA runtime library, providing the `cudaIpc*` calls.
	///
	/// Default: `libcudart.so`
	pub runtime_library: PathBuf,
	/// CUDA driver library, used to resolve allocation ranges.
	///
	/// Default: `libcuda.so.1`
	pub driver_library: PathBuf,
	/// Device made current before every call. `None` keeps the thread's device.
	///
	/// Default: `None`
	pub device: Option<i32>,
}

impl Default for CudaConfig {
	fn default() -> Self {
		Self {
			runtime_library: PathBuf::from("libcudart.so"),
			driver_library: PathBuf::from("libcuda.so.1"),
			device: None,
		}
	}
}

impl CudaConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn runtime_library(mut self, path: impl Into<PathBuf>) -> Self {
		self.runtime_library = path.into();
		self
	}

	pub fn driver_library(mut self, path: impl Into<PathBuf>) -> Self {
		self.driver_library = path.into();
		self
	}

	pub fn device(mut self, device: i32) -> Self {
		self.device = Some(device);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder() {
		let config = CudaConfig::new().runtime_library("/opt/cuda/lib64/libcudart.so.12").device(1);
		assert_eq!(config.runtime_library, PathBuf::from("/opt/cuda/lib64/libcudart.so.12"));
		assert_eq!(config.driver_library, PathBuf::from("libcuda.so.1"));
		assert_eq!(config.device, Some(1));
	}
}

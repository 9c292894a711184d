// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fault injection for handle opens.

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use reifydb_device::DevicePtr;
use reifydb_runtime::{DeviceRuntime, ExportedHandle, HostRuntime, IpcMemHandle, Result, RuntimeError};

/// `cudaErrorInvalidResourceHandle`
const INVALID_RESOURCE_HANDLE: i32 = 400;

/// Wraps a [`HostRuntime`] and fails a chosen open attempt.
pub struct FaultyRuntime {
	inner: Arc<HostRuntime>,
	fail_open_at: Option<usize>,
	open_attempts: AtomicUsize,
}

impl FaultyRuntime {
	pub fn new(inner: Arc<HostRuntime>) -> Self {
		Self {
			inner,
			fail_open_at: None,
			open_attempts: AtomicUsize::new(0),
		}
	}

	/// Fails the `attempt`-th call to `open_handle`, counting from 1.
	pub fn fail_open_at(mut self, attempt: usize) -> Self {
		self.fail_open_at = Some(attempt);
		self
	}

	pub fn open_attempts(&self) -> usize {
		self.open_attempts.load(Ordering::Acquire)
	}

	pub fn inner(&self) -> &Arc<HostRuntime> {
		&self.inner
	}
}

impl DeviceRuntime for FaultyRuntime {
	fn name(&self) -> &str {
		"faulty-host"
	}

	fn export_handle(&self, ptr: DevicePtr) -> Result<ExportedHandle> {
		self.inner.export_handle(ptr)
	}

	fn open_handle(&self, handle: &IpcMemHandle) -> Result<DevicePtr> {
		let attempt = self.open_attempts.fetch_add(1, Ordering::AcqRel) + 1;
		if self.fail_open_at == Some(attempt) {
			return Err(RuntimeError::Cuda {
				call: "cudaIpcOpenMemHandle",
				code: INVALID_RESOURCE_HANDLE,
				message: "invalid resource handle".to_string(),
			});
		}
		self.inner.open_handle(handle)
	}

	fn close_handle(&self, base: DevicePtr) -> Result<()> {
		self.inner.close_handle(base)
	}
}

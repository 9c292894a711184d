// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Accelerator runtime primitives for sharing device memory between processes.
//!
//! The IPC layer needs exactly three things from the accelerator: turn a device
//! pointer into a transferable handle, open a handle received from another
//! process, and close an opened handle again. [`DeviceRuntime`] captures those
//! three calls.
//!
//! Two implementations ship with this crate:
//! - [`CudaRuntime`] binds the CUDA runtime and driver libraries at runtime
//! - [`HostRuntime`] simulates a device inside the current process

pub mod config;
pub mod cuda;
pub mod error;
pub mod handle;
pub mod host;

pub use config::CudaConfig;
pub use cuda::CudaRuntime;
pub use error::{Result, RuntimeError};
pub use handle::{ExportedHandle, IPC_HANDLE_SIZE, IpcMemHandle};
pub use host::{HostRuntime, HostRuntimeStats};
use reifydb_device::DevicePtr;

/// The accelerator calls needed to move memory handles between processes.
///
/// Implementations must be safe to call concurrently for unrelated handles.
pub trait DeviceRuntime: Send + Sync {
	fn name(&self) -> &str;

	/// Obtains an IPC handle for the allocation containing `ptr`.
	///
	/// Exporting does not transfer or release anything on the calling side.
	fn export_handle(&self, ptr: DevicePtr) -> Result<ExportedHandle>;

	/// Maps the allocation behind `handle` into this process and returns its base.
	fn open_handle(&self, handle: &IpcMemHandle) -> Result<DevicePtr>;

	/// Unmaps a base pointer previously returned by [`DeviceRuntime::open_handle`].
	fn close_handle(&self, base: DevicePtr) -> Result<()>;
}

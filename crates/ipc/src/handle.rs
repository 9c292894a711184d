// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Debug, Formatter},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use reifydb_device::DevicePtr;
use reifydb_runtime::{DeviceRuntime, IpcMemHandle, RuntimeError};
use tracing::{trace, warn};

/// An IPC memory handle opened in this process.
///
/// The mapping is closed by [`ImportedPtr::close`] or on drop, whichever comes
/// first, and never more than once.
pub struct ImportedPtr {
	base: DevicePtr,
	ptr: DevicePtr,
	runtime: Arc<dyn DeviceRuntime>,
	closed: AtomicBool,
}

impl ImportedPtr {
	/// Opens `handle`; the exported pointer sat `offset` bytes into its allocation.
	///
	/// The mapping is closed again if `offset` cannot be applied to it.
	pub fn open(runtime: Arc<dyn DeviceRuntime>, handle: &IpcMemHandle, offset: usize) -> Result<Self, RuntimeError> {
		let base = runtime.open_handle(handle)?;
		trace!(runtime = runtime.name(), %base, offset, "opened ipc handle");
		let mut opened = Self {
			base,
			ptr: base,
			runtime,
			closed: AtomicBool::new(false),
		};
		opened.ptr = base.checked_offset(offset).ok_or(RuntimeError::AddressOverflow {
			base,
			offset,
		})?;
		Ok(opened)
	}

	/// The pointer the exporter handed over. Valid only while [`is_open`](Self::is_open).
	pub fn get(&self) -> DevicePtr {
		self.ptr
	}

	pub fn base(&self) -> DevicePtr {
		self.base
	}

	pub fn is_open(&self) -> bool {
		!self.closed.load(Ordering::Acquire)
	}

	/// Closes the mapping. Closing an already closed handle does nothing.
	///
	/// The handle counts as closed even when the runtime reports an error, so
	/// the close call is never repeated.
	pub fn close(&self) -> Result<(), RuntimeError> {
		if self.closed.swap(true, Ordering::AcqRel) {
			return Ok(());
		}
		self.runtime.close_handle(self.base)?;
		trace!(runtime = self.runtime.name(), base = %self.base, "closed ipc handle");
		Ok(())
	}
}

impl Drop for ImportedPtr {
	fn drop(&mut self) {
		if let Err(err) = self.close() {
			warn!(base = %self.base, "failed to close ipc handle: {err}");
		}
	}
}

impl Debug for ImportedPtr {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ImportedPtr")
			.field("base", &self.base)
			.field("ptr", &self.ptr)
			.field("runtime", &self.runtime.name())
			.field("open", &self.is_open())
			.finish()
	}
}

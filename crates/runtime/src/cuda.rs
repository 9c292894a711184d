// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! CUDA binding for [`DeviceRuntime`].
//!
//! The CUDA libraries are resolved with `dlopen` when the runtime is created,
//! so building and running without a GPU toolchain only fails at that point.

use std::{
	ffi::{CStr, c_char, c_int, c_uint, c_void},
	path::Path,
	ptr,
};

use libloading::Library;
use reifydb_device::DevicePtr;
use tracing::{debug, trace};

use crate::{CudaConfig, DeviceRuntime, ExportedHandle, IPC_HANDLE_SIZE, IpcMemHandle, Result, RuntimeError};

const CUDA_SUCCESS: c_int = 0;
const CUDA_IPC_MEM_LAZY_ENABLE_PEER_ACCESS: c_uint = 0x01;

/// `cudaIpcMemHandle_t`
#[repr(C)]
#[derive(Clone, Copy)]
struct CudaIpcMemHandle {
	reserved: [u8; IPC_HANDLE_SIZE],
}

type CudaIpcGetMemHandleFn = unsafe extern "C" fn(*mut CudaIpcMemHandle, *mut c_void) -> c_int;
type CudaIpcOpenMemHandleFn = unsafe extern "C" fn(*mut *mut c_void, CudaIpcMemHandle, c_uint) -> c_int;
type CudaIpcCloseMemHandleFn = unsafe extern "C" fn(*mut c_void) -> c_int;
type CudaSetDeviceFn = unsafe extern "C" fn(c_int) -> c_int;
type CudaGetErrorStringFn = unsafe extern "C" fn(c_int) -> *const c_char;
type CuMemGetAddressRangeFn = unsafe extern "C" fn(*mut u64, *mut usize, u64) -> c_int;
type CuGetErrorStringFn = unsafe extern "C" fn(c_int, *mut *const c_char) -> c_int;

struct CudaApi {
	ipc_get_mem_handle: CudaIpcGetMemHandleFn,
	ipc_open_mem_handle: CudaIpcOpenMemHandleFn,
	ipc_close_mem_handle: CudaIpcCloseMemHandleFn,
	set_device: CudaSetDeviceFn,
	get_error_string: CudaGetErrorStringFn,
	mem_get_address_range: CuMemGetAddressRangeFn,
	driver_get_error_string: CuGetErrorStringFn,
	// The function pointers above stay valid only while these are loaded.
	_runtime: Library,
	_driver: Library,
}

impl CudaApi {
	fn load(config: &CudaConfig) -> Result<Self> {
		let runtime_path = config.runtime_library.as_path();
		let driver_path = config.driver_library.as_path();
		let runtime = open_library(runtime_path)?;
		let driver = open_library(driver_path)?;

		Ok(Self {
			ipc_get_mem_handle: symbol(&runtime, runtime_path, "cudaIpcGetMemHandle")?,
			ipc_open_mem_handle: symbol(&runtime, runtime_path, "cudaIpcOpenMemHandle")?,
			ipc_close_mem_handle: symbol(&runtime, runtime_path, "cudaIpcCloseMemHandle")?,
			set_device: symbol(&runtime, runtime_path, "cudaSetDevice")?,
			get_error_string: symbol(&runtime, runtime_path, "cudaGetErrorString")?,
			mem_get_address_range: symbol(&driver, driver_path, "cuMemGetAddressRange_v2")?,
			driver_get_error_string: symbol(&driver, driver_path, "cuGetErrorString")?,
			_runtime: runtime,
			_driver: driver,
		})
	}
}

fn open_library(path: &Path) -> Result<Library> {
	// SAFETY: the CUDA libraries have no initialisation preconditions on the caller.
	unsafe { Library::new(path) }.map_err(|source| RuntimeError::LibraryLoad {
		path: path.display().to_string(),
		source,
	})
}

fn symbol<T: Copy>(library: &Library, path: &Path, name: &'static str) -> Result<T> {
	// SAFETY: every `T` requested in this module matches the C prototype of `name`.
	unsafe { library.get::<T>(name.as_bytes()) }.map(|symbol| *symbol).map_err(|source| {
		RuntimeError::MissingSymbol {
			path: path.display().to_string(),
			symbol: name,
			source,
		}
	})
}

/// [`DeviceRuntime`] backed by the CUDA runtime and driver libraries.
pub struct CudaRuntime {
	config: CudaConfig,
	api: CudaApi,
}

impl CudaRuntime {
	pub fn load(config: CudaConfig) -> Result<Self> {
		let api = CudaApi::load(&config)?;
		debug!(
			runtime = %config.runtime_library.display(),
			driver = %config.driver_library.display(),
			device = ?config.device,
			"loaded cuda libraries"
		);
		Ok(Self {
			config,
			api,
		})
	}

	pub fn config(&self) -> &CudaConfig {
		&self.config
	}

	fn bind_device(&self) -> Result<()> {
		if let Some(device) = self.config.device {
			// SAFETY: plain value argument.
			let code = unsafe { (self.api.set_device)(device) };
			self.check("cudaSetDevice", code)?;
		}
		Ok(())
	}

	fn check(&self, call: &'static str, code: c_int) -> Result<()> {
		if code == CUDA_SUCCESS {
			return Ok(());
		}
		// SAFETY: cudaGetErrorString returns a static NUL-terminated string for any code.
		let raw = unsafe { (self.api.get_error_string)(code) };
		Err(RuntimeError::Cuda {
			call,
			code,
			message: message_from(raw, code),
		})
	}

	fn check_driver(&self, call: &'static str, code: c_int) -> Result<()> {
		if code == CUDA_SUCCESS {
			return Ok(());
		}
		let mut raw: *const c_char = ptr::null();
		// SAFETY: `raw` is a valid out-pointer; on failure it stays null.
		unsafe { (self.api.driver_get_error_string)(code, &mut raw) };
		Err(RuntimeError::Cuda {
			call,
			code,
			message: message_from(raw, code),
		})
	}
}

fn message_from(raw: *const c_char, code: c_int) -> String {
	if raw.is_null() {
		return format!("unknown cuda error {code}");
	}
	// SAFETY: non-null strings returned by CUDA are static and NUL-terminated.
	unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

impl DeviceRuntime for CudaRuntime {
	fn name(&self) -> &str {
		"cuda"
	}

	fn export_handle(&self, ptr: DevicePtr) -> Result<ExportedHandle> {
		if ptr.is_null() {
			return Err(RuntimeError::NullPointer);
		}
		self.bind_device()?;

		let mut raw = CudaIpcMemHandle {
			reserved: [0; IPC_HANDLE_SIZE],
		};
		// SAFETY: `raw` is a valid out-pointer and `ptr` is only read by the driver.
		let code = unsafe { (self.api.ipc_get_mem_handle)(&mut raw, ptr.as_raw()) };
		self.check("cudaIpcGetMemHandle", code)?;

		let mut base = 0u64;
		let mut size = 0usize;
		// SAFETY: both out-pointers are valid for writes.
		let code = unsafe { (self.api.mem_get_address_range)(&mut base, &mut size, ptr.addr() as u64) };
		self.check_driver("cuMemGetAddressRange", code)?;

		let offset = (ptr.addr() as u64).checked_sub(base).ok_or(RuntimeError::UnknownAllocation {
			ptr,
		})?;
		trace!(%ptr, base, size, offset, "exported cuda ipc handle");

		Ok(ExportedHandle {
			handle: IpcMemHandle::new(raw.reserved),
			offset,
		})
	}

	fn open_handle(&self, handle: &IpcMemHandle) -> Result<DevicePtr> {
		self.bind_device()?;

		let raw = CudaIpcMemHandle {
			reserved: *handle.as_bytes(),
		};
		let mut base: *mut c_void = ptr::null_mut();
		// SAFETY: `base` is a valid out-pointer; the handle is passed by value.
		let code = unsafe { (self.api.ipc_open_mem_handle)(&mut base, raw, CUDA_IPC_MEM_LAZY_ENABLE_PEER_ACCESS) };
		self.check("cudaIpcOpenMemHandle", code)?;

		let base = DevicePtr::from_raw(base);
		trace!(%base, "opened cuda ipc handle");
		Ok(base)
	}

	fn close_handle(&self, base: DevicePtr) -> Result<()> {
		self.bind_device()?;

		// SAFETY: `base` came from cudaIpcOpenMemHandle; the caller guarantees it is closed once.
		let code = unsafe { (self.api.ipc_close_mem_handle)(base.as_raw()) };
		self.check("cudaIpcCloseMemHandle", code)?;
		trace!(%base, "closed cuda ipc handle");
		Ok(())
	}
}

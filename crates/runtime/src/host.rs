// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-process stand-in for an accelerator.
//!
//! Allocations are plain host buffers and handles name an allocation of one
//! particular [`HostRuntime`] instance. Opening a handle maps nothing new, it
//! returns the allocation's own base address, so an imported view aliases the
//! exported memory exactly as it would on a real device.

use std::{
	collections::{BTreeMap, HashMap},
	process,
	sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

use parking_lot::Mutex;
use reifydb_device::DevicePtr;
use tracing::trace;

use crate::{DeviceRuntime, ExportedHandle, IPC_HANDLE_SIZE, IpcMemHandle, Result, RuntimeError};

const HANDLE_MAGIC: [u8; 4] = *b"HOST";

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Counters of every call made against a [`HostRuntime`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostRuntimeStats {
	pub allocations: usize,
	pub exported: usize,
	pub opened: usize,
	pub closed: usize,
	/// Mappings opened and not yet closed.
	pub open_mappings: usize,
}

struct Allocation {
	id: u64,
	memory: Box<[u8]>,
}

#[derive(Default)]
struct HostState {
	next_id: u64,
	/// Keyed by base address.
	allocations: BTreeMap<usize, Allocation>,
	bases: HashMap<u64, usize>,
	/// Open mapping count per base address.
	mappings: HashMap<usize, usize>,
}

impl HostState {
	fn find(&self, ptr: DevicePtr) -> Option<(usize, &Allocation)> {
		let (base, allocation) = self.allocations.range(..=ptr.addr()).next_back()?;
		(ptr.addr() < base + allocation.memory.len()).then_some((*base, allocation))
	}

	fn find_mut(&mut self, ptr: DevicePtr) -> Option<(usize, &mut Allocation)> {
		let (base, allocation) = self.allocations.range_mut(..=ptr.addr()).next_back()?;
		(ptr.addr() < base + allocation.memory.len()).then_some((*base, allocation))
	}
}

pub struct HostRuntime {
	instance: u64,
	state: Mutex<HostState>,
	exported: AtomicUsize,
	opened: AtomicUsize,
	closed: AtomicUsize,
}

impl HostRuntime {
	pub fn new() -> Self {
		let sequence = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
		Self {
			instance: (u64::from(process::id()) << 32) | (sequence & 0xffff_ffff),
			state: Mutex::new(HostState::default()),
			exported: AtomicUsize::new(0),
			opened: AtomicUsize::new(0),
			closed: AtomicUsize::new(0),
		}
	}

	/// Allocates `len` zeroed bytes and returns their address.
	pub fn allocate(&self, len: usize) -> DevicePtr {
		// Zero-sized allocations still need a distinct address.
		let memory = vec![0u8; len.max(1)].into_boxed_slice();
		let base = memory.as_ptr().expose_provenance();

		let mut state = self.state.lock();
		state.next_id += 1;
		let id = state.next_id;
		state.allocations.insert(
			base,
			Allocation {
				id,
				memory,
			},
		);
		state.bases.insert(id, base);
		trace!(id, base, len, "host allocation");
		DevicePtr::new(base)
	}

	/// Allocates a buffer initialised with `bytes`.
	pub fn allocate_from(&self, bytes: &[u8]) -> DevicePtr {
		let ptr = self.allocate(bytes.len());
		if let Some((_, allocation)) = self.state.lock().find_mut(ptr) {
			allocation.memory[..bytes.len()].copy_from_slice(bytes);
		}
		ptr
	}

	/// Releases the allocation starting at `base`. Handles to it become stale.
	pub fn free(&self, base: DevicePtr) -> Result<()> {
		let mut state = self.state.lock();
		let allocation = state.allocations.remove(&base.addr()).ok_or(RuntimeError::UnknownAllocation {
			ptr: base,
		})?;
		state.bases.remove(&allocation.id);
		trace!(id = allocation.id, %base, "host free");
		Ok(())
	}

	/// Copies `bytes` to `ptr`, which may point anywhere inside an allocation.
	pub fn write(&self, ptr: DevicePtr, bytes: &[u8]) -> Result<()> {
		let mut state = self.state.lock();
		let (base, allocation) = state.find_mut(ptr).ok_or(RuntimeError::UnknownAllocation {
			ptr,
		})?;
		let start = ptr.addr() - base;
		let target = allocation.memory.get_mut(start..start + bytes.len()).ok_or(RuntimeError::UnknownAllocation {
			ptr: ptr.offset(bytes.len()),
		})?;
		target.copy_from_slice(bytes);
		Ok(())
	}

	/// Reads `len` bytes starting at `ptr`.
	pub fn read(&self, ptr: DevicePtr, len: usize) -> Result<Vec<u8>> {
		let state = self.state.lock();
		let (base, allocation) = state.find(ptr).ok_or(RuntimeError::UnknownAllocation {
			ptr,
		})?;
		let start = ptr.addr() - base;
		allocation.memory.get(start..start + len).map(<[u8]>::to_vec).ok_or(RuntimeError::UnknownAllocation {
			ptr: ptr.offset(len),
		})
	}

	pub fn stats(&self) -> HostRuntimeStats {
		let state = self.state.lock();
		HostRuntimeStats {
			allocations: state.allocations.len(),
			exported: self.exported.load(Ordering::Acquire),
			opened: self.opened.load(Ordering::Acquire),
			closed: self.closed.load(Ordering::Acquire),
			open_mappings: state.mappings.values().sum(),
		}
	}

	fn encode_handle(&self, id: u64) -> IpcMemHandle {
		let mut bytes = [0u8; IPC_HANDLE_SIZE];
		bytes[..4].copy_from_slice(&HANDLE_MAGIC);
		bytes[4..12].copy_from_slice(&self.instance.to_le_bytes());
		bytes[12..20].copy_from_slice(&id.to_le_bytes());
		IpcMemHandle::new(bytes)
	}

	fn decode_handle(&self, handle: &IpcMemHandle) -> Result<u64> {
		let bytes = handle.as_bytes();
		if bytes[..4] != HANDLE_MAGIC {
			return Err(RuntimeError::ForeignHandle);
		}
		let mut word = [0u8; 8];
		word.copy_from_slice(&bytes[4..12]);
		if u64::from_le_bytes(word) != self.instance {
			return Err(RuntimeError::ForeignHandle);
		}
		word.copy_from_slice(&bytes[12..20]);
		Ok(u64::from_le_bytes(word))
	}
}

impl Default for HostRuntime {
	fn default() -> Self {
		Self::new()
	}
}

impl DeviceRuntime for HostRuntime {
	fn name(&self) -> &str {
		"host"
	}

	fn export_handle(&self, ptr: DevicePtr) -> Result<ExportedHandle> {
		if ptr.is_null() {
			return Err(RuntimeError::NullPointer);
		}
		let state = self.state.lock();
		let (base, allocation) = state.find(ptr).ok_or(RuntimeError::UnknownAllocation {
			ptr,
		})?;
		let handle = self.encode_handle(allocation.id);
		self.exported.fetch_add(1, Ordering::AcqRel);
		Ok(ExportedHandle {
			handle,
			offset: (ptr.addr() - base) as u64,
		})
	}

	fn open_handle(&self, handle: &IpcMemHandle) -> Result<DevicePtr> {
		let id = self.decode_handle(handle)?;
		let mut state = self.state.lock();
		let base = *state.bases.get(&id).ok_or(RuntimeError::StaleHandle {
			id,
		})?;
		*state.mappings.entry(base).or_insert(0) += 1;
		self.opened.fetch_add(1, Ordering::AcqRel);
		Ok(DevicePtr::new(base))
	}

	fn close_handle(&self, base: DevicePtr) -> Result<()> {
		let mut state = self.state.lock();
		let count = state.mappings.get_mut(&base.addr()).ok_or(RuntimeError::NotOpen {
			ptr: base,
		})?;
		*count -= 1;
		if *count == 0 {
			state.mappings.remove(&base.addr());
		}
		self.closed.fetch_add(1, Ordering::AcqRel);
		Ok(())
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Debug, Formatter},
};

/// Size of an IPC memory handle in bytes (`CU_IPC_HANDLE_SIZE`).
pub const IPC_HANDLE_SIZE: usize = 64;

/// Opaque token that lets another process map a device allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpcMemHandle([u8; IPC_HANDLE_SIZE]);

impl IpcMemHandle {
	pub const fn new(bytes: [u8; IPC_HANDLE_SIZE]) -> Self {
		Self(bytes)
	}

	/// Returns `None` unless `bytes` is exactly [`IPC_HANDLE_SIZE`] long.
	pub fn from_slice(bytes: &[u8]) -> Option<Self> {
		bytes.try_into().ok().map(Self)
	}

	pub fn as_bytes(&self) -> &[u8; IPC_HANDLE_SIZE] {
		&self.0
	}
}

impl Debug for IpcMemHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str("IpcMemHandle(")?;
		for byte in &self.0[..8] {
			write!(f, "{byte:02x}")?;
		}
		f.write_str("..)")
	}
}

/// Handle produced on the exporting side.
///
/// IPC handles always name a whole allocation, so the position of the exported
/// pointer inside that allocation travels with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportedHandle {
	pub handle: IpcMemHandle,
	pub offset: u64,
}

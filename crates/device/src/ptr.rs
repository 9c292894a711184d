// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::c_void,
	fmt,
	fmt::{Debug, Display, Formatter},
	ptr,
};

/// Address of a buffer in accelerator memory.
///
/// Device addresses are never dereferenced on the host, so they are carried as
/// plain integers. This keeps views `Send + Sync` and comparable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DevicePtr(usize);

impl DevicePtr {
	pub const fn null() -> Self {
		Self(0)
	}

	pub const fn new(addr: usize) -> Self {
		Self(addr)
	}

	pub fn from_raw(raw: *const c_void) -> Self {
		Self(raw.expose_provenance())
	}

	pub const fn addr(self) -> usize {
		self.0
	}

	pub const fn is_null(self) -> bool {
		self.0 == 0
	}

	/// Raw pointer for handing to the accelerator runtime.
	pub fn as_raw(self) -> *mut c_void {
		ptr::with_exposed_provenance_mut(self.0)
	}

	/// Pointer `bytes` past this one.
	pub const fn offset(self, bytes: usize) -> Self {
		Self(self.0 + bytes)
	}

	/// Pointer `bytes` past this one, or `None` if that leaves the address space.
	pub const fn checked_offset(self, bytes: usize) -> Option<Self> {
		match self.0.checked_add(bytes) {
			Some(addr) => Some(Self(addr)),
			None => None,
		}
	}

	/// Distance in bytes from `base` to this pointer, if this pointer is not below `base`.
	pub const fn offset_from(self, base: DevicePtr) -> Option<usize> {
		self.0.checked_sub(base.0)
	}
}

impl Debug for DevicePtr {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "DevicePtr({:#x})", self.0)
	}
}

impl Display for DevicePtr {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_null() {
		assert!(DevicePtr::null().is_null());
		assert!(DevicePtr::default().is_null());
		assert!(!DevicePtr::new(0x1000).is_null());
	}

	#[test]
	fn test_offset() {
		let base = DevicePtr::new(0x1000);
		let inner = base.offset(0x40);
		assert_eq!(inner.addr(), 0x1040);
		assert_eq!(inner.offset_from(base), Some(0x40));
		assert_eq!(base.offset_from(inner), None);
	}

	#[test]
	fn test_checked_offset() {
		let base = DevicePtr::new(0x1000);
		assert_eq!(base.checked_offset(0x10), Some(DevicePtr::new(0x1010)));
		assert_eq!(base.checked_offset(usize::MAX), None);
	}

	#[test]
	fn test_raw_round_trip() {
		let value = 7u64;
		let raw = &value as *const u64 as *const c_void;
		let ptr = DevicePtr::from_raw(raw);
		assert_eq!(ptr.as_raw() as *const c_void, raw);
	}

	#[test]
	fn test_display() {
		assert_eq!(DevicePtr::new(0xff).to_string(), "0xff");
		assert_eq!(format!("{:?}", DevicePtr::new(0xff)), "DevicePtr(0xff)");
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_device::DevicePtr;
use tracing::warn;

use crate::{ImportedPtr, IpcError, Result, error::child_path};

/// Owner of the IPC handles behind one imported column and its children.
///
/// While a column is alive, its pointers and those of all its descendants stay
/// mapped. Releasing it, explicitly or by dropping it, closes the children
/// depth-first before its own handles. Columns cannot be cloned: a handle is
/// closed by exactly one owner. Share a root through an `Arc` instead.
#[derive(Debug)]
pub struct ImportedColumn {
	name: String,
	data: Option<ImportedPtr>,
	null_mask: Option<ImportedPtr>,
	children: Vec<ImportedColumn>,
}

impl ImportedColumn {
	pub fn new(name: impl Into<String>, data: ImportedPtr) -> Self {
		Self::from_parts(name, Some(data), None, Vec::new())
	}

	pub fn with_null_mask(name: impl Into<String>, data: ImportedPtr, null_mask: ImportedPtr) -> Self {
		Self::from_parts(name, Some(data), Some(null_mask), Vec::new())
	}

	/// Nested columns carry no data handle of their own.
	pub fn from_parts(
		name: impl Into<String>,
		data: Option<ImportedPtr>,
		null_mask: Option<ImportedPtr>,
		children: Vec<ImportedColumn>,
	) -> Self {
		Self {
			name: name.into(),
			data,
			null_mask,
			children,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Pointer to the imported data buffer, if it has one and it is still open.
	pub fn data(&self) -> Option<DevicePtr> {
		self.data.as_ref().filter(|ptr| ptr.is_open()).map(ImportedPtr::get)
	}

	pub fn null_mask(&self) -> Option<DevicePtr> {
		self.null_mask.as_ref().filter(|ptr| ptr.is_open()).map(ImportedPtr::get)
	}

	pub fn children(&self) -> &[ImportedColumn] {
		&self.children
	}

	pub fn child(&self, index: usize) -> Option<&ImportedColumn> {
		self.children.get(index)
	}

	/// Number of handles still open in this column and all its descendants.
	pub fn open_handles(&self) -> usize {
		let own = self.handles().filter(|ptr| ptr.is_open()).count();
		own + self.children.iter().map(ImportedColumn::open_handles).sum::<usize>()
	}

	/// Closes every handle of this column and its descendants.
	///
	/// Every handle is attempted even if some fail; the first failure is
	/// returned. Calling this again is a no-op.
	pub fn release(&self) -> Result<()> {
		self.release_at(&self.name)
	}

	fn release_at(&self, path: &str) -> Result<()> {
		let mut first_error = None;
		for (index, child) in self.children.iter().enumerate() {
			if let Err(err) = child.release_at(&child_path(path, &child.name, index)) {
				first_error.get_or_insert(err);
			}
		}
		for ptr in self.handles() {
			if let Err(source) = ptr.close() {
				first_error.get_or_insert(IpcError::HandleCloseFailure {
					column: path.to_string(),
					source,
				});
			}
		}
		match first_error {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}

	fn handles(&self) -> impl Iterator<Item = &ImportedPtr> {
		self.data.iter().chain(self.null_mask.iter())
	}
}

impl Drop for ImportedColumn {
	fn drop(&mut self) {
		if let Err(err) = self.release() {
			warn!(column = %self.name, code = err.code(), "failed to release imported column: {err}");
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use reifydb_runtime::{DeviceRuntime, HostRuntime};

	use super::*;

	fn open(runtime: &Arc<HostRuntime>) -> ImportedPtr {
		let exported = runtime.export_handle(runtime.allocate(16)).unwrap();
		ImportedPtr::open(runtime.clone(), &exported.handle, exported.offset as usize).unwrap()
	}

	#[test]
	fn test_release_cascades_to_children() {
		let runtime = Arc::new(HostRuntime::new());
		let grandchild = ImportedColumn::with_null_mask("value", open(&runtime), open(&runtime));
		let offsets = ImportedColumn::new("offsets", open(&runtime));
		let child = ImportedColumn::from_parts("items", None, Some(open(&runtime)), vec![offsets, grandchild]);
		let root = ImportedColumn::from_parts("orders", None, None, vec![child]);

		assert_eq!(root.open_handles(), 4);
		assert_eq!(runtime.stats().open_mappings, 4);

		root.release().unwrap();
		assert_eq!(root.open_handles(), 0);
		assert_eq!(runtime.stats().open_mappings, 0);
		assert!(root.child(0).unwrap().null_mask().is_none());

		root.release().unwrap();
		drop(root);
		assert_eq!(runtime.stats().closed, 4);
	}

	#[test]
	fn test_drop_closes_everything() {
		let runtime = Arc::new(HostRuntime::new());
		let column = ImportedColumn::from_parts(
			"s",
			None,
			None,
			vec![ImportedColumn::new("a", open(&runtime)), ImportedColumn::new("b", open(&runtime))],
		);
		assert_eq!(runtime.stats().open_mappings, 2);
		drop(column);
		assert_eq!(runtime.stats().open_mappings, 0);
	}

	#[test]
	fn test_accessors() {
		let runtime = Arc::new(HostRuntime::new());
		let data = open(&runtime);
		let ptr = data.get();
		let column = ImportedColumn::new("price", data);
		assert_eq!(column.name(), "price");
		assert_eq!(column.data(), Some(ptr));
		assert_eq!(column.null_mask(), None);
		assert!(column.children().is_empty());
	}
}

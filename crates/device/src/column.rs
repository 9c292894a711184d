// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{ColumnShape, DataType, DevicePtr};

/// Non-owning view of one column in device memory.
///
/// `head` is the start of the data buffer; the first visible row is `offset`
/// elements past it. Nested columns keep a null `head` and describe their
/// values through `children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
	data_type: DataType,
	size: usize,
	offset: usize,
	null_count: usize,
	head: DevicePtr,
	null_mask: Option<DevicePtr>,
	children: Vec<ColumnView>,
}

impl ColumnView {
	pub fn new(data_type: DataType, size: usize, head: DevicePtr) -> Self {
		Self {
			data_type,
			size,
			offset: 0,
			null_count: 0,
			head,
			null_mask: None,
			children: Vec::new(),
		}
	}

	/// A column without a data buffer of its own, such as a list or struct.
	pub fn nested(data_type: DataType, size: usize, children: Vec<ColumnView>) -> Self {
		Self {
			data_type,
			size,
			offset: 0,
			null_count: 0,
			head: DevicePtr::null(),
			null_mask: None,
			children,
		}
	}

	pub fn with_null_mask(mut self, null_mask: DevicePtr, null_count: usize) -> Self {
		self.null_mask = (!null_mask.is_null()).then_some(null_mask);
		self.null_count = null_count;
		self
	}

	pub fn with_offset(mut self, offset: usize) -> Self {
		self.offset = offset;
		self
	}

	pub fn with_children(mut self, children: Vec<ColumnView>) -> Self {
		self.children = children;
		self
	}

	pub fn data_type(&self) -> DataType {
		self.data_type
	}

	pub fn size(&self) -> usize {
		self.size
	}

	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	pub fn offset(&self) -> usize {
		self.offset
	}

	pub fn null_count(&self) -> usize {
		self.null_count
	}

	pub fn head(&self) -> DevicePtr {
		self.head
	}

	/// Pointer to the first visible element, or `None` for columns without a
	/// data buffer or whose offset points past the address space.
	pub fn data(&self) -> Option<DevicePtr> {
		if self.head.is_null() {
			return None;
		}
		let width = self.data_type.size_in_bytes().unwrap_or(0);
		self.head.checked_offset(self.offset.checked_mul(width)?)
	}

	pub fn null_mask(&self) -> Option<DevicePtr> {
		self.null_mask
	}

	pub fn nullable(&self) -> bool {
		self.null_mask.is_some()
	}

	pub fn children(&self) -> &[ColumnView] {
		&self.children
	}

	pub fn child(&self, index: usize) -> Option<&ColumnView> {
		self.children.get(index)
	}

	pub fn num_children(&self) -> usize {
		self.children.len()
	}

	pub fn shape(&self) -> ColumnShape {
		ColumnShape {
			data_type: self.data_type,
			size: self.size,
			offset: self.offset,
			null_count: self.null_count,
			has_data: !self.head.is_null(),
			has_null_mask: self.null_mask.is_some(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_data_applies_offset() {
		let column = ColumnView::new(DataType::Int64, 4, DevicePtr::new(0x1000)).with_offset(2);
		assert_eq!(column.head(), DevicePtr::new(0x1000));
		assert_eq!(column.data(), Some(DevicePtr::new(0x1010)));
	}

	#[test]
	fn test_nested_has_no_data() {
		let offsets = ColumnView::new(DataType::Int32, 3, DevicePtr::new(0x2000));
		let child = ColumnView::new(DataType::Int8, 5, DevicePtr::new(0x3000));
		let list = ColumnView::nested(DataType::List, 2, vec![offsets, child]);
		assert_eq!(list.data(), None);
		assert_eq!(list.num_children(), 2);
		assert_eq!(list.child(1).unwrap().size(), 5);
		assert!(!list.shape().has_data);
	}

	#[test]
	fn test_null_mask() {
		let column = ColumnView::new(DataType::Float32, 8, DevicePtr::new(0x1000));
		assert!(!column.nullable());

		let column = column.with_null_mask(DevicePtr::new(0x4000), 3);
		assert!(column.nullable());
		assert_eq!(column.null_mask(), Some(DevicePtr::new(0x4000)));
		assert_eq!(column.null_count(), 3);
		assert!(column.shape().has_null_mask);

		let column = column.with_null_mask(DevicePtr::null(), 0);
		assert!(!column.nullable());
	}
}

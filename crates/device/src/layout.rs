// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Physical layout rules for device columns.
//!
//! - fixed-width columns own a single data buffer and have no children
//! - strings keep offsets (`INT32`) and chars (`INT8`) in two children
//! - lists keep offsets (`INT32`) and the element column in two children
//! - structs keep one child per field, each at least as long as the parent

use thiserror::Error;

use crate::DataType;

/// Everything the layout rules need to know about one column, minus the pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnShape {
	pub data_type: DataType,
	pub size: usize,
	pub offset: usize,
	pub null_count: usize,
	pub has_data: bool,
	pub has_null_mask: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
	#[error("{data_type} columns have no physical representation")]
	Unrepresentable {
		data_type: DataType,
	},

	#[error("{data_type} column with {size} rows has no data buffer")]
	MissingData {
		data_type: DataType,
		size: usize,
	},

	#[error("{data_type} columns keep their values in children and must not carry a data buffer")]
	UnexpectedData {
		data_type: DataType,
	},

	#[error("{data_type} column expects {expected} children, found {actual}")]
	ChildCount {
		data_type: DataType,
		expected: usize,
		actual: usize,
	},

	#[error("child {index} of {data_type} column must be {expected}, found {actual}")]
	ChildType {
		data_type: DataType,
		index: usize,
		expected: DataType,
		actual: DataType,
	},

	#[error("child {index} of {data_type} column holds {actual} rows, at least {required} are needed")]
	ChildTooShort {
		data_type: DataType,
		index: usize,
		required: usize,
		actual: usize,
	},

	#[error("null count {null_count} exceeds column size {size}")]
	NullCountExceedsSize {
		null_count: usize,
		size: usize,
	},

	#[error("column reports {null_count} nulls but has no null mask")]
	MissingNullMask {
		null_count: usize,
	},

	#[error("{size} rows at offset {offset} exceed the addressable range")]
	OutOfRange {
		offset: usize,
		size: usize,
	},
}

impl ColumnShape {
	/// Checks this column against its direct children.
	pub fn check(&self, children: &[ColumnShape]) -> Result<(), LayoutError> {
		if self.null_count > self.size {
			return Err(LayoutError::NullCountExceedsSize {
				null_count: self.null_count,
				size: self.size,
			});
		}
		if self.null_count > 0 && !self.has_null_mask {
			return Err(LayoutError::MissingNullMask {
				null_count: self.null_count,
			});
		}

		let end = self.end()?;
		let data_type = self.data_type;
		match data_type {
			DataType::Empty | DataType::Dictionary32 => Err(LayoutError::Unrepresentable {
				data_type,
			}),
			DataType::String => {
				self.expect_no_data()?;
				self.expect_children(children, 2)?;
				self.expect_offsets(children, end)?;
				self.expect_child_type(children, 1, DataType::Int8)
			}
			DataType::List => {
				self.expect_no_data()?;
				self.expect_children(children, 2)?;
				self.expect_offsets(children, end)
			}
			DataType::Struct => {
				self.expect_no_data()?;
				let required = end;
				for (index, child) in children.iter().enumerate() {
					if child.size < required {
						return Err(LayoutError::ChildTooShort {
							data_type,
							index,
							required,
							actual: child.size,
						});
					}
				}
				Ok(())
			}
			_ => {
				self.expect_children(children, 0)?;
				if self.size > 0 && !self.has_data {
					return Err(LayoutError::MissingData {
						data_type,
						size: self.size,
					});
				}
				Ok(())
			}
		}
	}

	/// One past the last visible row.
	///
	/// No buffer spans more than `isize::MAX` bytes, so neither may a column.
	fn end(&self) -> Result<usize, LayoutError> {
		let out_of_range = || LayoutError::OutOfRange {
			offset: self.offset,
			size: self.size,
		};
		let end = self.offset.checked_add(self.size).ok_or_else(out_of_range)?;
		let width = self.data_type.size_in_bytes().unwrap_or(1);
		match end.checked_mul(width) {
			Some(bytes) if bytes <= isize::MAX as usize => Ok(end),
			_ => Err(out_of_range()),
		}
	}

	fn expect_no_data(&self) -> Result<(), LayoutError> {
		if self.has_data {
			return Err(LayoutError::UnexpectedData {
				data_type: self.data_type,
			});
		}
		Ok(())
	}

	fn expect_children(&self, children: &[ColumnShape], expected: usize) -> Result<(), LayoutError> {
		if children.len() != expected {
			return Err(LayoutError::ChildCount {
				data_type: self.data_type,
				expected,
				actual: children.len(),
			});
		}
		Ok(())
	}

	fn expect_child_type(&self, children: &[ColumnShape], index: usize, expected: DataType) -> Result<(), LayoutError> {
		let actual = children[index].data_type;
		if actual != expected {
			return Err(LayoutError::ChildType {
				data_type: self.data_type,
				index,
				expected,
				actual,
			});
		}
		Ok(())
	}

	// An empty parent may come with an empty offsets child.
	fn expect_offsets(&self, children: &[ColumnShape], end: usize) -> Result<(), LayoutError> {
		self.expect_child_type(children, 0, DataType::Int32)?;
		if self.size == 0 {
			return Ok(());
		}
		let required = end.checked_add(1).ok_or(LayoutError::OutOfRange {
			offset: self.offset,
			size: self.size,
		})?;
		let actual = children[0].size;
		if actual < required {
			return Err(LayoutError::ChildTooShort {
				data_type: self.data_type,
				index: 0,
				required,
				actual,
			});
		}
		Ok(())
	}
}

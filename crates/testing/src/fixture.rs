// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builds tables in host-simulated device memory and reads them back.

use std::sync::Arc;

use reifydb_device::{ColumnView, DataType, DevicePtr};
use reifydb_runtime::{HostRuntime, Result};

/// Null masks are padded to this many bytes.
const BITMASK_PADDING: usize = 64;

pub struct DeviceFixture {
	runtime: Arc<HostRuntime>,
}

impl DeviceFixture {
	pub fn new() -> Self {
		Self::with_runtime(Arc::new(HostRuntime::new()))
	}

	pub fn with_runtime(runtime: Arc<HostRuntime>) -> Self {
		Self {
			runtime,
		}
	}

	pub fn runtime(&self) -> &Arc<HostRuntime> {
		&self.runtime
	}

	pub fn int8(&self, values: &[i8]) -> ColumnView {
		self.fixed(DataType::Int8, values.iter().map(|v| v.to_le_bytes()))
	}

	pub fn int32(&self, values: &[i32]) -> ColumnView {
		self.fixed(DataType::Int32, values.iter().map(|v| v.to_le_bytes()))
	}

	pub fn int64(&self, values: &[i64]) -> ColumnView {
		self.fixed(DataType::Int64, values.iter().map(|v| v.to_le_bytes()))
	}

	pub fn float64(&self, values: &[f64]) -> ColumnView {
		self.fixed(DataType::Float64, values.iter().map(|v| v.to_le_bytes()))
	}

	pub fn decimal64(&self, unscaled: &[i64], scale: i32) -> ColumnView {
		self.fixed(
			DataType::Decimal64 {
				scale,
			},
			unscaled.iter().map(|v| v.to_le_bytes()),
		)
	}

	/// `INT64` column with a validity mask; `None` entries are null.
	pub fn nullable_int64(&self, values: &[Option<i64>]) -> ColumnView {
		let column = self.int64(&values.iter().map(|v| v.unwrap_or_default()).collect::<Vec<_>>());
		let valid = values.iter().map(Option::is_some).collect::<Vec<_>>();
		let null_count = valid.iter().filter(|v| !**v).count();
		column.with_null_mask(self.bitmask(&valid), null_count)
	}

	/// `STRING` column with `INT32` offsets and `INT8` chars children.
	pub fn strings(&self, values: &[&str]) -> ColumnView {
		let mut offsets = Vec::with_capacity(values.len() + 1);
		let mut chars = Vec::new();
		offsets.push(0i32);
		for value in values {
			chars.extend_from_slice(value.as_bytes());
			offsets.push(chars.len() as i32);
		}
		let chars = chars.into_iter().map(|b| b as i8).collect::<Vec<_>>();
		ColumnView::nested(DataType::String, values.len(), vec![self.int32(&offsets), self.int8(&chars)])
	}

	/// `LIST` column over `element`; `offsets` holds one more entry than there are rows.
	pub fn list(&self, offsets: &[i32], element: ColumnView) -> ColumnView {
		let size = offsets.len().saturating_sub(1);
		ColumnView::nested(DataType::List, size, vec![self.int32(offsets), element])
	}

	/// `STRUCT` column as long as its first field.
	pub fn structure(&self, fields: Vec<ColumnView>) -> ColumnView {
		let size = fields.first().map(ColumnView::size).unwrap_or(0);
		ColumnView::nested(DataType::Struct, size, fields)
	}

	/// Allocates an LSB-first validity bitmask, padded to 64 bytes.
	pub fn bitmask(&self, valid: &[bool]) -> DevicePtr {
		let len = valid.len().div_ceil(8).div_ceil(BITMASK_PADDING).max(1) * BITMASK_PADDING;
		let mut bytes = vec![0u8; len];
		for (row, _) in valid.iter().enumerate().filter(|(_, v)| **v) {
			bytes[row / 8] |= 1 << (row % 8);
		}
		self.runtime.allocate_from(&bytes)
	}

	pub fn read_i32(&self, column: &ColumnView) -> Result<Vec<i32>> {
		Ok(self.read_fixed::<4>(column)?.into_iter().map(i32::from_le_bytes).collect())
	}

	pub fn read_i64(&self, column: &ColumnView) -> Result<Vec<i64>> {
		Ok(self.read_fixed::<8>(column)?.into_iter().map(i64::from_le_bytes).collect())
	}

	pub fn read_f64(&self, column: &ColumnView) -> Result<Vec<f64>> {
		Ok(self.read_fixed::<8>(column)?.into_iter().map(f64::from_le_bytes).collect())
	}

	/// Validity of each visible row. Columns without a mask are all valid.
	pub fn read_validity(&self, column: &ColumnView) -> Result<Vec<bool>> {
		let Some(mask) = column.null_mask() else {
			return Ok(vec![true; column.size()]);
		};
		let end = column.offset() + column.size();
		let bytes = self.runtime.read(mask, end.div_ceil(8))?;
		Ok((column.offset()..end).map(|row| bytes[row / 8] & (1 << (row % 8)) != 0).collect())
	}

	pub fn read_strings(&self, column: &ColumnView) -> Result<Vec<String>> {
		let (Some(offsets), Some(chars)) = (column.child(0), column.child(1)) else {
			return Ok(Vec::new());
		};
		let offsets = self.read_i32(offsets)?;
		let start = column.offset();
		let mut result = Vec::with_capacity(column.size());
		for row in start..start + column.size() {
			let (begin, end) = (offsets[row] as usize, offsets[row + 1] as usize);
			let bytes = match chars.data() {
				Some(ptr) => self.runtime.read(ptr.offset(begin), end - begin)?,
				None => Vec::new(),
			};
			result.push(String::from_utf8_lossy(&bytes).into_owned());
		}
		Ok(result)
	}

	fn fixed<const N: usize>(&self, data_type: DataType, values: impl Iterator<Item = [u8; N]>) -> ColumnView {
		let bytes = values.flatten().collect::<Vec<_>>();
		let size = bytes.len() / N;
		ColumnView::new(data_type, size, self.runtime.allocate_from(&bytes))
	}

	fn read_fixed<const N: usize>(&self, column: &ColumnView) -> Result<Vec<[u8; N]>> {
		let Some(data) = column.data() else {
			return Ok(Vec::new());
		};
		let bytes = self.runtime.read(data, column.size() * N)?;
		Ok(bytes.chunks_exact(N).filter_map(|chunk| chunk.try_into().ok()).collect())
	}
}

impl Default for DeviceFixture {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_int64_round_trip() {
		let fixture = DeviceFixture::new();
		let column = fixture.int64(&[1, -2, 3]);
		assert_eq!(column.data_type(), DataType::Int64);
		assert_eq!(fixture.read_i64(&column).unwrap(), vec![1, -2, 3]);
	}

	#[test]
	fn test_read_respects_offset() {
		let fixture = DeviceFixture::new();
		let column = fixture.int32(&[10, 20, 30, 40]);
		let sliced = ColumnView::new(DataType::Int32, 2, column.head()).with_offset(1);
		assert_eq!(fixture.read_i32(&sliced).unwrap(), vec![20, 30]);
	}

	#[test]
	fn test_nullable() {
		let fixture = DeviceFixture::new();
		let column = fixture.nullable_int64(&[Some(1), None, Some(3), None]);
		assert_eq!(column.null_count(), 2);
		assert_eq!(fixture.read_validity(&column).unwrap(), vec![true, false, true, false]);
	}

	#[test]
	fn test_strings() {
		let fixture = DeviceFixture::new();
		let column = fixture.strings(&["ab", "", "cde"]);
		assert_eq!(column.size(), 3);
		assert_eq!(fixture.read_i32(&column.children()[0]).unwrap(), vec![0, 2, 2, 5]);
		assert_eq!(fixture.read_strings(&column).unwrap(), vec!["ab", "", "cde"]);
	}

	#[test]
	fn test_layouts_are_valid() {
		let fixture = DeviceFixture::new();
		let list = fixture.list(&[0, 2, 3], fixture.int32(&[1, 2, 3]));
		let record = fixture.structure(vec![fixture.int64(&[1, 2]), fixture.strings(&["x", "y"])]);
		for column in [&list, &record] {
			let children = column.children().iter().map(ColumnView::shape).collect::<Vec<_>>();
			assert_eq!(column.shape().check(&children), Ok(()));
		}
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

/// Logical type of a device column.
///
/// Decimal types carry their base-10 scale. Nested types (`String`, `List`,
/// `Struct`, `Dictionary32`) keep their values in child columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
	Empty,
	Bool8,
	Int8,
	Int16,
	Int32,
	Int64,
	Uint8,
	Uint16,
	Uint32,
	Uint64,
	Float32,
	Float64,
	TimestampDays,
	TimestampSeconds,
	TimestampMilliseconds,
	TimestampMicroseconds,
	TimestampNanoseconds,
	DurationDays,
	DurationSeconds,
	DurationMilliseconds,
	DurationMicroseconds,
	DurationNanoseconds,
	Decimal32 {
		scale: i32,
	},
	Decimal64 {
		scale: i32,
	},
	Decimal128 {
		scale: i32,
	},
	Dictionary32,
	String,
	List,
	Struct,
}

impl DataType {
	/// Stable one-byte code used on the wire.
	pub const fn code(&self) -> u8 {
		match self {
			DataType::Empty => 0,
			DataType::Int8 => 1,
			DataType::Int16 => 2,
			DataType::Int32 => 3,
			DataType::Int64 => 4,
			DataType::Uint8 => 5,
			DataType::Uint16 => 6,
			DataType::Uint32 => 7,
			DataType::Uint64 => 8,
			DataType::Float32 => 9,
			DataType::Float64 => 10,
			DataType::Bool8 => 11,
			DataType::TimestampDays => 12,
			DataType::TimestampSeconds => 13,
			DataType::TimestampMilliseconds => 14,
			DataType::TimestampMicroseconds => 15,
			DataType::TimestampNanoseconds => 16,
			DataType::DurationDays => 17,
			DataType::DurationSeconds => 18,
			DataType::DurationMilliseconds => 19,
			DataType::DurationMicroseconds => 20,
			DataType::DurationNanoseconds => 21,
			DataType::Dictionary32 => 22,
			DataType::String => 23,
			DataType::List => 24,
			DataType::Decimal32 { .. } => 25,
			DataType::Decimal64 { .. } => 26,
			DataType::Decimal128 { .. } => 27,
			DataType::Struct => 28,
		}
	}

	/// Inverse of [`DataType::code`]. `scale` is ignored for non-decimal types.
	pub const fn from_code(code: u8, scale: i32) -> Option<Self> {
		let result = match code {
			0 => DataType::Empty,
			1 => DataType::Int8,
			2 => DataType::Int16,
			3 => DataType::Int32,
			4 => DataType::Int64,
			5 => DataType::Uint8,
			6 => DataType::Uint16,
			7 => DataType::Uint32,
			8 => DataType::Uint64,
			9 => DataType::Float32,
			10 => DataType::Float64,
			11 => DataType::Bool8,
			12 => DataType::TimestampDays,
			13 => DataType::TimestampSeconds,
			14 => DataType::TimestampMilliseconds,
			15 => DataType::TimestampMicroseconds,
			16 => DataType::TimestampNanoseconds,
			17 => DataType::DurationDays,
			18 => DataType::DurationSeconds,
			19 => DataType::DurationMilliseconds,
			20 => DataType::DurationMicroseconds,
			21 => DataType::DurationNanoseconds,
			22 => DataType::Dictionary32,
			23 => DataType::String,
			24 => DataType::List,
			25 => DataType::Decimal32 {
				scale,
			},
			26 => DataType::Decimal64 {
				scale,
			},
			27 => DataType::Decimal128 {
				scale,
			},
			28 => DataType::Struct,
			_ => return None,
		};
		Some(result)
	}

	pub const fn scale(&self) -> i32 {
		match self {
			DataType::Decimal32 {
				scale,
			}
			| DataType::Decimal64 {
				scale,
			}
			| DataType::Decimal128 {
				scale,
			} => *scale,
			_ => 0,
		}
	}

	/// Width of one element in bytes, for types stored in a single flat buffer.
	pub const fn size_in_bytes(&self) -> Option<usize> {
		let size = match self {
			DataType::Bool8 | DataType::Int8 | DataType::Uint8 => 1,
			DataType::Int16 | DataType::Uint16 => 2,
			DataType::Int32
			| DataType::Uint32
			| DataType::Float32
			| DataType::TimestampDays
			| DataType::DurationDays
			| DataType::Decimal32 { .. } => 4,
			DataType::Int64
			| DataType::Uint64
			| DataType::Float64
			| DataType::TimestampSeconds
			| DataType::TimestampMilliseconds
			| DataType::TimestampMicroseconds
			| DataType::TimestampNanoseconds
			| DataType::DurationSeconds
			| DataType::DurationMilliseconds
			| DataType::DurationMicroseconds
			| DataType::DurationNanoseconds
			| DataType::Decimal64 { .. } => 8,
			DataType::Decimal128 { .. } => 16,
			DataType::Empty | DataType::Dictionary32 | DataType::String | DataType::List | DataType::Struct => {
				return None;
			}
		};
		Some(size)
	}

	pub const fn is_fixed_width(&self) -> bool {
		self.size_in_bytes().is_some()
	}

	pub const fn is_nested(&self) -> bool {
		matches!(self, DataType::String | DataType::List | DataType::Struct | DataType::Dictionary32)
	}

	/// Whether columns of this type can be described purely by IPC memory handles.
	///
	/// `Empty` columns have no buffers to hand over and dictionary columns share
	/// their keys across columns, so neither can be exported.
	pub const fn is_ipc_exportable(&self) -> bool {
		!matches!(self, DataType::Empty | DataType::Dictionary32)
	}
}

impl Display for DataType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			DataType::Empty => f.write_str("EMPTY"),
			DataType::Bool8 => f.write_str("BOOL8"),
			DataType::Int8 => f.write_str("INT8"),
			DataType::Int16 => f.write_str("INT16"),
			DataType::Int32 => f.write_str("INT32"),
			DataType::Int64 => f.write_str("INT64"),
			DataType::Uint8 => f.write_str("UINT8"),
			DataType::Uint16 => f.write_str("UINT16"),
			DataType::Uint32 => f.write_str("UINT32"),
			DataType::Uint64 => f.write_str("UINT64"),
			DataType::Float32 => f.write_str("FLOAT32"),
			DataType::Float64 => f.write_str("FLOAT64"),
			DataType::TimestampDays => f.write_str("TIMESTAMP_DAYS"),
			DataType::TimestampSeconds => f.write_str("TIMESTAMP_SECONDS"),
			DataType::TimestampMilliseconds => f.write_str("TIMESTAMP_MILLISECONDS"),
			DataType::TimestampMicroseconds => f.write_str("TIMESTAMP_MICROSECONDS"),
			DataType::TimestampNanoseconds => f.write_str("TIMESTAMP_NANOSECONDS"),
			DataType::DurationDays => f.write_str("DURATION_DAYS"),
			DataType::DurationSeconds => f.write_str("DURATION_SECONDS"),
			DataType::DurationMilliseconds => f.write_str("DURATION_MILLISECONDS"),
			DataType::DurationMicroseconds => f.write_str("DURATION_MICROSECONDS"),
			DataType::DurationNanoseconds => f.write_str("DURATION_NANOSECONDS"),
			DataType::Decimal32 {
				scale,
			} => write!(f, "DECIMAL32({scale})"),
			DataType::Decimal64 {
				scale,
			} => write!(f, "DECIMAL64({scale})"),
			DataType::Decimal128 {
				scale,
			} => write!(f, "DECIMAL128({scale})"),
			DataType::Dictionary32 => f.write_str("DICTIONARY32"),
			DataType::String => f.write_str("STRING"),
			DataType::List => f.write_str("LIST"),
			DataType::Struct => f.write_str("STRUCT"),
		}
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wire format of an exported table.
//!
//! A message holds a schema section followed by a handle section. The schema
//! is the column tree flattened in pre-order: each [`ColumnRecord`] is followed
//! by the records of its `num_children` children. The handle section lists
//! every exported handle in the same order: a column's data handle, then its
//! null-mask handle, then the handles of its children. The whole message is
//! postcard encoded.
//!
//! Keeping the schema flat on the wire means decoding never recurses on
//! untrusted input; the tree is rebuilt with an explicit stack and rejected as
//! soon as it grows deeper than [`IpcConfig::max_nesting_depth`].

use reifydb_device::{ColumnShape, DataType};
use reifydb_runtime::{IPC_HANDLE_SIZE, IpcMemHandle};
use serde::{Deserialize, Serialize};

use crate::{IpcConfig, IpcError, Result, error::child_path};

pub const MAGIC: [u8; 4] = *b"RDIP";
pub const VERSION: u8 = 2;

/// A message exactly as it is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
	pub magic: [u8; 4],
	pub version: u8,
	pub row_count: u64,
	pub columns: Vec<ColumnRecord>,
	pub handles: Vec<HandleRecord>,
}

/// One column of the pre-order schema section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
	pub name: String,
	pub type_code: u8,
	pub scale: i32,
	pub size: u64,
	pub offset: u64,
	pub null_count: u64,
	pub has_data: bool,
	pub has_null_mask: bool,
	pub num_children: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleRecord {
	#[serde(with = "serde_bytes")]
	pub handle: Vec<u8>,
	/// Position of the exported pointer inside the allocation the handle names.
	pub offset: u64,
}

/// A decoded table: schema tree plus handles in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcMessage {
	pub row_count: u64,
	pub schema: Vec<ColumnDescriptor>,
	pub handles: Vec<HandleRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
	pub name: String,
	pub type_code: u8,
	pub scale: i32,
	pub size: u64,
	pub offset: u64,
	pub null_count: u64,
	pub has_data: bool,
	pub has_null_mask: bool,
	pub children: Vec<ColumnDescriptor>,
}

impl HandleRecord {
	pub fn new(handle: &IpcMemHandle, offset: u64) -> Self {
		Self {
			handle: handle.as_bytes().to_vec(),
			offset,
		}
	}

	pub fn handle(&self) -> Result<IpcMemHandle> {
		IpcMemHandle::from_slice(&self.handle).ok_or_else(|| {
			IpcError::malformed(format!(
				"handle payload is {} bytes, expected {IPC_HANDLE_SIZE}",
				self.handle.len()
			))
		})
	}

	/// The in-allocation offset as a byte count no buffer can exceed.
	pub fn offset(&self) -> Result<usize> {
		usize::try_from(self.offset)
			.ok()
			.filter(|offset| *offset <= isize::MAX as usize)
			.ok_or_else(|| IpcError::malformed(format!("handle offset {} is out of range", self.offset)))
	}
}

impl ColumnRecord {
	fn from_descriptor(descriptor: &ColumnDescriptor) -> Self {
		Self {
			name: descriptor.name.clone(),
			type_code: descriptor.type_code,
			scale: descriptor.scale,
			size: descriptor.size,
			offset: descriptor.offset,
			null_count: descriptor.null_count,
			has_data: descriptor.has_data,
			has_null_mask: descriptor.has_null_mask,
			num_children: descriptor.children.len() as u64,
		}
	}

	fn into_descriptor(self) -> ColumnDescriptor {
		ColumnDescriptor {
			name: self.name,
			type_code: self.type_code,
			scale: self.scale,
			size: self.size,
			offset: self.offset,
			null_count: self.null_count,
			has_data: self.has_data,
			has_null_mask: self.has_null_mask,
			children: Vec::new(),
		}
	}
}

impl ColumnDescriptor {
	pub fn data_type(&self) -> Option<DataType> {
		DataType::from_code(self.type_code, self.scale)
	}

	/// Number of handles this column and its descendants contribute.
	pub fn buffer_count(&self) -> usize {
		usize::from(self.has_data)
			+ usize::from(self.has_null_mask)
			+ self.children.iter().map(ColumnDescriptor::buffer_count).sum::<usize>()
	}

	fn shape(&self, path: &str) -> Result<ColumnShape> {
		let data_type = self
			.data_type()
			.ok_or_else(|| IpcError::malformed(format!("column '{path}' has unknown type code {}", self.type_code)))?;
		Ok(ColumnShape {
			data_type,
			size: to_usize(self.size, path)?,
			offset: to_usize(self.offset, path)?,
			null_count: to_usize(self.null_count, path)?,
			has_data: self.has_data,
			has_null_mask: self.has_null_mask,
		})
	}

	// Depth is bounded by `build_schema`.
	fn validate(&self, path: &str) -> Result<()> {
		let shape = self.shape(path)?;
		if !shape.data_type.is_ipc_exportable() {
			return Err(IpcError::malformed(format!(
				"column '{path}' declares type {}, which has no ipc representation",
				shape.data_type
			)));
		}

		let mut children = Vec::with_capacity(self.children.len());
		for (index, child) in self.children.iter().enumerate() {
			let child_path = child_path(path, &child.name, index);
			child.validate(&child_path)?;
			children.push(child.shape(&child_path)?);
		}

		shape.check(&children).map_err(|err| IpcError::malformed(format!("column '{path}': {err}")))
	}
}

fn to_usize(value: u64, path: &str) -> Result<usize> {
	usize::try_from(value).map_err(|_| IpcError::malformed(format!("column '{path}' declares out of range size {value}")))
}

/// Rebuilds the column trees from their pre-order records.
fn build_schema(records: Vec<ColumnRecord>, config: &IpcConfig) -> Result<Vec<ColumnDescriptor>> {
	let mut roots = Vec::new();
	// Columns still waiting for children, with the number they still expect.
	let mut open: Vec<(ColumnDescriptor, u64)> = Vec::new();

	for record in records {
		if open.len() >= config.max_nesting_depth {
			return Err(IpcError::malformed(format!("schema is nested deeper than {}", config.max_nesting_depth)));
		}

		let remaining = record.num_children;
		let mut node = record.into_descriptor();
		if remaining > 0 {
			open.push((node, remaining));
			continue;
		}

		loop {
			match open.last_mut() {
				None => {
					roots.push(node);
					break;
				}
				Some((parent, remaining)) => {
					parent.children.push(node);
					*remaining -= 1;
					if *remaining > 0 {
						break;
					}
				}
			}
			match open.pop() {
				Some((parent, _)) => node = parent,
				None => break,
			}
		}
	}

	if let Some((column, remaining)) = open.last() {
		return Err(IpcError::malformed(format!(
			"schema ended while column '{}' still expects {remaining} children",
			column.name
		)));
	}
	Ok(roots)
}

impl WireMessage {
	pub fn encode(&self) -> Result<Vec<u8>> {
		postcard::to_stdvec(self).map_err(|err| IpcError::malformed(format!("failed to encode message: {err}")))
	}
}

impl IpcMessage {
	pub fn new(row_count: u64, schema: Vec<ColumnDescriptor>, handles: Vec<HandleRecord>) -> Self {
		Self {
			row_count,
			schema,
			handles,
		}
	}

	/// Flattens the schema into its pre-order wire form.
	pub fn to_wire(&self) -> WireMessage {
		let mut columns = Vec::new();
		let mut pending: Vec<&ColumnDescriptor> = self.schema.iter().rev().collect();
		while let Some(column) = pending.pop() {
			columns.push(ColumnRecord::from_descriptor(column));
			pending.extend(column.children.iter().rev());
		}
		WireMessage {
			magic: MAGIC,
			version: VERSION,
			row_count: self.row_count,
			columns,
			handles: self.handles.clone(),
		}
	}

	pub fn encode(&self) -> Result<Vec<u8>> {
		self.to_wire().encode()
	}

	/// Decodes and validates a message without touching any handle.
	pub fn decode(bytes: &[u8], config: &IpcConfig) -> Result<Self> {
		if bytes.len() > config.max_message_len {
			return Err(IpcError::malformed(format!(
				"message of {} bytes exceeds limit of {}",
				bytes.len(),
				config.max_message_len
			)));
		}

		let (wire, rest): (WireMessage, &[u8]) =
			postcard::take_from_bytes(bytes).map_err(|err| IpcError::malformed(err.to_string()))?;
		if !rest.is_empty() {
			return Err(IpcError::malformed(format!("{} trailing bytes after message", rest.len())));
		}
		if wire.magic != MAGIC {
			return Err(IpcError::malformed("not an ipc table message"));
		}
		if wire.version != VERSION {
			return Err(IpcError::malformed(format!("unsupported version {}", wire.version)));
		}

		let message = Self {
			row_count: wire.row_count,
			schema: build_schema(wire.columns, config)?,
			handles: wire.handles,
		};
		message.validate()?;
		Ok(message)
	}

	fn validate(&self) -> Result<()> {
		for (index, column) in self.schema.iter().enumerate() {
			let path = child_path("", &column.name, index);
			column.validate(&path)?;
			if column.size != self.row_count {
				return Err(IpcError::malformed(format!(
					"column '{path}' has {} rows, table has {}",
					column.size, self.row_count
				)));
			}
		}

		let expected = self.schema.iter().map(ColumnDescriptor::buffer_count).sum::<usize>();
		if self.handles.len() != expected {
			return Err(IpcError::malformed(format!(
				"schema declares {expected} buffers, found {} handles",
				self.handles.len()
			)));
		}
		for record in &self.handles {
			record.handle()?;
			record.offset()?;
		}
		Ok(())
	}
}

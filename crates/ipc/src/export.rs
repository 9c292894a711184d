// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_device::{ColumnMetadata, ColumnView, DevicePtr, TableView};
use reifydb_runtime::DeviceRuntime;
use tracing::trace;

use crate::{
	IpcBuffer, IpcError, Result,
	error::child_path,
	wire::{ColumnDescriptor, HandleRecord, IpcMessage},
};

/// Depth-first walk over a table, collecting one handle per physical buffer.
struct Exporter<'a> {
	runtime: &'a dyn DeviceRuntime,
	handles: Vec<HandleRecord>,
}

pub(crate) fn export_table(
	runtime: &dyn DeviceRuntime,
	table: &TableView,
	metadata: &[ColumnMetadata],
) -> Result<IpcBuffer> {
	if metadata.len() != table.num_columns() {
		return Err(IpcError::SchemaMismatch {
			column: String::new(),
			reason: format!("table has {} columns, metadata describes {}", table.num_columns(), metadata.len()),
		});
	}

	let mut exporter = Exporter {
		runtime,
		handles: Vec::new(),
	};
	let mut schema = Vec::with_capacity(table.num_columns());
	for (index, (column, meta)) in table.iter().zip(metadata).enumerate() {
		let path = child_path("", &meta.name, index);
		if column.size() != table.num_rows() {
			return Err(IpcError::SchemaMismatch {
				column: path,
				reason: format!("column has {} rows, table has {}", column.size(), table.num_rows()),
			});
		}
		schema.push(exporter.export_column(column, meta, &path)?);
	}

	let message = IpcMessage::new(table.num_rows() as u64, schema, exporter.handles);
	Ok(IpcBuffer::from(message.encode()?))
}

impl Exporter<'_> {
	fn export_column(&mut self, column: &ColumnView, metadata: &ColumnMetadata, path: &str) -> Result<ColumnDescriptor> {
		let data_type = column.data_type();
		if !data_type.is_ipc_exportable() {
			return Err(IpcError::UnsupportedType {
				column: path.to_string(),
				data_type,
			});
		}
		if metadata.children.len() != column.num_children() {
			return Err(IpcError::SchemaMismatch {
				column: path.to_string(),
				reason: format!(
					"{data_type} column has {} children, metadata describes {}",
					column.num_children(),
					metadata.children.len()
				),
			});
		}

		let shapes: Vec<_> = column.children().iter().map(ColumnView::shape).collect();
		column.shape().check(&shapes).map_err(|source| IpcError::InvalidLayout {
			column: path.to_string(),
			source,
		})?;

		let has_data = !column.head().is_null();
		if has_data {
			self.export_buffer(column.head(), path)?;
		}
		let has_null_mask = match column.null_mask() {
			Some(mask) => {
				self.export_buffer(mask, path)?;
				true
			}
			None => false,
		};

		let mut children = Vec::with_capacity(column.num_children());
		for (index, (child, child_meta)) in column.children().iter().zip(&metadata.children).enumerate() {
			let child_path = child_path(path, &child_meta.name, index);
			children.push(self.export_column(child, child_meta, &child_path)?);
		}

		Ok(ColumnDescriptor {
			name: metadata.name.clone(),
			type_code: data_type.code(),
			scale: data_type.scale(),
			size: column.size() as u64,
			offset: column.offset() as u64,
			null_count: column.null_count() as u64,
			has_data,
			has_null_mask,
			children,
		})
	}

	fn export_buffer(&mut self, ptr: DevicePtr, path: &str) -> Result<()> {
		let exported = self.runtime.export_handle(ptr).map_err(|source| IpcError::HandleExportFailure {
			column: path.to_string(),
			source,
		})?;
		trace!(column = path, %ptr, offset = exported.offset, "exported buffer");
		self.handles.push(HandleRecord::new(&exported.handle, exported.offset));
		Ok(())
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{slice, sync::Arc};

use reifydb_device::{ColumnView, DevicePtr, TableView};
use reifydb_runtime::DeviceRuntime;

use crate::{
	ImportedColumn, ImportedPtr, IpcConfig, IpcError, Result,
	error::child_path,
	wire::{ColumnDescriptor, HandleRecord, IpcMessage},
};

/// Opens handles in the order the exporter wrote them.
///
/// Every opened handle is owned by a local value until its column is complete,
/// so an early return closes everything opened so far in this import.
struct Importer<'a> {
	runtime: Arc<dyn DeviceRuntime>,
	handles: slice::Iter<'a, HandleRecord>,
}

pub(crate) fn import_table(
	runtime: Arc<dyn DeviceRuntime>,
	bytes: &[u8],
	config: &IpcConfig,
) -> Result<(TableView, Vec<Arc<ImportedColumn>>)> {
	let message = IpcMessage::decode(bytes, config)?;

	let mut importer = Importer {
		runtime,
		handles: message.handles.iter(),
	};
	let mut views = Vec::with_capacity(message.schema.len());
	let mut roots = Vec::with_capacity(message.schema.len());
	for (index, descriptor) in message.schema.iter().enumerate() {
		let path = child_path("", &descriptor.name, index);
		let (view, column) = importer.import_column(descriptor, &path)?;
		views.push(view);
		roots.push(Arc::new(column));
	}

	Ok((TableView::new(views), roots))
}

impl Importer<'_> {
	fn import_column(&mut self, descriptor: &ColumnDescriptor, path: &str) -> Result<(ColumnView, ImportedColumn)> {
		let data_type = descriptor
			.data_type()
			.ok_or_else(|| IpcError::malformed(format!("column '{path}' has unknown type code {}", descriptor.type_code)))?;

		let data = if descriptor.has_data {
			Some(self.open_next(path)?)
		} else {
			None
		};
		let null_mask = if descriptor.has_null_mask {
			Some(self.open_next(path)?)
		} else {
			None
		};

		let mut child_views = Vec::with_capacity(descriptor.children.len());
		let mut children = Vec::with_capacity(descriptor.children.len());
		for (index, child) in descriptor.children.iter().enumerate() {
			let (view, column) = self.import_column(child, &child_path(path, &child.name, index))?;
			child_views.push(view);
			children.push(column);
		}

		let head = data.as_ref().map(ImportedPtr::get).unwrap_or(DevicePtr::null());
		let mut view = ColumnView::new(data_type, descriptor.size as usize, head)
			.with_offset(descriptor.offset as usize)
			.with_children(child_views);
		if let Some(mask) = &null_mask {
			view = view.with_null_mask(mask.get(), descriptor.null_count as usize);
		}

		let column = ImportedColumn::from_parts(descriptor.name.clone(), data, null_mask, children);
		Ok((view, column))
	}

	fn open_next(&mut self, path: &str) -> Result<ImportedPtr> {
		let record = self
			.handles
			.next()
			.ok_or_else(|| IpcError::malformed(format!("handle section ended before column '{path}'")))?;
		let handle = record.handle()?;
		let offset = record.offset()?;
		ImportedPtr::open(self.runtime.clone(), &handle, offset).map_err(|source| {
			IpcError::HandleOpenFailure {
				column: path.to_string(),
				source,
			}
		})
	}
}

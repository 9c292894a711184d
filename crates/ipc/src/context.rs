// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use reifydb_device::{ColumnMetadata, TableView};
use reifydb_runtime::DeviceRuntime;
use tracing::{debug, instrument};

use crate::{ImportedColumn, IpcBuffer, IpcConfig, Result, export::export_table, import::import_table};

/// A device runtime paired with the limits used for export and import.
#[derive(Clone)]
pub struct IpcContext {
	runtime: Arc<dyn DeviceRuntime>,
	config: IpcConfig,
}

impl IpcContext {
	pub fn new(runtime: Arc<dyn DeviceRuntime>) -> Self {
		Self {
			runtime,
			config: IpcConfig::default(),
		}
	}

	pub fn with_config(mut self, config: IpcConfig) -> Self {
		self.config = config;
		self
	}

	pub fn runtime(&self) -> &Arc<dyn DeviceRuntime> {
		&self.runtime
	}

	pub fn config(&self) -> &IpcConfig {
		&self.config
	}

	/// Serializes `table` into IPC handles plus schema.
	///
	/// `metadata` names the columns and must mirror the table's column tree.
	/// Either the whole table is exported or an error is returned; nothing is
	/// closed or released on this side.
	pub fn export(&self, table: &TableView, metadata: &[ColumnMetadata]) -> Result<IpcBuffer> {
		export_ipc(self.runtime.as_ref(), table, metadata)
	}

	/// Rebuilds a table view over the memory described by `buffer`.
	///
	/// The returned view aliases memory owned by the returned columns and must
	/// not be used after they are dropped. On error, every handle opened by
	/// this call has already been closed.
	#[instrument(name = "ipc::import", level = "debug", skip_all, fields(runtime = self.runtime.name(), bytes = buffer.len()))]
	pub fn import(&self, buffer: &IpcBuffer) -> Result<(TableView, Vec<Arc<ImportedColumn>>)> {
		let (view, columns) = import_table(self.runtime.clone(), buffer.as_bytes(), &self.config).inspect_err(|err| {
			debug!(code = err.code(), "import failed: {err}");
		})?;
		debug!(columns = columns.len(), handles = columns.iter().map(|c| c.open_handles()).sum::<usize>(), "imported table");
		Ok((view, columns))
	}
}

/// Exports `table` through `runtime`. See [`IpcContext::export`].
#[instrument(name = "ipc::export", level = "debug", skip_all, fields(runtime = runtime.name(), columns = table.num_columns(), rows = table.num_rows()))]
pub fn export_ipc(runtime: &dyn DeviceRuntime, table: &TableView, metadata: &[ColumnMetadata]) -> Result<IpcBuffer> {
	let buffer = export_table(runtime, table, metadata).inspect_err(|err| {
		debug!(code = err.code(), "export failed: {err}");
	})?;
	debug!(bytes = buffer.len(), "exported table");
	Ok(buffer)
}

/// Imports `buffer` with the default configuration. See [`IpcContext::import`].
pub fn import_ipc(runtime: Arc<dyn DeviceRuntime>, buffer: &IpcBuffer) -> Result<(TableView, Vec<Arc<ImportedColumn>>)> {
	IpcContext::new(runtime).import(buffer)
}

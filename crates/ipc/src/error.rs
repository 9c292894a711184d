// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_device::{DataType, LayoutError};
use reifydb_runtime::RuntimeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IpcError>;

/// Errors reported by IPC export and import.
///
/// `column` fields hold the dotted path of the offending column, with `[i]`
/// standing in for unnamed children.
#[derive(Debug, Error)]
pub enum IpcError {
	#[error("column '{column}' has type {data_type}, which cannot be exported through IPC handles")]
	UnsupportedType {
		column: String,
		data_type: DataType,
	},

	#[error("metadata does not match table at '{column}': {reason}")]
	SchemaMismatch {
		column: String,
		reason: String,
	},

	#[error("malformed ipc buffer: {reason}")]
	MalformedBuffer {
		reason: String,
	},

	#[error("failed to open ipc handle for column '{column}': {source}")]
	HandleOpenFailure {
		column: String,
		#[source]
		source: RuntimeError,
	},

	#[error("failed to export ipc handle for column '{column}': {source}")]
	HandleExportFailure {
		column: String,
		#[source]
		source: RuntimeError,
	},

	#[error("failed to close ipc handle of column '{column}': {source}")]
	HandleCloseFailure {
		column: String,
		#[source]
		source: RuntimeError,
	},

	#[error("column '{column}' has an invalid layout: {source}")]
	InvalidLayout {
		column: String,
		#[source]
		source: LayoutError,
	},
}

impl IpcError {
	pub(crate) fn malformed(reason: impl Into<String>) -> Self {
		IpcError::MalformedBuffer {
			reason: reason.into(),
		}
	}

	/// Stable diagnostic code of this error kind.
	pub fn code(&self) -> &'static str {
		match self {
			IpcError::UnsupportedType { .. } => "IPC_001",
			IpcError::SchemaMismatch { .. } => "IPC_002",
			IpcError::MalformedBuffer { .. } => "IPC_003",
			IpcError::HandleOpenFailure { .. } => "IPC_004",
			IpcError::HandleExportFailure { .. } => "IPC_005",
			IpcError::HandleCloseFailure { .. } => "IPC_006",
			IpcError::InvalidLayout { .. } => "IPC_007",
		}
	}
}

/// Path of child `index` named `name` below `parent`.
pub(crate) fn child_path(parent: &str, name: &str, index: usize) -> String {
	match (parent.is_empty(), name.is_empty()) {
		(true, true) => format!("[{index}]"),
		(true, false) => name.to_string(),
		(false, true) => format!("{parent}.[{index}]"),
		(false, false) => format!("{parent}.{name}"),
	}
}

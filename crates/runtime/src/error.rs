// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_device::DevicePtr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
	#[error("failed to load '{path}': {source}")]
	LibraryLoad {
		path: String,
		#[source]
		source: libloading::Error,
	},

	#[error("symbol '{symbol}' not found in '{path}': {source}")]
	MissingSymbol {
		path: String,
		symbol: &'static str,
		#[source]
		source: libloading::Error,
	},

	#[error("{call} failed with error {code}: {message}")]
	Cuda {
		call: &'static str,
		code: i32,
		message: String,
	},

	#[error("cannot export a handle for a null device pointer")]
	NullPointer,

	#[error("pointer {ptr} does not belong to any live allocation")]
	UnknownAllocation {
		ptr: DevicePtr,
	},

	#[error("handle was issued by a different runtime instance")]
	ForeignHandle,

	#[error("handle refers to allocation {id}, which has been released")]
	StaleHandle {
		id: u64,
	},

	#[error("pointer {ptr} is not an open IPC mapping")]
	NotOpen {
		ptr: DevicePtr,
	},

	#[error("offset {offset} past mapping {base} leaves the address space")]
	AddressOverflow {
		base: DevicePtr,
		offset: usize,
	},
}

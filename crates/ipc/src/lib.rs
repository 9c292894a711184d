// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Zero-copy hand-off of device-resident tables between processes.
//!
//! The exporting process turns a [`TableView`] into an [`IpcBuffer`] holding the
//! table's schema and one IPC memory handle per physical buffer. The importing
//! process, on the same device, opens those handles and gets back a
//! [`TableView`] over the very same memory together with the
//! [`ImportedColumn`]s that keep the handles open.
//!
//! # Lifetime of imported views
//!
//! The imported view borrows nothing in the Rust sense; its pointers alias
//! memory mapped by the returned columns. Keep the column list alive for as long
//! as the view, or any copy of it, is read. Dropping the last reference to a
//! root column closes every handle beneath it.
//!
//! ```ignore
//! let buffer = export_ipc(&runtime, &table, &metadata)?;
//! // ... hand `buffer.as_bytes()` to another process ...
//! let (view, columns) = import_ipc(runtime, &buffer)?;
//! run_query(&view);
//! drop(columns); // `view` must not be used past this point
//! ```

pub mod buffer;
pub mod column;
pub mod config;
pub mod context;
pub mod error;
mod export;
pub mod handle;
mod import;
pub mod wire;

pub use buffer::IpcBuffer;
pub use column::ImportedColumn;
pub use config::IpcConfig;
pub use context::{IpcContext, export_ipc, import_ipc};
pub use error::{IpcError, Result};
pub use handle::ImportedPtr;
pub use reifydb_device::{ColumnMetadata, ColumnView, DataType, DevicePtr, TableView};
pub use reifydb_runtime::DeviceRuntime;

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Non-owning views over columnar tables that live in accelerator memory.
//!
//! Nothing in this crate allocates or frees device memory. A [`ColumnView`] only
//! records where the buffers of a column are, what type they hold and how the
//! column nests; whoever hands out the view is responsible for keeping the
//! memory alive while it is read.

pub mod column;
pub mod layout;
pub mod metadata;
pub mod ptr;
pub mod table;
pub mod r#type;

pub use column::ColumnView;
pub use layout::{ColumnShape, LayoutError};
pub use metadata::ColumnMetadata;
pub use ptr::DevicePtr;
pub use table::TableView;
pub use r#type::DataType;

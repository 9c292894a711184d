// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::ColumnView;

/// Name of a column together with the names of its children.
///
/// The tree mirrors the physical children of the column it labels, so a list
/// column carries two entries (offsets and elements) and a struct one entry per
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMetadata {
	pub name: String,
	pub children: Vec<ColumnMetadata>,
}

impl ColumnMetadata {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			children: Vec::new(),
		}
	}

	pub fn with_children(mut self, children: Vec<ColumnMetadata>) -> Self {
		self.children = children;
		self
	}

	pub fn child(&self, index: usize) -> Option<&ColumnMetadata> {
		self.children.get(index)
	}

	/// Metadata with empty names that matches the shape of `column`.
	pub fn unnamed_for(column: &ColumnView) -> Self {
		Self {
			name: String::new(),
			children: column.children().iter().map(Self::unnamed_for).collect(),
		}
	}
}

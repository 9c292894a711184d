// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::slice;

use crate::ColumnView;

/// Ordered set of equally sized column views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
	columns: Vec<ColumnView>,
}

impl TableView {
	pub fn new(columns: Vec<ColumnView>) -> Self {
		Self {
			columns,
		}
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn num_columns(&self) -> usize {
		self.columns.len()
	}

	/// Row count of the table, taken from its first column.
	pub fn num_rows(&self) -> usize {
		self.columns.first().map(ColumnView::size).unwrap_or(0)
	}

	pub fn column(&self, index: usize) -> Option<&ColumnView> {
		self.columns.get(index)
	}

	pub fn columns(&self) -> &[ColumnView] {
		&self.columns
	}

	pub fn iter(&self) -> slice::Iter<'_, ColumnView> {
		self.columns.iter()
	}

	pub fn into_columns(self) -> Vec<ColumnView> {
		self.columns
	}
}

impl<'a> IntoIterator for &'a TableView {
	type Item = &'a ColumnView;
	type IntoIter = slice::Iter<'a, ColumnView>;

	fn into_iter(self) -> Self::IntoIter {
		self.columns.iter()
	}
}

impl FromIterator<ColumnView> for TableView {
	fn from_iter<I: IntoIterator<Item = ColumnView>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

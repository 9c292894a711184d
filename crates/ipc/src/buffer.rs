// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ops::Deref, sync::Arc};

/// Immutable, cheaply cloneable bytes of an exported table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcBuffer(Arc<[u8]>);

impl IpcBuffer {
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Deref for IpcBuffer {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl AsRef<[u8]> for IpcBuffer {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

impl From<Vec<u8>> for IpcBuffer {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes.into())
	}
}

impl From<&[u8]> for IpcBuffer {
	fn from(bytes: &[u8]) -> Self {
		Self(bytes.into())
	}
}

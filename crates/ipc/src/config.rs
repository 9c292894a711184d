// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Limits applied when decoding an IPC buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcConfig {
	/// Deepest column nesting accepted on import.
	///
	/// Default: 64
	pub max_nesting_depth: usize,
	/// Largest buffer accepted on import, in bytes.
	///
	/// Default: 64 MiB
	pub max_message_len: usize,
}

impl Default for IpcConfig {
	fn default() -> Self {
		Self {
			max_nesting_depth: 64,
			max_message_len: 64 * 1024 * 1024,
		}
	}
}

impl IpcConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn max_nesting_depth(mut self, depth: usize) -> Self {
		self.max_nesting_depth = depth;
		self
	}

	pub fn max_message_len(mut self, len: usize) -> Self {
		self.max_message_len = len;
		self
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness. Honors `RUST_LOG`, defaults to `warn`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

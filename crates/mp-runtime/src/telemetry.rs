// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tracing initialization for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Install a formatted `tracing` subscriber.
///
/// `RUST_LOG` wins when set; `fallback_level` (e.g. `"info"`) applies
/// otherwise. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_level.to_string()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

//! Tracing and logging setup shared by binaries and tests.

/// Initialize process-wide tracing/logging.
///
/// Output format comes from `LOG_FORMAT` (`json` by default, `pretty` for
/// human-readable output). Safe to call multiple times; subsequent calls are
/// no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::LogFormat;

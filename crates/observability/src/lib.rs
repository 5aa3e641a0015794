//! Process-wide tracing setup shared by the gateway binary and tests.

/// Initialize tracing using `LOG_FORMAT` (JSON unless set to `pretty`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

pub use crate::tracing::LogFormat;

/// Tracing configuration (filters, layers).
pub mod tracing;

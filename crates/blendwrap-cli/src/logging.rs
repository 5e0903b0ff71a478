//! Diagnostic logging setup.
//!
//! Logs always go to stderr: in the callback role stdout carries the export plan.

use tracing::Level;

/// Installs the global subscriber. DEBUG when requested, WARN otherwise.
pub fn init(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    // Ignore a second initialization; tests may call this more than once.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

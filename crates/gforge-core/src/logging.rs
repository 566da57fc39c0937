//! Tracing initialization shared by the daemon binary and tests.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global tracing subscriber.
///
/// Respects `GFORGE_LOG` (falling back to `info`) so operators can raise
/// verbosity per-module without rebuilding. Logs go to stderr; stdout is
/// reserved for command output. Calling this twice is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("GFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}

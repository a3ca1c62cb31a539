use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber on stderr. `RUST_LOG` takes precedence over
/// `level`. Calling it twice is an error from the second call on.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

/// Routes log output through the test harness. Safe to call from every test.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

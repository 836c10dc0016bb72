use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Install the global `tracing` subscriber. Logs go to stderr so that
/// structured output on stdout stays machine-readable. `RUST_LOG` wins over
/// `level` when set.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = build_filter(level)?;
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    if !LOG_LEVELS.contains(&level) {
        return Err(anyhow!(
            "invalid log level '{level}', expected one of: {}",
            LOG_LEVELS.join(", ")
        ));
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
}

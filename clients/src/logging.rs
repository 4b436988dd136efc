//! `tracing` subscriber setup shared by the binaries.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Directive used when neither `--log` nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Resolves the filter: an explicit directive first, then `RUST_LOG`, then
/// [`DEFAULT_DIRECTIVE`].
///
/// # Errors
///
/// Fails if `directive` does not parse.
pub fn resolve_filter(directive: Option<&str>) -> Result<EnvFilter> {
    match directive {
        Some(d) => EnvFilter::try_new(d).map_err(|err| anyhow!("invalid log directive '{d}': {err}")),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))),
    }
}

/// Installs a stderr fmt subscriber.
///
/// # Errors
///
/// Fails on a bad directive or if a global subscriber is already set.
pub fn init(directive: Option<&str>) -> Result<()> {
    let filter = resolve_filter(directive)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

//! Tracing setup for test binaries that install envscope hooks

use std::io;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a `tracing` filter directive
pub const LOG_FILTER_ENV: &str = "ENVSCOPE_LOG";

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when no filter is given
    pub level: Level,
    /// Explicit filter directive; overrides `ENVSCOPE_LOG` and `level`
    pub filter: Option<String>,
    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            filter: None,
            json: false,
        }
    }
}

impl TracingConfig {
    fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        if let Some(filter) = &self.filter {
            return EnvFilter::try_new(filter);
        }
        match std::env::var(LOG_FILTER_ENV) {
            Ok(filter) if !filter.trim().is_empty() => EnvFilter::try_new(filter),
            _ => {
                let level = self.level.as_str().to_ascii_lowercase();
                EnvFilter::try_new(format!("envscope_secrets={level},envscope_hooks={level}"))
            }
        }
    }
}

/// Install a global subscriber writing to stderr.
///
/// Returns `Ok(false)` without touching the existing subscriber if one is
/// already installed, so every test binary entry point may call it.
///
/// # Errors
///
/// Returns [`crate::Error::Configuration`] for an invalid filter directive.
pub fn init_tracing(config: &TracingConfig) -> crate::Result<bool> {
    let filter = config
        .env_filter()
        .map_err(|e| crate::Error::configuration(format!("invalid tracing filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init()
    };

    Ok(installed.is_ok())
}

//! Structured logging setup using tracing-subscriber.

use crate::config::LoggingConfig;
use crate::error::{BotError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.log_level`. JSON output is meant
/// for log shippers, the compact form for a terminal.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| BotError::Config(format!("bad log level {:?}: {e}", config.log_level)))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.json_output {
        registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).compact())
            .try_init()
    };

    installed.map_err(|e| BotError::Config(format!("logging already initialized: {e}")))
}

//! Logging setup for the daemon.
//!
//! Structured logging via the `tracing` ecosystem. The config file picks
//! the defaults; CLI flags win over it, and `RUST_LOG` wins over both.
//! Output goes to stderr in either pretty or JSON form.

use darkroom_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `verbose` forces DEBUG level and `json_logs` forces JSON output,
/// regardless of what the config says.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs || config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

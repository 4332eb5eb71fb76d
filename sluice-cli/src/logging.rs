//! Logging initialization for the sluice CLI.
//!
//! Configures `tracing-subscriber` based on the `[general]` section of
//! `SluiceConfig`. Supports JSON structured logging and human-readable
//! pretty format.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sluice_core::config::GeneralConfig;

use crate::error::CliError;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// The `RUST_LOG` environment variable takes precedence; otherwise
/// `override_level` (the `--log-level` flag), then `config.log_level`.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (default for production)
/// * `"pretty"` - Human-readable colored output (for development)
pub fn init_tracing(config: &GeneralConfig, override_level: Option<&str>) -> Result<(), CliError> {
    let level = override_level.unwrap_or(&config.log_level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .map_err(|e| {
                    CliError::Command(format!("failed to initialize JSON tracing subscriber: {e}"))
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .map_err(|e| {
                    CliError::Command(format!(
                        "failed to initialize pretty tracing subscriber: {e}"
                    ))
                })?;
        }
        other => {
            return Err(CliError::Config(format!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )));
        }
    }

    Ok(())
}

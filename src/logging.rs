//! Log sink setup for `BASIC_BRIDGE_LOG` / `BASIC_BRIDGE_LOG_FILE`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::error::LoggingError;

/// Install the global `tracing` subscriber.
///
/// Returns `Ok(())` without changes when a subscriber is already installed, so embedding
/// applications that bring their own subscriber keep it.
pub fn init_logging(config: &EnvConfig) -> Result<(), LoggingError> {
    let filter = parse_filter(config.log_filter())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::Io {
                    path: path.to_string(),
                    source,
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed; keeping it");
    }
    Ok(())
}

fn parse_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|err| LoggingError::Filter {
        filter: filter.to_string(),
        reason: err.to_string(),
    })
}

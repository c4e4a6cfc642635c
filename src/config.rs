//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use settings_store::settings_file;

pub const DEFAULT_WAIT_QUANTUM_MS: u64 = 10;
pub const DEFAULT_MODAL_POLL_MS: u64 = 50;
pub const DEFAULT_READ_CHUNK: usize = 1024;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_filter: Option<String>,
    pub log_file: Option<String>,
    pub wait_quantum_ms: Option<u64>,
    pub data_dir: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt("BASIC_BRIDGE_LOG"),
            log_file: env_string_opt("BASIC_BRIDGE_LOG_FILE"),
            wait_quantum_ms: env_u64_opt("BASIC_BRIDGE_WAIT_MS"),
            data_dir: env_string_opt("BASIC_BRIDGE_DATA_DIR"),
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

/// Tunables for the dispatcher, wait controller and connection reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Sleep between non-blocking pumps in duration-bounded waits.
    pub wait_quantum: Duration,
    /// Park interval while a modal wait looks for its target event.
    pub modal_poll: Duration,
    /// Maximum bytes requested per connection read.
    pub read_chunk: usize,
    /// Where shell settings are persisted, if anywhere.
    pub settings_file: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wait_quantum: Duration::from_millis(DEFAULT_WAIT_QUANTUM_MS),
            modal_poll: Duration::from_millis(DEFAULT_MODAL_POLL_MS),
            read_chunk: DEFAULT_READ_CHUNK,
            settings_file: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_env(env: &EnvConfig) -> Self {
        let mut config = Self::default();
        if let Some(ms) = env.wait_quantum_ms.filter(|ms| *ms > 0) {
            config.wait_quantum = Duration::from_millis(ms);
        }
        config.settings_file = env
            .data_dir
            .as_deref()
            .map(|dir| settings_file(std::path::Path::new(dir)));
        config
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_u64_opt(key: &str) -> Option<u64> {
    env_string_opt(key).and_then(|value| value.trim().parse().ok())
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line} in {path} has non-integer value for '{key}': {value}")]
    InvalidInteger {
        path: PathBuf,
        line: usize,
        key: &'static str,
        value: String,
    },

    #[error("line {line} in {path} has an unterminated quoted value for '{key}'")]
    UnterminatedQuote {
        path: PathBuf,
        line: usize,
        key: String,
    },
}

impl SettingsError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

//! Error types for the bridge.
//!
//! None of these escape the core as hard failures: host-call and connection errors are degraded
//! to sentinel values at the boundary and logged.

use thiserror::Error;

use crate::core::gateway::ReturnKind;

#[derive(Debug, Error)]
pub enum HostCallError {
    #[error("failed to attach to host runtime: {0}")]
    Attach(String),

    #[error("host method '{method}' is not available")]
    UnknownMethod { method: String },

    #[error("host method '{method}' returned {found:?}; expected {expected:?}")]
    ReturnMismatch {
        method: String,
        expected: ReturnKind,
        found: ReturnKind,
    },

    #[error("host method '{method}' failed: {reason}")]
    Failed { method: String, reason: String },
}

impl HostCallError {
    #[must_use]
    pub fn unknown(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    #[must_use]
    pub fn failed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("host refused to open '{url}'")]
    Refused { url: String },

    #[error("connect to '{url}' failed with result {result}")]
    ConnectFailed { url: String, result: i32 },

    #[error("read from '{url}' failed with result {result}")]
    ReadFailed { url: String, result: i32 },

    #[error("could not grow buffer for '{url}' beyond {len} bytes")]
    Allocation { url: String, len: usize },

    #[error("read from '{url}' abandoned during teardown")]
    Abandoned { url: String },
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("I/O error while opening log file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

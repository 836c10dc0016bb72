//! Error types for the scanning engine and its input layers.
//!
//! Probe failures are not errors: a refused or timed-out connect is a closed
//! port and travels as a [`crate::probe::ProbeOutcome`]. The variants here cover
//! bad configuration, bad caller input and engine faults.

/// Errors surfaced by the library.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("invalid port entry '{entry}': {reason}")]
    InvalidPort { entry: String, reason: String },

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn port(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPort {
            entry: entry.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

//! Monitor error types

use storage::StorageError;
use thiserror::Error;

/// Errors surfaced by collaborators and the cycle engine
#[derive(Error, Debug)]
pub enum MonitorError {
    /// An upstream feed could not be read or decoded
    #[error("Provider error ({source_name}): {message}")]
    Provider { source_name: String, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A row sink rejected or failed to receive rows
    #[error("Sink error ({sink}): {message}")]
    Sink { sink: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    pub fn provider(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Provider {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn sink(sink: impl Into<String>, message: impl ToString) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

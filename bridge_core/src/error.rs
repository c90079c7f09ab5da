use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Query on table '{table}' failed: {reason}")]
    SourceQueryFailed { table: String, reason: String },

    #[error("Invalid record from table '{table}': field '{field}' {reason}")]
    InvalidRecord {
        table: String,
        field: String,
        reason: String,
    },

    #[error("Failed to bind exposition listener on {addr}: {source}")]
    ExpositionBindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    pub fn query_failed(table: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceQueryFailed {
            table: table.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the store itself could not be reached or refused our credentials,
    /// as opposed to a single query going wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BridgeError::SourceUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

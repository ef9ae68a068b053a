//! Couchbase error types

use thiserror::Error;

/// Errors produced while talking to the cluster.
///
/// Every variant is fatal for the round trip; none is retried.
#[derive(Error, Debug)]
pub enum CouchbaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Unsupported SASL mechanism: {0}")]
    UnsupportedSaslMechanism(String),

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Document key must not be empty")]
    InvalidKey,

    #[error("Write of '{key}' failed: {message}")]
    Write { key: String, message: String },

    #[error("Read of '{key}' failed: {message}")]
    Read { key: String, message: String },

    #[error("Document not found: {key}")]
    DocumentNotFound { key: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl CouchbaseError {
    /// Whether this is the not-found condition of a fetch
    pub fn is_not_found(&self) -> bool {
        matches!(self, CouchbaseError::DocumentNotFound { .. })
    }

    /// Whether the server rejected the supplied credentials
    pub fn is_authentication(&self) -> bool {
        matches!(self, CouchbaseError::Authentication(_))
    }
}

impl From<reqwest::Error> for CouchbaseError {
    fn from(err: reqwest::Error) -> Self {
        CouchbaseError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for CouchbaseError {
    fn from(err: serde_json::Error) -> Self {
        CouchbaseError::Decode(err.to_string())
    }
}

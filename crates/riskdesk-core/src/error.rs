//! Error types for riskdesk

use std::time::Duration;

use crate::schema::{DecisionSource, SchemaViolation};

/// Result type alias using riskdesk's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for riskdesk operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed request (empty question, missing identifiers); a client error
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Customer context provider unreachable or customer unknown
    #[error("customer context lookup failed: {0}")]
    ContextLookupFailed(String),

    /// Generative backend could not be reached or answered with an error
    #[error("generative backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Generative backend did not answer within the configured bound
    #[error("generative backend timed out after {0:?}")]
    BackendTimeout(Duration),

    /// A candidate decision failed the schema gate
    #[error("{origin} decision violated the schema: {violation}")]
    SchemaViolation {
        origin: DecisionSource,
        violation: SchemaViolation,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new invalid-request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new context lookup error
    pub fn context(msg: impl Into<String>) -> Self {
        Self::ContextLookupFailed(msg.into())
    }

    /// Create a new backend-unavailable error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a schema violation together with the path that produced it
    pub fn schema(origin: DecisionSource, violation: SchemaViolation) -> Self {
        Self::SchemaViolation { origin, violation }
    }

    /// Whether the error should be reported to the caller as a client error
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Whether the error means the deterministic path itself is broken
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SchemaViolation {
                origin: DecisionSource::Deterministic,
                ..
            }
        )
    }
}

//! Letterdesk error types
//!
//! The top-level [`Error`] separates client faults (validation) from the
//! three upstream collaborators. Each collaborator has its own narrow error
//! enum so the orchestrator can decide what is fatal and what is only logged.

use thiserror::Error;

/// Letterdesk error type
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing input (client fault)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Content generation failed
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Outbound delivery failed
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// Record store failure
    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Content generator failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The model answered but produced no usable text
    #[error("the model returned no content")]
    Empty,

    /// The call to the model failed (network, auth, quota, bad payload)
    #[error("upstream model error: {0}")]
    Upstream(String),
}

/// Notifier failures; all are terminal for the current attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Transport credentials were refused
    #[error("SMTP authentication failed, check the mail credentials")]
    Auth,

    /// The destination was refused by the transport
    #[error("recipient address rejected: {0}")]
    RecipientRejected(String),

    /// The connection dropped mid-send
    #[error("connection to the mail server was lost: {0}")]
    Disconnected(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Record store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A write was rejected or returned no identifier
    #[error("write rejected: {0}")]
    Write(String),

    /// No artifact with this identifier
    #[error("record {0} not found")]
    NotFound(uuid::Uuid),

    /// A read or query failed
    #[error("read failed: {0}")]
    Read(String),
}

/// Result type alias for Letterdesk operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_convert() {
        let err: Error = GenerationError::Empty.into();
        assert!(matches!(err, Error::Generation(GenerationError::Empty)));

        let err: Error = DeliveryError::Auth.into();
        assert!(err.to_string().contains("authentication"));

        let id = uuid::Uuid::new_v4();
        let err: Error = PersistenceError::NotFound(id).into();
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "IO error: config.toml");
    }
}

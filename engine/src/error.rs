//! Error types for the replication engine.

use thiserror::Error;

/// Failure of the remote fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Decode(String),
}

/// Failure of the storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("id space exhausted")]
    IdSpaceExhausted,
}

/// All possible outcomes of a failed replication cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Nothing was read from or written to storage
    #[error("client request failed: {0}")]
    ClientRequestFailed(#[source] ClientError),

    #[error("client returned no products")]
    NoProducts,

    // Storage errors are carried unchanged
    #[error("product lookup failed: {0}")]
    Lookup(#[source] StorageError),

    #[error("product save failed: {0}")]
    Save(#[source] StorageError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_display() {
        let err = Error::NoProducts;
        assert_eq!(err.to_string(), "client returned no products");

        let err = Error::ClientRequestFailed(ClientError::Status(503));
        assert_eq!(
            err.to_string(),
            "client request failed: unexpected status code: 503"
        );

        let err = Error::Save(StorageError::Database("deadlock detected".into()));
        assert_eq!(
            err.to_string(),
            "product save failed: database error: deadlock detected"
        );
    }

    #[test]
    fn error_source_is_the_collaborator_error() {
        let cause = StorageError::Unavailable("connection refused".into());
        let err = Error::Lookup(cause.clone());

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), cause.to_string());
        assert!(Error::NoProducts.source().is_none());
    }

    #[test]
    fn lookup_and_save_are_distinct() {
        let cause = StorageError::Database("boom".into());
        assert_ne!(Error::Lookup(cause.clone()), Error::Save(cause));
    }
}

use crate::entity::EntityKey;

/// Errors from datastore operations.
#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    /// An entity read by the transaction changed before commit.
    #[error("transaction conflict on {key}")]
    Conflict { key: EntityKey },

    /// The transaction kept conflicting until the retry cap was reached.
    #[error("transaction abandoned after {attempts} conflicting attempts")]
    TooMuchContention { attempts: u32 },

    /// The backend cannot serve requests.
    #[error("datastore unavailable")]
    Unavailable,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for datastore operations.
pub type DatastoreResult<T> = Result<T, DatastoreError>;

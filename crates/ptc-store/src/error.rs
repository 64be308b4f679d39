use std::time::Duration;

use ptc_datastore::DatastoreError;
use ptc_types::TypeError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Datastore I/O or transaction failure, passed through unchanged.
    #[error(transparent)]
    Backend(#[from] DatastoreError),

    /// A stored payload could not be encoded or decoded.
    #[error("store.{blob}: {reason}")]
    Codec { blob: String, reason: String },

    /// A blob name with no registered codec.
    #[error("store: unknown blob name {0:?}")]
    UnknownBlob(String),

    /// No free login code was found within the attempt limit.
    #[error("could not assign login code")]
    CodeExhausted,

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(#[from] TypeError),

    /// An instructor class modification names a session that does not exist.
    #[error("session index {0} out of range")]
    InvalidSession(usize),

    #[error("store: empty blob name")]
    EmptyBlobName,

    /// The operation did not finish within the configured request timeout.
    #[error("store operation timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

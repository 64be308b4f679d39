use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("config: CookieKey not set")]
    MissingCookieKey,

    #[error("config: unknown field {0}")]
    UnknownField(String),

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid rating for {field}: {value:?}")]
    InvalidRating { field: String, value: String },
}

//! Error types for gator.

use thiserror::Error;

/// Common error type for gator.
#[derive(Error, Debug)]
pub enum GatorError {
    /// Missing or invalid command arguments.
    #[error("{0}")]
    Usage(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique key already exists.
    ///
    /// Post ingestion treats this as "already ingested"; everything else
    /// reports it to the user.
    #[error("{0} already exists")]
    Conflict(String),

    /// Feed fetch error (network, timeout, HTTP status or malformed body).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Database error.
    ///
    /// Any persistence failure other than a unique-key violation.
    #[error("database error: {0}")]
    Database(String),

    /// The current session could not be resolved to a user.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for data read from a feed or from the user.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for GatorError {
    fn from(e: sqlx::Error) -> Self {
        GatorError::Database(e.to_string())
    }
}

impl GatorError {
    /// Map an insert error, turning unique-key violations into `Conflict`.
    pub fn from_insert(e: sqlx::Error, what: &str) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                GatorError::Conflict(what.to_string())
            }
            _ => GatorError::Database(e.to_string()),
        }
    }

    /// Whether this error is a unique-key conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatorError::Conflict(_))
    }
}

/// Result type alias for gator operations.
pub type Result<T> = std::result::Result<T, GatorError>;

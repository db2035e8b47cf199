//! Error types for s3browser operations.

use thiserror::Error;

/// Result type alias using [`BrowserError`].
pub type Result<T> = std::result::Result<T, BrowserError>;

/// Errors that can occur while connecting, resolving sessions, or talking
/// to the object store.
///
/// All errors implement `std::error::Error` and can be chained with `source()`.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// A required connect field was missing or empty. Detected before any I/O.
    #[error("{0}")]
    Validation(String),

    /// The probe against the storage endpoint failed (bad credentials,
    /// unreachable host, timeout).
    #[error("connection test failed: {message}")]
    Connection {
        /// Underlying cause, folded into a user-facing message
        message: String,
    },

    /// No token was presented, or it does not resolve to a live session.
    ///
    /// Never-valid and expired tokens produce the same error.
    #[error("No valid session")]
    Unauthenticated,

    /// Lookup of an absent session or object.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request parameter (bucket name, object key, config value) is invalid.
    #[error("{0}")]
    InvalidInput(String),

    /// Object-store operation failed.
    #[error("{operation}: {message}")]
    Storage {
        /// Operation name (list_buckets, delete_bucket, ...)
        operation: String,
        /// S3 error code when the service returned one (e.g. `NoSuchBucket`)
        code: Option<String>,
        /// Error message from the service or transport
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BrowserError {
    /// Creates a connection error from any displayable cause.
    pub fn connection(cause: impl std::fmt::Display) -> Self {
        Self::Connection {
            message: cause.to_string(),
        }
    }

    /// Creates a storage error with an optional service error code.
    ///
    /// # Example
    ///
    /// ```
    /// use s3browser::BrowserError;
    ///
    /// let err = BrowserError::storage(
    ///     "delete_bucket",
    ///     Some("BucketNotEmpty".to_string()),
    ///     "The bucket you tried to delete is not empty",
    /// );
    ///
    /// assert_eq!(err.storage_code(), Some("BucketNotEmpty"));
    /// assert_eq!(
    ///     err.to_string(),
    ///     "delete_bucket: The bucket you tried to delete is not empty"
    /// );
    /// ```
    pub fn storage(
        operation: impl Into<String>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Storage {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    /// Returns the S3 error code carried by a [`BrowserError::Storage`], if any.
    pub fn storage_code(&self) -> Option<&str> {
        match self {
            Self::Storage { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

//! Crate-wide error hierarchy for kb-controllers.
//!
//! Request failures never show up here: controllers turn them into inline
//! error text on their view. These errors cover local concerns only
//! (persisted flags, admin configuration).

use kb_api_client::ApiClientError;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Root error type for the kb-controllers crate.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Persisted flag storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Admin action menu could not be loaded.
    #[error("invalid admin action file {path}: {reason}")]
    ActionFile {
        /// File that was read.
        path: String,
        /// What went wrong (I/O or JSON).
        reason: String,
    },
}

/// Flag storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while reading or writing the flag file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error in the flag file.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// In-memory store lock was poisoned.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// Text shown inline for a failed request; `fallback` covers empty messages.
pub(crate) fn error_text(err: &ApiClientError, fallback: &str) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_uses_fallback() {
        let err = ApiClientError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(error_text(&err, "Query failed"), "Query failed");
    }

    #[test]
    fn body_text_is_kept() {
        let err = ApiClientError::Status {
            status: 400,
            body: "bad question".into(),
        };
        assert_eq!(error_text(&err, "Query failed"), "bad question");
    }
}

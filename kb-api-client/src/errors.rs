//! Crate-wide error hierarchy for kb-api-client.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ApiClientResult<T> = Result<T, ApiClientError>;

/// Root error type for the kb-api-client crate.
///
/// The `Display` output of [`ApiClientError::Status`] and
/// [`ApiClientError::Network`] is exactly the text the user gets to see:
/// the raw response body and the transport failure description.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// Backend answered with a non-2xx status.
    #[error("{body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Raw response body text, unmodified.
        body: String,
    },

    /// Network/transport failure without HTTP status (DNS/connect/reset/timeout).
    #[error("{0}")]
    Network(String),

    /// Response body was not valid JSON for the expected type.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Local I/O while preparing a request (e.g. reading a file to upload).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration problems (bad base URL, timeout, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiClientError {
    /// HTTP status carried by this error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration and setup errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (timeouts, limits).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `KB_HTTP_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `KB_BACKEND_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },
}

impl From<reqwest::Error> for ApiClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return ApiClientError::Decode(e.to_string());
        }
        ApiClientError::Network(error_chain(&e))
    }
}

/// Joins an error and its `source()` chain with `": "`, skipping levels
/// whose message is already part of the text.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !msg.is_empty() && !text.contains(&msg) {
            text.push_str(": ");
            text.push_str(&msg);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_body_verbatim() {
        let err = ApiClientError::Status {
            status: 422,
            body: "{\"detail\":\"file too large\"}".to_string(),
        };
        assert_eq!(err.to_string(), "{\"detail\":\"file too large\"}");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn network_error_displays_cause() {
        let err = ApiClientError::Network("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] Middle);

    #[derive(Debug, Error)]
    #[error("tcp connect error")]
    struct Middle(#[source] std::io::Error);

    #[test]
    fn error_chain_keeps_every_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let text = error_chain(&Outer(Middle(io)));
        assert_eq!(text, "error sending request: tcp connect error: Connection refused");
    }
}

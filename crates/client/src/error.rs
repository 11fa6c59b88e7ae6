//! Error types for the client crate.

use thiserror::Error;

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the remote API.
#[derive(Error, Debug)]
pub enum Error {
    /// The object or workspace does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered with a body we could not interpret.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Failure injected into an in-memory remote.
    #[error("injected {operation} failure for '{target}'")]
    Injected { operation: String, target: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn injected(operation: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Injected {
            operation: operation.into(),
            target: target.into(),
        }
    }

    /// Whether the remote reported the target as absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("tag", "12");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "tag '12' not found");
    }

    #[test]
    fn test_status_is_not_not_found() {
        let err = Error::status(500, "boom");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("500"));
    }
}

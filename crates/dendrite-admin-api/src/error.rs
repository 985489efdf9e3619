//! Error taxonomy for admin API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Maximum password length accepted by Dendrite's bcrypt-backed storage.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Convenience alias for admin API results.
pub type Result<T> = std::result::Result<T, Error>;

/// Primary error type for admin API operations.
///
/// Every failure is surfaced to the caller; the client never retries and
/// never recovers silently.
#[derive(Debug, Error)]
pub enum Error {
    /// A password exceeded the 72-byte limit before any network call.
    #[error(
        "password is {bytes} bytes; Dendrite rejects passwords over \
         {MAX_PASSWORD_BYTES} bytes (set override-password-length-check to bypass)"
    )]
    PasswordTooLong {
        /// UTF-8 byte length of the offending password.
        bytes: usize,
    },
    /// A local precondition other than password length failed.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The server answered with a non-2xx status other than 404.
    #[error("server returned {status}: {body}")]
    Remote {
        /// HTTP status of the response.
        status: StatusCode,
        /// Raw response body, kept verbatim for the operator.
        body: String,
    },
    /// The server reported an unknown room or user identifier.
    #[error("{what} not found: {body}")]
    NotFound {
        /// Identifier the server did not recognize.
        what: String,
        /// Raw response body.
        body: String,
    },
    /// The server response violated the expected handshake shape.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// No interactive-auth flow started with a password stage.
    #[error("no supported interactive-auth flow (expected a flow starting with m.login.password)")]
    UnsupportedFlow,
    /// An intermediate postcondition of a multi-step handshake failed.
    #[error("{0}")]
    Operation(String),
    /// The HTTP transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A URL could not be constructed from the configured base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Whether this error is the 404 subtype of the remote class.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status carried by remote errors, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration problems detected while building a client.
///
/// These are fatal: no client is constructed and no request is ever issued.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The security identifier is missing or empty.
    #[error("missing credential: security identifier must be a non-empty string")]
    MissingCredential,

    /// The API endpoint is missing, empty, or not a usable base address.
    #[error("missing endpoint: {reason}")]
    MissingEndpoint {
        /// Why the endpoint was rejected.
        reason: String,
    },

    /// Throttle parameters are missing or contain a non-positive limit.
    #[error("missing throttle parameters: {reason}")]
    MissingThrottleParameters {
        /// Why the parameters were rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Helper: build a `MissingEndpoint` error.
    pub fn endpoint(reason: impl Into<String>) -> Self {
        Self::MissingEndpoint {
            reason: reason.into(),
        }
    }

    /// Helper: build a `MissingThrottleParameters` error.
    pub fn throttle(reason: impl Into<String>) -> Self {
        Self::MissingThrottleParameters {
            reason: reason.into(),
        }
    }
}

/// Unified runtime error type for the pagewise workspace.
///
/// Errors are `Clone` so a failed cursor can hand the same terminal error to
/// every subsequent pull.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PagewiseError {
    /// The request never produced a response (connection, DNS, TLS, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The response could not be decoded into a page.
    #[error("malformed page: {0}")]
    MalformedPage(String),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid configuration surfaced at runtime.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl PagewiseError {
    /// Helper: build a `Transport` error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Helper: build a `Server` error from a status code and message.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Helper: build a `MalformedPage` error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPage(msg.into())
    }

    /// Returns true if this error is a cancellation signal rather than a failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if this error was raised by fetching a page.
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Server { .. } | Self::MalformedPage(_)
        )
    }
}

//! Error types for the REST transport.

use thiserror::Error;

/// Result type for REST transport operations.
pub type RestResult<T> = Result<T, RestError>;

/// Errors raised while talking to the engine over HTTP.
#[derive(Debug, Error)]
pub enum RestError {
    /// The engine answered with a non-success status.
    #[error("{method} {url} returned status {status}: {body}")]
    Status {
        /// HTTP method.
        method: String,
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// HTTP method.
        method: String,
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body is not the expected JSON shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A resource URI could not be resolved against the base URL.
    #[error("invalid resource URI '{uri}': {source}")]
    InvalidUri {
        /// Offending URI text.
        uri: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The base URL cannot carry path segments.
    #[error("base URL '{0}' cannot carry path segments")]
    InvalidBase(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RestError {
    /// Returns the HTTP status when the engine answered with an error status.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body when the engine answered with an error
    /// status.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns `true` when the engine rejected the session credentials.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

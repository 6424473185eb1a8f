//! Directory service port for resolving users and groups.

use crate::catalog::domain::Participant;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory lookup contract.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Returns participants whose name matches `search`.
    ///
    /// An empty result means nobody matched; it is not an error.
    async fn find_participants(&self, search: &str) -> DirectoryResult<Vec<Participant>>;
}

/// Errors returned by directory adapters.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The directory rejected the session credentials.
    #[error("directory authentication rejected (status {status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The directory rejected the query for another reason.
    #[error("directory query rejected (status {status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// Transport or decoding failure.
    #[error("directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a transport or decoding failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}

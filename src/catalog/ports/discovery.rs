//! Discovery port for the engine's appspace, role and work class listings.

use crate::catalog::domain::{TemplateRef, UserProfile};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// One entry of the appspace listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSpaceListing {
    /// Appspace name.
    pub name: String,
    /// URI of the appspace's role-name listing.
    pub roles_uri: String,
}

/// Read-only discovery contract.
///
/// Each method maps to a single GET against the engine; the tree walk that
/// combines them lives in [`crate::catalog::services::CatalogService`].
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Lists appspaces with the URI of their role listing.
    async fn appspaces(&self) -> DiscoveryResult<Vec<AppSpaceListing>>;

    /// Lists the role names exposed at `roles_uri`.
    async fn role_names(&self, roles_uri: &str) -> DiscoveryResult<Vec<String>>;

    /// Lists launchable work classes.
    async fn work_classes(&self) -> DiscoveryResult<Vec<TemplateRef>>;

    /// Returns the profile of the authenticated user.
    async fn current_user(&self) -> DiscoveryResult<UserProfile>;
}

/// Errors returned by discovery adapters.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// The engine rejected the session credentials.
    #[error("authentication rejected (status {status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The requested listing does not exist.
    #[error("discovery resource not found: {0}")]
    NotFound(String),

    /// The engine rejected the request for another reason.
    #[error("discovery request rejected (status {status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The listing could not be decoded into catalog values.
    #[error("invalid discovery data: {0}")]
    InvalidData(Arc<dyn std::error::Error + Send + Sync>),

    /// Transport-level failure.
    #[error("discovery unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DiscoveryError {
    /// Wraps a decoding or validation failure.
    pub fn invalid_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidData(Arc::new(err))
    }

    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}

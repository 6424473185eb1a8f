//! Service layer for the one-shot discovery walk.

use crate::catalog::{
    domain::{AppSpace, Catalog, CatalogDomainError, QueueName, UserProfile},
    ports::{Discovery, DiscoveryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for discovery.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// Discovered data failed domain validation.
    #[error(transparent)]
    Domain(#[from] CatalogDomainError),
    /// A discovery request failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// Result type for catalog service operations.
pub type CatalogServiceResult<T> = Result<T, CatalogServiceError>;

/// Discovery orchestration service.
#[derive(Clone)]
pub struct CatalogService<D>
where
    D: Discovery,
{
    discovery: Arc<D>,
}

impl<D> CatalogService<D>
where
    D: Discovery,
{
    /// Creates a new catalog service.
    #[must_use]
    pub const fn new(discovery: Arc<D>) -> Self {
        Self { discovery }
    }

    /// Walks appspaces, their roles and the work class listing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError`] when any listing request fails or a
    /// listed name is blank.
    pub async fn discover(&self) -> CatalogServiceResult<Catalog> {
        let listings = self.discovery.appspaces().await?;
        let mut appspaces = Vec::with_capacity(listings.len());
        for listing in listings {
            let roles = self
                .discovery
                .role_names(&listing.roles_uri)
                .await?
                .into_iter()
                .map(QueueName::new)
                .collect::<Result<Vec<_>, _>>()?;
            debug!(appspace = %listing.name, roles = roles.len(), "discovered appspace roles");
            appspaces.push(AppSpace::new(listing.name, roles));
        }

        let templates = self.discovery.work_classes().await?;
        let catalog = Catalog::new(appspaces, templates);
        info!(
            appspaces = catalog.appspaces().len(),
            queues = catalog.queue_names().len(),
            templates = catalog.template_names().len(),
            "engine discovery complete"
        );
        Ok(catalog)
    }

    /// Returns the profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Discovery`] when the request fails.
    pub async fn current_user(&self) -> CatalogServiceResult<UserProfile> {
        Ok(self.discovery.current_user().await?)
    }
}

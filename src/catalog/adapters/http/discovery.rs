//! REST implementation of the discovery port.

use crate::catalog::domain::{TemplateRef, UserProfile};
use crate::catalog::ports::{AppSpaceListing, Discovery, DiscoveryError, DiscoveryResult};
use crate::rest::{RestClient, RestError, RestResponse};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AppSpaceBody {
    #[serde(rename = "rolenames")]
    role_names: String,
}

#[derive(Debug, Deserialize)]
struct WorkClassBody {
    #[serde(rename = "URI")]
    uri: String,
}

/// Discovery adapter reading the engine's name listings.
///
/// Listings are JSON objects keyed by name; the adapter returns them in key
/// order.
#[derive(Debug, Clone)]
pub struct RestDiscovery {
    client: RestClient,
}

impl RestDiscovery {
    /// Creates an adapter over an authenticated client.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn get(&self, url: url::Url) -> DiscoveryResult<RestResponse> {
        debug!(%url, "discovery request");
        self.client.get(url).await.map_err(discovery_error)
    }

    async fn get_endpoint(&self, segment: &str) -> DiscoveryResult<RestResponse> {
        let url = self
            .client
            .endpoint([segment])
            .map_err(DiscoveryError::unavailable)?;
        self.get(url).await
    }
}

fn discovery_error(err: RestError) -> DiscoveryError {
    match err {
        RestError::Status {
            status: 401, body, ..
        } => DiscoveryError::Authentication { status: 401, body },
        RestError::Status {
            status: 404, url, ..
        } => DiscoveryError::NotFound(url),
        RestError::Status { status, body, .. } => DiscoveryError::Rejected { status, body },
        decode @ RestError::Decode { .. } => DiscoveryError::invalid_data(decode),
        other => DiscoveryError::unavailable(other),
    }
}

#[async_trait]
impl Discovery for RestDiscovery {
    async fn appspaces(&self) -> DiscoveryResult<Vec<AppSpaceListing>> {
        let response = self.get_endpoint("appspacenames").await?;
        let listing: Option<BTreeMap<String, AppSpaceBody>> =
            response.json_opt().map_err(discovery_error)?;
        Ok(listing
            .unwrap_or_default()
            .into_iter()
            .map(|(name, body)| AppSpaceListing {
                name,
                roles_uri: body.role_names,
            })
            .collect())
    }

    async fn role_names(&self, roles_uri: &str) -> DiscoveryResult<Vec<String>> {
        let url = self
            .client
            .resolve(roles_uri)
            .map_err(DiscoveryError::invalid_data)?;
        let response = self.get(url).await?;
        let listing: Option<Map<String, Value>> = response.json_opt().map_err(discovery_error)?;
        Ok(listing.unwrap_or_default().into_iter().map(|(name, _)| name).collect())
    }

    async fn work_classes(&self) -> DiscoveryResult<Vec<TemplateRef>> {
        let response = self.get_endpoint("workclasses").await?;
        let listing: Option<BTreeMap<String, WorkClassBody>> =
            response.json_opt().map_err(discovery_error)?;
        listing
            .unwrap_or_default()
            .into_iter()
            .map(|(name, body)| {
                TemplateRef::new(name, body.uri).map_err(DiscoveryError::invalid_data)
            })
            .collect()
    }

    async fn current_user(&self) -> DiscoveryResult<UserProfile> {
        let response = self.get_endpoint("currentuser").await?;
        response.json().map_err(discovery_error)
    }
}

//! REST implementation of the directory port.

use crate::catalog::domain::Participant;
use crate::catalog::ports::{Directory, DirectoryError, DirectoryResult};
use crate::rest::{RestClient, RestError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ParticipantBody {
    #[serde(default)]
    name: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "emailAddress", default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParticipantListing {
    Bare(Vec<ParticipantBody>),
    Wrapped {
        #[serde(default)]
        participants: Vec<ParticipantBody>,
    },
}

impl ParticipantListing {
    fn into_participants(self) -> Vec<Participant> {
        let bodies = match self {
            Self::Bare(bodies) | Self::Wrapped { participants: bodies } => bodies,
        };
        bodies
            .into_iter()
            .filter_map(|body| {
                let participant = Participant::new(body.name).ok()?;
                let named = match body.display_name {
                    Some(display_name) => participant.with_display_name(display_name),
                    None => participant,
                };
                Some(match body.email {
                    Some(email) => named.with_email(email),
                    None => named,
                })
            })
            .collect()
    }
}

/// Directory adapter using the engine's participant search.
#[derive(Debug, Clone)]
pub struct RestDirectory {
    client: RestClient,
    limit: u32,
}

impl RestDirectory {
    /// Creates an adapter returning at most `limit` matches per search.
    #[must_use]
    pub const fn new(client: RestClient, limit: u32) -> Self {
        Self { client, limit }
    }
}

fn directory_error(err: RestError) -> DirectoryError {
    match err {
        RestError::Status {
            status: 401, body, ..
        } => DirectoryError::Authentication { status: 401, body },
        RestError::Status { status, body, .. } => DirectoryError::Rejected { status, body },
        other => DirectoryError::unavailable(other),
    }
}

#[async_trait]
impl Directory for RestDirectory {
    async fn find_participants(&self, search: &str) -> DirectoryResult<Vec<Participant>> {
        let mut url = self
            .client
            .endpoint(["participants"])
            .map_err(DirectoryError::unavailable)?;
        url.query_pairs_mut()
            .append_pair("searchPattern", search.trim())
            .append_pair("limit", &self.limit.to_string());
        debug!(search, "directory search");
        let response = self.client.get(url).await.map_err(directory_error)?;
        let listing: Option<ParticipantListing> =
            response.json_opt().map_err(directory_error)?;
        Ok(listing
            .map(ParticipantListing::into_participants)
            .unwrap_or_default())
    }
}

//! URL construction for engine task resources.

use crate::catalog::domain::{QueueName, TemplateName, TemplateRef};
use crate::rest::{RestClient, RestResult};
use crate::task::domain::{StepActionRequest, StepElementUri, WorkObjectNumber};
use url::Url;

const ACTION_TOKEN_PARAM: &str = "If-Match";
const TEMPLATE_EXPANSION_PARAM: &str = "POE";
const DEFAULT_ROSTER: &str = "DefaultRoster";

/// Turns logical task, queue and template references into engine URLs.
///
/// Step and template URIs reported by the engine are resolved against the
/// REST root; queue and launch URLs are composed from percent-encoded path
/// segments.
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    client: RestClient,
}

impl ResourceLocator {
    /// Creates a locator over the client's REST root.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Returns the current URL of a step resource.
    ///
    /// # Errors
    ///
    /// Returns [`crate::rest::RestError::InvalidUri`] when the URI cannot be
    /// resolved.
    pub fn step(&self, step: &StepElementUri) -> RestResult<Url> {
        self.client.resolve(step.as_str())
    }

    /// Returns the URL that performs `request` on a step.
    ///
    /// The precondition token is mirrored into an `If-Match` query parameter
    /// alongside the header the client sends.
    ///
    /// # Errors
    ///
    /// Returns [`crate::rest::RestError::InvalidUri`] when the URI cannot be
    /// resolved.
    pub fn step_action(
        &self,
        step: &StepElementUri,
        request: &StepActionRequest,
    ) -> RestResult<Url> {
        let mut url = self.step(step)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.action.query_pairs() {
                query.append_pair(key, &value);
            }
            query.append_pair(ACTION_TOKEN_PARAM, request.token.as_str());
        }
        Ok(url)
    }

    /// Returns the workbasket resource of a queue.
    ///
    /// # Errors
    ///
    /// Returns [`crate::rest::RestError::InvalidBase`] when the REST root
    /// cannot carry path segments.
    pub fn queue(&self, queue: &QueueName) -> RestResult<Url> {
        self.client
            .endpoint(["queues", queue.as_str(), "workbaskets", queue.as_str()])
    }

    /// Returns the element listing of a queue.
    ///
    /// # Errors
    ///
    /// See [`Self::queue`].
    pub fn queue_elements(&self, queue: &QueueName) -> RestResult<Url> {
        self.client.endpoint([
            "queues",
            queue.as_str(),
            "workbaskets",
            queue.as_str(),
            "queueelements",
        ])
    }

    /// Returns the element count resource of a queue.
    ///
    /// # Errors
    ///
    /// See [`Self::queue`].
    pub fn queue_count(&self, queue: &QueueName) -> RestResult<Url> {
        self.client.endpoint([
            "queues",
            queue.as_str(),
            "workbaskets",
            queue.as_str(),
            "queueelements",
            "count",
        ])
    }

    /// Returns the column definitions of a queue's workbasket.
    ///
    /// # Errors
    ///
    /// See [`Self::queue`].
    pub fn queue_columns(&self, queue: &QueueName) -> RestResult<Url> {
        self.client.endpoint([
            "queues",
            queue.as_str(),
            "workbaskets",
            queue.as_str(),
            "columns",
        ])
    }

    /// Returns the milestone resource a queue listing linked.
    ///
    /// # Errors
    ///
    /// Returns [`crate::rest::RestError::InvalidUri`] when the URI cannot be
    /// resolved.
    pub fn milestones(&self, uri: &str) -> RestResult<Url> {
        self.client.resolve(uri)
    }

    /// Returns the expanded template resource.
    ///
    /// # Errors
    ///
    /// Returns [`crate::rest::RestError::InvalidUri`] when the template URI
    /// cannot be resolved.
    pub fn template(&self, template: &TemplateRef) -> RestResult<Url> {
        let mut url = self.client.resolve(template.uri())?;
        url.query_pairs_mut()
            .append_pair(TEMPLATE_EXPANSION_PARAM, "1");
        Ok(url)
    }

    /// Returns the URL that launches a workflow from a template.
    ///
    /// # Errors
    ///
    /// See [`Self::queue`].
    pub fn launch(&self, template: &TemplateName, number: &WorkObjectNumber) -> RestResult<Url> {
        let mut url = self.client.endpoint([
            "rosters",
            DEFAULT_ROSTER,
            "wc",
            template.as_str(),
            "wob",
            number.as_str(),
        ])?;
        url.query_pairs_mut()
            .append_pair(TEMPLATE_EXPANSION_PARAM, "1");
        Ok(url)
    }
}

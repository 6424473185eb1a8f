//! REST implementation of the process engine port.

use super::ResourceLocator;
use crate::catalog::domain::{QueueName, TemplateRef};
use crate::rest::{RestClient, RestError};
use crate::task::domain::{
    Queue, QueueElement, Step, StepActionRequest, StepElementUri, VersionToken, VersionedStep,
    WorkObjectNumber, WorkflowTemplate,
};
use crate::task::ports::{EngineError, EngineResult, ProcessEngine};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
enum ResponseShapeError {
    #[error("response from {0} carries no ETag header")]
    MissingEtag(String),
    #[error("template {0} has no pre-allocated work object number")]
    MissingWorkObjectNumber(String),
}

#[derive(Debug, Deserialize)]
struct WorkbasketBody {
    #[serde(rename = "queueElements", default)]
    queue_elements: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CountBody {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct QueueElementPage {
    #[serde(rename = "queueElements", default)]
    queue_elements: Vec<QueueElement>,
}

/// Process engine adapter speaking the BPM REST protocol.
#[derive(Debug, Clone)]
pub struct RestProcessEngine {
    client: RestClient,
    locator: ResourceLocator,
}

impl RestProcessEngine {
    /// Creates an adapter over an authenticated client.
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        let locator = ResourceLocator::new(client.clone());
        Self { client, locator }
    }

    /// Returns the locator used to build resource URLs.
    #[must_use]
    pub const fn locator(&self) -> &ResourceLocator {
        &self.locator
    }
}

/// Classifies a transport error for the engine port.
fn engine_error(err: RestError) -> EngineError {
    match err {
        RestError::Status {
            status: 401, body, ..
        } => EngineError::Authentication { status: 401, body },
        RestError::Status {
            status: 404, url, ..
        } => EngineError::NotFound { resource: url },
        RestError::Status {
            status: 412,
            url,
            body,
            ..
        } => EngineError::PreconditionFailed {
            resource: url,
            body,
        },
        RestError::Status { status, body, .. } => EngineError::Rejected { status, body },
        decode @ RestError::Decode { .. } => EngineError::decode(decode),
        other => EngineError::unavailable(other),
    }
}

fn launched_number(body: &Value) -> Option<WorkObjectNumber> {
    body.pointer("/systemProperties/workObjectNumber")
        .or_else(|| body.get("workObjectNumber"))
        .and_then(Value::as_str)
        .and_then(|number| WorkObjectNumber::new(number).ok())
}

#[async_trait]
impl ProcessEngine for RestProcessEngine {
    async fn fetch_step(&self, step: &StepElementUri) -> EngineResult<VersionedStep> {
        let url = self.locator.step(step).map_err(engine_error)?;
        let response = self.client.get(url).await.map_err(engine_error)?;
        let token = response
            .etag()
            .and_then(|etag| VersionToken::new(etag).ok())
            .ok_or_else(|| {
                EngineError::decode(ResponseShapeError::MissingEtag(response.url().to_owned()))
            })?;
        let body: Step = response.json().map_err(engine_error)?;
        Ok(VersionedStep { step: body, token })
    }

    async fn apply_action(
        &self,
        step: &StepElementUri,
        request: StepActionRequest,
    ) -> EngineResult<Option<VersionToken>> {
        let url = self
            .locator
            .step_action(step, &request)
            .map_err(engine_error)?;
        let body = request
            .body
            .as_ref()
            .filter(|_| request.action.carries_body())
            .map(serde_json::to_value)
            .transpose()
            .map_err(EngineError::decode)?;
        debug!(step = %step, action = request.action.name(), "applying step action");
        let response = self
            .client
            .put(url, Some(request.token.as_str()), body.as_ref())
            .await
            .map_err(engine_error)?;
        Ok(response.etag().and_then(|etag| VersionToken::new(etag).ok()))
    }

    async fn queue(&self, queue: &QueueName) -> EngineResult<Queue> {
        let url = self.locator.queue(queue).map_err(engine_error)?;
        let response = self.client.get(url.clone()).await.map_err(engine_error)?;
        let body: Option<WorkbasketBody> = response.json_opt().map_err(engine_error)?;
        let elements_uri = body
            .and_then(|workbasket| workbasket.queue_elements)
            .and_then(|uri| uri.as_str().map(str::to_owned))
            .map_or_else(
                || self.locator.queue_elements(queue).map(String::from),
                Ok,
            )
            .map_err(engine_error)?;
        Ok(Queue::new(queue.clone(), url).with_elements_uri(elements_uri))
    }

    async fn queue_element_count(&self, queue: &QueueName) -> EngineResult<u64> {
        let url = self.locator.queue_count(queue).map_err(engine_error)?;
        let response = self.client.get(url).await.map_err(engine_error)?;
        let body: Option<CountBody> = response.json_opt().map_err(engine_error)?;
        Ok(body.map_or(0, |count| count.count))
    }

    async fn list_queue_elements(&self, queue: &QueueName) -> EngineResult<Vec<QueueElement>> {
        let url = self.locator.queue_elements(queue).map_err(engine_error)?;
        let response = self.client.get(url).await.map_err(engine_error)?;
        let page: Option<QueueElementPage> = response.json_opt().map_err(engine_error)?;
        Ok(page.unwrap_or_default().queue_elements)
    }

    async fn queue_columns(&self, queue: &QueueName) -> EngineResult<Value> {
        let url = self.locator.queue_columns(queue).map_err(engine_error)?;
        let response = self.client.get(url).await.map_err(engine_error)?;
        let columns: Option<Value> = response.json_opt().map_err(engine_error)?;
        Ok(columns.unwrap_or(Value::Null))
    }

    async fn milestones(&self, uri: &str) -> EngineResult<Value> {
        let url = self.locator.milestones(uri).map_err(engine_error)?;
        let response = self.client.get(url).await.map_err(engine_error)?;
        let milestones: Option<Value> = response.json_opt().map_err(engine_error)?;
        Ok(milestones.unwrap_or(Value::Null))
    }

    async fn fetch_template(&self, template: &TemplateRef) -> EngineResult<WorkflowTemplate> {
        let url = self.locator.template(template).map_err(engine_error)?;
        let response = self.client.get(url).await.map_err(engine_error)?;
        let step: Step = response.json().map_err(engine_error)?;
        Ok(WorkflowTemplate::new(template.clone(), step))
    }

    async fn create_instance(
        &self,
        template: &WorkflowTemplate,
        body: &Step,
    ) -> EngineResult<Option<WorkObjectNumber>> {
        let name = template.reference().name();
        let number = template.work_object_number().ok_or_else(|| {
            EngineError::decode(ResponseShapeError::MissingWorkObjectNumber(
                name.as_str().to_owned(),
            ))
        })?;
        let url = self.locator.launch(name, &number).map_err(engine_error)?;
        let payload = serde_json::to_value(body).map_err(EngineError::decode)?;
        debug!(template = %name, wob = %number, "launching workflow");
        let response = self.client.post(url, &payload).await.map_err(engine_error)?;
        let created: Option<Value> = response.json_opt().map_err(engine_error)?;
        Ok(created.as_ref().and_then(launched_number))
    }
}

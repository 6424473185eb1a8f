//! Process engine port: step resources, queues and workflow templates.

use crate::catalog::domain::{QueueName, TemplateRef};
use crate::task::domain::{
    Queue, QueueElement, Step, StepActionRequest, StepElementUri, VersionToken, VersionedStep,
    WorkObjectNumber, WorkflowTemplate,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for process engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Contract for the remote process engine.
///
/// Every call is one round trip. Implementations make no retry decisions and
/// hold no client-side locks; contention is settled by the engine's version
/// token preconditions.
#[async_trait]
pub trait ProcessEngine: Send + Sync {
    /// Fetches a step body with its current version token.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the step no longer exists.
    async fn fetch_step(&self, step: &StepElementUri) -> EngineResult<VersionedStep>;

    /// Applies an action to a step under the request's precondition token.
    ///
    /// Returns the new version token when the engine reports one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PreconditionFailed`] when the token is stale
    /// and [`EngineError::NotFound`] when the step no longer exists.
    async fn apply_action(
        &self,
        step: &StepElementUri,
        request: StepActionRequest,
    ) -> EngineResult<Option<VersionToken>>;

    /// Fetches a queue resource.
    async fn queue(&self, queue: &QueueName) -> EngineResult<Queue>;

    /// Returns the number of elements waiting in a queue.
    async fn queue_element_count(&self, queue: &QueueName) -> EngineResult<u64>;

    /// Lists the elements of a queue. An empty queue yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the queue does not exist.
    async fn list_queue_elements(&self, queue: &QueueName) -> EngineResult<Vec<QueueElement>>;

    /// Fetches the column definitions of a queue's workbasket. An empty
    /// body yields [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the queue does not exist.
    async fn queue_columns(&self, queue: &QueueName) -> EngineResult<Value>;

    /// Fetches the milestone document a queue listing linked for a work
    /// object. `uri` is the link as listed, relative to the engine root.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the work object is gone.
    async fn milestones(&self, uri: &str) -> EngineResult<Value>;

    /// Fetches a workflow template, pre-allocating a work object number.
    async fn fetch_template(&self, template: &TemplateRef) -> EngineResult<WorkflowTemplate>;

    /// Submits a populated template body, starting a new workflow.
    ///
    /// Returns the new work object number when the engine reports one.
    async fn create_instance(
        &self,
        template: &WorkflowTemplate,
        body: &Step,
    ) -> EngineResult<Option<WorkObjectNumber>>;
}

/// Errors returned by process engine adapters.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine rejected the session credentials.
    #[error("authentication rejected (status {status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The addressed resource does not exist.
    #[error("resource not found: {resource}")]
    NotFound {
        /// Resource URI or name.
        resource: String,
    },

    /// The version token presented was stale.
    #[error("precondition failed for {resource}: {body}")]
    PreconditionFailed {
        /// Resource URI.
        resource: String,
        /// Response body, verbatim.
        body: String,
    },

    /// The engine rejected the request for another reason.
    #[error("engine rejected request (status {status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The engine could not be reached.
    #[error("engine unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// A response could not be decoded.
    #[error("undecodable engine response: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Wraps a decoding failure.
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Returns `true` for a missing resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

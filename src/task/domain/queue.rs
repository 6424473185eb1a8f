//! Queue resources and their listing entries.

use super::{StepElementUri, SystemProperties, Task, TaskDomainError, VersionToken, WorkObjectNumber};
use crate::catalog::domain::QueueName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A workbasket on the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Queue {
    name: QueueName,
    uri: String,
    elements_uri: Option<String>,
    count: Option<u64>,
}

impl Queue {
    /// Creates a queue description.
    #[must_use]
    pub fn new(name: QueueName, uri: impl Into<String>) -> Self {
        Self {
            name,
            uri: uri.into(),
            elements_uri: None,
            count: None,
        }
    }

    /// Sets the element listing URI.
    #[must_use]
    pub fn with_elements_uri(mut self, uri: impl Into<String>) -> Self {
        self.elements_uri = Some(uri.into());
        self
    }

    /// Sets the element count.
    #[must_use]
    pub const fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Returns the queue name.
    #[must_use]
    pub const fn name(&self) -> &QueueName {
        &self.name
    }

    /// Returns the queue resource URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the element listing URI advertised by the engine.
    #[must_use]
    pub fn elements_uri(&self) -> Option<&str> {
        self.elements_uri.as_deref()
    }

    /// Returns the element count, when it was fetched.
    #[must_use]
    pub const fn count(&self) -> Option<u64> {
        self.count
    }
}

/// One entry of a queue element listing, as sent by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueElement {
    /// Stable work object number.
    #[serde(rename = "workObjectNumber", default)]
    pub work_object_number: Option<String>,
    /// Step resource URI.
    #[serde(rename = "stepElement", default)]
    pub step_element: Option<String>,
    /// Version token of the step at listing time.
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Queue the element was listed from.
    #[serde(rename = "queueName", default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    /// Workflow subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Name of the current step.
    #[serde(rename = "stepName", default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    /// Engine-maintained properties, when the listing includes them.
    #[serde(
        rename = "systemProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub system_properties: Option<SystemProperties>,
    /// Milestone listing URI of the work object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<String>,
    /// Members this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueueElement {
    /// Returns `true` when this entry carries the given work object number.
    #[must_use]
    pub fn is_work_object(&self, number: &WorkObjectNumber) -> bool {
        self.work_object_number
            .as_deref()
            .is_some_and(|candidate| candidate.trim() == number.as_str())
    }

    /// Converts the entry into a task handle.
    ///
    /// `listed_in` is used when the entry does not name its own queue.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::IncompleteQueueElement`] when the work
    /// object number or step URI is missing, or a domain error when either is
    /// blank.
    pub fn to_task(&self, listed_in: &QueueName) -> Result<Task, TaskDomainError> {
        let number = self
            .work_object_number
            .as_deref()
            .ok_or(TaskDomainError::IncompleteQueueElement("workObjectNumber"))?;
        let step = self
            .step_element
            .as_deref()
            .ok_or(TaskDomainError::IncompleteQueueElement("stepElement"))?;
        let queue = match self.queue_name.as_deref() {
            Some(name) if !name.trim().is_empty() => QueueName::new(name)?,
            _ => listed_in.clone(),
        };

        let mut task = Task::new(
            WorkObjectNumber::new(number)?,
            StepElementUri::new(step)?,
            queue,
        );
        if let Some(token) = self.etag.as_deref().and_then(|etag| VersionToken::new(etag).ok()) {
            task = task.with_version_token(token);
        }
        if let Some(subject) = &self.subject {
            task = task.with_subject(subject.clone());
        }
        if let Some(properties) = &self.system_properties {
            task = task.with_system_properties(properties.clone());
        }
        if let Some(uri) = self.milestones.as_deref().filter(|uri| !uri.trim().is_empty()) {
            task = task.with_milestones(uri.trim());
        }
        Ok(task)
    }
}

//! Client-side handle to a queue-resident work item.

use super::{StepElementUri, SystemProperties, VersionToken, WorkObjectNumber};
use crate::catalog::domain::QueueName;
use serde::Serialize;

/// A disposable snapshot of where a work item was last seen.
///
/// The engine owns the work item; a `Task` only records the identifiers
/// needed to address it again. The step URI and queue name go stale once the
/// engine moves the item, while the work object number stays fixed for the
/// item's whole life.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    work_object_number: WorkObjectNumber,
    step_element: StepElementUri,
    queue_name: QueueName,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_token: Option<VersionToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_properties: Option<SystemProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    milestones: Option<String>,
}

impl Task {
    /// Creates a handle from its stable identifier, step URI and queue.
    #[must_use]
    pub const fn new(
        work_object_number: WorkObjectNumber,
        step_element: StepElementUri,
        queue_name: QueueName,
    ) -> Self {
        Self {
            work_object_number,
            step_element,
            queue_name,
            version_token: None,
            subject: None,
            system_properties: None,
            milestones: None,
        }
    }

    /// Records the version token seen with this handle.
    #[must_use]
    pub fn with_version_token(mut self, token: VersionToken) -> Self {
        self.version_token = Some(token);
        self
    }

    /// Records the workflow subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Records a system-properties snapshot.
    #[must_use]
    pub fn with_system_properties(mut self, properties: SystemProperties) -> Self {
        self.system_properties = Some(properties);
        self
    }

    /// Records the milestone listing URI.
    #[must_use]
    pub fn with_milestones(mut self, uri: impl Into<String>) -> Self {
        self.milestones = Some(uri.into());
        self
    }

    /// Returns the stable work object number.
    #[must_use]
    pub const fn work_object_number(&self) -> &WorkObjectNumber {
        &self.work_object_number
    }

    /// Returns the step resource URI.
    #[must_use]
    pub const fn step_element(&self) -> &StepElementUri {
        &self.step_element
    }

    /// Returns the queue the task was last seen in.
    #[must_use]
    pub const fn queue_name(&self) -> &QueueName {
        &self.queue_name
    }

    /// Returns the last observed version token.
    #[must_use]
    pub const fn version_token(&self) -> Option<&VersionToken> {
        self.version_token.as_ref()
    }

    /// Returns the workflow subject, when known.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the system-properties snapshot, when one was recorded.
    #[must_use]
    pub const fn system_properties(&self) -> Option<&SystemProperties> {
        self.system_properties.as_ref()
    }

    /// Returns the milestone listing URI, when the listing supplied one.
    #[must_use]
    pub fn milestones(&self) -> Option<&str> {
        self.milestones.as_deref()
    }
}

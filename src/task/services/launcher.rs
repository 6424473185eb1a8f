//! Starting new workflows from templates.

use super::{
    TaskControlError, TaskControlResult,
    mutation::{assign_attachments, assign_fields, assign_groups},
};
use crate::catalog::domain::Catalog;
use crate::task::{
    domain::{TemplateShape, WorkObjectNumber},
    ports::ProcessEngine,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Request to launch, or describe, a workflow template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchRequest {
    template: String,
    fields: BTreeMap<String, Value>,
    groups: BTreeMap<String, String>,
    attachments: BTreeMap<String, String>,
    object_store: Option<String>,
    subject: Option<String>,
}

impl LaunchRequest {
    /// Creates a request naming only the template. Launched as is, it
    /// describes the template instead of starting a workflow.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    /// Supplies a data field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Supplies participants for a workflow group, separated by `", "`.
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>, participants: impl Into<String>) -> Self {
        self.groups.insert(name.into(), participants.into());
        self
    }

    /// Supplies a document identifier for an attachment slot.
    #[must_use]
    pub fn with_attachment(
        mut self,
        slot: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        self.attachments.insert(slot.into(), document_id.into());
        self
    }

    /// Names the object store holding attachment documents.
    #[must_use]
    pub fn with_object_store(mut self, object_store: impl Into<String>) -> Self {
        self.object_store = Some(object_store.into());
        self
    }

    /// Sets the workflow subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Returns the template name.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns `true` when the request names only a template.
    #[must_use]
    pub fn is_describe_only(&self) -> bool {
        self.fields.is_empty()
            && self.groups.is_empty()
            && self.attachments.is_empty()
            && self.object_store.is_none()
            && self.subject.is_none()
    }
}

/// Result of a launch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The template's declared shape; nothing was submitted.
    Described(TemplateShape),
    /// A workflow was started.
    Launched(WorkObjectNumber),
}

/// Instantiates workflows from catalogued templates.
#[derive(Clone)]
pub struct WorkflowLauncher<E>
where
    E: ProcessEngine,
{
    engine: Arc<E>,
    catalog: Arc<Catalog>,
}

impl<E> WorkflowLauncher<E>
where
    E: ProcessEngine,
{
    /// Creates a launcher over a session catalog.
    #[must_use]
    pub const fn new(engine: Arc<E>, catalog: Arc<Catalog>) -> Self {
        Self { engine, catalog }
    }

    /// Describes or launches the requested template.
    ///
    /// A request naming only the template returns its declared shape and
    /// issues no write. Otherwise fields and groups are validated as for a
    /// step update, attachment slots are filled when an object store is
    /// named, and the populated template is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::NotFound`] when the catalog has no such
    /// template and [`TaskControlError::Validation`] before any write when a
    /// value is invalid.
    pub async fn launch(&self, request: &LaunchRequest) -> TaskControlResult<LaunchOutcome> {
        let reference = self.catalog.template(request.template()).ok_or_else(|| {
            TaskControlError::NotFound(format!("workflow template '{}'", request.template()))
        })?;
        let template = self.engine.fetch_template(reference).await?;
        if request.is_describe_only() {
            return Ok(LaunchOutcome::Described(template.shape()));
        }

        let mut body = template.step().clone();
        assign_fields(&mut body, &request.fields)?;
        assign_groups(&mut body, &request.groups);
        if let Some(store) = request.object_store.as_deref().filter(|store| !store.trim().is_empty()) {
            assign_attachments(&mut body, store.trim(), &request.attachments);
        }
        if let Some(subject) = &request.subject {
            body.system_properties_mut().set_subject(subject.clone());
        }

        let reported = self.engine.create_instance(&template, &body).await?;
        let number = reported
            .or_else(|| template.work_object_number())
            .ok_or_else(|| {
                TaskControlError::PreconditionNotMet(format!(
                    "engine reported no work object number for '{}'",
                    request.template()
                ))
            })?;
        info!(template = request.template(), wob = %number, "workflow launched");
        Ok(LaunchOutcome::Launched(number))
    }
}

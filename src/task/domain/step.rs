//! Wire-shaped step bodies.
//!
//! A [`Step`] is the mutable, point-in-time body of a task: system
//! properties, data fields, workflow groups and attachment slots. Members the
//! client does not model are kept in flattened maps so a fetched step can be
//! sent back to the engine without losing data.

use super::{DataField, VersionToken};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator between participant names in a caller-supplied group value.
pub const PARTICIPANT_DELIMITER: &str = ", ";

/// Library type code the engine uses for content-repository documents.
const DOCUMENT_LIBRARY_TYPE: u32 = 3;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Engine-maintained properties of a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemProperties {
    #[serde(
        rename = "workObjectNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    work_object_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(rename = "canReassign", default)]
    can_reassign: bool,
    #[serde(rename = "canReturnToSource", default)]
    can_return_to_source: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    responses: Vec<String>,
    #[serde(
        rename = "selectedResponse",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    selected_response: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl SystemProperties {
    /// Sets the work object number.
    #[must_use]
    pub fn with_work_object_number(mut self, number: impl Into<String>) -> Self {
        self.work_object_number = Some(number.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the reassignment permission flag.
    #[must_use]
    pub const fn with_can_reassign(mut self, allowed: bool) -> Self {
        self.can_reassign = allowed;
        self
    }

    /// Sets the return-to-source permission flag.
    #[must_use]
    pub const fn with_can_return_to_source(mut self, allowed: bool) -> Self {
        self.can_return_to_source = allowed;
        self
    }

    /// Sets the declared responses.
    #[must_use]
    pub fn with_responses(mut self, responses: impl IntoIterator<Item = String>) -> Self {
        self.responses = responses.into_iter().collect();
        self
    }

    /// Returns the work object number, when the engine supplied one.
    #[must_use]
    pub fn work_object_number(&self) -> Option<&str> {
        self.work_object_number.as_deref()
    }

    /// Returns the step comment, treating an empty comment as absent.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|comment| !comment.is_empty())
    }

    /// Returns the workflow subject.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns `true` when the engine allows reassigning this step.
    #[must_use]
    pub const fn can_reassign(&self) -> bool {
        self.can_reassign
    }

    /// Returns `true` when the engine allows returning this step to its
    /// previous workbasket.
    #[must_use]
    pub const fn can_return_to_source(&self) -> bool {
        self.can_return_to_source
    }

    /// Returns the declared responses.
    #[must_use]
    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    /// Returns the selected response, treating a blank selection as absent.
    #[must_use]
    pub fn selected_response(&self) -> Option<&str> {
        self.selected_response
            .as_deref()
            .filter(|response| !response.trim().is_empty())
    }

    /// Returns `true` when the step declares responses and none is selected.
    #[must_use]
    pub fn requires_response(&self) -> bool {
        !self.responses.is_empty() && self.selected_response().is_none()
    }

    pub(crate) fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    pub(crate) fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = Some(subject.into());
    }

    pub(crate) fn set_selected_response(&mut self, response: impl Into<String>) {
        self.selected_response = Some(response.into());
    }

    pub(crate) fn set_work_object_number(&mut self, number: impl Into<String>) {
        self.work_object_number = Some(number.into());
    }
}

/// A participant group declared by the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    value: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl WorkflowGroup {
    /// Creates a group with the given participants.
    #[must_use]
    pub fn new(participants: impl IntoIterator<Item = String>) -> Self {
        Self {
            value: participants.into_iter().collect(),
            extra: Map::new(),
        }
    }

    /// Returns the assigned participants.
    #[must_use]
    pub fn participants(&self) -> &[String] {
        &self.value
    }

    pub(crate) fn assign(&mut self, participants: Vec<String>) {
        self.value = participants;
    }
}

/// Reference to a content-repository document stored in an attachment slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    title: String,
    #[serde(rename = "libraryType")]
    library_type: u32,
    #[serde(rename = "libraryName")]
    library_name: String,
    #[serde(rename = "vsId")]
    vs_id: String,
    version: String,
    #[serde(rename = "type")]
    kind: u32,
    #[serde(default)]
    desc: String,
}

impl AttachmentRef {
    /// Creates a reference to `document_id` in `object_store`.
    ///
    /// The document identifier doubles as version series and version, which
    /// resolves to the current version of the document.
    #[must_use]
    pub fn document(object_store: impl Into<String>, document_id: impl Into<String>) -> Self {
        let id = document_id.into();
        Self {
            title: "Attachment".to_owned(),
            library_type: DOCUMENT_LIBRARY_TYPE,
            library_name: object_store.into(),
            vs_id: id.clone(),
            version: id,
            kind: DOCUMENT_LIBRARY_TYPE,
            desc: String::new(),
        }
    }

    /// Returns the object store name.
    #[must_use]
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Returns the version series identifier.
    #[must_use]
    pub fn version_series_id(&self) -> &str {
        &self.vs_id
    }

    /// Returns the version identifier.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the attachment title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// An attachment slot and whatever the engine stored in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    value: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Attachment {
    /// Creates an empty slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the stored document reference, when the slot holds one.
    #[must_use]
    pub fn reference(&self) -> Option<AttachmentRef> {
        serde_json::from_value(self.value.clone()).ok()
    }

    /// Returns slot metadata other than the stored value.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub(crate) fn assign(&mut self, reference: &AttachmentRef) {
        self.value = serde_json::to_value(reference).unwrap_or(Value::Null);
    }
}

/// The mutable body of a task at its current point in the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "systemProperties", default)]
    system_properties: SystemProperties,
    #[serde(rename = "dataFields", default, deserialize_with = "null_as_default")]
    data_fields: BTreeMap<String, DataField>,
    #[serde(
        rename = "workflowGroups",
        default,
        deserialize_with = "null_as_default"
    )]
    workflow_groups: BTreeMap<String, WorkflowGroup>,
    #[serde(default, deserialize_with = "null_as_default")]
    attachments: BTreeMap<String, Attachment>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Step {
    /// Creates an empty step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the system properties.
    #[must_use]
    pub fn with_system_properties(mut self, properties: SystemProperties) -> Self {
        self.system_properties = properties;
        self
    }

    /// Declares a data field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field: DataField) -> Self {
        self.data_fields.insert(name.into(), field);
        self
    }

    /// Declares a workflow group.
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>, group: WorkflowGroup) -> Self {
        self.workflow_groups.insert(name.into(), group);
        self
    }

    /// Declares an attachment slot.
    #[must_use]
    pub fn with_attachment(mut self, name: impl Into<String>, attachment: Attachment) -> Self {
        self.attachments.insert(name.into(), attachment);
        self
    }

    /// Returns the system properties.
    #[must_use]
    pub const fn system_properties(&self) -> &SystemProperties {
        &self.system_properties
    }

    /// Returns the declared data fields by name.
    #[must_use]
    pub const fn data_fields(&self) -> &BTreeMap<String, DataField> {
        &self.data_fields
    }

    /// Returns a data field by name.
    #[must_use]
    pub fn data_field(&self, name: &str) -> Option<&DataField> {
        self.data_fields.get(name)
    }

    /// Returns the declared workflow groups by name.
    #[must_use]
    pub const fn workflow_groups(&self) -> &BTreeMap<String, WorkflowGroup> {
        &self.workflow_groups
    }

    /// Returns the attachment slots by name.
    #[must_use]
    pub const fn attachments(&self) -> &BTreeMap<String, Attachment> {
        &self.attachments
    }

    pub(crate) const fn system_properties_mut(&mut self) -> &mut SystemProperties {
        &mut self.system_properties
    }

    pub(crate) fn data_field_mut(&mut self, name: &str) -> Option<&mut DataField> {
        self.data_fields.get_mut(name)
    }

    pub(crate) fn workflow_group_mut(&mut self, name: &str) -> Option<&mut WorkflowGroup> {
        self.workflow_groups.get_mut(name)
    }

    pub(crate) fn attachment_mut(&mut self, name: &str) -> Option<&mut Attachment> {
        self.attachments.get_mut(name)
    }
}

/// A step together with the version token it was read under.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedStep {
    /// Step body.
    pub step: Step,
    /// Token to present on the next state-changing request.
    pub token: VersionToken,
}

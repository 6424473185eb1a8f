//! Merging caller-supplied values into a fetched step.

use crate::task::domain::{
    AttachmentRef, FieldValue, Step, ValidationError, PARTICIPANT_DELIMITER,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field, group, response and comment changes for one step update.
///
/// Values are loosely typed on input and checked against the step's declared
/// shape by [`MutationBuilder::apply`]. Names the step does not declare are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationRequest {
    fields: BTreeMap<String, Value>,
    groups: BTreeMap<String, String>,
    response: Option<String>,
    comment: Option<String>,
}

impl MutationRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies a value for a data field.
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

    /// Selects a response.
    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Sets the step comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the supplied field values.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the supplied group values.
    #[must_use]
    pub const fn groups(&self) -> &BTreeMap<String, String> {
        &self.groups
    }

    /// Returns the selected response.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// Returns the comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Pure merge of a [`MutationRequest`] into a step.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationBuilder;

impl MutationBuilder {
    /// Returns a copy of `step` with the request's changes applied.
    ///
    /// Writable fields receive coerced values. Read-only fields, undeclared
    /// names and `null` values are skipped. Group values are split into
    /// participant names without a directory check.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a value does not match its field's
    /// declared type or the response is not declared. `step` is unchanged.
    pub fn apply(step: &Step, request: &MutationRequest) -> Result<Step, ValidationError> {
        let mut updated = step.clone();
        assign_fields(&mut updated, &request.fields)?;
        assign_groups(&mut updated, &request.groups);
        if let Some(response) = &request.response {
            select_response(&mut updated, response)?;
        }
        if let Some(comment) = &request.comment {
            updated.system_properties_mut().set_comment(comment.clone());
        }
        Ok(updated)
    }
}

pub(crate) fn assign_fields(
    step: &mut Step,
    supplied: &BTreeMap<String, Value>,
) -> Result<(), ValidationError> {
    for (name, input) in supplied {
        if input.is_null() {
            continue;
        }
        let Some(field) = step.data_field_mut(name) else {
            continue;
        };
        if !field.mode().is_writable() {
            continue;
        }
        let value = FieldValue::coerce(name, field.field_type(), input)?;
        field.assign(&value);
    }
    Ok(())
}

pub(crate) fn assign_groups(step: &mut Step, supplied: &BTreeMap<String, String>) {
    for (name, raw) in supplied {
        let participants = split_participants(raw);
        if participants.is_empty() {
            continue;
        }
        if let Some(group) = step.workflow_group_mut(name) {
            group.assign(participants);
        }
    }
}

pub(crate) fn assign_attachments(
    step: &mut Step,
    object_store: &str,
    documents: &BTreeMap<String, String>,
) {
    for (slot, document_id) in documents {
        let id = document_id.trim();
        if id.is_empty() {
            continue;
        }
        if let Some(attachment) = step.attachment_mut(slot) {
            attachment.assign(&AttachmentRef::document(object_store, id));
        }
    }
}

fn select_response(step: &mut Step, response: &str) -> Result<(), ValidationError> {
    let properties = step.system_properties_mut();
    if !properties.responses().iter().any(|declared| declared == response) {
        return Err(ValidationError::UnknownResponse {
            response: response.to_owned(),
            available: properties.responses().to_vec(),
        });
    }
    properties.set_selected_response(response);
    Ok(())
}

fn split_participants(raw: &str) -> Vec<String> {
    raw.split(PARTICIPANT_DELIMITER)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

//! Workflow templates fetched for launch.

use super::{FieldMode, FieldType, Step, WorkObjectNumber};
use crate::catalog::domain::TemplateRef;
use serde::Serialize;
use std::collections::BTreeMap;

/// A template body fetched from the engine, immutable once read.
///
/// The engine pre-allocates a work object number for every template fetch;
/// it addresses the launch request.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    reference: TemplateRef,
    step: Step,
}

impl WorkflowTemplate {
    /// Pairs a template reference with its fetched body.
    #[must_use]
    pub const fn new(reference: TemplateRef, step: Step) -> Self {
        Self { reference, step }
    }

    /// Returns the template reference.
    #[must_use]
    pub const fn reference(&self) -> &TemplateRef {
        &self.reference
    }

    /// Returns the template body.
    #[must_use]
    pub const fn step(&self) -> &Step {
        &self.step
    }

    /// Returns the pre-allocated work object number, when present.
    #[must_use]
    pub fn work_object_number(&self) -> Option<WorkObjectNumber> {
        self.step
            .system_properties()
            .work_object_number()
            .and_then(|number| WorkObjectNumber::new(number).ok())
    }

    /// Summarises the declared fields, groups and attachment slots.
    #[must_use]
    pub fn shape(&self) -> TemplateShape {
        TemplateShape {
            fields: self
                .step
                .data_fields()
                .iter()
                .map(|(name, field)| {
                    (
                        name.clone(),
                        FieldShape {
                            field_type: field.field_type(),
                            mode: field.mode(),
                        },
                    )
                })
                .collect(),
            groups: self.step.workflow_groups().keys().cloned().collect(),
            attachments: self.step.attachments().keys().cloned().collect(),
        }
    }
}

/// Declared type and mode of one template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldShape {
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Access mode.
    pub mode: FieldMode,
}

/// What a template accepts at launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateShape {
    /// Declared data fields by name.
    pub fields: BTreeMap<String, FieldShape>,
    /// Declared workflow group names.
    pub groups: Vec<String>,
    /// Declared attachment slot names.
    pub attachments: Vec<String>,
}

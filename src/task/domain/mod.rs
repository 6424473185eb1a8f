//! Domain model for task lifecycle control.
//!
//! Wire-shaped step bodies are decoded into typed fields, groups and
//! attachments while unknown members are carried through untouched, so a
//! fetched step can be mutated and sent back without losing engine data.

mod action;
mod error;
mod field;
mod ids;
mod queue;
mod step;
mod task;
mod template;
mod tree;

pub use action::{CommitAction, StepAction, StepActionRequest};
pub use error::{TaskDomainError, ValidationError};
pub use field::{DataField, FieldMode, FieldType, FieldValue};
pub use ids::{StepElementUri, VersionToken, WorkObjectNumber};
pub use queue::{Queue, QueueElement};
pub use step::{
    Attachment, AttachmentRef, Step, SystemProperties, VersionedStep, WorkflowGroup,
    PARTICIPANT_DELIMITER,
};
pub use task::Task;
pub use template::{FieldShape, TemplateShape, WorkflowTemplate};
pub use tree::{PropertyNode, PropertyTree};

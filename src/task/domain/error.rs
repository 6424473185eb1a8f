//! Error types for task domain construction and payload validation.

use super::FieldType;
use thiserror::Error;

/// Errors returned while constructing task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A work object number is empty after trimming.
    #[error("work object number must not be empty")]
    EmptyWorkObjectNumber,

    /// A step element URI is empty after trimming.
    #[error("step element URI must not be empty")]
    EmptyStepElementUri,

    /// A version token is empty.
    #[error("version token must not be empty")]
    EmptyVersionToken,

    /// A queue listing entry lacks a field required to address the task.
    #[error("queue element is missing '{0}'")]
    IncompleteQueueElement(&'static str),

    /// A queue or template name failed validation.
    #[error(transparent)]
    Catalog(#[from] crate::catalog::domain::CatalogDomainError),
}

/// Errors raised while validating caller-supplied values against a step's
/// declared shape. Validation runs locally; nothing is sent to the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A value does not match the declared type of its field.
    #[error("field '{field}' expects a {expected} value")]
    FieldType {
        /// Field name.
        field: String,
        /// Declared field type.
        expected: FieldType,
    },

    /// The field's declared type cannot be written by this client.
    #[error("field '{field}' has unsupported type code {code}")]
    UnsupportedFieldType {
        /// Field name.
        field: String,
        /// Wire type code.
        code: u32,
    },

    /// The selected response is not among the step's declared responses.
    #[error("response '{response}' is not available; expected one of {available:?}")]
    UnknownResponse {
        /// Requested response.
        response: String,
        /// Declared responses.
        available: Vec<String>,
    },
}

impl ValidationError {
    /// Returns the name of the field the error refers to, if any.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::FieldType { field, .. } | Self::UnsupportedFieldType { field, .. } => {
                Some(field)
            }
            Self::UnknownResponse { .. } => None,
        }
    }
}

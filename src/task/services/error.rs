//! Error taxonomy for task lifecycle control.

use crate::catalog::ports::DirectoryError;
use crate::task::domain::{TaskDomainError, ValidationError};
use crate::task::ports::EngineError;
use thiserror::Error;

/// Result type for task control operations.
pub type TaskControlResult<T> = Result<T, TaskControlError>;

/// Errors surfaced by the task controller.
///
/// Port failures are classified here: a stale version token becomes
/// [`Self::ConcurrencyConflict`], a missing resource [`Self::NotFound`], and
/// any other engine rejection keeps its status and body inside
/// [`Self::Engine`].
#[derive(Debug, Error)]
pub enum TaskControlError {
    /// The engine or directory rejected the session credentials.
    #[error("authentication rejected (status {status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// A task, queue, template or participant does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The version token presented was stale.
    #[error("concurrent modification of {resource}: {body}")]
    ConcurrencyConflict {
        /// Resource URI.
        resource: String,
        /// Response body, verbatim.
        body: String,
    },

    /// A caller-supplied value failed validation. Nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The engine declared the action not permitted for this step.
    #[error("{action} is not permitted for work object {work_object_number}")]
    PermissionDenied {
        /// Wire action name.
        action: &'static str,
        /// Work object the action addressed.
        work_object_number: String,
    },

    /// The step is not in a state that allows the action.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(String),

    /// Engine data could not be turned into domain values.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Any other engine failure.
    #[error(transparent)]
    Engine(EngineError),

    /// Any other directory failure.
    #[error(transparent)]
    Directory(DirectoryError),

    /// A commit failed and the compensating abort failed too. The step may
    /// still be locked.
    #[error("{operation}; compensating abort also failed: {discard}")]
    CompensationFailed {
        /// The failure that triggered compensation.
        operation: Box<TaskControlError>,
        /// The failure of the compensating abort.
        discard: Box<TaskControlError>,
    },
}

impl TaskControlError {
    /// Returns `true` when a failure after a successful lock leaves the
    /// step held and must be compensated by an abort.
    ///
    /// Missing resources and rejected credentials are excluded: there is
    /// nothing left to abort, or the abort would be rejected the same way.
    #[must_use]
    pub const fn requires_compensation(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyConflict { .. } | Self::PreconditionNotMet(_) | Self::Engine(_)
        )
    }
}

impl From<EngineError> for TaskControlError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Authentication { status, body } => Self::Authentication { status, body },
            EngineError::NotFound { resource } => Self::NotFound(resource),
            EngineError::PreconditionFailed { resource, body } => {
                Self::ConcurrencyConflict { resource, body }
            }
            other => Self::Engine(other),
        }
    }
}

impl From<DirectoryError> for TaskControlError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Authentication { status, body } => {
                Self::Authentication { status, body }
            }
            other => Self::Directory(other),
        }
    }
}

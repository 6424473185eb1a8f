//! State-changing actions accepted by a step resource.

use super::{Step, VersionToken};

/// An action sent as `PUT {step}?action={name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Take an exclusive hold on the step.
    Lock,
    /// Persist the body and release the hold.
    SaveAndUnlock,
    /// Persist the body and advance the process.
    Dispatch,
    /// Discard staged changes and release the hold.
    Abort,
    /// Transfer the step to another participant.
    Reassign {
        /// Login name of the new holder.
        participant: String,
    },
    /// Send the step back to the workbasket it came from.
    ReturnToSource,
}

impl StepAction {
    /// Returns the wire action name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::SaveAndUnlock => "saveAndUnlock",
            Self::Dispatch => "dispatch",
            Self::Abort => "abort",
            Self::Reassign { .. } => "reassign",
            Self::ReturnToSource => "returnToSource",
        }
    }

    /// Returns `true` when the action sends the step body.
    #[must_use]
    pub const fn carries_body(&self) -> bool {
        matches!(self, Self::SaveAndUnlock | Self::Dispatch)
    }

    /// Returns the query parameters identifying this action.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("action", self.name().to_owned())];
        if let Self::Reassign { participant } = self {
            pairs.push(("participant", participant.clone()));
        }
        pairs
    }
}

/// Actions that release a lock while keeping the staged body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    /// Save and release without advancing.
    SaveAndUnlock,
    /// Save and advance the process.
    Dispatch,
}

impl From<CommitAction> for StepAction {
    fn from(action: CommitAction) -> Self {
        match action {
            CommitAction::SaveAndUnlock => Self::SaveAndUnlock,
            CommitAction::Dispatch => Self::Dispatch,
        }
    }
}

/// An action request presented to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct StepActionRequest {
    /// Action to perform.
    pub action: StepAction,
    /// Precondition token.
    pub token: VersionToken,
    /// Body to persist, for actions that carry one.
    pub body: Option<Step>,
}

impl StepActionRequest {
    /// Creates a request without a body.
    #[must_use]
    pub const fn new(action: StepAction, token: VersionToken) -> Self {
        Self {
            action,
            token,
            body: None,
        }
    }

    /// Attaches the body to persist.
    #[must_use]
    pub fn with_body(mut self, body: Step) -> Self {
        self.body = Some(body);
        self
    }
}

//! Update and terminal actions on a task.

use super::{
    ConcurrencyTokenManager, MutationBuilder, MutationRequest, TaskControlError,
    TaskControlResult,
};
use crate::catalog::{domain::Participant, ports::Directory};
use crate::task::{
    domain::{CommitAction, StepAction, StepActionRequest, Task, VersionToken, VersionedStep},
    ports::ProcessEngine,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Request to hand a task to another participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignRequest {
    participant: String,
    comment: Option<String>,
}

impl ReassignRequest {
    /// Creates a request naming the destination participant.
    #[must_use]
    pub fn new(participant: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            comment: None,
        }
    }

    /// Saves `comment` on the step before reassigning it.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the destination participant.
    #[must_use]
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// Returns the comment to save first.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Drives update, dispatch, abort, reassign and return-to-source.
///
/// Every action uses a version token fetched immediately before it, and all
/// caller input is validated before the first state-changing request.
#[derive(Clone)]
pub struct TransitionEngine<E, D>
where
    E: ProcessEngine,
    D: Directory,
{
    engine: Arc<E>,
    directory: Arc<D>,
    tokens: ConcurrencyTokenManager<E>,
}

impl<E, D> TransitionEngine<E, D>
where
    E: ProcessEngine,
    D: Directory,
{
    /// Creates a transition engine.
    #[must_use]
    pub fn new(engine: Arc<E>, directory: Arc<D>) -> Self {
        let tokens = ConcurrencyTokenManager::new(Arc::clone(&engine));
        Self {
            engine,
            directory,
            tokens,
        }
    }

    /// Returns the token manager used for lock and commit.
    #[must_use]
    pub const fn tokens(&self) -> &ConcurrencyTokenManager<E> {
        &self.tokens
    }

    /// Applies `mutation` and saves it, releasing the lock.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::Validation`] before any lock when a value
    /// is invalid, [`TaskControlError::ConcurrencyConflict`] when the step
    /// changed since it was read, or the commit failure after a
    /// compensating abort.
    pub async fn update(
        &self,
        task: &Task,
        mutation: &MutationRequest,
    ) -> TaskControlResult<Option<VersionToken>> {
        let snapshot = self.tokens.snapshot(task).await?;
        let updated = MutationBuilder::apply(&snapshot.step, mutation)?;
        let locked = self
            .tokens
            .lock(
                task,
                VersionedStep {
                    step: updated,
                    token: snapshot.token,
                },
            )
            .await?;
        let token = self
            .tokens
            .commit_or_discard(locked, CommitAction::SaveAndUnlock)
            .await?;
        info!(wob = %task.work_object_number(), "task updated");
        Ok(token)
    }

    /// Saves a comment on the step.
    ///
    /// # Errors
    ///
    /// See [`Self::update`].
    pub async fn save_comment(
        &self,
        task: &Task,
        comment: &str,
    ) -> TaskControlResult<Option<VersionToken>> {
        self.update(task, &MutationRequest::new().with_comment(comment))
            .await
    }

    /// Completes the step and advances the process.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::PreconditionNotMet`] before any lock when
    /// the step declares responses and none is selected, plus the failures
    /// of [`Self::update`].
    pub async fn dispatch(
        &self,
        task: &Task,
        mutation: Option<&MutationRequest>,
    ) -> TaskControlResult<()> {
        let snapshot = self.tokens.snapshot(task).await?;
        let updated = match mutation {
            Some(request) => MutationBuilder::apply(&snapshot.step, request)?,
            None => snapshot.step,
        };
        if updated.system_properties().requires_response() {
            return Err(TaskControlError::PreconditionNotMet(
                "task requires updateTask/selectedResponse before dispatch".to_owned(),
            ));
        }
        let locked = self
            .tokens
            .lock(
                task,
                VersionedStep {
                    step: updated,
                    token: snapshot.token,
                },
            )
            .await?;
        self.tokens
            .commit_or_discard(locked, CommitAction::Dispatch)
            .await?;
        info!(wob = %task.work_object_number(), "task dispatched");
        Ok(())
    }

    /// Aborts the step with a fresh token, releasing any lock and dropping
    /// staged changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::NotFound`] when the step is gone.
    pub async fn abort(&self, task: &Task) -> TaskControlResult<()> {
        let snapshot = self.tokens.snapshot(task).await?;
        self.tokens
            .abort_with(task.step_element(), snapshot.token)
            .await?;
        debug!(wob = %task.work_object_number(), "task aborted");
        Ok(())
    }

    /// Transfers the task to another participant.
    ///
    /// The destination is checked against the directory first, then the
    /// optional comment is saved, then the step is re-read so the
    /// `canReassign` flag and token are current.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::NotFound`] when the directory does not
    /// know the participant and [`TaskControlError::PermissionDenied`] when
    /// the engine does not allow reassigning the step.
    pub async fn reassign(&self, task: &Task, request: &ReassignRequest) -> TaskControlResult<()> {
        let participant = self.resolve_participant(request.participant()).await?;
        if let Some(comment) = request.comment() {
            self.save_comment(task, comment).await?;
        }
        let fresh = self.tokens.snapshot(task).await?;
        if !fresh.step.system_properties().can_reassign() {
            return Err(permission_denied("reassign", task));
        }
        let action = StepAction::Reassign {
            participant: participant.name().to_owned(),
        };
        self.engine
            .apply_action(task.step_element(), StepActionRequest::new(action, fresh.token))
            .await?;
        info!(wob = %task.work_object_number(), to = participant.name(), "task reassigned");
        Ok(())
    }

    /// Sends the task back to the workbasket it came from.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::PermissionDenied`] when the engine does
    /// not allow returning the step.
    pub async fn return_to_source(
        &self,
        task: &Task,
        comment: Option<&str>,
    ) -> TaskControlResult<()> {
        if let Some(text) = comment {
            self.save_comment(task, text).await?;
        }
        let fresh = self.tokens.snapshot(task).await?;
        if !fresh.step.system_properties().can_return_to_source() {
            return Err(permission_denied("returnToSource", task));
        }
        self.engine
            .apply_action(
                task.step_element(),
                StepActionRequest::new(StepAction::ReturnToSource, fresh.token),
            )
            .await?;
        info!(wob = %task.work_object_number(), "task returned to source");
        Ok(())
    }

    async fn resolve_participant(&self, name: &str) -> TaskControlResult<Participant> {
        self.directory
            .find_participants(name)
            .await?
            .into_iter()
            .find(|candidate| candidate.matches(name))
            .ok_or_else(|| {
                TaskControlError::NotFound(format!(
                    "user '{}' not known to directory service",
                    name.trim()
                ))
            })
    }
}

fn permission_denied(action: &'static str, task: &Task) -> TaskControlError {
    TaskControlError::PermissionDenied {
        action,
        work_object_number: task.work_object_number().to_string(),
    }
}

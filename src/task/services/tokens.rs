//! Lock and unlock protocol over the engine's version tokens.

use super::{TaskControlError, TaskControlResult};
use crate::task::{
    domain::{
        CommitAction, Step, StepAction, StepActionRequest, StepElementUri, Task, VersionToken,
        VersionedStep,
    },
    ports::ProcessEngine,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// A step held under an exclusive engine lock.
///
/// Must be consumed by exactly one of
/// [`ConcurrencyTokenManager::commit`] or [`ConcurrencyTokenManager::discard`].
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a locked step must be committed or discarded"]
pub struct LockedStep {
    step_element: StepElementUri,
    step: Step,
    token: VersionToken,
}

impl LockedStep {
    /// Returns the locked step's URI.
    #[must_use]
    pub const fn step_element(&self) -> &StepElementUri {
        &self.step_element
    }

    /// Returns the staged body.
    #[must_use]
    pub const fn step(&self) -> &Step {
        &self.step
    }

    /// Returns the token obtained by the lock.
    #[must_use]
    pub const fn token(&self) -> &VersionToken {
        &self.token
    }

    /// Replaces the staged body.
    pub fn with_step(self, step: Step) -> Self {
        Self { step, ..self }
    }
}

/// Issues lock, commit and abort actions with the correct tokens.
///
/// The manager never retries: a stale token surfaces as
/// [`TaskControlError::ConcurrencyConflict`] and the caller decides.
#[derive(Clone)]
pub struct ConcurrencyTokenManager<E>
where
    E: ProcessEngine,
{
    engine: Arc<E>,
}

impl<E> ConcurrencyTokenManager<E>
where
    E: ProcessEngine,
{
    /// Creates a token manager over an engine port.
    #[must_use]
    pub const fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// Fetches the task's step and current token.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::NotFound`] when the step no longer exists.
    pub async fn snapshot(&self, task: &Task) -> TaskControlResult<VersionedStep> {
        Ok(self.engine.fetch_step(task.step_element()).await?)
    }

    /// Locks a step using the token of `snapshot`, staging its body.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError::ConcurrencyConflict`] when the token is
    /// stale and [`TaskControlError::NotFound`] when the step is gone.
    pub async fn lock(&self, task: &Task, snapshot: VersionedStep) -> TaskControlResult<LockedStep> {
        let step_element = task.step_element().clone();
        let request = StepActionRequest::new(StepAction::Lock, snapshot.token);
        let reported = self.engine.apply_action(&step_element, request).await?;
        let token = match reported {
            Some(token) => token,
            None => self.engine.fetch_step(&step_element).await?.token,
        };
        debug!(wob = %task.work_object_number(), "step locked");
        Ok(LockedStep {
            step_element,
            step: snapshot.step,
            token,
        })
    }

    /// Snapshots and locks a task.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`] and [`Self::lock`].
    pub async fn acquire(&self, task: &Task) -> TaskControlResult<LockedStep> {
        let snapshot = self.snapshot(task).await?;
        self.lock(task, snapshot).await
    }

    /// Persists the staged body and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError`] when the engine rejects the commit. The
    /// lock is left in place; see [`Self::commit_or_discard`].
    pub async fn commit(
        &self,
        locked: LockedStep,
        action: CommitAction,
    ) -> TaskControlResult<Option<VersionToken>> {
        let request =
            StepActionRequest::new(StepAction::from(action), locked.token).with_body(locked.step);
        Ok(self
            .engine
            .apply_action(&locked.step_element, request)
            .await?)
    }

    /// Discards the staged body and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns [`TaskControlError`] when the engine rejects the abort.
    pub async fn discard(&self, locked: LockedStep) -> TaskControlResult<()> {
        self.abort_with(&locked.step_element, locked.token).await
    }

    /// Commits, compensating a failed commit with exactly one abort.
    ///
    /// Only failures that leave the step held trigger the abort; see
    /// [`TaskControlError::requires_compensation`].
    ///
    /// # Errors
    ///
    /// Returns the commit failure, or
    /// [`TaskControlError::CompensationFailed`] carrying both failures when
    /// the abort fails as well.
    pub async fn commit_or_discard(
        &self,
        locked: LockedStep,
        action: CommitAction,
    ) -> TaskControlResult<Option<VersionToken>> {
        let step_element = locked.step_element.clone();
        let token = locked.token.clone();
        match self.commit(locked, action).await {
            Ok(new_token) => Ok(new_token),
            Err(failure) if failure.requires_compensation() => {
                warn!(step = %step_element, error = %failure, "commit failed, aborting");
                match self.abort_with(&step_element, token).await {
                    Ok(()) => Err(failure),
                    Err(discard) => {
                        warn!(step = %step_element, error = %discard, "compensating abort failed");
                        Err(TaskControlError::CompensationFailed {
                            operation: Box::new(failure),
                            discard: Box::new(discard),
                        })
                    }
                }
            }
            Err(failure) => Err(failure),
        }
    }

    pub(crate) async fn abort_with(
        &self,
        step_element: &StepElementUri,
        token: VersionToken,
    ) -> TaskControlResult<()> {
        let request = StepActionRequest::new(StepAction::Abort, token);
        self.engine.apply_action(step_element, request).await?;
        Ok(())
    }
}

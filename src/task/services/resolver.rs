//! Re-locating a task after the engine may have moved it.

use super::{MutationRequest, TaskControlResult, TransitionEngine};
use crate::catalog::{domain::QueueName, ports::Directory};
use crate::task::{
    domain::{Task, WorkObjectNumber},
    ports::ProcessEngine,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a task was found, if anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "task", rename_all = "snake_case")]
pub enum Relocation {
    /// The work object is waiting in one of the tracked queues.
    Located(Task),
    /// No tracked queue holds the work object; it moved out of scope or its
    /// process ended.
    NotLocated,
}

impl Relocation {
    /// Returns the located task, if any.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        match self {
            Self::Located(task) => Some(task),
            Self::NotLocated => None,
        }
    }
}

/// Outcome of one relocation sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelocationReport {
    /// Where the task was found.
    pub relocation: Relocation,
    /// Tracked queues the engine no longer knows.
    pub missing_queues: Vec<QueueName>,
    /// When the sweep started.
    pub checked_at: DateTime<Utc>,
}

/// Sweeps tracked queues for a work object by its stable number.
#[derive(Clone)]
pub struct ConsistencyResolver<E, C>
where
    E: ProcessEngine,
    C: Clock + Send + Sync,
{
    engine: Arc<E>,
    clock: Arc<C>,
}

impl<E, C> ConsistencyResolver<E, C>
where
    E: ProcessEngine,
    C: Clock + Send + Sync,
{
    /// Creates a resolver.
    #[must_use]
    pub const fn new(engine: Arc<E>, clock: Arc<C>) -> Self {
        Self { engine, clock }
    }

    /// Looks for `task`'s work object in `tracked`, in caller order.
    ///
    /// A queue the engine reports as missing is skipped. Not finding the task
    /// is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError`] when a listing fails for any
    /// reason other than the queue being gone.
    pub async fn relocate(
        &self,
        task: &Task,
        tracked: &[QueueName],
    ) -> TaskControlResult<RelocationReport> {
        self.locate(task.work_object_number(), tracked).await
    }

    /// Looks for a work object by number in `tracked`, in caller order.
    ///
    /// # Errors
    ///
    /// See [`Self::relocate`].
    pub async fn locate(
        &self,
        number: &WorkObjectNumber,
        tracked: &[QueueName],
    ) -> TaskControlResult<RelocationReport> {
        let checked_at = self.clock.utc();
        let mut missing_queues = Vec::new();
        for queue in tracked {
            let elements = match self.engine.list_queue_elements(queue).await {
                Ok(elements) => elements,
                Err(err) if err.is_not_found() => {
                    warn!(%queue, "tracked queue no longer exists");
                    missing_queues.push(queue.clone());
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let found = elements
                .iter()
                .filter(|element| element.is_work_object(number))
                .find_map(|element| match element.to_task(queue) {
                    Ok(task) => Some(task),
                    Err(err) => {
                        warn!(
                            %queue,
                            wob = %number,
                            error = %err,
                            "skipping incomplete queue element"
                        );
                        None
                    }
                });
            if let Some(located) = found {
                debug!(wob = %number, %queue, "task located");
                return Ok(RelocationReport {
                    relocation: Relocation::Located(located),
                    missing_queues,
                    checked_at,
                });
            }
        }
        debug!(wob = %number, "task not located in tracked queues");
        Ok(RelocationReport {
            relocation: Relocation::NotLocated,
            missing_queues,
            checked_at,
        })
    }

    /// Dispatches `task`, then looks for where the engine filed it.
    ///
    /// # Errors
    ///
    /// Returns the dispatch failure or a relocation failure.
    pub async fn dispatch_and_relocate<D>(
        &self,
        transitions: &TransitionEngine<E, D>,
        task: &Task,
        mutation: Option<&MutationRequest>,
        tracked: &[QueueName],
    ) -> TaskControlResult<RelocationReport>
    where
        D: Directory,
    {
        transitions.dispatch(task, mutation).await?;
        self.relocate(task, tracked).await
    }
}

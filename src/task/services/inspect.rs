//! Read-only views of queues and steps.

use super::TaskControlResult;
use crate::catalog::domain::QueueName;
use crate::task::{
    domain::{AttachmentRef, PropertyTree, Queue, Task},
    ports::{EngineError, ProcessEngine},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

fn tree_of(document: &Value) -> PropertyTree {
    if document.is_null() {
        PropertyTree::default()
    } else {
        PropertyTree::from_json(document)
    }
}

/// An attachment slot and the document it references, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSlot {
    /// Slot name.
    pub name: String,
    /// Stored document reference.
    pub reference: Option<AttachmentRef>,
}

/// Reads queue contents and step details without changing anything.
#[derive(Clone)]
pub struct TaskInspector<E>
where
    E: ProcessEngine,
{
    engine: Arc<E>,
}

impl<E> TaskInspector<E>
where
    E: ProcessEngine,
{
    /// Creates an inspector.
    #[must_use]
    pub const fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// Returns the queue resource with its element count.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the queue does not
    /// exist.
    pub async fn queue(&self, queue: &QueueName) -> TaskControlResult<Queue> {
        let resource = self.engine.queue(queue).await?;
        let count = self.engine.queue_element_count(queue).await?;
        Ok(resource.with_count(count))
    }

    /// Returns the number of tasks waiting in a queue.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the queue does not
    /// exist.
    pub async fn count(&self, queue: &QueueName) -> TaskControlResult<u64> {
        Ok(self.engine.queue_element_count(queue).await?)
    }

    /// Lists the tasks waiting in a queue. Entries missing a work object
    /// number or step URI are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the queue does not
    /// exist.
    pub async fn tasks(&self, queue: &QueueName) -> TaskControlResult<Vec<Task>> {
        let elements = self.engine.list_queue_elements(queue).await?;
        Ok(elements
            .iter()
            .filter_map(|element| match element.to_task(queue) {
                Ok(task) => Some(task),
                Err(err) => {
                    warn!(%queue, error = %err, "skipping incomplete queue element");
                    None
                }
            })
            .collect())
    }

    /// Returns the column definitions of a queue's workbasket. A queue with
    /// no columns yields an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the queue does not
    /// exist.
    pub async fn columns(&self, queue: &QueueName) -> TaskControlResult<PropertyTree> {
        let columns = self.engine.queue_columns(queue).await?;
        Ok(tree_of(&columns))
    }

    /// Returns the milestones reached by a task's work object.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the listing gave the
    /// task no milestone link or the work object is gone.
    pub async fn milestones(&self, task: &Task) -> TaskControlResult<PropertyTree> {
        let Some(uri) = task.milestones() else {
            return Err(super::TaskControlError::NotFound(format!(
                "milestones of work object {}",
                task.work_object_number()
            )));
        };
        let milestones = self.engine.milestones(uri).await?;
        Ok(tree_of(&milestones))
    }

    /// Returns the step comment, if one is set.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the step is gone.
    pub async fn comment(&self, task: &Task) -> TaskControlResult<Option<String>> {
        let current = self.engine.fetch_step(task.step_element()).await?;
        Ok(current.step.system_properties().comment().map(str::to_owned))
    }

    /// Lists the step's attachment slots.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the step is gone.
    pub async fn attachments(&self, task: &Task) -> TaskControlResult<Vec<AttachmentSlot>> {
        let current = self.engine.fetch_step(task.step_element()).await?;
        Ok(current
            .step
            .attachments()
            .iter()
            .map(|(name, attachment)| AttachmentSlot {
                name: name.clone(),
                reference: attachment.reference(),
            })
            .collect())
    }

    /// Returns every property of the step as a tree.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskControlError::NotFound`] when the step is gone.
    pub async fn describe(&self, task: &Task) -> TaskControlResult<PropertyTree> {
        let current = self.engine.fetch_step(task.step_element()).await?;
        let document = serde_json::to_value(&current.step).map_err(EngineError::decode)?;
        Ok(tree_of(&document))
    }
}

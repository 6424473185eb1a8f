//! In-memory process engine for service and integration tests.
//!
//! The adapter mimics the engine's observable protocol: every step carries a
//! revision-based version token, state-changing actions must present the
//! current token, and dispatching or reassigning a step files the work object
//! under a fresh step URI in another queue.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::domain::{QueueName, TemplateName, TemplateRef};
use crate::task::{
    domain::{
        Queue, QueueElement, Step, StepAction, StepActionRequest, StepElementUri, VersionToken,
        VersionedStep, WorkObjectNumber, WorkflowTemplate,
    },
    ports::{EngineError, EngineResult, ProcessEngine},
};

const CONFLICT: u16 = 409;
const FORBIDDEN: u16 = 403;
const BAD_REQUEST: u16 = 400;

/// A state-changing request received by [`InMemoryProcessEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAction {
    /// Step the action addressed.
    pub step: StepElementUri,
    /// Wire action name.
    pub action: String,
}

/// Thread-safe in-memory process engine.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessEngine {
    state: Arc<RwLock<EngineState>>,
}

#[derive(Debug, Default)]
struct EngineState {
    steps: BTreeMap<StepElementUri, StoredStep>,
    queues: BTreeSet<QueueName>,
    routes: HashMap<QueueName, QueueName>,
    templates: HashMap<TemplateName, Step>,
    failures: HashMap<&'static str, EngineError>,
    actions: Vec<RecordedAction>,
    launches: Vec<Step>,
    columns: HashMap<QueueName, Value>,
    milestones: HashMap<WorkObjectNumber, Value>,
    placements: u64,
    revisions: u64,
}

#[derive(Debug, Clone)]
struct StoredStep {
    number: WorkObjectNumber,
    queue: QueueName,
    step: Step,
    revision: u64,
    locked: bool,
    sources: Vec<QueueName>,
}

impl StoredStep {
    fn etag(&self) -> String {
        format!("\"{}\"", self.revision)
    }

    fn token(&self) -> EngineResult<VersionToken> {
        VersionToken::new(self.etag()).map_err(EngineError::decode)
    }
}

fn poisoned(err: impl ToString) -> EngineError {
    EngineError::unavailable(std::io::Error::other(err.to_string()))
}

fn rejected(status: u16, body: &str) -> EngineError {
    EngineError::Rejected {
        status,
        body: body.to_owned(),
    }
}

impl EngineState {
    fn next_revision(&mut self) -> u64 {
        self.revisions += 1;
        self.revisions
    }

    fn place(
        &mut self,
        number: WorkObjectNumber,
        queue: QueueName,
        mut step: Step,
        sources: Vec<QueueName>,
    ) -> EngineResult<StepElementUri> {
        self.placements += 1;
        let uri = StepElementUri::new(format!(
            "queues/{queue}/stepelements/{}",
            self.placements
        ))
        .map_err(EngineError::decode)?;
        step.system_properties_mut()
            .set_work_object_number(number.as_str());
        let revision = self.next_revision();
        self.queues.insert(queue.clone());
        self.steps.insert(
            uri.clone(),
            StoredStep {
                number,
                queue,
                step,
                revision,
                locked: false,
                sources,
            },
        );
        Ok(uri)
    }

    fn stored(&self, step: &StepElementUri) -> EngineResult<&StoredStep> {
        self.steps.get(step).ok_or_else(|| EngineError::NotFound {
            resource: step.to_string(),
        })
    }

    fn locked_body(stored: &StoredStep, body: Option<Step>) -> EngineResult<Step> {
        if !stored.locked {
            return Err(rejected(CONFLICT, "step is not locked"));
        }
        Ok(body.unwrap_or_else(|| stored.step.clone()))
    }

    fn relocate(
        &mut self,
        uri: &StepElementUri,
        destination: QueueName,
        body: Step,
        sources: Vec<QueueName>,
    ) -> EngineResult<()> {
        let Some(stored) = self.steps.remove(uri) else {
            return Err(EngineError::NotFound {
                resource: uri.to_string(),
            });
        };
        self.place(stored.number, destination, body, sources)?;
        Ok(())
    }

    fn transition(
        &mut self,
        uri: &StepElementUri,
        request: StepActionRequest,
    ) -> EngineResult<Option<VersionToken>> {
        let stored = self.stored(uri)?.clone();
        if request.token.as_str() != stored.etag() {
            return Err(EngineError::PreconditionFailed {
                resource: uri.to_string(),
                body: "version token is stale".to_owned(),
            });
        }
        let properties = stored.step.system_properties().clone();
        let mut sources = stored.sources.clone();
        match request.action {
            StepAction::Lock => {
                if stored.locked {
                    return Err(rejected(CONFLICT, "step is already locked"));
                }
                self.update_in_place(uri, stored.step.clone(), true)
            }
            StepAction::SaveAndUnlock => {
                let body = Self::locked_body(&stored, request.body)?;
                self.update_in_place(uri, body, false)
            }
            StepAction::Abort => self.update_in_place(uri, stored.step.clone(), false),
            StepAction::Dispatch => {
                let body = Self::locked_body(&stored, request.body)?;
                if body.system_properties().requires_response() {
                    return Err(rejected(BAD_REQUEST, "a response must be selected"));
                }
                match self.routes.get(&stored.queue).cloned() {
                    Some(next) => {
                        sources.push(stored.queue.clone());
                        self.relocate(uri, next, body, sources)?;
                    }
                    None => {
                        self.steps.remove(uri);
                    }
                }
                Ok(None)
            }
            StepAction::Reassign { participant } => {
                if !properties.can_reassign() {
                    return Err(rejected(FORBIDDEN, "reassignment is not allowed"));
                }
                let destination = QueueName::new(participant).map_err(EngineError::decode)?;
                sources.push(stored.queue.clone());
                self.relocate(uri, destination, stored.step.clone(), sources)?;
                Ok(None)
            }
            StepAction::ReturnToSource => {
                if !properties.can_return_to_source() {
                    return Err(rejected(FORBIDDEN, "return to source is not allowed"));
                }
                let Some(previous) = sources.pop() else {
                    return Err(rejected(BAD_REQUEST, "step has no source workbasket"));
                };
                self.relocate(uri, previous, stored.step.clone(), sources)?;
                Ok(None)
            }
        }
    }

    fn update_in_place(
        &mut self,
        uri: &StepElementUri,
        body: Step,
        locked: bool,
    ) -> EngineResult<Option<VersionToken>> {
        let revision = self.next_revision();
        let Some(stored) = self.steps.get_mut(uri) else {
            return Err(EngineError::NotFound {
                resource: uri.to_string(),
            });
        };
        stored.step = body;
        stored.locked = locked;
        stored.revision = revision;
        stored.token().map(Some)
    }
}

impl InMemoryProcessEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, EngineState>> {
        self.state.write().map_err(poisoned)
    }

    /// Registers an empty queue.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn add_queue(&self, queue: &QueueName) -> EngineResult<()> {
        self.write()?.queues.insert(queue.clone());
        Ok(())
    }

    /// Removes a queue and every step filed in it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn remove_queue(&self, queue: &QueueName) -> EngineResult<()> {
        let mut state = self.write()?;
        state.queues.remove(queue);
        state.steps.retain(|_, stored| &stored.queue != queue);
        Ok(())
    }

    /// Routes work dispatched from `from` into `to`. Without a route,
    /// dispatching ends the process.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn add_route(&self, from: &QueueName, to: &QueueName) -> EngineResult<()> {
        let mut state = self.write()?;
        state.queues.insert(from.clone());
        state.queues.insert(to.clone());
        state.routes.insert(from.clone(), to.clone());
        Ok(())
    }

    /// Registers a launchable template body.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn add_template(&self, name: &TemplateName, body: Step) -> EngineResult<()> {
        self.write()?.templates.insert(name.clone(), body);
        Ok(())
    }

    /// Sets the column definitions served for `queue`, registering it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn set_columns(&self, queue: &QueueName, columns: Value) -> EngineResult<()> {
        let mut state = self.write()?;
        state.queues.insert(queue.clone());
        state.columns.insert(queue.clone(), columns);
        Ok(())
    }

    /// Sets the milestone document served for a work object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn set_milestones(
        &self,
        number: &WorkObjectNumber,
        milestones: Value,
    ) -> EngineResult<()> {
        self.write()?.milestones.insert(number.clone(), milestones);
        Ok(())
    }

    /// Files a new work object in `queue` and returns its listing entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn seed(&self, queue: &QueueName, body: Step) -> EngineResult<QueueElement> {
        let number = WorkObjectNumber::new(Uuid::new_v4().simple().to_string())
            .map_err(EngineError::decode)?;
        let mut state = self.write()?;
        let uri = state.place(number, queue.clone(), body, Vec::new())?;
        let stored = state.stored(&uri)?;
        Ok(listing_entry(&uri, stored))
    }

    /// Fails the next request for the named action with `error`.
    ///
    /// `action` is a wire action name such as `saveAndUnlock`, or `launch`
    /// for workflow creation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] when the state lock is poisoned.
    pub fn fail_next(&self, action: &'static str, error: EngineError) -> EngineResult<()> {
        self.write()?.failures.insert(action, error);
        Ok(())
    }

    /// Changes a step's revision as another client's save would.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the step does not exist.
    pub fn touch(&self, step: &StepElementUri) -> EngineResult<()> {
        let mut state = self.write()?;
        let revision = state.next_revision();
        let stored = state.steps.get_mut(step).ok_or_else(|| EngineError::NotFound {
            resource: step.to_string(),
        })?;
        stored.revision = revision;
        Ok(())
    }

    /// Returns every state-changing request received, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.state
            .read()
            .map(|state| state.actions.clone())
            .unwrap_or_default()
    }

    /// Returns every template body submitted for launch, in order.
    #[must_use]
    pub fn launches(&self) -> Vec<Step> {
        self.state
            .read()
            .map(|state| state.launches.clone())
            .unwrap_or_default()
    }

    /// Returns `true` when the step exists and is locked.
    #[must_use]
    pub fn is_locked(&self, step: &StepElementUri) -> bool {
        self.state
            .read()
            .map(|state| state.steps.get(step).is_some_and(|stored| stored.locked))
            .unwrap_or(false)
    }

    /// Returns the queue currently holding the work object, if any.
    #[must_use]
    pub fn queue_of(&self, number: &WorkObjectNumber) -> Option<QueueName> {
        self.state.read().ok().and_then(|state| {
            state
                .steps
                .values()
                .find(|stored| &stored.number == number)
                .map(|stored| stored.queue.clone())
        })
    }
}

fn milestones_uri(number: &WorkObjectNumber) -> String {
    format!("workobjects/{number}/milestones")
}

fn listing_entry(uri: &StepElementUri, stored: &StoredStep) -> QueueElement {
    let properties = stored.step.system_properties();
    QueueElement {
        work_object_number: Some(stored.number.to_string()),
        step_element: Some(uri.to_string()),
        etag: Some(stored.etag()),
        queue_name: Some(stored.queue.to_string()),
        subject: properties.subject().map(str::to_owned),
        step_name: None,
        system_properties: Some(properties.clone()),
        milestones: Some(milestones_uri(&stored.number)),
        extra: serde_json::Map::new(),
    }
}

#[async_trait]
impl ProcessEngine for InMemoryProcessEngine {
    async fn fetch_step(&self, step: &StepElementUri) -> EngineResult<VersionedStep> {
        let state = self.state.read().map_err(poisoned)?;
        let stored = state.stored(step)?;
        Ok(VersionedStep {
            step: stored.step.clone(),
            token: stored.token()?,
        })
    }

    async fn apply_action(
        &self,
        step: &StepElementUri,
        request: StepActionRequest,
    ) -> EngineResult<Option<VersionToken>> {
        let mut state = self.write()?;
        state.actions.push(RecordedAction {
            step: step.clone(),
            action: request.action.name().to_owned(),
        });
        if let Some(failure) = state.failures.remove(request.action.name()) {
            return Err(failure);
        }
        state.transition(step, request)
    }

    async fn queue(&self, queue: &QueueName) -> EngineResult<Queue> {
        let count = self.queue_element_count(queue).await?;
        let uri = format!("queues/{queue}/workbaskets/{queue}");
        Ok(Queue::new(queue.clone(), uri.clone())
            .with_elements_uri(format!("{uri}/queueelements"))
            .with_count(count))
    }

    async fn queue_element_count(&self, queue: &QueueName) -> EngineResult<u64> {
        let elements = self.list_queue_elements(queue).await?;
        Ok(u64::try_from(elements.len()).unwrap_or(u64::MAX))
    }

    async fn list_queue_elements(&self, queue: &QueueName) -> EngineResult<Vec<QueueElement>> {
        let state = self.state.read().map_err(poisoned)?;
        if !state.queues.contains(queue) {
            return Err(EngineError::NotFound {
                resource: queue.to_string(),
            });
        }
        Ok(state
            .steps
            .iter()
            .filter(|(_, stored)| &stored.queue == queue)
            .map(|(uri, stored)| listing_entry(uri, stored))
            .collect())
    }

    async fn queue_columns(&self, queue: &QueueName) -> EngineResult<Value> {
        let state = self.state.read().map_err(poisoned)?;
        if !state.queues.contains(queue) {
            return Err(EngineError::NotFound {
                resource: queue.to_string(),
            });
        }
        Ok(state.columns.get(queue).cloned().unwrap_or(Value::Null))
    }

    async fn milestones(&self, uri: &str) -> EngineResult<Value> {
        let state = self.state.read().map_err(poisoned)?;
        let stored = state
            .steps
            .values()
            .find(|stored| milestones_uri(&stored.number) == uri)
            .ok_or_else(|| EngineError::NotFound {
                resource: uri.to_owned(),
            })?;
        Ok(state
            .milestones
            .get(&stored.number)
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn fetch_template(&self, template: &TemplateRef) -> EngineResult<WorkflowTemplate> {
        let state = self.state.read().map_err(poisoned)?;
        let mut body = state
            .templates
            .get(template.name())
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                resource: template.uri().to_owned(),
            })?;
        body.system_properties_mut()
            .set_work_object_number(Uuid::new_v4().simple().to_string());
        Ok(WorkflowTemplate::new(template.clone(), body))
    }

    async fn create_instance(
        &self,
        template: &WorkflowTemplate,
        body: &Step,
    ) -> EngineResult<Option<WorkObjectNumber>> {
        let mut state = self.write()?;
        state.actions.push(RecordedAction {
            step: StepElementUri::new(template.reference().uri()).map_err(EngineError::decode)?,
            action: "launch".to_owned(),
        });
        if let Some(failure) = state.failures.remove("launch") {
            return Err(failure);
        }
        state.launches.push(body.clone());
        Ok(template.work_object_number())
    }
}

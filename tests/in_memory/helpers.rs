//! Shared test helpers for in-memory engine integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use workbasket::catalog::{
    adapters::memory::{InMemoryDirectory, InMemoryDiscovery},
    domain::{Catalog, Participant, QueueName, TemplateName, TemplateRef},
    services::CatalogService,
};
use workbasket::task::{
    adapters::memory::InMemoryProcessEngine,
    domain::{
        Attachment, DataField, FieldMode, FieldType, Step, SystemProperties, Task, WorkflowGroup,
    },
    services::{ConsistencyResolver, TaskInspector, TransitionEngine, WorkflowLauncher},
};

/// Work intake queue.
pub const INTAKE: &str = "Intake";
/// Queue that dispatched intake work is routed to.
pub const APPROVALS: &str = "Approvals";
/// Template registered with the engine and the catalog.
pub const APPROVAL_TEMPLATE: &str = "Approval";

/// Services wired to one in-memory engine and directory.
pub struct Session {
    /// The engine every service talks to.
    pub engine: Arc<InMemoryProcessEngine>,
    /// Update and terminal actions.
    pub transitions: TransitionEngine<InMemoryProcessEngine, InMemoryDirectory>,
    /// Queue sweeps.
    pub resolver: ConsistencyResolver<InMemoryProcessEngine, DefaultClock>,
    /// Read-only views.
    pub inspector: TaskInspector<InMemoryProcessEngine>,
    /// Template launch.
    pub launcher: WorkflowLauncher<InMemoryProcessEngine>,
    /// Catalog produced by discovery.
    pub catalog: Arc<Catalog>,
}

/// Returns a validated queue name.
///
/// # Errors
///
/// Returns an error if the name is blank.
pub fn queue(name: &str) -> eyre::Result<QueueName> {
    Ok(QueueName::new(name)?)
}

/// An approval step with a date field, a group, an attachment slot and two
/// responses.
#[must_use]
pub fn approval_step(can_reassign: bool) -> Step {
    Step::new()
        .with_system_properties(
            SystemProperties::default()
                .with_can_reassign(can_reassign)
                .with_can_return_to_source(true)
                .with_responses(["Approve".to_owned(), "Reject".to_owned()]),
        )
        .with_field(
            "Deadline",
            DataField::new(FieldType::DateTime, FieldMode::READ_WRITE),
        )
        .with_field(
            "Amount",
            DataField::new(FieldType::Integer, FieldMode::READ_WRITE).with_value(10),
        )
        .with_field(
            "Requester",
            DataField::new(FieldType::Text, FieldMode::READ).with_value("erin"),
        )
        .with_group("Reviewers", WorkflowGroup::default())
        .with_attachment("Invoice", Attachment::empty())
}

/// Files `step` in `queue_name` and returns its task handle.
///
/// # Errors
///
/// Returns an error if seeding fails or the listing entry is incomplete.
pub fn seed(session: &Session, queue_name: &str, step: Step) -> eyre::Result<Task> {
    let listed_in = queue(queue_name)?;
    let element = session.engine.seed(&listed_in, step)?;
    Ok(element.to_task(&listed_in)?)
}

async fn discover_catalog() -> eyre::Result<Catalog> {
    let discovery = InMemoryDiscovery::new();
    discovery.add_appspace("Operations", [INTAKE, APPROVALS])?;
    discovery.add_template(TemplateRef::new(
        APPROVAL_TEMPLATE,
        "workclasses/Approval",
    )?)?;
    Ok(CatalogService::new(Arc::new(discovery)).discover().await?)
}

/// Builds a session whose directory knows alice and dave, with intake work
/// routed to approvals.
///
/// # Errors
///
/// Returns an error if any fixture data fails validation.
pub async fn build_session() -> eyre::Result<Session> {
    let engine = Arc::new(InMemoryProcessEngine::new());
    engine.add_route(&queue(INTAKE)?, &queue(APPROVALS)?)?;
    engine.add_template(
        &TemplateName::new(APPROVAL_TEMPLATE)?,
        approval_step(false),
    )?;
    let directory = Arc::new(InMemoryDirectory::with_participants([
        Participant::new("alice")?.with_email("alice@example.com"),
        Participant::new("dave")?,
    ]));
    let catalog = Arc::new(discover_catalog().await?);

    Ok(Session {
        transitions: TransitionEngine::new(Arc::clone(&engine), directory),
        resolver: ConsistencyResolver::new(Arc::clone(&engine), Arc::new(DefaultClock)),
        inspector: TaskInspector::new(Arc::clone(&engine)),
        launcher: WorkflowLauncher::new(Arc::clone(&engine), Arc::clone(&catalog)),
        catalog,
        engine,
    })
}

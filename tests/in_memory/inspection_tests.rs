//! Queue counts, listings and step views.

use rstest::rstest;
use serde_json::json;
use workbasket::task::services::{LaunchRequest, MutationRequest, TaskControlError};

use super::helpers::{approval_step, build_session, queue, seed, APPROVALS, INTAKE};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queue_counts_and_listings_agree() -> eyre::Result<()> {
    let session = build_session().await?;
    let first = seed(&session, INTAKE, approval_step(true))?;
    let second = seed(&session, INTAKE, approval_step(false))?;

    let intake = queue(INTAKE)?;
    let resource = session.inspector.queue(&intake).await?;
    let tasks = session.inspector.tasks(&intake).await?;

    eyre::ensure!(resource.count() == Some(2), "count: {:?}", resource.count());
    eyre::ensure!(session.inspector.count(&queue(APPROVALS)?).await? == 0, "approvals empty");
    let numbers: Vec<_> = tasks.iter().map(|task| task.work_object_number()).collect();
    eyre::ensure!(
        numbers.contains(&first.work_object_number())
            && numbers.contains(&second.work_object_number()),
        "both tasks listed"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_queue_is_not_found() -> eyre::Result<()> {
    let session = build_session().await?;

    let result = session.inspector.tasks(&queue("Archive")?).await;

    eyre::ensure!(
        matches!(result, Err(TaskControlError::NotFound(_))),
        "expected not found"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn describe_exposes_every_step_property() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    session
        .transitions
        .update(&task, &MutationRequest::new().with_field("Amount", 42))
        .await?;

    let tree = session.inspector.describe(&task).await?;

    eyre::ensure!(
        tree.lookup("dataFields.Amount.value") == Some(&json!(42)),
        "amount should be visible"
    );
    eyre::ensure!(
        tree.lookup("systemProperties.canReassign") == Some(&json!(true)),
        "flags should be visible"
    );
    eyre::ensure!(
        tree.lookup("systemProperties.workObjectNumber")
            == Some(&json!(task.work_object_number().as_str())),
        "work object number should be visible"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attachments_list_every_slot() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;

    let slots = session.inspector.attachments(&task).await?;

    eyre::ensure!(slots.len() == 1, "one slot declared");
    let slot = slots
        .first()
        .ok_or_else(|| eyre::eyre!("slot expected"))?;
    eyre::ensure!(slot.name == "Invoice", "slot name: {}", slot.name);
    eyre::ensure!(slot.reference.is_none(), "slot is empty");
    eyre::ensure!(session.inspector.comment(&task).await?.is_none(), "no comment yet");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launched_attachment_references_the_document() -> eyre::Result<()> {
    let session = build_session().await?;
    let request = LaunchRequest::new("Approval")
        .with_attachment("Invoice", "{6B1D6B34-0000-4A4A-9000-00000000002A}")
        .with_object_store("FINANCE");

    session.launcher.launch(&request).await?;

    let launches = session.engine.launches();
    let reference = launches
        .first()
        .and_then(|step| step.attachments().get("Invoice"))
        .and_then(|slot| slot.reference())
        .ok_or_else(|| eyre::eyre!("invoice slot should be filled"))?;
    eyre::ensure!(reference.library_name() == "FINANCE", "object store");
    eyre::ensure!(
        reference.version() == "{6B1D6B34-0000-4A4A-9000-00000000002A}",
        "document version"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listed_tasks_link_their_milestones() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    session.engine.set_milestones(
        task.work_object_number(),
        json!({"Received": {"reached": true}}),
    )?;
    session
        .engine
        .set_columns(&queue(INTAKE)?, json!({"F_Subject": {"prompt": "Subject"}}))?;

    let listed = session.inspector.tasks(&queue(INTAKE)?).await?;
    let first = listed
        .first()
        .ok_or_else(|| eyre::eyre!("task expected"))?;
    let milestones = session.inspector.milestones(first).await?;
    let columns = session.inspector.columns(&queue(INTAKE)?).await?;

    eyre::ensure!(
        milestones.lookup("Received.reached") == Some(&json!(true)),
        "milestone should be visible"
    );
    eyre::ensure!(
        columns.lookup("F_Subject.prompt") == Some(&json!("Subject")),
        "column should be visible"
    );
    Ok(())
}

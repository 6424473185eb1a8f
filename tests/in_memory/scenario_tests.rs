//! Reassignment, validation and launch scenarios against the in-memory
//! engine.

use rstest::rstest;
use workbasket::task::{
    domain::FieldType,
    services::{LaunchOutcome, LaunchRequest, MutationRequest, ReassignRequest, TaskControlError},
};

use super::helpers::{approval_step, build_session, queue, seed, APPROVAL_TEMPLATE, INTAKE};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigning_a_locked_down_task_is_denied() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(false))?;

    let result = session
        .transitions
        .reassign(&task, &ReassignRequest::new("alice"))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskControlError::PermissionDenied {
                action: "reassign",
                ..
            })
        ),
        "expected permission denied, got {result:?}"
    );
    eyre::ensure!(
        session.engine.queue_of(task.work_object_number()) == Some(queue(INTAKE)?),
        "task should not have moved"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigning_to_an_unknown_user_is_not_found() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;

    let result = session
        .transitions
        .reassign(&task, &ReassignRequest::new("bob"))
        .await;

    let Err(TaskControlError::NotFound(message)) = result else {
        eyre::bail!("expected a missing participant");
    };
    eyre::ensure!(message.contains("bob"), "message should name the user");
    eyre::ensure!(session.engine.actions().is_empty(), "nothing should be sent");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigning_to_a_known_user_moves_the_task() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;

    session
        .transitions
        .reassign(&task, &ReassignRequest::new("alice"))
        .await?;

    let report = session
        .resolver
        .relocate(&task, &[queue(INTAKE)?, queue("alice")?])
        .await?;
    let located = report
        .relocation
        .task()
        .ok_or_else(|| eyre::eyre!("task should be located"))?;
    eyre::ensure!(located.queue_name() == &queue("alice")?, "wrong queue");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_deadline_is_rejected_locally() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;

    let result = session
        .transitions
        .update(
            &task,
            &MutationRequest::new()
                .with_field("Amount", 20)
                .with_field("Deadline", "not-a-date"),
        )
        .await;

    let Err(TaskControlError::Validation(err)) = result else {
        eyre::bail!("expected a validation failure");
    };
    eyre::ensure!(err.field_name() == Some("Deadline"), "wrong field: {err}");
    eyre::ensure!(session.engine.actions().is_empty(), "nothing should be sent");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launching_by_name_only_describes_the_template() -> eyre::Result<()> {
    let session = build_session().await?;
    eyre::ensure!(
        session.catalog.template(APPROVAL_TEMPLATE).is_some(),
        "template should be catalogued"
    );

    let outcome = session
        .launcher
        .launch(&LaunchRequest::new(APPROVAL_TEMPLATE))
        .await?;

    let LaunchOutcome::Described(shape) = outcome else {
        eyre::bail!("expected a description");
    };
    let fields: Vec<&str> = shape.fields.keys().map(String::as_str).collect();
    eyre::ensure!(fields == ["Amount", "Deadline", "Requester"], "fields: {fields:?}");
    eyre::ensure!(
        shape.fields.get("Deadline").map(|field| field.field_type) == Some(FieldType::DateTime),
        "deadline should be a date"
    );
    eyre::ensure!(shape.groups == ["Reviewers"], "groups: {:?}", shape.groups);
    eyre::ensure!(shape.attachments == ["Invoice"], "slots: {:?}", shape.attachments);
    eyre::ensure!(session.engine.actions().is_empty(), "nothing should be sent");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launching_with_values_starts_a_workflow() -> eyre::Result<()> {
    let session = build_session().await?;
    let request = LaunchRequest::new(APPROVAL_TEMPLATE)
        .with_field("Deadline", "2026-12-01T12:00:00Z")
        .with_group("Reviewers", "alice, dave")
        .with_subject("Quarterly spend");

    let outcome = session.launcher.launch(&request).await?;

    let LaunchOutcome::Launched(number) = outcome else {
        eyre::bail!("expected a launch");
    };
    eyre::ensure!(!number.as_str().is_empty(), "number should be set");
    let launches = session.engine.launches();
    let submitted = launches
        .first()
        .ok_or_else(|| eyre::eyre!("one launch expected"))?;
    eyre::ensure!(
        submitted.system_properties().work_object_number() == Some(number.as_str()),
        "launch should carry the pre-allocated number"
    );
    Ok(())
}

//! Lock protocol, dispatch and relocation end to end.

use rstest::rstest;
use workbasket::task::{
    domain::CommitAction,
    ports::{EngineError, ProcessEngine},
    services::{MutationBuilder, MutationRequest, Relocation, TaskControlError},
};

use super::helpers::{approval_step, build_session, queue, seed, APPROVALS, INTAKE};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn acquire_and_discard_changes_nothing() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    let before = session.engine.fetch_step(task.step_element()).await?;

    let locked = session.transitions.tokens().acquire(&task).await?;
    let staged = MutationBuilder::apply(
        locked.step(),
        &MutationRequest::new().with_field("Amount", 99),
    )?;
    session
        .transitions
        .tokens()
        .discard(locked.with_step(staged))
        .await?;

    let after = session.engine.fetch_step(task.step_element()).await?;
    eyre::ensure!(after.step == before.step, "discard must drop staged changes");
    eyre::ensure!(
        !session.engine.is_locked(task.step_element()),
        "step should be unlocked"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manual_commit_persists_staged_changes() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;

    let locked = session.transitions.tokens().acquire(&task).await?;
    let staged = MutationBuilder::apply(
        locked.step(),
        &MutationRequest::new().with_comment("checked totals"),
    )?;
    let token = session
        .transitions
        .tokens()
        .commit(locked.with_step(staged), CommitAction::SaveAndUnlock)
        .await?;

    let current = session.engine.fetch_step(task.step_element()).await?;
    eyre::ensure!(token == Some(current.token), "commit should report the new token");
    eyre::ensure!(
        session.inspector.comment(&task).await? == Some("checked totals".to_owned()),
        "comment should be saved"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_edit_is_a_conflict() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    let tokens = session.transitions.tokens();
    let snapshot = tokens.snapshot(&task).await?;
    session.engine.touch(task.step_element())?;

    let result = tokens.lock(&task, snapshot).await;

    eyre::ensure!(
        matches!(result, Err(TaskControlError::ConcurrencyConflict { .. })),
        "expected a conflict"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_moves_the_task_out_of_its_queue() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    let tracked = [queue(INTAKE)?, queue(APPROVALS)?];

    let refused = session.transitions.dispatch(&task, None).await;
    eyre::ensure!(
        matches!(refused, Err(TaskControlError::PreconditionNotMet(_))),
        "a response must be selected first"
    );

    let report = session
        .resolver
        .dispatch_and_relocate(
            &session.transitions,
            &task,
            Some(&MutationRequest::new().with_response("Approve")),
            &tracked,
        )
        .await?;

    let Relocation::Located(moved) = report.relocation else {
        eyre::bail!("dispatched task should be found in approvals");
    };
    eyre::ensure!(moved.work_object_number() == task.work_object_number(), "same work object");
    eyre::ensure!(moved.queue_name() == &queue(APPROVALS)?, "moved to approvals");
    eyre::ensure!(moved.step_element() != task.step_element(), "new step resource");

    let finished = session
        .resolver
        .dispatch_and_relocate(
            &session.transitions,
            &moved,
            Some(&MutationRequest::new().with_response("Approve")),
            &tracked,
        )
        .await?;
    eyre::ensure!(
        finished.relocation == Relocation::NotLocated,
        "the last step ends the process"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn return_to_source_reverses_a_dispatch() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    let tracked = [queue(INTAKE)?, queue(APPROVALS)?];
    let report = session
        .resolver
        .dispatch_and_relocate(
            &session.transitions,
            &task,
            Some(&MutationRequest::new().with_response("Reject")),
            &tracked,
        )
        .await?;
    let moved = report
        .relocation
        .task()
        .ok_or_else(|| eyre::eyre!("task should be in approvals"))?;

    session
        .transitions
        .return_to_source(moved, Some("missing receipts"))
        .await?;

    let back = session.resolver.relocate(moved, &tracked).await?;
    let returned = back
        .relocation
        .task()
        .ok_or_else(|| eyre::eyre!("task should be back in intake"))?;
    eyre::ensure!(returned.queue_name() == &queue(INTAKE)?, "returned to intake");
    eyre::ensure!(
        session.inspector.comment(returned).await? == Some("missing receipts".to_owned()),
        "comment should travel with the task"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_failed_save_releases_the_lock() -> eyre::Result<()> {
    let session = build_session().await?;
    let task = seed(&session, INTAKE, approval_step(true))?;
    session.engine.fail_next(
        "saveAndUnlock",
        EngineError::Rejected {
            status: 500,
            body: "internal error".to_owned(),
        },
    )?;

    let result = session.transitions.save_comment(&task, "retry later").await;

    let Err(TaskControlError::Engine(EngineError::Rejected { status, body })) = result else {
        eyre::bail!("expected the engine rejection");
    };
    eyre::ensure!(status == 500 && body == "internal error", "status and body verbatim");
    eyre::ensure!(
        !session.engine.is_locked(task.step_element()),
        "the compensating abort should release the lock"
    );
    let names: Vec<String> = session
        .engine
        .actions()
        .into_iter()
        .map(|recorded| recorded.action)
        .collect();
    eyre::ensure!(
        names == ["lock", "saveAndUnlock", "abort"],
        "actions: {names:?}"
    );
    Ok(())
}

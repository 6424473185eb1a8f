//! REST adapter tests against a mock engine server.
//!
//! Each test starts its own `mockito` server and points a session at the
//! BPM REST root beneath it.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use rstest::rstest;
use serde_json::json;
use workbasket::catalog::{
    adapters::{
        http::{RestDirectory, RestDiscovery},
        memory::InMemoryDirectory,
    },
    domain::{AppSpace, Catalog, QueueName, TemplateRef},
    ports::{Directory, Discovery, DiscoveryError},
};
use workbasket::config::EngineConfig;
use workbasket::rest::RestClient;
use workbasket::task::{
    adapters::http::RestProcessEngine,
    domain::{
        QueueElement, Step, StepAction, StepActionRequest, StepElementUri, VersionToken,
        WorkflowTemplate,
    },
    ports::{EngineError, ProcessEngine},
    services::{
        LaunchOutcome, LaunchRequest, MutationRequest, TaskInspector, TransitionEngine,
        WorkflowLauncher,
    },
};

const ROOT: &str = "/peengine/P8BPMREST/p8/bpm/v1";
const STEP: &str = "queues/Inbox/stepelements/S1";
/// `alice:pw` in basic authentication form.
const BASIC_AUTH: &str = "Basic YWxpY2U6cHc=";

fn client(server: &ServerGuard) -> eyre::Result<RestClient> {
    let config = EngineConfig::from_base_url(&format!("{}{ROOT}/", server.url()), "alice", "pw")?;
    Ok(RestClient::new(&config)?)
}

fn path(relative: &str) -> String {
    format!("{ROOT}/{relative}")
}

fn step_body() -> serde_json::Value {
    json!({
        "systemProperties": {
            "workObjectNumber": "W1",
            "canReassign": true,
            "responses": ["Approve", "Reject"]
        },
        "dataFields": {
            "Amount": {"type": 1, "mode": 3, "value": 5},
            "Reference": {"type": 2, "mode": 1, "value": "REF-1"}
        }
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_step_reads_body_and_etag() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path(STEP).as_str())
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .with_header("etag", "\"3\"")
        .with_body(step_body().to_string())
        .create_async()
        .await;
    let engine = RestProcessEngine::new(client(&server)?);

    let fetched = engine.fetch_step(&StepElementUri::new(STEP)?).await?;

    mock.assert_async().await;
    eyre::ensure!(fetched.token.as_str() == "\"3\"", "token: {}", fetched.token.as_str());
    eyre::ensure!(
        fetched.step.system_properties().work_object_number() == Some("W1"),
        "work object number"
    );
    eyre::ensure!(fetched.step.data_field("Amount").is_some(), "amount declared");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_step_without_etag_is_a_decode_error() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", path(STEP).as_str())
        .with_status(200)
        .with_body(step_body().to_string())
        .create_async()
        .await;
    let engine = RestProcessEngine::new(client(&server)?);

    let result = engine.fetch_step(&StepElementUri::new(STEP)?).await;

    eyre::ensure!(
        matches!(result, Err(EngineError::Decode(_))),
        "expected a decode error"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lock_sends_the_token_as_header_and_query() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", path(STEP).as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "lock".into()),
            Matcher::UrlEncoded("If-Match".into(), "\"3\"".into()),
        ]))
        .match_header("if-match", "\"3\"")
        .with_status(200)
        .with_header("etag", "\"4\"")
        .create_async()
        .await;
    let engine = RestProcessEngine::new(client(&server)?);

    let token = engine
        .apply_action(
            &StepElementUri::new(STEP)?,
            StepActionRequest::new(StepAction::Lock, VersionToken::new("\"3\"")?),
        )
        .await?;

    mock.assert_async().await;
    eyre::ensure!(
        token == Some(VersionToken::new("\"4\"")?),
        "lock should report the new token"
    );
    Ok(())
}

#[rstest]
#[case(401, "auth")]
#[case(404, "missing")]
#[case(412, "stale")]
#[case(500, "boom")]
#[tokio::test(flavor = "multi_thread")]
async fn error_statuses_are_classified(
    #[case] status: usize,
    #[case] body: &str,
) -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PUT", path(STEP).as_str())
        .match_query(Matcher::Any)
        .with_status(status)
        .with_body(body)
        .create_async()
        .await;
    let engine = RestProcessEngine::new(client(&server)?);

    let result = engine
        .apply_action(
            &StepElementUri::new(STEP)?,
            StepActionRequest::new(StepAction::Abort, VersionToken::new("7")?),
        )
        .await;

    let classified = match (status, result) {
        (401, Err(EngineError::Authentication { status: 401, body: got })) => got == body,
        (404, Err(EngineError::NotFound { resource })) => resource.contains(STEP),
        (412, Err(EngineError::PreconditionFailed { body: got, .. })) => got == body,
        (500, Err(EngineError::Rejected { status: 500, body: got })) => got == body,
        _ => false,
    };
    eyre::ensure!(classified, "status {status} was misclassified");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queue_count_and_listing_use_workbasket_paths() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let count = server
        .mock(
            "GET",
            path("queues/Inbox/workbaskets/Inbox/queueelements/count").as_str(),
        )
        .with_status(200)
        .with_body(r#"{"count": 2}"#)
        .create_async()
        .await;
    let listing = server
        .mock(
            "GET",
            path("queues/Inbox/workbaskets/Inbox/queueelements").as_str(),
        )
        .with_status(200)
        .with_body(
            json!({
                "queueElements": [
                    {"workObjectNumber": "W1", "stepElement": STEP, "ETag": "3"},
                    {"workObjectNumber": "W2"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let engine = RestProcessEngine::new(client(&server)?);
    let inbox = QueueName::new("Inbox")?;

    let total = engine.queue_element_count(&inbox).await?;
    let elements = engine.list_queue_elements(&inbox).await?;

    count.assert_async().await;
    listing.assert_async().await;
    eyre::ensure!(total == 2, "count: {total}");
    eyre::ensure!(elements.len() == 2, "both entries decoded");
    let complete = elements
        .iter()
        .filter(|element| element.to_task(&inbox).is_ok())
        .count();
    eyre::ensure!(complete == 1, "one complete entry, got {complete}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_count_body_means_zero() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock(
            "GET",
            path("queues/Inbox/workbaskets/Inbox/queueelements/count").as_str(),
        )
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let engine = RestProcessEngine::new(client(&server)?);

    let total = engine.queue_element_count(&QueueName::new("Inbox")?).await?;

    eyre::ensure!(total == 0, "count: {total}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn columns_and_milestones_are_read_from_linked_resources() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let columns = server
        .mock(
            "GET",
            path("queues/Inbox/workbaskets/Inbox/columns").as_str(),
        )
        .with_status(200)
        .with_body(json!({"Subject": {"type": 2, "prompt": "Subject"}}).to_string())
        .create_async()
        .await;
    let listing = server
        .mock(
            "GET",
            path("queues/Inbox/workbaskets/Inbox/queueelements").as_str(),
        )
        .with_status(200)
        .with_body(
            json!({
                "queueElements": [{
                    "workObjectNumber": "W1",
                    "stepElement": STEP,
                    "milestones": "workobjects/W1/milestones"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let milestones = server
        .mock("GET", path("workobjects/W1/milestones").as_str())
        .with_status(200)
        .with_body(json!({"milestones": {"Submitted": {"level": 1}}}).to_string())
        .create_async()
        .await;
    let inspector = TaskInspector::new(Arc::new(RestProcessEngine::new(client(&server)?)));
    let inbox = QueueName::new("Inbox")?;

    let tree = inspector.columns(&inbox).await?;
    let tasks = inspector.tasks(&inbox).await?;
    let task = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("listed task expected"))?;
    let reached = inspector.milestones(task).await?;

    columns.assert_async().await;
    listing.assert_async().await;
    milestones.assert_async().await;
    eyre::ensure!(
        tree.lookup("Subject.prompt") == Some(&json!("Subject")),
        "column prompt"
    );
    eyre::ensure!(
        reached.lookup("milestones.Submitted.level") == Some(&json!(1)),
        "milestone level"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_locks_then_saves_the_coerced_body() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let fetch = server
        .mock("GET", path(STEP).as_str())
        .with_status(200)
        .with_header("etag", "3")
        .with_body(step_body().to_string())
        .expect_at_least(1)
        .create_async()
        .await;
    let lock = server
        .mock("PUT", path(STEP).as_str())
        .match_query(Matcher::UrlEncoded("action".into(), "lock".into()))
        .match_header("if-match", "3")
        .with_status(200)
        .with_header("etag", "4")
        .expect(1)
        .create_async()
        .await;
    let save = server
        .mock("PUT", path(STEP).as_str())
        .match_query(Matcher::UrlEncoded("action".into(), "saveAndUnlock".into()))
        .match_header("if-match", "4")
        .match_body(Matcher::PartialJson(json!({
            "dataFields": {"Amount": {"value": 7}}
        })))
        .with_status(200)
        .with_header("etag", "5")
        .expect(1)
        .create_async()
        .await;
    let engine = Arc::new(RestProcessEngine::new(client(&server)?));
    let transitions = TransitionEngine::new(engine, Arc::new(InMemoryDirectory::new()));
    let task = QueueElement {
        work_object_number: Some("W1".to_owned()),
        step_element: Some(STEP.to_owned()),
        ..Default::default()
    }
    .to_task(&QueueName::new("Inbox")?)?;

    transitions
        .update(&task, &MutationRequest::new().with_field("Amount", 7))
        .await?;

    fetch.assert_async().await;
    lock.assert_async().await;
    save.assert_async().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn discovery_reads_name_listings() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let _appspaces = server
        .mock("GET", path("appspacenames").as_str())
        .with_status(200)
        .with_body(
            json!({"Operations": {"rolenames": "appspaces/Operations/rolenames"}}).to_string(),
        )
        .create_async()
        .await;
    let _roles = server
        .mock("GET", path("appspaces/Operations/rolenames").as_str())
        .with_status(200)
        .with_body(json!({"Intake": {}, "Approvals": {}}).to_string())
        .create_async()
        .await;
    let _classes = server
        .mock("GET", path("workclasses").as_str())
        .with_status(200)
        .with_body(json!({"Approval": {"URI": "workclasses/Approval"}}).to_string())
        .create_async()
        .await;
    let _user = server
        .mock("GET", path("currentuser").as_str())
        .with_status(200)
        .with_body(json!({"name": "alice", "displayName": "Alice Example"}).to_string())
        .create_async()
        .await;
    let discovery = RestDiscovery::new(client(&server)?);

    let appspaces = discovery.appspaces().await?;
    let listing = appspaces
        .first()
        .ok_or_else(|| eyre::eyre!("one appspace expected"))?;
    let roles = discovery.role_names(&listing.roles_uri).await?;
    let classes = discovery.work_classes().await?;
    let user = discovery.current_user().await?;

    eyre::ensure!(listing.name == "Operations", "appspace: {}", listing.name);
    eyre::ensure!(roles == ["Approvals", "Intake"], "roles: {roles:?}");
    eyre::ensure!(
        classes == [TemplateRef::new("Approval", "workclasses/Approval")?],
        "classes: {classes:?}"
    );
    eyre::ensure!(user.name == "alice", "user: {}", user.name);
    eyre::ensure!(
        user.display_name.as_deref() == Some("Alice Example"),
        "display name"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_role_listing_is_not_found() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", path("appspaces/Gone/rolenames").as_str())
        .with_status(404)
        .create_async()
        .await;
    let discovery = RestDiscovery::new(client(&server)?);

    let result = discovery.role_names("appspaces/Gone/rolenames").await;

    eyre::ensure!(
        matches!(result, Err(DiscoveryError::NotFound(_))),
        "expected not found"
    );
    Ok(())
}

#[rstest]
#[case::bare(json!([{"name": "alice", "displayName": "Alice Example"}]))]
#[case::wrapped(json!({"participants": [{"name": "alice", "displayName": "Alice Example"}]}))]
#[tokio::test(flavor = "multi_thread")]
async fn directory_search_accepts_both_listing_shapes(
    #[case] body: serde_json::Value,
) -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("participants").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("searchPattern".into(), "alice".into()),
            Matcher::UrlEncoded("limit".into(), "25".into()),
        ]))
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;
    let directory = RestDirectory::new(client(&server)?, 25);

    let found = directory.find_participants(" alice ").await?;

    mock.assert_async().await;
    let first = found
        .first()
        .ok_or_else(|| eyre::eyre!("one participant expected"))?;
    eyre::ensure!(first.name() == "alice", "login: {}", first.name());
    eyre::ensure!(
        first.display_name() == Some("Alice Example"),
        "display name"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launch_posts_to_the_default_roster() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let template = server
        .mock("GET", path("workclasses/Approval").as_str())
        .match_query(Matcher::UrlEncoded("POE".into(), "1".into()))
        .with_status(200)
        .with_body(
            json!({
                "systemProperties": {"workObjectNumber": "WOB9"},
                "dataFields": {"Amount": {"type": 1, "mode": 3}}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let launch = server
        .mock(
            "POST",
            path("rosters/DefaultRoster/wc/Approval/wob/WOB9").as_str(),
        )
        .match_query(Matcher::UrlEncoded("POE".into(), "1".into()))
        .match_body(Matcher::PartialJson(json!({
            "dataFields": {"Amount": {"value": 12}}
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let catalog = Arc::new(Catalog::new(
        Vec::<AppSpace>::new(),
        [TemplateRef::new("Approval", "workclasses/Approval")?],
    ));
    let launcher = WorkflowLauncher::new(
        Arc::new(RestProcessEngine::new(client(&server)?)),
        catalog,
    );

    let outcome = launcher
        .launch(&LaunchRequest::new("Approval").with_field("Amount", 12))
        .await?;

    template.assert_async().await;
    launch.assert_async().await;
    let LaunchOutcome::Launched(number) = outcome else {
        eyre::bail!("expected a launch");
    };
    eyre::ensure!(number.as_str() == "WOB9", "number: {}", number.as_str());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn template_without_number_cannot_launch() -> eyre::Result<()> {
    let server = Server::new_async().await;
    let engine = RestProcessEngine::new(client(&server)?);
    let template = WorkflowTemplate::new(
        TemplateRef::new("Approval", "workclasses/Approval")?,
        Step::new(),
    );

    let result = engine.create_instance(&template, &Step::new()).await;

    eyre::ensure!(
        matches!(result, Err(EngineError::Decode(_))),
        "expected a decode error"
    );
    Ok(())
}

//! End-to-end bank-task workflow tests against a mock server

use async_trait::async_trait;
use protocol_core::{Challenge, SyncRequest, TaskReply};
use serde_json::{json, Value};
use session_core::{ChallengeHandler, Error, PollPolicy, Session, SessionConfig, TaskState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves a fixed sequence of poll responses and records each request body.
#[derive(Clone)]
struct ScriptedProgress {
    responses: Arc<Vec<Value>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    hits: Arc<AtomicUsize>,
}

impl ScriptedProgress {
    fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Arc::new(responses),
            bodies: Arc::new(Mutex::new(Vec::new())),
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn body(&self, index: usize) -> Value {
        self.bodies.lock().unwrap()[index].clone()
    }
}

impl Respond for ScriptedProgress {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        self.bodies.lock().unwrap().push(body);
        let index = self.hits.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!({"is_ended": true, "is_erroneous": true}));
        ResponseTemplate::new(200).set_body_json(response)
    }
}

struct PinPad;

#[async_trait]
impl ChallengeHandler for PinPad {
    async fn on_challenge(&self, _challenge: &Challenge) -> Option<TaskReply> {
        Some(TaskReply::pin("1234"))
    }
}

struct DeclineSavePin;

#[async_trait]
impl ChallengeHandler for DeclineSavePin {
    async fn on_challenge(&self, _challenge: &Challenge) -> Option<TaskReply> {
        Some(TaskReply::save_pin(false))
    }
}

struct Abandon;

#[async_trait]
impl ChallengeHandler for Abandon {
    async fn on_challenge(&self, _challenge: &Challenge) -> Option<TaskReply> {
        None
    }
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        initial_interval: Duration::from_millis(1),
        multiplier: 1.0,
        max_interval: Duration::from_millis(2),
    }
}

async fn session_with_task(server: &MockServer) -> (Session, session_core::BankTask) {
    Mock::given(method("POST"))
        .and(path("/rest/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_token": "T1"})))
        .mount(server)
        .await;

    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let session =
        Session::with_config(SessionConfig::new("test-token").with_endpoint(server.uri()))
            .unwrap();
    let task = session.trigger_sync(&SyncRequest::default()).await.unwrap();
    (session, task)
}

async fn mount_start(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/task/start"))
        .and(query_param("id", "T1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn pin_challenge_flow_runs_to_success() {
    let server = MockServer::start().await;
    let (_session, mut task) = session_with_task(&server).await;
    assert_eq!(task.token().as_str(), "T1");
    assert_eq!(task.state(), TaskState::Created);

    mount_start(&server).await;
    let script = ScriptedProgress::new(vec![
        json!({"is_ended": false}),
        json!({
            "is_ended": false,
            "challenge": {"title": "Enter PIN", "label": "PIN", "format": "Text"}
        }),
        json!({"is_ended": true, "is_erroneous": false, "accounts": ["A1.1"]}),
    ]);
    Mock::given(method("POST"))
        .and(path("/task/progress"))
        .and(query_param("id", "T1"))
        .respond_with(script.clone())
        .expect(3)
        .mount(&server)
        .await;

    let status = task.drive(&PinPad, &fast_policy()).await.unwrap();

    assert_eq!(task.state(), TaskState::Succeeded);
    assert!(status.is_ended);
    assert!(!status.is_erroneous);
    assert_eq!(status.accounts.as_deref(), Some(&["A1.1".to_string()][..]));

    assert_eq!(script.hits(), 3);
    assert_eq!(script.body(0), json!({"id": "T1"}));
    assert_eq!(script.body(1), json!({"id": "T1"}));
    assert_eq!(script.body(2), json!({"id": "T1", "pin": "1234"}));
}

#[tokio::test]
async fn boolean_challenge_reply_uses_wire_literals() {
    let server = MockServer::start().await;
    let (_session, mut task) = session_with_task(&server).await;

    mount_start(&server).await;
    let script = ScriptedProgress::new(vec![
        json!({
            "is_ended": false,
            "challenge": {"title": "Store PIN?", "format": "Text"}
        }),
        json!({"is_ended": true, "is_erroneous": false}),
    ]);
    Mock::given(method("POST"))
        .and(path("/task/progress"))
        .respond_with(script.clone())
        .mount(&server)
        .await;

    task.drive(&DeclineSavePin, &fast_policy()).await.unwrap();

    assert_eq!(task.state(), TaskState::Succeeded);
    assert_eq!(script.body(1), json!({"id": "T1", "save_pin": "0"}));
}

#[tokio::test]
async fn erroneous_end_reports_failed_and_seals_the_task() {
    let server = MockServer::start().await;
    let (_session, mut task) = session_with_task(&server).await;

    mount_start(&server).await;
    let script = ScriptedProgress::new(vec![json!({
        "is_ended": true,
        "is_erroneous": true,
        "message": "Login credentials rejected"
    })]);
    Mock::given(method("POST"))
        .and(path("/task/progress"))
        .respond_with(script.clone())
        .mount(&server)
        .await;

    let status = task.drive(&PinPad, &fast_policy()).await.unwrap();

    // The poll itself succeeded; only the task failed.
    assert_eq!(task.state(), TaskState::Failed);
    assert!(status.is_erroneous);
    assert_eq!(status.message.as_deref(), Some("Login credentials rejected"));

    let error = task.poll().await.unwrap_err();
    assert!(matches!(
        error,
        Error::InvalidTaskState {
            from: TaskState::Failed,
            ..
        }
    ));
}

#[tokio::test]
async fn abandoning_a_challenge_cancels_the_task() {
    let server = MockServer::start().await;
    let (_session, mut task) = session_with_task(&server).await;

    mount_start(&server).await;
    let script = ScriptedProgress::new(vec![json!({
        "is_ended": false,
        "challenge": {"title": "Enter TAN", "format": "Text"}
    })]);
    Mock::given(method("POST"))
        .and(path("/task/progress"))
        .respond_with(script.clone())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/task/cancel"))
        .and(query_param("id", "T1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    task.drive(&Abandon, &fast_policy()).await.unwrap();

    assert_eq!(task.state(), TaskState::Cancelled);
    assert_eq!(script.hits(), 1);

    let error = task.cancel().await.unwrap_err();
    assert!(matches!(error, Error::InvalidTaskState { .. }));
}

#[tokio::test]
async fn status_with_challenge_is_not_treated_as_terminal() {
    let server = MockServer::start().await;
    let (_session, mut task) = session_with_task(&server).await;

    mount_start(&server).await;
    let script = ScriptedProgress::new(vec![json!({
        "is_ended": false,
        "challenge": {"title": "Enter PIN", "format": "Text"}
    })]);
    Mock::given(method("POST"))
        .and(path("/task/progress"))
        .respond_with(script.clone())
        .mount(&server)
        .await;

    task.start().await.unwrap();
    let status = task.poll().await.unwrap();

    assert!(status.challenge_pending());
    assert_eq!(task.state(), TaskState::AwaitingResponse);
    assert!(!task.state().is_terminal());
}

#[tokio::test]
async fn explicit_poll_respond_loop_matches_the_driver() {
    let server = MockServer::start().await;
    let (_session, mut task) = session_with_task(&server).await;

    mount_start(&server).await;
    let script = ScriptedProgress::new(vec![
        json!({
            "is_ended": false,
            "challenge": {"title": "Enter TAN", "label": "TAN", "format": "Text"}
        }),
        json!({"is_ended": true, "is_erroneous": false}),
    ]);
    Mock::given(method("POST"))
        .and(path("/task/progress"))
        .respond_with(script.clone())
        .mount(&server)
        .await;

    task.start().await.unwrap();
    let status = task.poll().await.unwrap();
    let challenge = status.challenge.unwrap();
    assert_eq!(challenge.title.as_deref(), Some("Enter TAN"));

    let status = task.respond(TaskReply::challenge("998877")).await.unwrap();
    assert!(status.is_ended);
    assert_eq!(task.state(), TaskState::Succeeded);
    assert_eq!(script.body(1), json!({"id": "T1", "response": "998877"}));
}

//! End-to-end tests for an editor session driving the HTTP judge client.
//!
//! Each test starts an in-process fake judge on an ephemeral port and runs
//! real submissions through `SessionHandle` and `JudgeClient`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use codeplay_core::{
    CompletionOutcome, Config, LanguageRegistry, SessionEvent, SessionHandle, SessionStatus,
    ENV_JUDGE_KEY, ENV_JUDGE_URL, TRANSPORT_FAILURE_TEXT,
};
use codeplay_judge::JudgeClient;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// Scripted judge: answers each submission with the next queued reply.
#[derive(Clone)]
struct FakeJudge {
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    received: Arc<Mutex<Vec<Value>>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeJudge {
    fn new(replies: &[(StatusCode, &str)]) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                replies
                    .iter()
                    .map(|(status, body)| (*status, (*body).to_string()))
                    .collect(),
            )),
            received: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Holds every answer until the returned semaphore gets a permit.
    fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    fn received(&self) -> Vec<Value> {
        self.received.lock().expect("lock poisoned").clone()
    }
}

async fn submissions(
    State(judge): State<FakeJudge>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    judge.received.lock().expect("lock poisoned").push(body);

    if let Some(gate) = &judge.gate {
        gate.acquire().await.expect("gate closed").forget();
    }

    judge
        .replies
        .lock()
        .expect("lock poisoned")
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "no scripted reply".to_string()))
}

/// Spawns the fake judge and returns its submissions URL.
async fn spawn_judge(judge: FakeJudge) -> String {
    let router = Router::new()
        .route("/submissions", post(submissions))
        .with_state(judge);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    format!("http://{addr}/submissions")
}

/// Builds a session handle wired to the judge at `endpoint`.
fn open_session(endpoint: &str) -> SessionHandle<JudgeClient> {
    let mut config = Config::default();
    config.apply_env_overrides(|name| match name {
        ENV_JUDGE_URL => Some(endpoint.to_string()),
        ENV_JUDGE_KEY => Some("test-key".to_string()),
        _ => None,
    });
    config.validate().expect("config should be valid");

    let client = JudgeClient::new(&config.judge).expect("Failed to build client");
    let registry = LanguageRegistry::builtin().expect("builtin catalog");
    SessionHandle::open(registry, Arc::new(client), &config).expect("Failed to open session")
}

async fn finish(run: tokio::task::JoinHandle<CompletionOutcome>) -> CompletionOutcome {
    timeout(Duration::from_secs(5), run)
        .await
        .expect("Timeout waiting for run")
        .expect("Run task panicked")
}

#[tokio::test]
async fn test_python_run_shows_stdout() {
    let judge = FakeJudge::new(&[(
        StatusCode::CREATED,
        r#"{"stdout":"Enter your name: Hello, Ada!\n","stderr":null,"compile_output":null}"#,
    )]);
    let endpoint = spawn_judge(judge.clone()).await;
    let session = open_session(&endpoint);

    session.edit_stdin("Ada").await;
    let outcome = finish(session.run_submit().await.expect("submit")).await;

    assert_eq!(outcome, CompletionOutcome::Applied);
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.last_output, "Enter your name: Hello, Ada!\n");
    assert_eq!(snapshot.status, SessionStatus::Idle);

    let received = judge.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["language_id"], 71);
    assert_eq!(received[0]["stdin"], "Ada");
    assert_eq!(received[0]["source_code"], snapshot.source_text.as_str());
}

#[tokio::test]
async fn test_javascript_run_sends_no_stdin() {
    let judge = FakeJudge::new(&[(StatusCode::OK, r#"{"stdout":"Hello, World!\n"}"#)]);
    let endpoint = spawn_judge(judge.clone()).await;
    let session = open_session(&endpoint);

    session.select_language("63").await.expect("JavaScript is builtin");
    assert!(!session.snapshot().await.requires_stdin);
    session.edit_stdin("unused").await;
    finish(session.run_submit().await.expect("submit")).await;

    let received = judge.received();
    assert_eq!(received[0]["language_id"], 63);
    assert_eq!(received[0]["stdin"], "");
}

#[tokio::test]
async fn test_compile_error_shown_verbatim() {
    let diagnostics = "main.cpp: In function 'int main()':\nmain.cpp:4:5: error: expected ';'\n";
    let body = serde_json::json!({
        "stdout": null,
        "compile_output": diagnostics,
        "stderr": null,
        "status": {"id": 6, "description": "Compilation Error"}
    })
    .to_string();
    let judge = FakeJudge::new(&[(StatusCode::OK, body.as_str())]);
    let endpoint = spawn_judge(judge).await;
    let session = open_session(&endpoint);

    session.select_language("54").await.expect("C++ is builtin");
    session.edit_source("int main() { return 0 }").await;
    let mut events = session.subscribe();
    finish(session.run_submit().await.expect("submit")).await;

    assert_eq!(session.snapshot().await.last_output, diagnostics);

    let mut applied = None;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::OutputApplied { outcome, .. } = event {
            applied = Some(outcome);
        }
    }
    assert_eq!(applied.as_deref(), Some("compile_error"));
}

#[tokio::test]
async fn test_judge_outage_is_reported_in_output() {
    let judge = FakeJudge::new(&[(StatusCode::INTERNAL_SERVER_ERROR, "boom")]);
    let endpoint = spawn_judge(judge).await;
    let session = open_session(&endpoint);

    let outcome = finish(session.run_submit().await.expect("submit")).await;

    assert_eq!(outcome, CompletionOutcome::Applied);
    let snapshot = session.snapshot().await;
    assert!(snapshot.last_output.starts_with(TRANSPORT_FAILURE_TEXT));
    assert!(snapshot.last_output.contains("500"));
    assert_eq!(snapshot.status, SessionStatus::Idle);

    // The session accepts another run after a failure.
    assert!(session.run_submit().await.is_ok());
}

#[tokio::test]
async fn test_language_switch_discards_in_flight_result() {
    let (judge, gate) =
        FakeJudge::new(&[(StatusCode::OK, r#"{"stdout":"late python output"}"#)]).gated();
    let endpoint = spawn_judge(judge.clone()).await;
    let session = open_session(&endpoint);

    let run = session.run_submit().await.expect("submit");
    assert!(session.run_submit().await.is_err());

    session.select_language("60").await.expect("Go is builtin");
    let go_source = session.snapshot().await.source_text;
    gate.add_permits(1);

    assert_eq!(finish(run).await, CompletionOutcome::Discarded);

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.selected_language.as_str(), "60");
    assert_eq!(snapshot.source_text, go_source);
    assert!(snapshot.last_output.is_empty());
    assert_eq!(snapshot.status, SessionStatus::Idle);
    assert_eq!(judge.received().len(), 1);
}

//! End-to-end runs of the built-in suite against an in-process reqres stub.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apicheck_application::{ExecuteCheck, RunSuite};
use apicheck_domain::{
    Assertion, Check, CheckError, CheckSuite, RequestSpec, RunSummary, RunnerSettings,
};
use apicheck_infrastructure::{
    JsonAssertionEvaluator, ReqwestHttpClient, SystemClock, builtin_suite,
};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct StubState {
    /// `METHOD path` of every request, in arrival order.
    requests: Arc<Mutex<Vec<String>>>,
    /// `x-api-key` header of every request that carried one.
    api_keys: Arc<Mutex<Vec<String>>>,
}

impl StubState {
    fn record(&self, line: String, headers: &HeaderMap) {
        self.requests.lock().unwrap().push(line);
        if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
            self.api_keys.lock().unwrap().push(key.to_string());
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
}

fn missing_password() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": "Missing password"}))).into_response()
}

fn user(id: u64) -> Value {
    let (email, first, last) = match id {
        7 => ("michael.lawson@reqres.in", "Michael", "Lawson"),
        8 => ("lindsay.ferguson@reqres.in", "Lindsay", "Ferguson"),
        _ => ("janet.weaver@reqres.in", "Janet", "Weaver"),
    };
    json!({
        "id": id,
        "email": email,
        "first_name": first,
        "last_name": last,
        "avatar": format!("https://reqres.in/img/faces/{id}-image.jpg"),
    })
}

fn resource() -> Value {
    json!({
        "id": 2,
        "name": "fuchsia rose",
        "year": 2001,
        "color": "#C74375",
        "pantone_value": "17-2031"
    })
}

fn echo(body: Map<String, Value>, stamp: &str) -> Map<String, Value> {
    let mut out = body;
    out.insert(
        stamp.to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    out
}

async fn list_users(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record("GET /api/users".to_string(), &headers);
    let page: u64 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    Json(json!({"page": page, "data": [user(7), user(8)]}))
}

async fn create_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    state.record("POST /api/users".to_string(), &headers);
    let mut created = echo(body, "createdAt");
    created.insert("id".to_string(), json!("742"));
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn get_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.record(format!("GET /api/users/{id}"), &headers);
    if id == 2 {
        Json(json!({"data": user(2)})).into_response()
    } else {
        not_found()
    }
}

async fn update_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Map<String, Value>>,
) -> Json<Map<String, Value>> {
    state.record(format!("PUT /api/users/{id}"), &headers);
    Json(echo(body, "updatedAt"))
}

async fn patch_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Map<String, Value>>,
) -> Json<Map<String, Value>> {
    state.record(format!("PATCH /api/users/{id}"), &headers);
    Json(echo(body, "updatedAt"))
}

async fn delete_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> StatusCode {
    state.record(format!("DELETE /api/users/{id}"), &headers);
    StatusCode::NO_CONTENT
}

async fn list_resources(State(state): State<StubState>, headers: HeaderMap) -> Json<Value> {
    state.record("GET /api/unknown".to_string(), &headers);
    Json(json!({"page": 1, "data": [resource()]}))
}

async fn get_resource(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.record(format!("GET /api/unknown/{id}"), &headers);
    if id == 2 {
        Json(json!({"data": resource()})).into_response()
    } else {
        not_found()
    }
}

async fn register(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    state.record("POST /api/register".to_string(), &headers);
    if body.contains_key("password") {
        Json(json!({"id": 4, "token": "QpwL5tke4Pnpja7X4"})).into_response()
    } else {
        missing_password()
    }
}

async fn login(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    state.record("POST /api/login".to_string(), &headers);
    if body.contains_key("password") {
        Json(json!({"token": "QpwL5tke4Pnpja7X4"})).into_response()
    } else {
        missing_password()
    }
}

/// Answers long after any sane check timeout.
async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"data": []}))
}

/// Serves the reqres endpoints under `/api` on an ephemeral port.
async fn spawn_stub() -> (String, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .route("/api/unknown", get(list_resources))
        .route("/api/unknown/{id}", get(get_resource))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/slow", get(slow))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), state)
}

fn settings(base_url: &str) -> RunnerSettings {
    RunnerSettings {
        base_url: base_url.to_string(),
        timeout_ms: 5_000,
        api_key: Some("reqres-free-v1".to_string()),
        ..RunnerSettings::default()
    }
}

async fn run(settings: &RunnerSettings, suite: &CheckSuite) -> RunSummary {
    let client = Arc::new(ReqwestHttpClient::from_settings(settings).unwrap());
    let execute = ExecuteCheck::new(client, Arc::new(JsonAssertionEvaluator::new()))
        .with_stop_on_failure(settings.stop_on_failure);
    RunSuite::new(execute, Arc::new(SystemClock::new()))
        .with_concurrency(settings.concurrency)
        .run(suite)
        .await
}

fn describe_failures(summary: &RunSummary) -> String {
    summary
        .failures()
        .map(|r| format!("{}: {:?}", r.name, r.failures))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn builtin_suite_passes_against_stub() {
    let (base_url, state) = spawn_stub().await;
    let suite = builtin_suite().unwrap();

    let summary = run(&settings(&base_url), &suite).await;

    assert!(summary.all_passed(), "{}", describe_failures(&summary));
    assert_eq!(summary.total, 15);
    assert_eq!(summary.passed, 15);
    assert_eq!(state.requests.lock().unwrap().len(), 15);
}

#[tokio::test]
async fn credentials_are_sent_with_every_request() {
    let (base_url, state) = spawn_stub().await;
    let suite = builtin_suite().unwrap();

    run(&settings(&base_url), &suite).await;

    let keys = state.api_keys.lock().unwrap().clone();
    assert_eq!(keys.len(), 15);
    assert!(keys.iter().all(|k| k == "reqres-free-v1"));
}

#[tokio::test]
async fn concurrent_run_keeps_order_and_mutation_sequence() {
    let (base_url, state) = spawn_stub().await;
    let suite = builtin_suite().unwrap();
    let settings = RunnerSettings {
        concurrency: 4,
        ..settings(&base_url)
    };

    let summary = run(&settings, &suite).await;

    assert!(summary.all_passed(), "{}", describe_failures(&summary));
    let expected: Vec<_> = suite.checks().map(|c| c.name.clone()).collect();
    let actual: Vec<_> = summary.results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(actual, expected);

    let requests = state.requests.lock().unwrap().clone();
    let position = |line: &str| requests.iter().position(|r| r == line).unwrap();
    assert!(position("POST /api/users") < position("PUT /api/users/2"));
    assert!(position("PUT /api/users/2") < position("PATCH /api/users/2"));
    assert!(position("PATCH /api/users/2") < position("DELETE /api/users/2"));
}

#[tokio::test]
async fn repeated_get_checks_are_idempotent() {
    let (base_url, _state) = spawn_stub().await;
    let suite = builtin_suite().unwrap();
    let reads = suite
        .checks()
        .filter(|c| c.request.method.is_read_only())
        .fold(CheckSuite::new("reads"), |acc, check| {
            acc.with_check(check.clone())
        });

    let first = run(&settings(&base_url), &reads).await;
    let second = run(&settings(&base_url), &reads).await;

    assert_eq!(first.total, 7);
    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.status, b.status);
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.assertions.len(), b.assertions.len());
    }
}

#[tokio::test]
async fn contract_violations_are_reported_with_details() {
    let (base_url, _state) = spawn_stub().await;
    let suite = CheckSuite::new("drift")
        .with_check(
            Check::new("wrong user", RequestSpec::get("/users/2"))
                .with_assertion(Assertion::status(200))
                .with_assertion(Assertion::equals("$.data.id", 3))
                .with_assertion(Assertion::has_key("$.data.phone")),
        )
        .with_check(
            Check::new("untolerated 404", RequestSpec::get("/users/23"))
                .with_assertion(Assertion::status(404)),
        )
        .with_check(
            Check::new("still runs", RequestSpec::get("/unknown/2"))
                .with_assertion(Assertion::status(200)),
        );

    let summary = run(&settings(&base_url), &suite).await;

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 2);

    let wrong = &summary.results[0];
    assert_eq!(
        wrong.error,
        Some(CheckError::AssertionMismatch {
            failed: 2,
            total: 3
        })
    );
    assert_eq!(
        wrong.failures[0],
        "$.data.id equals 3: value mismatch (expected 3, actual 2)"
    );

    let untolerated = &summary.results[1];
    assert_eq!(
        untolerated.error,
        Some(CheckError::UnexpectedStatus {
            actual: 404,
            body: "{}".to_string()
        })
    );
    assert!(untolerated.assertions.is_empty());
}

#[tokio::test]
async fn timeout_fails_only_the_slow_check() {
    let (base_url, _state) = spawn_stub().await;
    let suite = CheckSuite::new("timeouts")
        .with_check(
            Check::new("slow endpoint", RequestSpec::get("/slow"))
                .with_assertion(Assertion::status(200)),
        )
        .with_check(
            Check::new("single user", RequestSpec::get("/users/2"))
                .with_assertion(Assertion::equals("$.data.id", 2)),
        );
    let settings = RunnerSettings {
        timeout_ms: 300,
        ..settings(&base_url)
    };

    let summary = run(&settings, &suite).await;

    let slow = &summary.results[0];
    assert!(!slow.passed);
    assert_eq!(slow.status, None);
    match &slow.error {
        Some(CheckError::Network { message }) => {
            assert!(message.contains("timed out"), "{message}");
        }
        other => panic!("expected a network error, got {other:?}"),
    }
    assert!(summary.results[1].passed, "{}", describe_failures(&summary));
}

#[tokio::test]
async fn unreachable_server_fails_each_check_without_aborting() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .unwrap()
        .port();
    let suite = builtin_suite().unwrap();

    let summary = run(&settings(&format!("http://127.0.0.1:{port}/api")), &suite).await;

    assert_eq!(summary.total, 15);
    assert_eq!(summary.failed, 15);
    assert!(
        summary
            .results
            .iter()
            .all(|r| matches!(r.error, Some(CheckError::Network { .. })))
    );
}

#[tokio::test]
#[ignore = "hits the public reqres.in API"]
async fn builtin_suite_passes_against_reqres_in() {
    let settings = RunnerSettings {
        api_key: std::env::var("APICHECK_API_KEY").ok(),
        ..RunnerSettings::default()
    };
    let summary = run(&settings, &builtin_suite().unwrap()).await;
    assert!(summary.all_passed(), "{}", describe_failures(&summary));
}

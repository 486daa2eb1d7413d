//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::{Mutex, watch};
use tower::ServiceExt;
use trivia_core::catalog::QuizCatalog;
use trivia_core::clock::Clock;
use trivia_core::ledger::ScoreLedger;
use trivia_scoreboard::refresher::Scoreboard;
use trivia_session::application::narration::NoNarration;
use trivia_session::application::timer_driver::TimerDriver;
use trivia_session::domain::session::{QuizSession, SessionSettings};
use trivia_session::domain::tracker::AnsweredTracker;
use trivia_test_support::{FixedClock, MemoryProgressStore};
use uuid::Uuid;

use trivia_api::routes;
use trivia_api::state::AppState;

/// Countdown used by every test session.
pub const TEST_TIMER_SECONDS: u32 = 2;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over in-memory collaborators. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app(catalog: Arc<dyn QuizCatalog>, ledger: Arc<dyn ScoreLedger>) -> Router {
    let clock = fixed_clock();
    let tracker = AnsweredTracker::open(Arc::new(MemoryProgressStore::new()));
    let session = QuizSession::new(
        Uuid::new_v4(),
        SessionSettings {
            default_timer_seconds: TEST_TIMER_SECONDS,
        },
        tracker,
    );
    let driver = TimerDriver::new(Arc::clone(&clock), Arc::new(NoNarration));
    let (_sender, scoreboard) = watch::channel(Scoreboard::default());
    let app_state = AppState::new(
        Arc::new(Mutex::new(session)),
        Arc::new(driver),
        catalog,
        ledger,
        clock,
        scoreboard,
        Duration::from_secs(1),
    );

    routes::api_router().with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

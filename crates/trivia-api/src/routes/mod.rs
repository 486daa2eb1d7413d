//! Route modules and the assembled API router.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod scoreboard;
pub mod session;

/// All routes. The moderator API lives under `/api/v1`; `/health` is also
/// served at the root for probes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1", health::router())
        .nest("/api/v1/session", session::router())
        .nest("/api/v1/scoreboard", scoreboard::router())
}

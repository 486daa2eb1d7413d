//! Scoreboard routes.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::instrument;
use trivia_core::error::DomainError;
use trivia_core::model::CategoryId;
use trivia_scoreboard::aggregator::{RankedStanding, aggregate_by_category, rank};
use trivia_scoreboard::refresher::Scoreboard;

use crate::error::ApiError;
use crate::state::AppState;

/// Standings restricted to one category.
#[derive(Debug, Serialize)]
pub struct CategoryScoreboard {
    /// The category.
    pub category_id: CategoryId,
    /// Ranked standings.
    pub standings: Vec<RankedStanding>,
}

/// GET /
async fn overall(State(state): State<AppState>) -> Json<Scoreboard> {
    Json(state.scoreboard.borrow().clone())
}

/// GET /categories/{category_id}
#[instrument(skip(state))]
async fn by_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<CategoryScoreboard>, ApiError> {
    let roster = {
        let session = state.session.lock().await;
        let catalog = session.catalog();
        if !catalog.categories.iter().any(|c| c.id == category_id) {
            return Err(DomainError::not_found("category", category_id).into());
        }
        catalog.teams.clone()
    };

    let records = tokio::time::timeout(state.ledger_timeout, state.ledger.fetch_scores())
        .await
        .unwrap_or(Err(DomainError::LedgerTimeout(state.ledger_timeout)))?;

    Ok(Json(CategoryScoreboard {
        category_id,
        standings: rank(aggregate_by_category(&records, &roster, category_id)),
    }))
}

/// Returns the router for scoreboards.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(overall))
        .route("/categories/{category_id}", get(by_category))
}

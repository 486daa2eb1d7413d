//! Routes for moderating the live quiz session.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use trivia_core::event::DomainEvent;
use trivia_core::model::{CategoryId, QuestionId, TeamId};
use uuid::Uuid;

use trivia_session::application::command_handlers::{self, SessionCommandResult};
use trivia_session::application::query_handlers::{
    self, CategorySummary, NextSuggestion, QuestionView, SessionView, TeamView,
};
use trivia_session::domain::commands;
use trivia_session::domain::planner::RotationOutcome;
use trivia_session::domain::session::LoadNotice;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /select-category.
#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    /// The category to rotate through.
    pub category_id: CategoryId,
}

/// Request body for POST /begin.
#[derive(Debug, Deserialize)]
pub struct BeginQuestionRequest {
    /// The team being asked.
    pub team_id: TeamId,
    /// The question to present.
    pub question_id: QuestionId,
}

/// Request body for POST /award.
#[derive(Debug, Default, Deserialize)]
pub struct AwardPointsRequest {
    /// The team to credit; omitted means the team that was asked.
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

/// Request body for POST /reset-category.
#[derive(Debug, Deserialize)]
pub struct ResetCategoryRequest {
    /// The category whose progress is cleared.
    pub category_id: CategoryId,
}

/// Request body for POST /reset.
#[derive(Debug, Default, Deserialize)]
pub struct ResetCompetitionRequest {
    /// Also drop the stored roster snapshot.
    #[serde(default)]
    pub forget_roster: bool,
}

/// Query string for GET /available-questions.
#[derive(Debug, Deserialize)]
pub struct AvailableQuestionsQuery {
    /// The selected category.
    pub category_id: CategoryId,
}

/// One event recorded while handling a command.
#[derive(Debug, Serialize)]
pub struct EventSummary {
    /// Event identifier.
    pub event_id: Uuid,
    /// Event type identifier.
    pub event_type: &'static str,
    /// Position in the session's event sequence.
    pub sequence_number: i64,
    /// Event payload.
    pub payload: serde_json::Value,
}

/// The question handed to the countdown by POST /begin.
#[derive(Debug, Serialize)]
pub struct PresentationView {
    /// Presentation generation.
    pub generation: u64,
    /// The team being asked.
    pub team_id: TeamId,
    /// The question presented.
    pub question_id: QuestionId,
    /// Countdown length.
    pub countdown_seconds: u32,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The session the command ran against.
    pub session_id: Uuid,
    /// Events recorded by the command.
    pub events: Vec<EventSummary>,
    /// Rotation state after a judgment.
    pub rotation: Option<RotationOutcome>,
    /// Set by POST /begin.
    pub presentation: Option<PresentationView>,
    /// Non-fatal load problems.
    pub notices: Vec<LoadNotice>,
}

impl From<SessionCommandResult> for CommandResponse {
    fn from(result: SessionCommandResult) -> Self {
        Self {
            session_id: result.session_id,
            events: result
                .events
                .iter()
                .map(|event| EventSummary {
                    event_id: event.metadata().event_id,
                    event_type: event.event_type(),
                    sequence_number: event.metadata().sequence_number,
                    payload: event.to_payload(),
                })
                .collect(),
            rotation: result.rotation,
            presentation: result.presentation.map(|p| PresentationView {
                generation: p.generation,
                team_id: p.team_id,
                question_id: p.question.id,
                countdown_seconds: p.countdown_seconds,
            }),
            notices: result.notices,
        }
    }
}

/// POST /load
#[instrument(skip(state))]
async fn load_catalog(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::LoadCatalog {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling load_catalog command");

    let result = command_handlers::handle_load_catalog(
        &command,
        &state.session,
        state.catalog.as_ref(),
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /select-category
#[instrument(skip(state, request), fields(category_id = %request.category_id))]
async fn select_category(
    State(state): State<AppState>,
    Json(request): Json<SelectCategoryRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SelectCategory {
        correlation_id: Uuid::new_v4(),
        category_id: request.category_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_category command");

    let result = command_handlers::handle_select_category(
        &command,
        &state.session,
        state.catalog.as_ref(),
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /begin
#[instrument(
    skip(state, request),
    fields(team_id = %request.team_id, question_id = %request.question_id)
)]
async fn begin_question(
    State(state): State<AppState>,
    Json(request): Json<BeginQuestionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::BeginQuestion {
        correlation_id: Uuid::new_v4(),
        team_id: request.team_id,
        question_id: request.question_id,
    };

    info!(correlation_id = %command.correlation_id, "handling begin_question command");

    let result = command_handlers::handle_begin_question(
        &command,
        &state.session,
        &state.driver,
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /stop
#[instrument(skip(state))]
async fn stop_timer(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::StopTimer {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling stop_timer command");

    let result = command_handlers::handle_stop_timer(
        &command,
        &state.session,
        &state.driver,
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /cancel
#[instrument(skip(state))]
async fn cancel_question(
    State(state): State<AppState>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CancelQuestion {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling cancel_question command");

    let result = command_handlers::handle_cancel_question(
        &command,
        &state.session,
        &state.driver,
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /award
#[instrument(skip(state, request), fields(team_id = ?request.team_id))]
async fn award_points(
    State(state): State<AppState>,
    Json(request): Json<AwardPointsRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AwardPoints {
        correlation_id: Uuid::new_v4(),
        team_id: request.team_id,
    };

    info!(correlation_id = %command.correlation_id, "handling award_points command");

    let result = command_handlers::handle_award_points(
        &command,
        &state.session,
        state.ledger.as_ref(),
        state.clock.as_ref(),
        state.ledger_timeout,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /wrong
#[instrument(skip(state))]
async fn mark_wrong(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::MarkWrong {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling mark_wrong command");

    let result = command_handlers::handle_mark_wrong(
        &command,
        &state.session,
        state.ledger.as_ref(),
        state.clock.as_ref(),
        state.ledger_timeout,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /reset-category
#[instrument(skip(state, request), fields(category_id = %request.category_id))]
async fn reset_category(
    State(state): State<AppState>,
    Json(request): Json<ResetCategoryRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ResetCategory {
        correlation_id: Uuid::new_v4(),
        category_id: request.category_id,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_category command");

    let result =
        command_handlers::handle_reset_category(&command, &state.session, state.clock.as_ref())
            .await?;

    Ok(Json(result.into()))
}

/// POST /reset
#[instrument(skip(state, request), fields(forget_roster = request.forget_roster))]
async fn reset_competition(
    State(state): State<AppState>,
    Json(request): Json<ResetCompetitionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ResetCompetition {
        correlation_id: Uuid::new_v4(),
        forget_roster: request.forget_roster,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_competition command");

    let result = command_handlers::handle_reset_competition(
        &command,
        &state.session,
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// GET /
async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(query_handlers::get_session(&state.session).await)
}

/// GET /categories
async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategorySummary>> {
    Json(query_handlers::list_categories(&state.session).await)
}

/// GET /teams
async fn list_teams(State(state): State<AppState>) -> Json<Vec<TeamView>> {
    Json(query_handlers::list_teams(&state.session).await)
}

/// GET /available-questions?category_id=
async fn available_questions(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuestionsQuery>,
) -> Result<Json<Vec<QuestionView>>, ApiError> {
    let questions =
        query_handlers::get_available_questions(&state.session, query.category_id).await?;
    Ok(Json(questions))
}

/// GET /next
async fn next_suggestion(State(state): State<AppState>) -> Json<Option<NextSuggestion>> {
    Json(query_handlers::get_next_suggestion(&state.session).await)
}

/// Returns the router for the quiz session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/categories", get(list_categories))
        .route("/teams", get(list_teams))
        .route("/available-questions", get(available_questions))
        .route("/next", get(next_suggestion))
        .route("/load", post(load_catalog))
        .route("/select-category", post(select_category))
        .route("/begin", post(begin_question))
        .route("/stop", post(stop_timer))
        .route("/cancel", post(cancel_question))
        .route("/award", post(award_points))
        .route("/wrong", post(mark_wrong))
        .route("/reset-category", post(reset_category))
        .route("/reset", post(reset_competition))
}

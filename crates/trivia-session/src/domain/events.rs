//! Session events observed by the moderator UI.

use serde::{Deserialize, Serialize};
use tracing::warn;
use trivia_core::event::{DomainEvent, EventMetadata};
use trivia_core::model::{CategoryId, QuestionId, TeamId};

/// Emitted when the catalog is (re)loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogLoaded {
    /// Number of categories loaded.
    pub categories: usize,
    /// Number of teams loaded.
    pub teams: usize,
    /// Number of questions loaded.
    pub questions: usize,
    /// Number of non-fatal load notices raised.
    pub notices: usize,
}

/// Emitted when a category is chosen for rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySelected {
    /// The selected category.
    pub category_id: CategoryId,
}

/// Emitted when a question is put in front of a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPresented {
    /// The category of the question.
    pub category_id: CategoryId,
    /// The team being asked.
    pub team_id: TeamId,
    /// The question.
    pub question_id: QuestionId,
    /// The countdown the team gets.
    pub countdown_seconds: u32,
}

/// Emitted when the countdown starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStarted {
    /// The question being timed.
    pub question_id: QuestionId,
    /// Countdown length.
    pub duration_seconds: u32,
}

/// Emitted when the countdown reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerExpired {
    /// The question that ran out of time.
    pub question_id: QuestionId,
}

/// Emitted when the answer is shown and judging opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRevealed {
    /// The revealed question.
    pub question_id: QuestionId,
    /// `true` when the moderator stopped the countdown early.
    pub manual: bool,
}

/// Emitted after the ledger accepted an award.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsAwarded {
    /// The team credited.
    pub team_id: TeamId,
    /// The question.
    pub question_id: QuestionId,
    /// Points credited.
    pub points: u32,
}

/// Emitted when the ledger rejected or did not answer an award request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardFailed {
    /// The team that was to be credited.
    pub team_id: TeamId,
    /// The question.
    pub question_id: QuestionId,
    /// Why the award failed.
    pub reason: String,
}

/// Emitted when a question is judged incorrect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerMarkedWrong {
    /// The team that answered.
    pub team_id: TeamId,
    /// The question.
    pub question_id: QuestionId,
}

/// Emitted when the moderator leaves a question without judging it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAbandoned {
    /// The question left unanswered.
    pub question_id: QuestionId,
}

/// Emitted when the last question of a category is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryExhausted {
    /// The exhausted category.
    pub category_id: CategoryId,
}

/// Emitted when one category's progress is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReset {
    /// The reset category.
    pub category_id: CategoryId,
}

/// Event type identifier for [`CatalogLoaded`].
pub const CATALOG_LOADED_EVENT_TYPE: &str = "trivia.catalog_loaded";
/// Event type identifier for [`CategorySelected`].
pub const CATEGORY_SELECTED_EVENT_TYPE: &str = "trivia.category_selected";
/// Event type identifier for [`QuestionPresented`].
pub const QUESTION_PRESENTED_EVENT_TYPE: &str = "trivia.question_presented";
/// Event type identifier for [`TimerStarted`].
pub const TIMER_STARTED_EVENT_TYPE: &str = "trivia.timer_started";
/// Event type identifier for [`TimerExpired`].
pub const TIMER_EXPIRED_EVENT_TYPE: &str = "trivia.timer_expired";
/// Event type identifier for [`AnswerRevealed`].
pub const ANSWER_REVEALED_EVENT_TYPE: &str = "trivia.answer_revealed";
/// Event type identifier for [`PointsAwarded`].
pub const POINTS_AWARDED_EVENT_TYPE: &str = "trivia.points_awarded";
/// Event type identifier for [`AwardFailed`].
pub const AWARD_FAILED_EVENT_TYPE: &str = "trivia.award_failed";
/// Event type identifier for [`AnswerMarkedWrong`].
pub const ANSWER_MARKED_WRONG_EVENT_TYPE: &str = "trivia.answer_marked_wrong";
/// Event type identifier for [`QuestionAbandoned`].
pub const QUESTION_ABANDONED_EVENT_TYPE: &str = "trivia.question_abandoned";
/// Event type identifier for [`CategoryExhausted`].
pub const CATEGORY_EXHAUSTED_EVENT_TYPE: &str = "trivia.category_exhausted";
/// Event type identifier for [`CategoryReset`].
pub const CATEGORY_RESET_EVENT_TYPE: &str = "trivia.category_reset";
/// Event type identifier for `SessionEventKind::CompetitionReset`.
pub const COMPETITION_RESET_EVENT_TYPE: &str = "trivia.competition_reset";

/// Event payload variants for a quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The catalog was loaded.
    CatalogLoaded(CatalogLoaded),
    /// A category was selected.
    CategorySelected(CategorySelected),
    /// A question was presented.
    QuestionPresented(QuestionPresented),
    /// The countdown started.
    TimerStarted(TimerStarted),
    /// The countdown expired.
    TimerExpired(TimerExpired),
    /// The answer was revealed.
    AnswerRevealed(AnswerRevealed),
    /// Points were awarded.
    PointsAwarded(PointsAwarded),
    /// An award failed and may be retried.
    AwardFailed(AwardFailed),
    /// The answer was judged wrong.
    AnswerMarkedWrong(AnswerMarkedWrong),
    /// The question was left without judging.
    QuestionAbandoned(QuestionAbandoned),
    /// The category has no questions left.
    CategoryExhausted(CategoryExhausted),
    /// One category's progress was cleared.
    CategoryReset(CategoryReset),
    /// All progress was cleared.
    CompetitionReset,
}

/// Event envelope for a quiz session.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

/// Maps a payload to its event type identifier.
#[must_use]
pub fn event_type_of(kind: &SessionEventKind) -> &'static str {
    match kind {
        SessionEventKind::CatalogLoaded(_) => CATALOG_LOADED_EVENT_TYPE,
        SessionEventKind::CategorySelected(_) => CATEGORY_SELECTED_EVENT_TYPE,
        SessionEventKind::QuestionPresented(_) => QUESTION_PRESENTED_EVENT_TYPE,
        SessionEventKind::TimerStarted(_) => TIMER_STARTED_EVENT_TYPE,
        SessionEventKind::TimerExpired(_) => TIMER_EXPIRED_EVENT_TYPE,
        SessionEventKind::AnswerRevealed(_) => ANSWER_REVEALED_EVENT_TYPE,
        SessionEventKind::PointsAwarded(_) => POINTS_AWARDED_EVENT_TYPE,
        SessionEventKind::AwardFailed(_) => AWARD_FAILED_EVENT_TYPE,
        SessionEventKind::AnswerMarkedWrong(_) => ANSWER_MARKED_WRONG_EVENT_TYPE,
        SessionEventKind::QuestionAbandoned(_) => QUESTION_ABANDONED_EVENT_TYPE,
        SessionEventKind::CategoryExhausted(_) => CATEGORY_EXHAUSTED_EVENT_TYPE,
        SessionEventKind::CategoryReset(_) => CATEGORY_RESET_EVENT_TYPE,
        SessionEventKind::CompetitionReset => COMPETITION_RESET_EVENT_TYPE,
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        event_type_of(&self.kind)
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_else(|err| {
            warn!(error = %err, event_type = self.event_type(), "event payload not serializable");
            serde_json::Value::Null
        })
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

//! Query handlers for the trivia session.
//!
//! Read-only view DTOs built from a snapshot of the shared session.

use serde::Serialize;
use trivia_core::error::DomainError;
use trivia_core::model::{CategoryId, Question, QuestionId, TeamId};
use uuid::Uuid;

use super::timer_driver::SharedSession;
use crate::domain::planner::{SelectionPhase, SessionSelection};
use crate::domain::session::{LoadNotice, QuizSession, questions_of};
use crate::domain::timer::TimerState;

/// Countdown snapshot.
#[derive(Debug, Serialize)]
pub struct TimerView {
    /// Timer state.
    pub state: TimerState,
    /// Seconds left.
    pub remaining_seconds: u32,
    /// Countdown length.
    pub duration_seconds: u32,
}

/// A question as shown to the moderator. The answer is only included once
/// revealed.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    /// The question identifier.
    pub id: QuestionId,
    /// Its category.
    pub category_id: CategoryId,
    /// Question text.
    pub text: String,
    /// Multiple-choice options, empty for open questions.
    pub options: Vec<String>,
    /// Points for a correct answer.
    pub points: u32,
    /// The answer, once revealed.
    pub answer: Option<String>,
}

impl QuestionView {
    fn hidden(question: &Question) -> Self {
        Self {
            id: question.id,
            category_id: question.category_id,
            text: question.text.clone(),
            options: question.options.clone(),
            points: question.points,
            answer: None,
        }
    }

    fn revealed(question: &Question) -> Self {
        Self {
            answer: Some(question.answer.clone()),
            ..Self::hidden(question)
        }
    }
}

/// Read-only view of the session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Selected category, team, question and phase.
    pub selection: Option<SessionSelection>,
    /// The question presented or revealed.
    pub active_question: Option<QuestionView>,
    /// The countdown.
    pub timer: TimerView,
    /// Whether a judgment can be recorded now.
    pub judging_open: bool,
    /// Set after the last question of this category was consumed.
    pub exhausted_category_id: Option<CategoryId>,
    /// Problems met at the last catalog load.
    pub notices: Vec<LoadNotice>,
}

/// Per-category progress.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    /// The category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Questions in the category.
    pub total_questions: usize,
    /// Questions already consumed.
    pub answered_questions: usize,
    /// Whether every question is consumed.
    pub complete: bool,
}

/// A roster entry.
#[derive(Debug, Serialize)]
pub struct TeamView {
    /// The team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Countdown this team gets.
    pub countdown_seconds: u32,
}

/// The proposed next pair.
#[derive(Debug, Serialize)]
pub struct NextSuggestion {
    /// The team with the fewest turns.
    pub team_id: TeamId,
    /// Its name.
    pub team_name: String,
    /// The first available question.
    pub question: QuestionView,
}

fn session_view(session: &QuizSession) -> SessionView {
    let selection = session.selection();
    let revealed = selection.is_some_and(|s| s.phase == SelectionPhase::Revealed);
    let active_question = session.active_question().map(|q| {
        if revealed {
            QuestionView::revealed(q)
        } else {
            QuestionView::hidden(q)
        }
    });
    SessionView {
        session_id: session.id(),
        selection,
        active_question,
        timer: TimerView {
            state: session.timer().state(),
            remaining_seconds: session.timer().remaining(),
            duration_seconds: session.timer().duration(),
        },
        judging_open: session.is_judging_open(),
        exhausted_category_id: session.exhausted_category(),
        notices: session.catalog().notices.clone(),
    }
}

/// Retrieves the session snapshot.
pub async fn get_session(session: &SharedSession) -> SessionView {
    session_view(&*session.lock().await)
}

/// Lists categories with their progress.
pub async fn list_categories(session: &SharedSession) -> Vec<CategorySummary> {
    let guard = session.lock().await;
    let selected = guard.selection().map(|s| s.category_id);
    guard
        .catalog()
        .categories
        .iter()
        .map(|category| {
            let questions = if selected == Some(category.id) {
                guard.selected_questions().to_vec()
            } else {
                questions_of(&guard.catalog().questions, category.id)
            };
            let answered_questions = guard.tracker().answered_among(category.id, &questions);
            CategorySummary {
                id: category.id,
                name: category.name.clone(),
                total_questions: questions.len(),
                answered_questions,
                complete: answered_questions >= questions.len(),
            }
        })
        .collect()
}

/// Lists the roster.
pub async fn list_teams(session: &SharedSession) -> Vec<TeamView> {
    let guard = session.lock().await;
    let default_timer_seconds = guard.settings().default_timer_seconds;
    guard
        .catalog()
        .teams
        .iter()
        .map(|team| TeamView {
            id: team.id,
            name: team.name.clone(),
            color: team.color.clone(),
            countdown_seconds: team.countdown_seconds(default_timer_seconds),
        })
        .collect()
}

/// Lists the questions of the selected category still available.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if `category_id` is not selected.
pub async fn get_available_questions(
    session: &SharedSession,
    category_id: CategoryId,
) -> Result<Vec<QuestionView>, DomainError> {
    let guard = session.lock().await;
    Ok(guard
        .available_questions(category_id)?
        .into_iter()
        .map(QuestionView::hidden)
        .collect())
}

/// Suggests the next (team, question) pair, if any.
pub async fn get_next_suggestion(session: &SharedSession) -> Option<NextSuggestion> {
    let guard = session.lock().await;
    guard
        .suggest_next()
        .map(|(team, question)| NextSuggestion {
            team_id: team.id,
            team_name: team.name.clone(),
            question: QuestionView::hidden(question),
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tokio::sync::Mutex;
    use trivia_core::model::{Category, Team};
    use trivia_test_support::{FixedClock, MemoryProgressStore, category, question, team};

    use super::*;
    use crate::domain::session::{LoadedCatalog, SessionSettings};
    use crate::domain::tracker::AnsweredTracker;

    struct Fixture {
        session: SharedSession,
        clock: FixedClock,
        history: Category,
        science: Category,
        teams: Vec<Team>,
        questions: Vec<Question>,
    }

    fn fixture() -> Fixture {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let history = category("History");
        let science = category("Science");
        let mut eagles = team("Eagles");
        eagles.timer_seconds = Some(45);
        let teams = vec![team("Lions"), eagles];
        let questions = vec![
            question(history.id, "h1", 10),
            question(history.id, "h2", 10),
            question(science.id, "s1", 10),
        ];
        let tracker = AnsweredTracker::open(Arc::new(MemoryProgressStore::new()));
        let mut session = QuizSession::new(Uuid::new_v4(), SessionSettings::default(), tracker);
        session
            .install_catalog(
                LoadedCatalog {
                    categories: vec![history.clone(), science.clone()],
                    teams: teams.clone(),
                    questions: questions.clone(),
                    notices: Vec::new(),
                },
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();
        session
            .select_category(
                history.id,
                questions_of(&questions, history.id),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();
        Fixture {
            session: Arc::new(Mutex::new(session)),
            clock,
            history,
            science,
            teams,
            questions,
        }
    }

    #[tokio::test]
    async fn test_get_session_hides_answer_until_revealed() {
        // Arrange
        let f = fixture();
        let presentation = f
            .session
            .lock()
            .await
            .begin_question(f.teams[0].id, f.questions[0].id, Uuid::new_v4(), &f.clock)
            .unwrap();

        // Act
        let presenting = get_session(&f.session).await;

        // Assert
        assert_eq!(presenting.active_question.unwrap().answer, None);
        assert!(!presenting.judging_open);

        {
            let mut guard = f.session.lock().await;
            guard
                .start_timer(presentation.generation, Uuid::new_v4(), &f.clock)
                .unwrap();
            guard.stop_timer(Uuid::new_v4(), &f.clock).unwrap();
        }
        let revealed = get_session(&f.session).await;
        assert_eq!(
            revealed.active_question.unwrap().answer.as_deref(),
            Some("answer to h1")
        );
        assert!(revealed.judging_open);
        assert_eq!(revealed.timer.state, TimerState::Revealed);
    }

    #[tokio::test]
    async fn test_list_categories_reports_progress() {
        // Arrange
        let f = fixture();

        // Act
        let categories = list_categories(&f.session).await;

        // Assert
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id, f.history.id);
        assert_eq!(categories[0].total_questions, 2);
        assert_eq!(categories[0].answered_questions, 0);
        assert!(!categories[0].complete);
        assert_eq!(categories[1].id, f.science.id);
        assert_eq!(categories[1].total_questions, 1);
    }

    #[tokio::test]
    async fn test_list_teams_resolves_countdowns() {
        // Arrange
        let f = fixture();

        // Act
        let teams = list_teams(&f.session).await;

        // Assert
        let countdowns: Vec<u32> = teams.iter().map(|t| t.countdown_seconds).collect();
        assert_eq!(countdowns, vec![30, 45]);
    }

    #[tokio::test]
    async fn test_get_available_questions_for_unselected_category_is_rejected() {
        // Arrange
        let f = fixture();

        // Act
        let result = get_available_questions(&f.session, f.science.id).await;

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_get_next_suggestion_prefers_team_with_fewest_turns() {
        // Arrange
        let f = fixture();
        f.session
            .lock()
            .await
            .begin_question(f.teams[0].id, f.questions[0].id, Uuid::new_v4(), &f.clock)
            .unwrap();
        f.session
            .lock()
            .await
            .cancel_question(Uuid::new_v4(), &f.clock)
            .unwrap();

        // Act
        let suggestion = get_next_suggestion(&f.session).await.unwrap();

        // Assert
        assert_eq!(suggestion.team_id, f.teams[1].id);
        assert_eq!(suggestion.question.id, f.questions[0].id);
        assert!(suggestion.question.answer.is_none());
    }
}

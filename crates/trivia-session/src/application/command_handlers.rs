//! Command handlers for the trivia session.
//!
//! Each handler locks the shared session only for synchronous state changes.
//! Catalog and ledger I/O happens with the lock released. Ledger calls are
//! bounded by `ledger_timeout`, so a hung backend surfaces as
//! `DomainError::LedgerTimeout` instead of freezing the session. A judgment
//! handler dropped mid-call (client gone, outer timeout) releases its
//! judgment so the question can be judged again.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use trivia_core::catalog::QuizCatalog;
use trivia_core::clock::Clock;
use trivia_core::command::Command;
use trivia_core::error::DomainError;
use trivia_core::ledger::ScoreLedger;
use uuid::Uuid;

use super::catalog_loader::{load_catalog, load_category_questions};
use super::timer_driver::{SharedSession, TimerDriver, log_events};
use crate::domain::commands::{
    AwardPoints, BeginQuestion, CancelQuestion, LoadCatalog, MarkWrong, ResetCategory,
    ResetCompetition, SelectCategory, StopTimer,
};
use crate::domain::events::SessionEvent;
use crate::domain::planner::RotationOutcome;
use crate::domain::session::{LoadNotice, Presentation, QuizSession, questions_of};

/// What a command produced.
#[derive(Debug)]
pub struct SessionCommandResult {
    /// The session the command ran against.
    pub session_id: Uuid,
    /// Events recorded while handling the command.
    pub events: Vec<SessionEvent>,
    /// Where rotation stands after a judgment.
    pub rotation: Option<RotationOutcome>,
    /// The question presented by `BeginQuestion`.
    pub presentation: Option<Presentation>,
    /// Non-fatal problems met while loading data.
    pub notices: Vec<LoadNotice>,
}

impl SessionCommandResult {
    fn from_session(session: &mut QuizSession) -> Self {
        Self {
            session_id: session.id(),
            events: session.drain_events(),
            rotation: None,
            presentation: None,
            notices: Vec::new(),
        }
    }
}

fn trace_command(command: &dyn Command) {
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling command"
    );
}

async fn with_ledger_timeout<T>(
    ledger_timeout: Duration,
    call: impl Future<Output = Result<T, DomainError>>,
) -> Result<T, DomainError> {
    tokio::time::timeout(ledger_timeout, call)
        .await
        .unwrap_or(Err(DomainError::LedgerTimeout(ledger_timeout)))
}

/// Holds the session's judgment slot between `prepare_*` and the matching
/// `complete_*` or failure call. Dropping it unsettled releases the slot.
struct PendingJudgment {
    session: Option<SharedSession>,
}

impl PendingJudgment {
    fn new(session: &SharedSession) -> Self {
        Self {
            session: Some(Arc::clone(session)),
        }
    }

    fn settle(mut self) {
        self.session = None;
    }
}

impl Drop for PendingJudgment {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Ok(mut guard) = session.try_lock() {
            guard.release_judgment();
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    session.lock().await.release_judgment();
                });
            }
            Err(_) => warn!("no runtime to release an abandoned judgment"),
        }
    }
}

/// Handles the `LoadCatalog` command: fetches the catalog outside the lock and
/// installs it.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` while a question is active.
pub async fn handle_load_catalog(
    command: &LoadCatalog,
    session: &SharedSession,
    catalog: &dyn QuizCatalog,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let loaded = load_catalog(catalog).await;
    let notices = loaded.notices.clone();

    let mut guard = session.lock().await;
    guard.install_catalog(loaded, command.correlation_id, clock)?;
    let mut result = SessionCommandResult::from_session(&mut guard);
    result.notices = notices;
    Ok(result)
}

/// Handles the `SelectCategory` command: fetches the category's questions,
/// falling back to those cached at catalog load, and selects it.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown category and
/// `DomainError::InvalidTransition` while a question is active.
pub async fn handle_select_category(
    command: &SelectCategory,
    session: &SharedSession,
    catalog: &dyn QuizCatalog,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let cached = {
        let guard = session.lock().await;
        questions_of(&guard.catalog().questions, command.category_id)
    };
    let (questions, notice) = load_category_questions(catalog, command.category_id, cached).await;

    let mut guard = session.lock().await;
    guard.select_category(command.category_id, questions, command.correlation_id, clock)?;
    let mut result = SessionCommandResult::from_session(&mut guard);
    result.notices.extend(notice);
    Ok(result)
}

/// Handles the `BeginQuestion` command: presents the question and launches
/// its countdown.
///
/// # Errors
///
/// Returns `DomainError::NotFound`, `DomainError::AlreadyAnswered` or
/// `DomainError::InvalidTransition` if the question cannot be presented.
pub async fn handle_begin_question(
    command: &BeginQuestion,
    session: &SharedSession,
    driver: &TimerDriver,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let mut guard = session.lock().await;
    let presentation = guard.begin_question(
        command.team_id,
        command.question_id,
        command.correlation_id,
        clock,
    )?;
    let mut result = SessionCommandResult::from_session(&mut guard);
    drop(guard);

    driver.launch(Arc::clone(session), presentation.clone());
    result.presentation = Some(presentation);
    Ok(result)
}

/// Handles the `StopTimer` command: reveals the answer early.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` unless a countdown is running.
pub async fn handle_stop_timer(
    command: &StopTimer,
    session: &SharedSession,
    driver: &TimerDriver,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let mut guard = session.lock().await;
    guard.stop_timer(command.correlation_id, clock)?;
    driver.cancel();
    Ok(SessionCommandResult::from_session(&mut guard))
}

/// Handles the `CancelQuestion` command: tears down the countdown and leaves
/// the question available.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if no question is active or its
/// judgment is being recorded.
pub async fn handle_cancel_question(
    command: &CancelQuestion,
    session: &SharedSession,
    driver: &TimerDriver,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let mut guard = session.lock().await;
    guard.cancel_question(command.correlation_id, clock)?;
    driver.cancel();
    Ok(SessionCommandResult::from_session(&mut guard))
}

/// Handles the `AwardPoints` command: credits the revealed question's points
/// through the ledger and, only once the ledger confirmed, consumes it.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if nothing can be judged,
/// `DomainError::LedgerTimeout` if the ledger did not answer in time, or the
/// ledger's own error. On any ledger failure the question stays revealed.
pub async fn handle_award_points(
    command: &AwardPoints,
    session: &SharedSession,
    ledger: &dyn ScoreLedger,
    clock: &dyn Clock,
    ledger_timeout: Duration,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let request = session.lock().await.prepare_award(command.team_id)?;
    let pending = PendingJudgment::new(session);

    let outcome = with_ledger_timeout(
        ledger_timeout,
        ledger.award_points(
            request.team_id,
            request.question_id,
            request.category_id,
            request.points,
        ),
    )
    .await;

    let mut guard = session.lock().await;
    pending.settle();
    match outcome {
        Ok(record) => {
            let rotation = guard.complete_award(request, &record, command.correlation_id, clock)?;
            let mut result = SessionCommandResult::from_session(&mut guard);
            result.rotation = Some(rotation);
            Ok(result)
        }
        Err(err) => {
            guard.record_award_failure(request, &err, command.correlation_id, clock);
            log_events(&guard.drain_events());
            Err(err)
        }
    }
}

/// Handles the `MarkWrong` command: records the wrong answer and consumes the
/// question.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if nothing can be judged,
/// `DomainError::LedgerTimeout` if the ledger did not answer in time, or the
/// ledger's own error. On any ledger failure the question stays revealed.
pub async fn handle_mark_wrong(
    command: &MarkWrong,
    session: &SharedSession,
    ledger: &dyn ScoreLedger,
    clock: &dyn Clock,
    ledger_timeout: Duration,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let request = session.lock().await.prepare_wrong_answer()?;
    let pending = PendingJudgment::new(session);

    let outcome = with_ledger_timeout(
        ledger_timeout,
        ledger.record_wrong_answer(request.team_id, request.question_id),
    )
    .await;

    let mut guard = session.lock().await;
    pending.settle();
    match outcome {
        Ok(()) => {
            let rotation = guard.complete_wrong_answer(request, command.correlation_id, clock)?;
            let mut result = SessionCommandResult::from_session(&mut guard);
            result.rotation = Some(rotation);
            Ok(result)
        }
        Err(err) => {
            guard.record_wrong_answer_failure(request, &err);
            Err(err)
        }
    }
}

/// Handles the `ResetCategory` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown category and
/// `DomainError::InvalidTransition` while a question is active.
pub async fn handle_reset_category(
    command: &ResetCategory,
    session: &SharedSession,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let mut guard = session.lock().await;
    guard.reset_category(command.category_id, command.correlation_id, clock)?;
    Ok(SessionCommandResult::from_session(&mut guard))
}

/// Handles the `ResetCompetition` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` while a question is active.
pub async fn handle_reset_competition(
    command: &ResetCompetition,
    session: &SharedSession,
    clock: &dyn Clock,
) -> Result<SessionCommandResult, DomainError> {
    trace_command(command);
    let mut guard = session.lock().await;
    guard.reset_competition(command.forget_roster, command.correlation_id, clock)?;
    Ok(SessionCommandResult::from_session(&mut guard))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tokio::sync::Mutex;
    use trivia_core::event::DomainEvent;
    use trivia_core::model::{Category, Question, Team};
    use trivia_test_support::{
        FailingCatalog, FailingScoreLedger, FixedClock, MemoryProgressStore,
        RecordingScoreLedger, StalledScoreLedger, StaticCatalog, category, question, team,
    };

    use super::*;
    use crate::application::narration::NoNarration;
    use crate::domain::planner::SelectionPhase;
    use crate::domain::session::SessionSettings;
    use crate::domain::timer::TimerState;
    use crate::domain::tracker::AnsweredTracker;

    const LEDGER_TIMEOUT: Duration = Duration::from_secs(10);

    struct Fixture {
        session: SharedSession,
        driver: TimerDriver,
        clock: FixedClock,
        catalog: StaticCatalog,
        category: Category,
        teams: Vec<Team>,
        questions: Vec<Question>,
    }

    async fn loaded_fixture() -> Fixture {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let history = category("History");
        let teams = vec![team("Lions"), team("Eagles")];
        let questions = vec![
            question(history.id, "q1", 10),
            question(history.id, "q2", 20),
            question(history.id, "q3", 30),
        ];
        let catalog = StaticCatalog {
            categories: vec![history.clone()],
            teams: teams.clone(),
            questions: questions.clone(),
        };
        let tracker = AnsweredTracker::open(Arc::new(MemoryProgressStore::new()));
        let session: SharedSession = Arc::new(Mutex::new(QuizSession::new(
            Uuid::new_v4(),
            SessionSettings::default(),
            tracker,
        )));
        handle_load_catalog(
            &LoadCatalog {
                correlation_id: Uuid::new_v4(),
            },
            &session,
            &catalog,
            &clock,
        )
        .await
        .unwrap();
        handle_select_category(
            &SelectCategory {
                correlation_id: Uuid::new_v4(),
                category_id: history.id,
            },
            &session,
            &catalog,
            &clock,
        )
        .await
        .unwrap();
        Fixture {
            session,
            driver: TimerDriver::new(Arc::new(clock), Arc::new(NoNarration)),
            clock,
            catalog,
            category: history,
            teams,
            questions,
        }
    }

    async fn begin_and_stop(f: &Fixture, team_index: usize, question_index: usize) {
        handle_begin_question(
            &BeginQuestion {
                correlation_id: Uuid::new_v4(),
                team_id: f.teams[team_index].id,
                question_id: f.questions[question_index].id,
            },
            &f.session,
            &f.driver,
            &f.clock,
        )
        .await
        .unwrap();
        wait_until_running(f).await;
        handle_stop_timer(
            &StopTimer {
                correlation_id: Uuid::new_v4(),
            },
            &f.session,
            &f.driver,
            &f.clock,
        )
        .await
        .unwrap();
    }

    async fn wait_until_running(f: &Fixture) {
        for _ in 0..100 {
            if f.session.lock().await.timer().state() == TimerState::Running {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("countdown never started");
    }

    fn award(team_id: Option<trivia_core::model::TeamId>) -> AwardPoints {
        AwardPoints {
            correlation_id: Uuid::new_v4(),
            team_id,
        }
    }

    #[tokio::test]
    async fn test_handle_load_catalog_reports_notices_and_keeps_going() {
        // Arrange
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let tracker = AnsweredTracker::open(Arc::new(MemoryProgressStore::new()));
        let session: SharedSession = Arc::new(Mutex::new(QuizSession::new(
            Uuid::new_v4(),
            SessionSettings::default(),
            tracker,
        )));
        let command = LoadCatalog {
            correlation_id: Uuid::new_v4(),
        };

        // Act
        let result = handle_load_catalog(&command, &session, &FailingCatalog, &clock)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.notices.len(), 3);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].event_type(), "trivia.catalog_loaded");
        assert_eq!(
            result.events[0].metadata().correlation_id,
            command.correlation_id
        );
    }

    #[tokio::test]
    async fn test_handle_select_category_unknown_is_not_found() {
        // Arrange
        let f = loaded_fixture().await;
        let command = SelectCategory {
            correlation_id: Uuid::new_v4(),
            category_id: trivia_core::model::CategoryId::new(),
        };

        // Act
        let result = handle_select_category(&command, &f.session, &f.catalog, &f.clock).await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::NotFound {
                kind: "category",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_handle_select_category_falls_back_to_cached_questions() {
        // Arrange
        let f = loaded_fixture().await;
        let command = SelectCategory {
            correlation_id: Uuid::new_v4(),
            category_id: f.category.id,
        };

        // Act
        let result = handle_select_category(&command, &f.session, &FailingCatalog, &f.clock)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.notices.len(), 1);
        let guard = f.session.lock().await;
        assert_eq!(guard.available_questions(f.category.id).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_handle_begin_question_launches_countdown() {
        // Arrange
        let f = loaded_fixture().await;
        let command = BeginQuestion {
            correlation_id: Uuid::new_v4(),
            team_id: f.teams[0].id,
            question_id: f.questions[0].id,
        };

        // Act
        let result = handle_begin_question(&command, &f.session, &f.driver, &f.clock)
            .await
            .unwrap();

        // Assert
        let presentation = result.presentation.unwrap();
        assert_eq!(presentation.question.id, f.questions[0].id);
        assert_eq!(presentation.countdown_seconds, 30);
        assert!(f.driver.is_running());
        assert_eq!(
            f.session.lock().await.selection().unwrap().phase,
            SelectionPhase::Presenting
        );
    }

    #[tokio::test]
    async fn test_handle_award_points_records_and_consumes() {
        // Arrange
        let f = loaded_fixture().await;
        let ledger = RecordingScoreLedger::new();
        begin_and_stop(&f, 0, 1).await;

        // Act
        let result = handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.rotation, Some(RotationOutcome::Continue));
        let records = ledger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].team_id, f.teams[0].id);
        assert_eq!(records[0].points, 20);
        let guard = f.session.lock().await;
        assert!(
            guard
                .tracker()
                .is_answered(f.category.id, f.questions[1].id)
        );
    }

    #[tokio::test]
    async fn test_handle_award_points_twice_awards_once() {
        // Arrange
        let f = loaded_fixture().await;
        let ledger = RecordingScoreLedger::new();
        begin_and_stop(&f, 0, 0).await;
        handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT)
            .await
            .unwrap();

        // Act
        let second =
            handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT).await;

        // Assert
        assert!(matches!(second, Err(DomainError::InvalidTransition(_))));
        assert_eq!(ledger.award_calls(), 1);
    }

    #[tokio::test]
    async fn test_handle_award_points_failure_leaves_question_answerable() {
        // Arrange
        let f = loaded_fixture().await;
        begin_and_stop(&f, 0, 0).await;

        // Act
        let result = handle_award_points(
            &award(None),
            &f.session,
            &FailingScoreLedger,
            &f.clock,
            LEDGER_TIMEOUT,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        let guard = f.session.lock().await;
        assert!(!guard.tracker().is_answered(f.category.id, f.questions[0].id));
        assert_eq!(guard.selection().unwrap().phase, SelectionPhase::Revealed);
    }

    #[tokio::test]
    async fn test_handle_award_points_retry_after_failure_succeeds() {
        // Arrange
        let f = loaded_fixture().await;
        let ledger = RecordingScoreLedger::new();
        ledger.fail_next_awards(1);
        begin_and_stop(&f, 1, 0).await;
        let first =
            handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT).await;
        assert!(first.is_err());

        // Act
        let retry =
            handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT).await;

        // Assert
        assert!(retry.is_ok());
        assert_eq!(ledger.award_calls(), 2);
        assert_eq!(ledger.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_award_points_times_out_on_stalled_ledger() {
        // Arrange
        let f = loaded_fixture().await;
        begin_and_stop(&f, 0, 0).await;

        // Act
        let result = handle_award_points(
            &award(None),
            &f.session,
            &StalledScoreLedger,
            &f.clock,
            LEDGER_TIMEOUT,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::LedgerTimeout(d)) if d == LEDGER_TIMEOUT));
        let guard = f.session.lock().await;
        assert!(!guard.tracker().is_answered(f.category.id, f.questions[0].id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_award_points_dropped_midway_can_be_retried() {
        // Arrange
        let f = loaded_fixture().await;
        begin_and_stop(&f, 0, 0).await;
        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            handle_award_points(
                &award(None),
                &f.session,
                &StalledScoreLedger,
                &f.clock,
                LEDGER_TIMEOUT,
            ),
        )
        .await;
        assert!(abandoned.is_err());
        let ledger = RecordingScoreLedger::new();

        // Act
        let retry =
            handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT).await;

        // Assert
        assert_eq!(retry.unwrap().rotation, Some(RotationOutcome::Continue));
        assert_eq!(ledger.records().len(), 1);
        let guard = f.session.lock().await;
        assert!(guard.tracker().is_answered(f.category.id, f.questions[0].id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_mark_wrong_dropped_midway_leaves_question_cancellable() {
        // Arrange
        let f = loaded_fixture().await;
        begin_and_stop(&f, 1, 1).await;
        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            handle_mark_wrong(
                &MarkWrong {
                    correlation_id: Uuid::new_v4(),
                },
                &f.session,
                &StalledScoreLedger,
                &f.clock,
                LEDGER_TIMEOUT,
            ),
        )
        .await;
        assert!(abandoned.is_err());

        // Act
        let cancelled = handle_cancel_question(
            &CancelQuestion {
                correlation_id: Uuid::new_v4(),
            },
            &f.session,
            &f.driver,
            &f.clock,
        )
        .await;

        // Assert
        assert!(cancelled.is_ok());
        let guard = f.session.lock().await;
        assert!(!guard.tracker().is_answered(f.category.id, f.questions[1].id));
        assert_eq!(guard.available_questions(f.category.id).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_handle_mark_wrong_consumes_without_points() {
        // Arrange
        let f = loaded_fixture().await;
        let ledger = RecordingScoreLedger::new();
        begin_and_stop(&f, 1, 2).await;

        // Act
        let result = handle_mark_wrong(
            &MarkWrong {
                correlation_id: Uuid::new_v4(),
            },
            &f.session,
            &ledger,
            &f.clock,
            LEDGER_TIMEOUT,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(result.rotation, Some(RotationOutcome::Continue));
        assert!(ledger.records().is_empty());
        assert_eq!(
            ledger.wrong_answers(),
            vec![(f.teams[1].id, f.questions[2].id)]
        );
        let guard = f.session.lock().await;
        assert!(guard.tracker().is_answered(f.category.id, f.questions[2].id));
    }

    #[tokio::test]
    async fn test_handle_cancel_question_stops_driver_and_keeps_question() {
        // Arrange
        let f = loaded_fixture().await;
        handle_begin_question(
            &BeginQuestion {
                correlation_id: Uuid::new_v4(),
                team_id: f.teams[0].id,
                question_id: f.questions[0].id,
            },
            &f.session,
            &f.driver,
            &f.clock,
        )
        .await
        .unwrap();

        // Act
        handle_cancel_question(
            &CancelQuestion {
                correlation_id: Uuid::new_v4(),
            },
            &f.session,
            &f.driver,
            &f.clock,
        )
        .await
        .unwrap();

        // Assert
        assert!(!f.driver.is_running());
        let guard = f.session.lock().await;
        assert_eq!(guard.available_questions(f.category.id).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_handle_reset_competition_clears_progress() {
        // Arrange
        let f = loaded_fixture().await;
        let ledger = RecordingScoreLedger::new();
        begin_and_stop(&f, 0, 0).await;
        handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT)
            .await
            .unwrap();

        // Act
        let result = handle_reset_competition(
            &ResetCompetition {
                correlation_id: Uuid::new_v4(),
                forget_roster: false,
            },
            &f.session,
            &f.clock,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(result.events[0].event_type(), "trivia.competition_reset");
        let guard = f.session.lock().await;
        assert!(guard.selection().is_none());
        assert_eq!(guard.tracker().answered_count(f.category.id), 0);
    }

    #[tokio::test]
    async fn test_award_after_reset_competition_is_recorded_again() {
        // Arrange
        let f = loaded_fixture().await;
        let ledger = RecordingScoreLedger::new();
        begin_and_stop(&f, 0, 0).await;
        handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT)
            .await
            .unwrap();
        handle_reset_competition(
            &ResetCompetition {
                correlation_id: Uuid::new_v4(),
                forget_roster: false,
            },
            &f.session,
            &f.clock,
        )
        .await
        .unwrap();
        handle_select_category(
            &SelectCategory {
                correlation_id: Uuid::new_v4(),
                category_id: f.category.id,
            },
            &f.session,
            &f.catalog,
            &f.clock,
        )
        .await
        .unwrap();
        begin_and_stop(&f, 0, 0).await;

        // Act
        let replayed =
            handle_award_points(&award(None), &f.session, &ledger, &f.clock, LEDGER_TIMEOUT).await;

        // Assert
        assert!(replayed.is_ok());
        let records = ledger.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.team_id == f.teams[0].id));
    }

    #[tokio::test]
    async fn test_handle_reset_category_unknown_is_not_found() {
        // Arrange
        let f = loaded_fixture().await;

        // Act
        let result = handle_reset_category(
            &ResetCategory {
                correlation_id: Uuid::new_v4(),
                category_id: trivia_core::model::CategoryId::new(),
            },
            &f.session,
            &f.clock,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}

//! The quiz session orchestrator.
//!
//! `QuizSession` owns the tracker, planner and timer and sequences them. It is
//! synchronous; calls to the scoring backend happen in the command handlers,
//! which split an award into `prepare_*` (validate, build the request) and
//! `complete_*` / `record_award_failure` (apply the ledger's answer). A
//! question is only marked answered in `complete_*`, i.e. after the ledger
//! call resolved successfully.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};
use trivia_core::clock::Clock;
use trivia_core::error::DomainError;
use trivia_core::event::EventMetadata;
use trivia_core::model::{Category, CategoryId, Question, QuestionId, ScoreRecord, Team, TeamId};
use uuid::Uuid;

use super::events::{
    AnswerMarkedWrong, AnswerRevealed, AwardFailed, CatalogLoaded, CategoryExhausted,
    CategoryReset, CategorySelected, PointsAwarded, QuestionAbandoned, QuestionPresented,
    SessionEvent, SessionEventKind, TimerExpired, TimerStarted, event_type_of,
};
use super::planner::{RotationOutcome, RotationPlanner, SelectionPhase, SessionSelection};
use super::timer::{QuestionTimer, TickOutcome, TimerState};
use super::tracker::AnsweredTracker;

/// Countdown used when a team has no `timer_seconds` of its own.
pub const DEFAULT_TIMER_SECONDS: u32 = 30;

/// Session-wide settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Countdown for teams without their own setting.
    pub default_timer_seconds: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_timer_seconds: DEFAULT_TIMER_SECONDS,
        }
    }
}

/// A non-fatal problem raised while loading data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadNotice {
    /// Which collection failed to load (`categories`, `teams`, `questions`).
    pub source: &'static str,
    /// Human-readable detail.
    pub message: String,
}

/// Everything a session plays with, as loaded from the catalog.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalog {
    /// Categories, in catalog order.
    pub categories: Vec<Category>,
    /// Team roster, in catalog order.
    pub teams: Vec<Team>,
    /// Questions of all categories, in natural order.
    pub questions: Vec<Question>,
    /// Problems encountered while loading.
    pub notices: Vec<LoadNotice>,
}

/// A question just handed to the timer.
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Identifies this presentation; ticks for any other generation are stale.
    pub generation: u64,
    /// The team being asked.
    pub team_id: TeamId,
    /// The question presented.
    pub question: Question,
    /// Countdown for this question.
    pub countdown_seconds: u32,
}

/// A validated request to credit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardRequest {
    /// The team to credit.
    pub team_id: TeamId,
    /// The revealed question.
    pub question_id: QuestionId,
    /// Its category.
    pub category_id: CategoryId,
    /// Points to credit.
    pub points: u32,
}

/// A validated request to record a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongAnswerRequest {
    /// The team that answered.
    pub team_id: TeamId,
    /// The revealed question.
    pub question_id: QuestionId,
    /// Its category.
    pub category_id: CategoryId,
}

/// A single moderator-driven quiz session.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    settings: SessionSettings,
    tracker: AnsweredTracker,
    planner: RotationPlanner,
    timer: QuestionTimer,
    generation: u64,
    countdown_seconds: u32,
    catalog: LoadedCatalog,
    awarded: HashSet<(CategoryId, TeamId, QuestionId)>,
    judgment_in_flight: bool,
    exhausted: Option<CategoryId>,
    sequence: i64,
    pending_events: Vec<SessionEvent>,
}

impl QuizSession {
    /// Creates a session over an opened tracker. The catalog starts empty.
    #[must_use]
    pub fn new(id: Uuid, settings: SessionSettings, tracker: AnsweredTracker) -> Self {
        Self {
            id,
            settings,
            tracker,
            planner: RotationPlanner::new(),
            timer: QuestionTimer::new(),
            generation: 0,
            countdown_seconds: 0,
            catalog: LoadedCatalog::default(),
            awarded: HashSet::new(),
            judgment_in_flight: false,
            exhausted: None,
            sequence: 0,
            pending_events: Vec::new(),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Installs a freshly loaded catalog.
    ///
    /// A non-empty roster replaces the stored roster snapshot; an empty one
    /// (e.g. the team fetch failed) falls back to the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` while a question is active.
    pub fn install_catalog(
        &mut self,
        mut catalog: LoadedCatalog,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_no_active_question("reload the catalog")?;

        if catalog.teams.is_empty() {
            if !self.tracker.roster().is_empty() {
                info!(
                    teams = self.tracker.roster().len(),
                    "using stored roster snapshot"
                );
            }
            catalog.teams = self.tracker.roster().to_vec();
        } else {
            self.tracker.save_roster(&catalog.teams);
        }

        if let Some(category_id) = self.planner.category_id() {
            let questions = questions_of(&catalog.questions, category_id);
            if catalog.categories.iter().any(|c| c.id == category_id) {
                self.planner.select_category(category_id, questions)?;
            } else {
                self.planner.clear_category()?;
            }
        }

        let payload = CatalogLoaded {
            categories: catalog.categories.len(),
            teams: catalog.teams.len(),
            questions: catalog.questions.len(),
            notices: catalog.notices.len(),
        };
        self.catalog = catalog;
        self.record(correlation_id, clock, SessionEventKind::CatalogLoaded(payload));
        Ok(())
    }

    /// Selects `category_id` with the given question list.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown category and
    /// `DomainError::InvalidTransition` while a question is active.
    pub fn select_category(
        &mut self,
        category_id: CategoryId,
        questions: Vec<Question>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.category(category_id)?;
        self.planner.select_category(category_id, questions)?;
        self.exhausted = None;
        if self.planner.is_exhausted(&self.tracker) {
            self.exhausted = Some(category_id);
        }
        info!(%category_id, questions = self.planner.questions().len(), "category selected");
        self.record(
            correlation_id,
            clock,
            SessionEventKind::CategorySelected(CategorySelected { category_id }),
        );
        Ok(())
    }

    /// Questions of the selected category still available.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if `category_id` is not selected.
    pub fn available_questions(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<&Question>, DomainError> {
        self.planner
            .list_available_questions(category_id, &self.tracker)
    }

    /// The suggested next (team, question) pair.
    #[must_use]
    pub fn suggest_next(&self) -> Option<(&Team, &Question)> {
        self.planner.suggest_next(&self.catalog.teams, &self.tracker)
    }

    /// Presents `question_id` to `team_id`. The timer stays idle until
    /// [`start_timer`](Self::start_timer) is called for the returned
    /// presentation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown team or question,
    /// `DomainError::AlreadyAnswered` for a consumed question, and
    /// `DomainError::InvalidTransition` if no category is selected or another
    /// question is active.
    pub fn begin_question(
        &mut self,
        team_id: TeamId,
        question_id: QuestionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Presentation, DomainError> {
        let countdown_seconds = self
            .team(team_id)?
            .countdown_seconds(self.settings.default_timer_seconds);
        let question = self
            .planner
            .begin_question(team_id, question_id, &self.tracker)?
            .clone();

        self.generation += 1;
        self.timer = QuestionTimer::new();
        self.countdown_seconds = countdown_seconds;
        self.tracker.record_turn(question.category_id, team_id);

        info!(
            %team_id,
            %question_id,
            countdown_seconds,
            generation = self.generation,
            "question presented"
        );
        self.record(
            correlation_id,
            clock,
            SessionEventKind::QuestionPresented(QuestionPresented {
                category_id: question.category_id,
                team_id,
                question_id,
                countdown_seconds,
            }),
        );

        Ok(Presentation {
            generation: self.generation,
            team_id,
            question,
            countdown_seconds,
        })
    }

    /// Starts the countdown for presentation `generation`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the presentation was
    /// cancelled or superseded, or the timer already started.
    pub fn start_timer(
        &mut self,
        generation: u64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if generation != self.generation || self.planner.active_question().is_none() {
            return Err(DomainError::InvalidTransition(format!(
                "presentation {generation} is no longer active"
            )));
        }
        self.timer.start(self.countdown_seconds)?;
        let question_id = self.active_question_id()?;
        self.record(
            correlation_id,
            clock,
            SessionEventKind::TimerStarted(TimerStarted {
                question_id,
                duration_seconds: self.countdown_seconds,
            }),
        );
        Ok(())
    }

    /// Applies one elapsed second to presentation `generation`.
    pub fn tick(&mut self, generation: u64, clock: &dyn Clock) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        let outcome = self.timer.tick();
        let Ok(question_id) = self.active_question_id() else {
            return outcome;
        };
        let correlation_id = Uuid::new_v4();
        match outcome {
            TickOutcome::Counting(remaining) => debug!(%question_id, remaining, "timer tick"),
            TickOutcome::Expired => {
                info!(%question_id, "timer expired");
                self.record(
                    correlation_id,
                    clock,
                    SessionEventKind::TimerExpired(TimerExpired { question_id }),
                );
            }
            TickOutcome::Revealed => {
                if let Err(err) = self.planner.mark_revealed() {
                    warn!(error = %err, "timer revealed with no question presenting");
                }
                self.record(
                    correlation_id,
                    clock,
                    SessionEventKind::AnswerRevealed(AnswerRevealed {
                        question_id,
                        manual: false,
                    }),
                );
            }
            TickOutcome::Grace | TickOutcome::Ignored | TickOutcome::Stale => {}
        }
        outcome
    }

    /// Moderator stop: reveals the answer before the countdown ends.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the countdown is running.
    pub fn stop_timer(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        let question_id = self.active_question_id()?;
        self.timer.stop()?;
        self.planner.mark_revealed()?;
        info!(%question_id, remaining = self.timer.remaining(), "answer revealed early");
        self.record(
            correlation_id,
            clock,
            SessionEventKind::AnswerRevealed(AnswerRevealed {
                question_id,
                manual: true,
            }),
        );
        Ok(())
    }

    /// Leaves the active question without judging it: the timer and any
    /// pending reveal are torn down and the question stays available.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if no question is active.
    pub fn cancel_question(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let question_id = self.active_question_id()?;
        if self.judgment_in_flight {
            return Err(DomainError::InvalidTransition(
                "cannot leave a question while its judgment is being recorded".to_owned(),
            ));
        }
        if !self.timer.state().is_terminal() {
            self.timer.cancel()?;
        }
        self.planner.abandon_question();
        self.generation += 1;
        info!(%question_id, "question abandoned");
        self.record(
            correlation_id,
            clock,
            SessionEventKind::QuestionAbandoned(QuestionAbandoned { question_id }),
        );
        Ok(())
    }

    /// Validates a correct judgment and builds the ledger request. Until the
    /// request is completed or failed, further judgments are rejected.
    ///
    /// `team_id` defaults to the team that was asked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the answer is revealed,
    /// if the pair was already awarded or another judgment is in flight, and
    /// `DomainError::NotFound` for an unknown team.
    pub fn prepare_award(&mut self, team_id: Option<TeamId>) -> Result<AwardRequest, DomainError> {
        let question = self.revealed_question()?;
        let team_id = match team_id {
            Some(team_id) => self.team(team_id)?.id,
            None => self.active_team_id()?,
        };
        if self
            .awarded
            .contains(&(question.category_id, team_id, question.id))
        {
            return Err(DomainError::InvalidTransition(format!(
                "team {team_id} was already awarded question {}",
                question.id
            )));
        }
        let request = AwardRequest {
            team_id,
            question_id: question.id,
            category_id: question.category_id,
            points: question.points,
        };
        self.begin_judgment()?;
        Ok(request)
    }

    /// Applies a successful award: consumes the question and returns to
    /// rotation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if `request` does not match
    /// the revealed question.
    pub fn complete_award(
        &mut self,
        request: AwardRequest,
        record: &ScoreRecord,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<RotationOutcome, DomainError> {
        self.judgment_in_flight = false;
        self.ensure_revealed(request.question_id)?;
        self.awarded
            .insert((request.category_id, request.team_id, request.question_id));
        info!(
            team_id = %request.team_id,
            question_id = %request.question_id,
            points = record.points,
            "points awarded"
        );
        self.record(
            correlation_id,
            clock,
            SessionEventKind::PointsAwarded(PointsAwarded {
                team_id: request.team_id,
                question_id: request.question_id,
                points: record.points,
            }),
        );
        self.consume(request.category_id, request.question_id, correlation_id, clock)
    }

    /// Notes a failed award. The question stays revealed so the moderator
    /// can retry.
    pub fn record_award_failure(
        &mut self,
        request: AwardRequest,
        error: &DomainError,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        self.judgment_in_flight = false;
        warn!(
            team_id = %request.team_id,
            question_id = %request.question_id,
            error = %error,
            "award failed; question left open for retry"
        );
        self.record(
            correlation_id,
            clock,
            SessionEventKind::AwardFailed(AwardFailed {
                team_id: request.team_id,
                question_id: request.question_id,
                reason: error.to_string(),
            }),
        );
    }

    /// Validates a wrong judgment and builds the ledger request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the answer is revealed
    /// or if another judgment is in flight.
    pub fn prepare_wrong_answer(&mut self) -> Result<WrongAnswerRequest, DomainError> {
        let question = self.revealed_question()?;
        let request = WrongAnswerRequest {
            team_id: self.active_team_id()?,
            question_id: question.id,
            category_id: question.category_id,
        };
        self.begin_judgment()?;
        Ok(request)
    }

    /// Notes that recording a wrong answer failed. The question stays
    /// revealed.
    pub fn record_wrong_answer_failure(&mut self, request: WrongAnswerRequest, error: &DomainError) {
        self.judgment_in_flight = false;
        warn!(
            team_id = %request.team_id,
            question_id = %request.question_id,
            error = %error,
            "wrong answer not recorded; question left open for retry"
        );
    }

    /// Gives up a judgment whose ledger outcome will never be applied. The
    /// question stays revealed and can be judged again.
    pub fn release_judgment(&mut self) {
        if std::mem::take(&mut self.judgment_in_flight) {
            warn!(
                question_id = ?self.planner.active_question().map(|q| q.id),
                "judgment abandoned before it settled; question left open"
            );
        }
    }

    /// Applies a recorded wrong answer: the question is consumed anyway.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if `request` does not match
    /// the revealed question.
    pub fn complete_wrong_answer(
        &mut self,
        request: WrongAnswerRequest,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<RotationOutcome, DomainError> {
        self.judgment_in_flight = false;
        self.ensure_revealed(request.question_id)?;
        info!(
            team_id = %request.team_id,
            question_id = %request.question_id,
            "answer judged wrong"
        );
        self.record(
            correlation_id,
            clock,
            SessionEventKind::AnswerMarkedWrong(AnswerMarkedWrong {
                team_id: request.team_id,
                question_id: request.question_id,
            }),
        );
        self.consume(request.category_id, request.question_id, correlation_id, clock)
    }

    /// Clears the progress of one category.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown category and
    /// `DomainError::InvalidTransition` while a question is active.
    pub fn reset_category(
        &mut self,
        category_id: CategoryId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.category(category_id)?;
        self.ensure_no_active_question("reset a category")?;
        self.tracker.reset_category(category_id);
        self.awarded.retain(|(awarded_in, _, _)| *awarded_in != category_id);
        if self.exhausted == Some(category_id) {
            self.exhausted = None;
        }
        info!(%category_id, "category progress reset");
        self.record(
            correlation_id,
            clock,
            SessionEventKind::CategoryReset(CategoryReset { category_id }),
        );
        Ok(())
    }

    /// Clears all progress and returns to category selection.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` while a question is active.
    pub fn reset_competition(
        &mut self,
        forget_roster: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_no_active_question("reset the competition")?;
        self.tracker.reset_all();
        if forget_roster {
            self.tracker.forget_roster();
        }
        self.planner.clear_category()?;
        self.awarded.clear();
        self.exhausted = None;
        info!(forget_roster, "competition reset");
        self.record(correlation_id, clock, SessionEventKind::CompetitionReset);
        Ok(())
    }

    /// Takes the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// The active selection, if a category is selected.
    #[must_use]
    pub fn selection(&self) -> Option<SessionSelection> {
        self.planner.selection()
    }

    /// The question currently presented or revealed.
    #[must_use]
    pub fn active_question(&self) -> Option<&Question> {
        self.planner.active_question()
    }

    /// Every question of the selected category, answered or not.
    #[must_use]
    pub fn selected_questions(&self) -> &[Question] {
        self.planner.questions()
    }

    /// The timer of the current (or last) question.
    #[must_use]
    pub fn timer(&self) -> &QuestionTimer {
        &self.timer
    }

    /// The current presentation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The answered-question tracker.
    #[must_use]
    pub fn tracker(&self) -> &AnsweredTracker {
        &self.tracker
    }

    /// The loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &LoadedCatalog {
        &self.catalog
    }

    /// The category whose exhaustion was last signalled, until it is
    /// reset or another category is selected.
    #[must_use]
    pub fn exhausted_category(&self) -> Option<CategoryId> {
        self.exhausted
    }

    /// Session settings.
    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Whether the answer is revealed and a judgment can be recorded.
    #[must_use]
    pub fn is_judging_open(&self) -> bool {
        self.planner.active_phase() == Some(SelectionPhase::Revealed)
            && self.timer.state() == TimerState::Revealed
    }

    fn consume(
        &mut self,
        category_id: CategoryId,
        question_id: QuestionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<RotationOutcome, DomainError> {
        self.tracker.mark_answered(category_id, question_id);
        let outcome = self.planner.complete_question(&self.tracker)?;
        if outcome == RotationOutcome::CategoryExhausted {
            self.exhausted = Some(category_id);
            info!(
                %category_id,
                all_teams_had_turn = self.tracker.all_teams_had_turn(category_id),
                "category exhausted"
            );
            self.record(
                correlation_id,
                clock,
                SessionEventKind::CategoryExhausted(CategoryExhausted { category_id }),
            );
        }
        Ok(outcome)
    }

    fn category(&self, category_id: CategoryId) -> Result<&Category, DomainError> {
        self.catalog
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| DomainError::not_found("category", category_id))
    }

    fn team(&self, team_id: TeamId) -> Result<&Team, DomainError> {
        self.catalog
            .teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or_else(|| DomainError::not_found("team", team_id))
    }

    fn active_question_id(&self) -> Result<QuestionId, DomainError> {
        self.planner
            .active_question()
            .map(|q| q.id)
            .ok_or_else(|| DomainError::InvalidTransition("no question is active".to_owned()))
    }

    fn active_team_id(&self) -> Result<TeamId, DomainError> {
        self.planner
            .active_team()
            .ok_or_else(|| DomainError::InvalidTransition("no question is active".to_owned()))
    }

    fn revealed_question(&self) -> Result<&Question, DomainError> {
        match (self.planner.active_phase(), self.planner.active_question()) {
            (Some(SelectionPhase::Revealed), Some(question)) => Ok(question),
            _ => Err(DomainError::InvalidTransition(
                "judging is only possible once the answer is revealed".to_owned(),
            )),
        }
    }

    fn begin_judgment(&mut self) -> Result<(), DomainError> {
        if self.judgment_in_flight {
            return Err(DomainError::InvalidTransition(
                "a judgment for this question is already being recorded".to_owned(),
            ));
        }
        self.judgment_in_flight = true;
        Ok(())
    }

    fn ensure_revealed(&self, question_id: QuestionId) -> Result<(), DomainError> {
        let question = self.revealed_question()?;
        if question.id != question_id {
            return Err(DomainError::InvalidTransition(format!(
                "question {question_id} is not the revealed question"
            )));
        }
        Ok(())
    }

    fn ensure_no_active_question(&self, action: &str) -> Result<(), DomainError> {
        if let Some(question) = self.planner.active_question() {
            return Err(DomainError::InvalidTransition(format!(
                "cannot {action} while question {} is active",
                question.id
            )));
        }
        Ok(())
    }

    fn record(&mut self, correlation_id: Uuid, clock: &dyn Clock, kind: SessionEventKind) {
        self.sequence += 1;
        self.pending_events.push(SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: event_type_of(&kind).to_owned(),
                session_id: self.id,
                sequence_number: self.sequence,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        });
    }
}

/// The questions of `category_id`, in natural order.
#[must_use]
pub fn questions_of(questions: &[Question], category_id: CategoryId) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| q.category_id == category_id)
        .cloned()
        .collect()
}

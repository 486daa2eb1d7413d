//! Category → team → question rotation.

use serde::Serialize;
use trivia_core::error::DomainError;
use trivia_core::model::{CategoryId, Question, QuestionId, Team, TeamId};

use super::tracker::AnsweredTracker;

/// Phase of the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPhase {
    /// A category is chosen; the moderator is picking team and question.
    Selecting,
    /// A question is on screen and the countdown may be running.
    Presenting,
    /// The answer is shown and judging is possible.
    Revealed,
}

/// The single active selection of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSelection {
    /// The selected category.
    pub category_id: CategoryId,
    /// The team being asked, once a question is begun.
    pub team_id: Option<TeamId>,
    /// The question being asked, once begun.
    pub question_id: Option<QuestionId>,
    /// Current phase.
    pub phase: SelectionPhase,
}

/// Where rotation stands after a question is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationOutcome {
    /// Questions remain; back to team/question selection.
    Continue,
    /// Every question in the category is consumed.
    CategoryExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveQuestion {
    team_id: TeamId,
    question_id: QuestionId,
    phase: SelectionPhase,
}

/// Decides which (team, question) pair is presented next within a category.
#[derive(Debug, Default)]
pub struct RotationPlanner {
    category_id: Option<CategoryId>,
    questions: Vec<Question>,
    active: Option<ActiveQuestion>,
}

impl RotationPlanner {
    /// Creates a planner with no category selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters `Selecting` for `category_id` with its question list.
    ///
    /// Questions of other categories are dropped; the given order is kept.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` while a question is active.
    pub fn select_category(
        &mut self,
        category_id: CategoryId,
        questions: Vec<Question>,
    ) -> Result<(), DomainError> {
        self.ensure_idle("select a category")?;
        self.category_id = Some(category_id);
        self.questions = questions
            .into_iter()
            .filter(|q| q.category_id == category_id)
            .collect();
        Ok(())
    }

    /// Leaves the current category, if no question is active.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` while a question is active.
    pub fn clear_category(&mut self) -> Result<(), DomainError> {
        self.ensure_idle("leave the category")?;
        self.category_id = None;
        self.questions.clear();
        Ok(())
    }

    /// The selected category.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    /// Every question of the selected category, in natural order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Questions of `category_id` not yet answered, in natural order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if `category_id` is not the
    /// selected category.
    pub fn list_available_questions<'a>(
        &'a self,
        category_id: CategoryId,
        tracker: &AnsweredTracker,
    ) -> Result<Vec<&'a Question>, DomainError> {
        if self.category_id != Some(category_id) {
            return Err(DomainError::InvalidTransition(format!(
                "category {category_id} is not selected"
            )));
        }
        Ok(self
            .questions
            .iter()
            .filter(|q| !tracker.is_answered(category_id, q.id))
            .collect())
    }

    /// Proposes the next pair: the roster team with the fewest turns in the
    /// category (earliest in roster order on ties) and the first available
    /// question. `None` if no category is selected, it is exhausted, or the
    /// roster is empty.
    #[must_use]
    pub fn suggest_next<'a>(
        &'a self,
        roster: &'a [Team],
        tracker: &AnsweredTracker,
    ) -> Option<(&'a Team, &'a Question)> {
        let category_id = self.category_id?;
        let question = self
            .questions
            .iter()
            .find(|q| !tracker.is_answered(category_id, q.id))?;
        let team = roster
            .iter()
            .min_by_key(|team| tracker.turns(category_id, team.id))?;
        Some((team, question))
    }

    /// Begins presenting `question_id` to `team_id`.
    ///
    /// Checks, in order: a category is selected, the question belongs to it,
    /// the question is not answered, and no other question is active.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition`, `DomainError::NotFound` or
    /// `DomainError::AlreadyAnswered` per the checks above.
    pub fn begin_question(
        &mut self,
        team_id: TeamId,
        question_id: QuestionId,
        tracker: &AnsweredTracker,
    ) -> Result<&Question, DomainError> {
        let Some(category_id) = self.category_id else {
            return Err(DomainError::InvalidTransition(
                "no category selected".to_owned(),
            ));
        };
        let Some(index) = self.questions.iter().position(|q| q.id == question_id) else {
            return Err(DomainError::not_found("question", question_id));
        };
        if tracker.is_answered(category_id, question_id) {
            return Err(DomainError::AlreadyAnswered {
                category_id,
                question_id,
            });
        }
        self.ensure_idle("begin another question")?;

        self.active = Some(ActiveQuestion {
            team_id,
            question_id,
            phase: SelectionPhase::Presenting,
        });
        Ok(&self.questions[index])
    }

    /// Moves the active question from `Presenting` to `Revealed`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless a question is presenting.
    pub fn mark_revealed(&mut self) -> Result<(), DomainError> {
        match self.active.as_mut() {
            Some(active) if active.phase == SelectionPhase::Presenting => {
                active.phase = SelectionPhase::Revealed;
                Ok(())
            }
            _ => Err(DomainError::InvalidTransition(
                "no question is being presented".to_owned(),
            )),
        }
    }

    /// Finishes the revealed question and reports whether the category is
    /// now exhausted. The caller must already have recorded the question as
    /// answered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless a question is revealed.
    pub fn complete_question(
        &mut self,
        tracker: &AnsweredTracker,
    ) -> Result<RotationOutcome, DomainError> {
        let (Some(category_id), Some(active)) = (self.category_id, self.active) else {
            return Err(DomainError::InvalidTransition(
                "no question is active".to_owned(),
            ));
        };
        if active.phase != SelectionPhase::Revealed {
            return Err(DomainError::InvalidTransition(
                "a question can only be completed once revealed".to_owned(),
            ));
        }
        self.active = None;
        if self.all_answered(category_id, tracker) {
            Ok(RotationOutcome::CategoryExhausted)
        } else {
            Ok(RotationOutcome::Continue)
        }
    }

    /// Drops the active question without consuming it (navigation away).
    /// Returns the abandoned question id, if any.
    pub fn abandon_question(&mut self) -> Option<QuestionId> {
        self.active.take().map(|active| active.question_id)
    }

    /// Whether every question of the selected category is answered.
    #[must_use]
    pub fn is_exhausted(&self, tracker: &AnsweredTracker) -> bool {
        self.category_id
            .is_some_and(|id| self.all_answered(id, tracker))
    }

    /// The active selection, if a category is selected.
    #[must_use]
    pub fn selection(&self) -> Option<SessionSelection> {
        let category_id = self.category_id?;
        Some(match self.active {
            Some(active) => SessionSelection {
                category_id,
                team_id: Some(active.team_id),
                question_id: Some(active.question_id),
                phase: active.phase,
            },
            None => SessionSelection {
                category_id,
                team_id: None,
                question_id: None,
                phase: SelectionPhase::Selecting,
            },
        })
    }

    /// The question currently presented or revealed.
    #[must_use]
    pub fn active_question(&self) -> Option<&Question> {
        let active = self.active?;
        self.questions.iter().find(|q| q.id == active.question_id)
    }

    /// The team currently being asked.
    #[must_use]
    pub fn active_team(&self) -> Option<TeamId> {
        self.active.map(|active| active.team_id)
    }

    /// The phase of the active question, `None` while selecting.
    #[must_use]
    pub fn active_phase(&self) -> Option<SelectionPhase> {
        self.active.map(|active| active.phase)
    }

    fn all_answered(&self, category_id: CategoryId, tracker: &AnsweredTracker) -> bool {
        tracker.answered_among(category_id, &self.questions) >= self.questions.len()
    }

    fn ensure_idle(&self, action: &str) -> Result<(), DomainError> {
        match self.active {
            Some(active) => Err(DomainError::InvalidTransition(format!(
                "cannot {action} while question {} is {:?}",
                active.question_id, active.phase
            ))),
            None => Ok(()),
        }
    }
}

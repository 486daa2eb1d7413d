//! Moderator commands for a quiz session.

use trivia_core::command::Command;
use trivia_core::model::{CategoryId, QuestionId, TeamId};
use uuid::Uuid;

/// Command to (re)load categories, teams and questions.
#[derive(Debug, Clone)]
pub struct LoadCatalog {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for LoadCatalog {
    fn command_type(&self) -> &'static str {
        "trivia.load_catalog"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to choose the category to rotate through.
#[derive(Debug, Clone)]
pub struct SelectCategory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The category to select.
    pub category_id: CategoryId,
}

impl Command for SelectCategory {
    fn command_type(&self) -> &'static str {
        "trivia.select_category"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to present a question to a team.
#[derive(Debug, Clone)]
pub struct BeginQuestion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The team being asked.
    pub team_id: TeamId,
    /// The question to present.
    pub question_id: QuestionId,
}

impl Command for BeginQuestion {
    fn command_type(&self) -> &'static str {
        "trivia.begin_question"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to stop the countdown and reveal the answer early.
#[derive(Debug, Clone)]
pub struct StopTimer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StopTimer {
    fn command_type(&self) -> &'static str {
        "trivia.stop_timer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave the active question without judging it.
#[derive(Debug, Clone)]
pub struct CancelQuestion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for CancelQuestion {
    fn command_type(&self) -> &'static str {
        "trivia.cancel_question"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to judge the revealed question correct and award its points.
#[derive(Debug, Clone)]
pub struct AwardPoints {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The team to credit; defaults to the team that was asked.
    pub team_id: Option<TeamId>,
}

impl Command for AwardPoints {
    fn command_type(&self) -> &'static str {
        "trivia.award_points"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to judge the revealed question incorrect.
#[derive(Debug, Clone)]
pub struct MarkWrong {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for MarkWrong {
    fn command_type(&self) -> &'static str {
        "trivia.mark_wrong"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to clear one category's progress.
#[derive(Debug, Clone)]
pub struct ResetCategory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The category to reset.
    pub category_id: CategoryId,
}

impl Command for ResetCategory {
    fn command_type(&self) -> &'static str {
        "trivia.reset_category"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to clear all progress ("reset competition").
#[derive(Debug, Clone)]
pub struct ResetCompetition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Also drop the stored roster snapshot.
    pub forget_roster: bool,
}

impl Command for ResetCompetition {
    fn command_type(&self) -> &'static str {
        "trivia.reset_competition"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

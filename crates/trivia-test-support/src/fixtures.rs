//! Builders for model values used across tests.

use trivia_core::model::{
    Category, CategoryId, DEFAULT_TEAM_COLOR, Question, QuestionId, Team, TeamId,
};

/// A category with a fresh id.
#[must_use]
pub fn category(name: &str) -> Category {
    Category {
        id: CategoryId::new(),
        name: name.to_owned(),
    }
}

/// A team with a fresh id, the default color and no countdown override.
#[must_use]
pub fn team(name: &str) -> Team {
    Team {
        id: TeamId::new(),
        name: name.to_owned(),
        color: DEFAULT_TEAM_COLOR.to_owned(),
        timer_seconds: None,
    }
}

/// An open question in `category_id` worth `points`.
#[must_use]
pub fn question(category_id: CategoryId, text: &str, points: u32) -> Question {
    Question {
        id: QuestionId::new(),
        category_id,
        text: text.to_owned(),
        options: Vec::new(),
        answer: format!("answer to {text}"),
        points,
    }
}

//! Data model shared by every trivia context.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Points awarded for a question when the source does not say otherwise.
pub const DEFAULT_QUESTION_POINTS: u32 = 10;

/// Display color given to teams created without one.
pub const DEFAULT_TEAM_COLOR: &str = "#6A0DAD";

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Identifier of a question category.
    CategoryId
);
id_type!(
    /// Identifier of a competing team.
    TeamId
);
id_type!(
    /// Identifier of a question.
    QuestionId
);

/// A named grouping of questions, selected as a unit for a rotation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// A competing team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Display color, e.g. `#6A0DAD`.
    #[serde(default = "default_color")]
    pub color: String,
    /// Per-question countdown for this team; the session default applies
    /// when absent.
    #[serde(default)]
    pub timer_seconds: Option<u32>,
}

fn default_color() -> String {
    DEFAULT_TEAM_COLOR.to_owned()
}

impl Team {
    /// Returns the countdown this team gets, falling back to `default_seconds`.
    #[must_use]
    pub fn countdown_seconds(&self, default_seconds: u32) -> u32 {
        self.timer_seconds.unwrap_or(default_seconds)
    }
}

/// A question as loaded for a session. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier.
    pub id: QuestionId,
    /// The category this question belongs to.
    pub category_id: CategoryId,
    /// The question text.
    pub text: String,
    /// Options for multiple-choice display; empty for open questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// The expected answer, shown at reveal.
    pub answer: String,
    /// Points awarded for a correct answer.
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    DEFAULT_QUESTION_POINTS
}

/// One successful award, as kept by the scoring backend. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// The team that received the points.
    pub team_id: TeamId,
    /// The question the points were awarded for.
    pub question_id: QuestionId,
    /// The category of that question at award time.
    pub category_id: CategoryId,
    /// Points awarded.
    pub points: u32,
    /// When the award was recorded.
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_without_points_defaults_to_ten() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "category_id": Uuid::new_v4(),
            "text": "Who built the ark?",
            "answer": "Noah",
        });

        let question: Question = serde_json::from_value(json).unwrap();

        assert_eq!(question.points, DEFAULT_QUESTION_POINTS);
        assert!(question.options.is_empty());
    }

    #[test]
    fn test_team_without_color_gets_default_color() {
        let json = serde_json::json!({ "id": Uuid::new_v4(), "name": "Lions" });

        let team: Team = serde_json::from_value(json).unwrap();

        assert_eq!(team.color, DEFAULT_TEAM_COLOR);
        assert_eq!(team.timer_seconds, None);
    }

    #[test]
    fn test_countdown_seconds_prefers_team_setting() {
        let mut team = Team {
            id: TeamId::new(),
            name: "Eagles".to_owned(),
            color: DEFAULT_TEAM_COLOR.to_owned(),
            timer_seconds: None,
        };
        assert_eq!(team.countdown_seconds(30), 30);

        team.timer_seconds = Some(45);
        assert_eq!(team.countdown_seconds(30), 45);
    }

    #[test]
    fn test_ids_serialize_as_bare_uuids() {
        let raw = Uuid::new_v4();
        let value = serde_json::to_value(TeamId(raw)).unwrap();
        assert_eq!(value, serde_json::Value::String(raw.to_string()));
    }
}

//! `PostgreSQL` implementation of the `QuizCatalog` and `ScoreLedger` traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use trivia_core::catalog::QuizCatalog;
use trivia_core::error::DomainError;
use trivia_core::ledger::ScoreLedger;
use trivia_core::model::{Category, CategoryId, Question, QuestionId, ScoreRecord, Team, TeamId};

/// PostgreSQL-backed catalog and score ledger.
#[derive(Debug, Clone)]
pub struct PgQuizBackend {
    pool: PgPool,
}

impl PgQuizBackend {
    /// Creates a new `PgQuizBackend`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("database error: {err}"))
}

fn to_u32(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::Infrastructure(format!("column {column} holds negative value {value}"))
    })
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    color: String,
    timer_seconds: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    category_id: Uuid,
    text: String,
    options: Json<Vec<String>>,
    answer: String,
    points: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ScoreRow {
    team_id: Uuid,
    question_id: Uuid,
    category_id: Uuid,
    points: i32,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = DomainError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TeamId(row.id),
            name: row.name,
            color: row.color,
            timer_seconds: row
                .timer_seconds
                .map(|s| to_u32("teams.timer_seconds", s))
                .transpose()?,
        })
    }
}

impl TryFrom<QuestionRow> for Question {
    type Error = DomainError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: QuestionId(row.id),
            category_id: CategoryId(row.category_id),
            text: row.text,
            options: row.options.0,
            answer: row.answer,
            points: to_u32("questions.points", row.points)?,
        })
    }
}

impl TryFrom<ScoreRow> for ScoreRecord {
    type Error = DomainError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            team_id: TeamId(row.team_id),
            question_id: QuestionId(row.question_id),
            category_id: CategoryId(row.category_id),
            points: to_u32("scores.points", row.points)?,
            recorded_at: row.recorded_at,
        })
    }
}

#[async_trait]
impl QuizCatalog for PgQuizBackend {
    async fn fetch_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name FROM categories ORDER BY position, name")
                .fetch_all(&self.pool)
                .await
                .map_err(database_error)?;
        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: CategoryId(row.id),
                name: row.name,
            })
            .collect())
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, DomainError> {
        let rows: Vec<TeamRow> = sqlx::query_as(
            "SELECT id, name, color, timer_seconds FROM teams ORDER BY position, name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;
        rows.into_iter().map(Team::try_from).collect()
    }

    async fn fetch_questions(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Question>, DomainError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            r"
            SELECT id, category_id, text, options, answer, points
            FROM questions
            WHERE $1::uuid IS NULL OR category_id = $1
            ORDER BY category_id, position, id
            ",
        )
        .bind(category_id.map(Uuid::from))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;
        rows.into_iter().map(Question::try_from).collect()
    }
}

#[async_trait]
impl ScoreLedger for PgQuizBackend {
    async fn award_points(
        &self,
        team_id: TeamId,
        question_id: QuestionId,
        category_id: CategoryId,
        points: u32,
    ) -> Result<ScoreRecord, DomainError> {
        let points = i32::try_from(points)
            .map_err(|_| DomainError::Validation(format!("{points} points is out of range")))?;

        // Every confirmed award is a new record; the session decides when a
        // pair may be credited again.
        let row: ScoreRow = sqlx::query_as(
            r"
            INSERT INTO scores (id, team_id, question_id, category_id, points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING team_id, question_id, category_id, points, recorded_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::from(team_id))
        .bind(Uuid::from(question_id))
        .bind(Uuid::from(category_id))
        .bind(points)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;
        debug!(%team_id, %question_id, points, "score recorded");
        ScoreRecord::try_from(row)
    }

    async fn record_wrong_answer(
        &self,
        team_id: TeamId,
        question_id: QuestionId,
    ) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO wrong_answers (team_id, question_id) VALUES ($1, $2)")
            .bind(Uuid::from(team_id))
            .bind(Uuid::from(question_id))
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, DomainError> {
        let rows: Vec<ScoreRow> = sqlx::query_as(
            r"
            SELECT team_id, question_id, category_id, points, recorded_at
            FROM scores
            ORDER BY recorded_at, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;
        rows.into_iter().map(ScoreRecord::try_from).collect()
    }
}

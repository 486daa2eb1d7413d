//! Score ledger abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::model::{CategoryId, QuestionId, ScoreRecord, TeamId};

/// Client contract to the external scoring system of record.
///
/// Each successful `award_points` call is a new score record. The session
/// engine sequences its calls so a (team, question) pair is awarded at most
/// once per round; a reset starts a new round.
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Request creation of a score record. Returns the record as stored.
    async fn award_points(
        &self,
        team_id: TeamId,
        question_id: QuestionId,
        category_id: CategoryId,
        points: u32,
    ) -> Result<ScoreRecord, DomainError>;

    /// Record that a question was judged incorrect. No points are created.
    async fn record_wrong_answer(
        &self,
        team_id: TeamId,
        question_id: QuestionId,
    ) -> Result<(), DomainError>;

    /// Fetch every score record, oldest first.
    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, DomainError>;
}

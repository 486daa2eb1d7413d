//! Question catalog abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::model::{Category, CategoryId, Question, Team};

/// Read access to the categories, teams and questions a session plays with.
///
/// Implementations are thin I/O wrappers over whatever backend owns the data.
#[async_trait]
pub trait QuizCatalog: Send + Sync {
    /// Fetch all categories.
    async fn fetch_categories(&self) -> Result<Vec<Category>, DomainError>;

    /// Fetch the team roster.
    async fn fetch_teams(&self) -> Result<Vec<Team>, DomainError>;

    /// Fetch questions, optionally only those of one category, in the
    /// category's natural order.
    async fn fetch_questions(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Question>, DomainError>;
}

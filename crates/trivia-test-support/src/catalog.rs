//! Test catalogs: mock `QuizCatalog` implementations for tests.

use async_trait::async_trait;
use trivia_core::catalog::QuizCatalog;
use trivia_core::error::DomainError;
use trivia_core::model::{Category, CategoryId, Question, Team};

/// A catalog serving fixed in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    /// Categories returned by `fetch_categories`.
    pub categories: Vec<Category>,
    /// Teams returned by `fetch_teams`.
    pub teams: Vec<Team>,
    /// Questions, in natural order, filtered by `fetch_questions`.
    pub questions: Vec<Question>,
}

#[async_trait]
impl QuizCatalog for StaticCatalog {
    async fn fetch_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.clone())
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, DomainError> {
        Ok(self.teams.clone())
    }

    async fn fetch_questions(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Question>, DomainError> {
        Ok(self
            .questions
            .iter()
            .filter(|q| category_id.is_none_or(|id| q.category_id == id))
            .cloned()
            .collect())
    }
}

/// A catalog whose every fetch fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingCatalog;

#[async_trait]
impl QuizCatalog for FailingCatalog {
    async fn fetch_categories(&self) -> Result<Vec<Category>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_questions(
        &self,
        _category_id: Option<CategoryId>,
    ) -> Result<Vec<Question>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

//! Domain error types.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::model::{CategoryId, QuestionId};

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced category, team or question does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of entity was looked up.
        kind: &'static str,
        /// The identifier that was not found.
        id: Uuid,
    },

    /// The question has already been consumed in this category.
    #[error("question {question_id} was already answered in category {category_id}")]
    AlreadyAnswered {
        /// The category the question belongs to.
        category_id: CategoryId,
        /// The consumed question.
        question_id: QuestionId,
    },

    /// A state-machine transition that is not valid from the current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The scoring backend did not answer within the configured timeout.
    #[error("score ledger did not respond within {0:?}")]
    LedgerTimeout(Duration),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

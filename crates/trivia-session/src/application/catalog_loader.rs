//! Loads categories, teams and questions from the catalog.
//!
//! Each collection loads independently. A failed fetch degrades to an empty
//! list plus a [`LoadNotice`] so the moderator can still run what did load.

use tracing::{info, warn};
use trivia_core::catalog::QuizCatalog;
use trivia_core::error::DomainError;
use trivia_core::model::{CategoryId, Question};

use crate::domain::session::{LoadNotice, LoadedCatalog};

fn degrade<T>(
    source: &'static str,
    result: Result<Vec<T>, DomainError>,
    notices: &mut Vec<LoadNotice>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(source, error = %err, "catalog fetch failed; continuing with none");
            notices.push(LoadNotice {
                source,
                message: err.to_string(),
            });
            Vec::new()
        }
    }
}

/// Fetches the whole catalog, never failing.
pub async fn load_catalog(catalog: &dyn QuizCatalog) -> LoadedCatalog {
    let mut notices = Vec::new();
    let categories = degrade("categories", catalog.fetch_categories().await, &mut notices);
    let teams = degrade("teams", catalog.fetch_teams().await, &mut notices);
    let questions = degrade("questions", catalog.fetch_questions(None).await, &mut notices);

    info!(
        categories = categories.len(),
        teams = teams.len(),
        questions = questions.len(),
        notices = notices.len(),
        "catalog loaded"
    );

    LoadedCatalog {
        categories,
        teams,
        questions,
        notices,
    }
}

/// Fetches the questions of one category.
///
/// On failure the `fallback` list (usually the questions cached at catalog
/// load) is returned together with a notice.
pub async fn load_category_questions(
    catalog: &dyn QuizCatalog,
    category_id: CategoryId,
    fallback: Vec<Question>,
) -> (Vec<Question>, Option<LoadNotice>) {
    match catalog.fetch_questions(Some(category_id)).await {
        Ok(questions) => (questions, None),
        Err(err) => {
            warn!(%category_id, error = %err, "question fetch failed; using cached questions");
            (
                fallback,
                Some(LoadNotice {
                    source: "questions",
                    message: err.to_string(),
                }),
            )
        }
    }
}

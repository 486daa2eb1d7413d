//! Integration tests for `PgQuizBackend`.
//!
//! These need a `PostgreSQL` server reachable through `DATABASE_URL`; run
//! them with `cargo test -- --ignored`.

use sqlx::PgPool;
use trivia_core::catalog::QuizCatalog;
use trivia_core::ledger::ScoreLedger;
use trivia_core::model::{CategoryId, QuestionId, TeamId};
use trivia_store::pg_backend::PgQuizBackend;
use uuid::Uuid;

async fn seed_category(pool: &PgPool, name: &str, position: i32) -> CategoryId {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (id, name, position) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(position)
        .execute(pool)
        .await
        .unwrap();
    CategoryId(id)
}

async fn seed_question(pool: &PgPool, category_id: CategoryId, text: &str, position: i32) -> QuestionId {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO questions (id, category_id, text, options, answer, points, position) \
         VALUES ($1, $2, $3, '[\"a\", \"b\"]'::jsonb, 'a', 15, $4)",
    )
    .bind(id)
    .bind(Uuid::from(category_id))
    .bind(text)
    .bind(position)
    .execute(pool)
    .await
    .unwrap();
    QuestionId(id)
}

// --- catalog ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_categories_in_position_order(pool: PgPool) {
    let science = seed_category(&pool, "Science", 2).await;
    let history = seed_category(&pool, "History", 1).await;
    let backend = PgQuizBackend::new(pool);

    let categories = backend.fetch_categories().await.unwrap();

    let ids: Vec<CategoryId> = categories.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![history, science]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_teams_maps_optional_timer(pool: PgPool) {
    sqlx::query("INSERT INTO teams (id, name, timer_seconds, position) VALUES ($1, 'Lions', 45, 1)")
        .bind(Uuid::new_v4())
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO teams (id, name, position) VALUES ($1, 'Eagles', 2)")
        .bind(Uuid::new_v4())
        .execute(&pool)
        .await
        .unwrap();
    let backend = PgQuizBackend::new(pool);

    let teams = backend.fetch_teams().await.unwrap();

    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].timer_seconds, Some(45));
    assert_eq!(teams[1].timer_seconds, None);
    assert_eq!(teams[1].color, "#6A0DAD");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_questions_filters_by_category(pool: PgPool) {
    let history = seed_category(&pool, "History", 1).await;
    let science = seed_category(&pool, "Science", 2).await;
    let second = seed_question(&pool, history, "h2", 2).await;
    let first = seed_question(&pool, history, "h1", 1).await;
    seed_question(&pool, science, "s1", 1).await;
    let backend = PgQuizBackend::new(pool);

    let filtered = backend.fetch_questions(Some(history)).await.unwrap();
    let all = backend.fetch_questions(None).await.unwrap();

    let ids: Vec<QuestionId> = filtered.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(filtered[0].options, vec!["a", "b"]);
    assert_eq!(filtered[0].points, 15);
    assert_eq!(all.len(), 3);
}

// --- ledger ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_award_points_then_fetch_scores(pool: PgPool) {
    let backend = PgQuizBackend::new(pool);
    let team_id = TeamId::new();
    let question_id = QuestionId::new();
    let category_id = CategoryId::new();

    let record = backend
        .award_points(team_id, question_id, category_id, 10)
        .await
        .unwrap();

    assert_eq!(record.points, 10);
    let scores = backend.fetch_scores().await.unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].team_id, team_id);
    assert_eq!(scores[0].category_id, category_id);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_repeat_award_after_reset_creates_second_record(pool: PgPool) {
    let backend = PgQuizBackend::new(pool);
    let team_id = TeamId::new();
    let question_id = QuestionId::new();
    let category_id = CategoryId::new();

    backend
        .award_points(team_id, question_id, category_id, 10)
        .await
        .unwrap();
    let replayed = backend
        .award_points(team_id, question_id, category_id, 10)
        .await
        .unwrap();

    assert_eq!(replayed.points, 10);
    let scores = backend.fetch_scores().await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores.iter().map(|s| s.points).sum::<u32>(), 20);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_record_wrong_answer_creates_no_score(pool: PgPool) {
    let backend = PgQuizBackend::new(pool.clone());

    backend
        .record_wrong_answer(TeamId::new(), QuestionId::new())
        .await
        .unwrap();

    assert!(backend.fetch_scores().await.unwrap().is_empty());
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wrong_answers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

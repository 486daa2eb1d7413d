//! Database schema.

use sqlx::migrate::Migrator;

/// Embedded migrations for the trivia tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

//! Storage adapters for the trivia session engine.
//!
//! `PostgreSQL` is the system of record for categories, teams, questions and
//! scores. Session progress lives in a local JSON file.

pub mod pg_backend;
pub mod progress_file;
pub mod schema;

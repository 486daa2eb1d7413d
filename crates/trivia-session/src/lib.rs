//! Trivia session engine.
//!
//! Tracks which questions each category has consumed, rotates questions
//! across the team roster, runs the per-question countdown and reveal, and
//! routes moderator judgments to the score ledger.

pub mod application;
pub mod domain;

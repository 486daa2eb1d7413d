//! Scoreboard for the trivia session engine.
//!
//! Sums score records into ranked team standings, overall or per category,
//! and keeps a live overall scoreboard refreshed in the background.

pub mod aggregator;
pub mod refresher;

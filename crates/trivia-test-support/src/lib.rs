//! Shared test mocks and utilities for the trivia session engine.

mod catalog;
mod clock;
mod fixtures;
mod ledger;
mod store;

pub use catalog::{FailingCatalog, StaticCatalog};
pub use clock::FixedClock;
pub use fixtures::{category, question, team};
pub use ledger::{FailingScoreLedger, RecordingScoreLedger, StalledScoreLedger};
pub use store::{FailingProgressStore, MemoryProgressStore};

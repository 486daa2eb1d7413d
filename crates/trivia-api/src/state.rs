//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use trivia_core::catalog::QuizCatalog;
use trivia_core::clock::Clock;
use trivia_core::ledger::ScoreLedger;
use trivia_scoreboard::refresher::Scoreboard;
use trivia_session::application::timer_driver::{SharedSession, TimerDriver};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The live quiz session.
    pub session: SharedSession,
    /// Countdown task owner for the session.
    pub driver: Arc<TimerDriver>,
    /// Source of categories, teams and questions.
    pub catalog: Arc<dyn QuizCatalog>,
    /// Scoring system of record.
    pub ledger: Arc<dyn ScoreLedger>,
    /// Clock for event timestamps.
    pub clock: Arc<dyn Clock>,
    /// Latest overall scoreboard published by the refresher.
    pub scoreboard: watch::Receiver<Scoreboard>,
    /// Upper bound on a single ledger call.
    pub ledger_timeout: Duration,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("driver", &self.driver)
            .field("ledger_timeout", &self.ledger_timeout)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        session: SharedSession,
        driver: Arc<TimerDriver>,
        catalog: Arc<dyn QuizCatalog>,
        ledger: Arc<dyn ScoreLedger>,
        clock: Arc<dyn Clock>,
        scoreboard: watch::Receiver<Scoreboard>,
        ledger_timeout: Duration,
    ) -> Self {
        Self {
            session,
            driver,
            catalog,
            ledger,
            clock,
            scoreboard,
            ledger_timeout,
        }
    }
}

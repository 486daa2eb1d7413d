//! Live scoreboard: periodically recomputes the overall standings.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use trivia_core::catalog::QuizCatalog;
use trivia_core::clock::Clock;
use trivia_core::error::DomainError;
use trivia_core::ledger::ScoreLedger;
use trivia_core::model::Team;

use crate::aggregator::{RankedStanding, aggregate_overall, rank};

/// Default refresh period.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(5);

/// A published scoreboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scoreboard {
    /// Ranked standings.
    pub standings: Vec<RankedStanding>,
    /// When the standings were computed; `None` before the first refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Computes scoreboards from the ledger and the catalog's roster.
pub struct ScoreboardRefresher {
    ledger: Arc<dyn ScoreLedger>,
    catalog: Arc<dyn QuizCatalog>,
    clock: Arc<dyn Clock>,
    period: Duration,
    roster: Vec<Team>,
}

impl std::fmt::Debug for ScoreboardRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreboardRefresher")
            .field("period", &self.period)
            .field("roster", &self.roster.len())
            .finish_non_exhaustive()
    }
}

impl ScoreboardRefresher {
    /// Creates a refresher polling every `period`.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn ScoreLedger>,
        catalog: Arc<dyn QuizCatalog>,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        Self {
            ledger,
            catalog,
            clock,
            period,
            roster: Vec::new(),
        }
    }

    /// Computes the overall scoreboard once.
    ///
    /// A failed roster fetch falls back to the last roster seen.
    ///
    /// # Errors
    ///
    /// Returns the ledger's error if the score records cannot be fetched.
    pub async fn refresh_overall(&mut self) -> Result<Scoreboard, DomainError> {
        let records = self.ledger.fetch_scores().await?;
        self.update_roster().await;
        Ok(Scoreboard {
            standings: rank(aggregate_overall(&records, &self.roster)),
            refreshed_at: Some(self.clock.now()),
        })
    }

    async fn update_roster(&mut self) {
        match self.catalog.fetch_teams().await {
            Ok(teams) => self.roster = teams,
            Err(err) => warn!(error = %err, "roster fetch failed; using last roster"),
        }
    }

    /// Spawns the refresh loop. The first refresh happens immediately. A
    /// failed refresh keeps the last published scoreboard.
    pub fn spawn(mut self) -> (watch::Receiver<Scoreboard>, JoinHandle<()>) {
        let (sender, receiver) = watch::channel(Scoreboard::default());
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match self.refresh_overall().await {
                    Ok(scoreboard) => {
                        debug!(teams = scoreboard.standings.len(), "scoreboard refreshed");
                        if sender.send(scoreboard).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(error = %err, "scoreboard refresh failed; keeping last"),
                }
            }
        });
        (receiver, task)
    }
}

/// Waits for a spawned refresh loop to end and logs why. The loop only ends
/// once every receiver is dropped, or by panicking.
///
/// # Errors
///
/// Returns the task's `JoinError` if the loop panicked or was aborted.
pub async fn watch_refresh_task(task: JoinHandle<()>) -> Result<(), JoinError> {
    match task.await {
        Ok(()) => {
            info!("scoreboard refresher stopped; no subscribers left");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "scoreboard refresher died; scoreboard no longer refreshes");
            Err(err)
        }
    }
}

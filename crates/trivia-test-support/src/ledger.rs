//! Test ledgers: mock `ScoreLedger` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use trivia_core::error::DomainError;
use trivia_core::ledger::ScoreLedger;
use trivia_core::model::{CategoryId, QuestionId, ScoreRecord, TeamId};

/// A ledger that records every call and stores awards in memory.
///
/// It can be told to fail a number of upcoming award calls, which is how
/// tests exercise the retry path after a failed award.
#[derive(Debug)]
pub struct RecordingScoreLedger {
    recorded_at: DateTime<Utc>,
    records: Mutex<Vec<ScoreRecord>>,
    wrong_answers: Mutex<Vec<(TeamId, QuestionId)>>,
    award_calls: Mutex<usize>,
    failures_remaining: Mutex<usize>,
}

impl Default for RecordingScoreLedger {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl RecordingScoreLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that already holds `records`.
    ///
    /// # Panics
    ///
    /// Never in practice; the fixed timestamp is a valid date.
    #[must_use]
    pub fn with_records(records: Vec<ScoreRecord>) -> Self {
        Self {
            recorded_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            records: Mutex::new(records),
            wrong_answers: Mutex::new(Vec::new()),
            award_calls: Mutex::new(0),
            failures_remaining: Mutex::new(0),
        }
    }

    /// Make the next `count` award calls fail with an infrastructure error.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_next_awards(&self, count: usize) {
        *self.failures_remaining.lock().unwrap() = count;
    }

    /// Returns a snapshot of the stored records.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Returns every recorded wrong answer.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn wrong_answers(&self) -> Vec<(TeamId, QuestionId)> {
        self.wrong_answers.lock().unwrap().clone()
    }

    /// Number of `award_points` calls received, including failed ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn award_calls(&self) -> usize {
        *self.award_calls.lock().unwrap()
    }
}

#[async_trait]
impl ScoreLedger for RecordingScoreLedger {
    async fn award_points(
        &self,
        team_id: TeamId,
        question_id: QuestionId,
        category_id: CategoryId,
        points: u32,
    ) -> Result<ScoreRecord, DomainError> {
        *self.award_calls.lock().unwrap() += 1;
        {
            let mut remaining = self.failures_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomainError::Infrastructure("scoring backend unavailable".into()));
            }
        }
        let record = ScoreRecord {
            team_id,
            question_id,
            category_id,
            points,
            recorded_at: self.recorded_at,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn record_wrong_answer(
        &self,
        team_id: TeamId,
        question_id: QuestionId,
    ) -> Result<(), DomainError> {
        self.wrong_answers
            .lock()
            .unwrap()
            .push((team_id, question_id));
        Ok(())
    }

    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, DomainError> {
        Ok(self.records.lock().unwrap().clone())
    }
}

/// A ledger whose every call fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingScoreLedger;

#[async_trait]
impl ScoreLedger for FailingScoreLedger {
    async fn award_points(
        &self,
        _team_id: TeamId,
        _question_id: QuestionId,
        _category_id: CategoryId,
        _points: u32,
    ) -> Result<ScoreRecord, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn record_wrong_answer(
        &self,
        _team_id: TeamId,
        _question_id: QuestionId,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A ledger whose award and wrong-answer calls never resolve. Used to check
/// that pending calls surface as a timeout instead of hanging.
#[derive(Debug)]
pub struct StalledScoreLedger;

#[async_trait]
impl ScoreLedger for StalledScoreLedger {
    async fn award_points(
        &self,
        _team_id: TeamId,
        _question_id: QuestionId,
        _category_id: CategoryId,
        _points: u32,
    ) -> Result<ScoreRecord, DomainError> {
        std::future::pending().await
    }

    async fn record_wrong_answer(
        &self,
        _team_id: TeamId,
        _question_id: QuestionId,
    ) -> Result<(), DomainError> {
        std::future::pending().await
    }

    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, DomainError> {
        Ok(Vec::new())
    }
}

//! Answered-question bookkeeping, persisted per category.
//!
//! Progress is written through to a [`ProgressStore`] on every mutation so a
//! reload picks up where the session left off. The in-memory copy is the
//! authority for the running session: a failed write is logged and never
//! undoes or blocks the mutation.
//!
//! Documents are stored under these keys:
//!
//! - `answered/<category id>`: JSON array of answered question ids
//! - `turns/<category id>`: JSON object of team id to questions presented
//! - `roster`: JSON array of the team roster snapshot

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use trivia_core::error::DomainError;
use trivia_core::model::{CategoryId, Question, QuestionId, Team, TeamId};
use trivia_core::store::ProgressStore;
use uuid::Uuid;

const ANSWERED_PREFIX: &str = "answered/";
const TURNS_PREFIX: &str = "turns/";

/// Key of the roster snapshot document.
pub const ROSTER_KEY: &str = "roster";

fn answered_key(category_id: CategoryId) -> String {
    format!("{ANSWERED_PREFIX}{category_id}")
}

fn turns_key(category_id: CategoryId) -> String {
    format!("{TURNS_PREFIX}{category_id}")
}

/// Durable, idempotent record of which questions have been consumed.
pub struct AnsweredTracker {
    store: Arc<dyn ProgressStore>,
    answered: HashMap<CategoryId, BTreeSet<QuestionId>>,
    turns: HashMap<CategoryId, BTreeMap<TeamId, u32>>,
    roster: Vec<Team>,
}

impl std::fmt::Debug for AnsweredTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsweredTracker")
            .field("answered", &self.answered)
            .field("turns", &self.turns)
            .field("roster", &self.roster)
            .finish_non_exhaustive()
    }
}

impl AnsweredTracker {
    /// Opens the tracker, restoring any progress already in `store`.
    ///
    /// Unreadable or malformed documents are treated as empty.
    pub fn open(store: Arc<dyn ProgressStore>) -> Self {
        let mut tracker = Self {
            store,
            answered: HashMap::new(),
            turns: HashMap::new(),
            roster: Vec::new(),
        };

        let keys = match tracker.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "progress store unreadable; starting with empty progress");
                return tracker;
            }
        };

        for key in keys {
            if let Some(category_id) = parse_category_key(&key, ANSWERED_PREFIX) {
                let set: BTreeSet<QuestionId> = tracker.read_document(&key);
                if !set.is_empty() {
                    tracker.answered.insert(category_id, set);
                }
            } else if let Some(category_id) = parse_category_key(&key, TURNS_PREFIX) {
                let turns: BTreeMap<TeamId, u32> = tracker.read_document(&key);
                if !turns.is_empty() {
                    tracker.turns.insert(category_id, turns);
                }
            } else if key == ROSTER_KEY {
                tracker.roster = tracker.read_document(&key);
            }
        }

        debug!(
            categories = tracker.answered.len(),
            roster = tracker.roster.len(),
            "restored session progress"
        );
        tracker
    }

    /// Marks `question_id` answered in `category_id`. Returns `false` if it
    /// was already answered (the call is then a no-op).
    pub fn mark_answered(&mut self, category_id: CategoryId, question_id: QuestionId) -> bool {
        let set = self.answered.entry(category_id).or_default();
        if !set.insert(question_id) {
            return false;
        }
        let snapshot = set.clone();
        self.write_document(&answered_key(category_id), &snapshot);
        true
    }

    /// Returns whether `question_id` is answered in `category_id`.
    #[must_use]
    pub fn is_answered(&self, category_id: CategoryId, question_id: QuestionId) -> bool {
        self.answered
            .get(&category_id)
            .is_some_and(|set| set.contains(&question_id))
    }

    /// Number of questions answered in `category_id`.
    #[must_use]
    pub fn answered_count(&self, category_id: CategoryId) -> usize {
        self.answered.get(&category_id).map_or(0, BTreeSet::len)
    }

    /// Number of `questions` answered in `category_id`. Answered ids that are
    /// no longer part of the bank are not counted.
    #[must_use]
    pub fn answered_among(&self, category_id: CategoryId, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| self.is_answered(category_id, q.id))
            .count()
    }

    /// True iff at least `total_questions` questions are answered.
    #[must_use]
    pub fn is_category_complete(&self, category_id: CategoryId, total_questions: usize) -> bool {
        self.answered_count(category_id) >= total_questions
    }

    /// Clears the answered set and team turns of one category.
    pub fn reset_category(&mut self, category_id: CategoryId) {
        self.answered.remove(&category_id);
        self.turns.remove(&category_id);
        self.remove_document(&answered_key(category_id));
        self.remove_document(&turns_key(category_id));
    }

    /// Clears all answered sets and team turns. The roster snapshot is kept.
    pub fn reset_all(&mut self) {
        self.answered.clear();
        self.turns.clear();
        match self.store.keys() {
            Ok(keys) => {
                for key in keys {
                    if key.starts_with(ANSWERED_PREFIX) || key.starts_with(TURNS_PREFIX) {
                        self.remove_document(&key);
                    }
                }
            }
            Err(err) => warn!(error = %err, "could not list stored progress for reset"),
        }
    }

    /// Counts one presented question for `team_id` in `category_id`.
    pub fn record_turn(&mut self, category_id: CategoryId, team_id: TeamId) {
        let turns = self.turns.entry(category_id).or_default();
        *turns.entry(team_id).or_insert(0) += 1;
        let snapshot = turns.clone();
        self.write_document(&turns_key(category_id), &snapshot);
    }

    /// Number of questions presented to `team_id` in `category_id`.
    #[must_use]
    pub fn turns(&self, category_id: CategoryId, team_id: TeamId) -> u32 {
        self.turns
            .get(&category_id)
            .and_then(|turns| turns.get(&team_id))
            .copied()
            .unwrap_or(0)
    }

    /// True when every roster team has been presented at least one question
    /// in `category_id`. False for an empty roster.
    #[must_use]
    pub fn all_teams_had_turn(&self, category_id: CategoryId) -> bool {
        !self.roster.is_empty()
            && self
                .roster
                .iter()
                .all(|team| self.turns(category_id, team.id) > 0)
    }

    /// Replaces the durable roster snapshot.
    pub fn save_roster(&mut self, teams: &[Team]) {
        self.roster = teams.to_vec();
        self.write_document(ROSTER_KEY, &self.roster);
    }

    /// Drops the durable roster snapshot.
    pub fn forget_roster(&mut self) {
        self.roster.clear();
        self.remove_document(ROSTER_KEY);
    }

    /// The roster snapshot, in roster order.
    #[must_use]
    pub fn roster(&self) -> &[Team] {
        &self.roster
    }

    fn read_document<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(key, error = %err, "failed to read stored progress; treating as empty");
                return T::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key, error = %err, "stored progress is malformed; treating as empty");
            T::default()
        })
    }

    fn write_document<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| DomainError::Infrastructure(format!("progress serialization failed: {e}")))
            .and_then(|raw| self.store.save(key, &raw));
        if let Err(err) = result {
            warn!(key, error = %err, "failed to persist session progress");
        }
    }

    fn remove_document(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, error = %err, "failed to remove stored progress");
        }
    }
}

fn parse_category_key(key: &str, prefix: &str) -> Option<CategoryId> {
    let raw = key.strip_prefix(prefix)?;
    match Uuid::parse_str(raw) {
        Ok(id) => Some(CategoryId(id)),
        Err(_) => {
            warn!(key, "ignoring progress document with malformed key");
            None
        }
    }
}

//! Sums score records into ranked standings.
//!
//! Ordering: total points descending, then team name ascending, then team id
//! ascending, so equal totals always rank the same way.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use trivia_core::model::{CategoryId, DEFAULT_TEAM_COLOR, ScoreRecord, Team, TeamId};

/// One team's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// The team.
    pub team_id: TeamId,
    /// Display name; the id for teams missing from the roster.
    pub team_name: String,
    /// Display color.
    pub color: String,
    /// Sum of the team's awarded points.
    pub total_points: u32,
}

/// Medal or numeric rank of a standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// First place.
    Gold,
    /// Second place.
    Silver,
    /// Third place.
    Bronze,
    /// 1-based rank from fourth place on.
    Rank(usize),
}

impl Placement {
    /// Placement for a 0-based position in the ranked list.
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => Self::Gold,
            1 => Self::Silver,
            2 => Self::Bronze,
            n => Self::Rank(n + 1),
        }
    }
}

/// A standing with its placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedStanding {
    /// Medal or rank.
    pub placement: Placement,
    /// The standing.
    #[serde(flatten)]
    pub standing: Standing,
}

fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| a.team_name.cmp(&b.team_name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

fn aggregate<'a>(records: impl Iterator<Item = &'a ScoreRecord>, roster: &[Team]) -> Vec<Standing> {
    let mut totals: HashMap<TeamId, u32> = roster.iter().map(|t| (t.id, 0)).collect();
    for record in records {
        let total = totals.entry(record.team_id).or_insert(0);
        *total = total.saturating_add(record.points);
    }

    let mut standings: Vec<Standing> = totals
        .into_iter()
        .map(|(team_id, total_points)| {
            let team = roster.iter().find(|t| t.id == team_id);
            Standing {
                team_id,
                team_name: team.map_or_else(|| team_id.to_string(), |t| t.name.clone()),
                color: team.map_or_else(|| DEFAULT_TEAM_COLOR.to_owned(), |t| t.color.clone()),
                total_points,
            }
        })
        .collect();
    standings.sort_by(compare);
    standings
}

/// Totals across all categories. Every roster team appears, with zero if it
/// has no records.
#[must_use]
pub fn aggregate_overall(records: &[ScoreRecord], roster: &[Team]) -> Vec<Standing> {
    aggregate(records.iter(), roster)
}

/// Totals for the records of one category.
#[must_use]
pub fn aggregate_by_category(
    records: &[ScoreRecord],
    roster: &[Team],
    category_id: CategoryId,
) -> Vec<Standing> {
    aggregate(
        records.iter().filter(|r| r.category_id == category_id),
        roster,
    )
}

/// Attaches placements to already sorted standings.
#[must_use]
pub fn rank(standings: Vec<Standing>) -> Vec<RankedStanding> {
    standings
        .into_iter()
        .enumerate()
        .map(|(index, standing)| RankedStanding {
            placement: Placement::for_index(index),
            standing,
        })
        .collect()
}

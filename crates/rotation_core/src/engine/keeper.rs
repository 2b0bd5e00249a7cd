//! Goalkeeper rotation counts.
//!
//! A player earns one keeper quarter for every quarter in which they are in
//! goal at any point, as starter or as the substitute coming on in goal.

use crate::models::{Match, MatchId, PlayerId, Quarter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "match_id", rename_all = "snake_case")]
pub enum KeeperScope {
    /// Only the match with this id.
    Match(MatchId),
    /// Every supplied match.
    Season,
}

pub type KeeperCounts = BTreeMap<PlayerId, u32>;

/// Keepers of one quarter, each at most once.
pub fn keepers_in_quarter(quarter: &Quarter) -> Vec<&PlayerId> {
    quarter.keepers()
}

pub fn count(matches: &[Match], scope: &KeeperScope) -> KeeperCounts {
    let mut counts = KeeperCounts::new();
    let selected = matches.iter().filter(|m| match scope {
        KeeperScope::Match(id) => &m.id == id,
        KeeperScope::Season => true,
    });
    for m in selected {
        add_match(&mut counts, m, |_| true);
    }
    counts
}

pub fn count_match(m: &Match) -> KeeperCounts {
    let mut counts = KeeperCounts::new();
    add_match(&mut counts, m, |_| true);
    counts
}

/// Counts for one match, leaving out quarter `skip`.
pub(crate) fn count_match_except(m: &Match, skip: u8) -> KeeperCounts {
    let mut counts = KeeperCounts::new();
    add_match(&mut counts, m, |q| q.index != skip);
    counts
}

fn add_match(counts: &mut KeeperCounts, m: &Match, include: impl Fn(&Quarter) -> bool) {
    for quarter in m.quarters.iter().filter(|q| include(*q)) {
        for keeper in keepers_in_quarter(quarter) {
            if m.is_absent(keeper) {
                continue;
            }
            *counts.entry(keeper.clone()).or_insert(0) += 1;
        }
    }
}

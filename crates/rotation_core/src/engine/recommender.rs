//! Candidate ranking for the position-fill dialog.
//!
//! Ordering, most recommended first:
//! - Keeper: fewest keeper quarters this match, then fewest all-time, then name.
//! - Other positions after the first quarter: fewest minutes played up to
//!   and including the previous quarter, then name.
//! - First quarter: by name.
//!
//! Name ties are broken by player id, so equal inputs always produce the same
//! list.

use super::{keeper, playtime};
use crate::models::{Match, Player, Position};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The value a candidate was ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankBasis {
    Keeper { this_match: u32, all_time: u32 },
    MinutesSoFar { minutes: f64 },
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub player: Player,
    pub basis: RankBasis,
    /// Already starting or coming on at a different position this quarter.
    pub assigned_elsewhere: bool,
}

/// Eligible players for `position` in `quarter`, best first.
///
/// Absent players and players assigned to another position in the same
/// quarter are left out. The current occupant of `position` stays in the
/// list. `history` may include `m` itself; it is skipped by id.
pub fn rank(
    m: &Match,
    roster: &[Player],
    history: &[Match],
    quarter: u8,
    position: Position,
) -> Vec<Candidate> {
    rank_all(m, roster, history, quarter, position)
        .into_iter()
        .filter(|c| !c.assigned_elsewhere)
        .collect()
}

/// Like [`rank`], but keeps players assigned elsewhere at the bottom of the
/// list, ordered by name.
pub fn rank_all(
    m: &Match,
    roster: &[Player],
    history: &[Match],
    quarter: u8,
    position: Position,
) -> Vec<Candidate> {
    let Some(q) = m.quarter(quarter) else {
        log::debug!("Match {}: no quarter {} to rank for", m.id, quarter);
        return Vec::new();
    };
    if !m.formation.contains(position) {
        log::debug!("Match {}: {:?} not in {:?}", m.id, position, m.formation);
        return Vec::new();
    }

    let basis_for = basis_fn(m, roster, history, quarter, position);

    let mut candidates: Vec<Candidate> = roster
        .iter()
        .filter(|p| !m.is_absent(&p.id))
        .map(|p| Candidate {
            player: p.clone(),
            basis: basis_for(p),
            assigned_elsewhere: q.occupied_position(&p.id).is_some_and(|pos| pos != position),
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.assigned_elsewhere
            .cmp(&b.assigned_elsewhere)
            .then_with(|| {
                if a.assigned_elsewhere {
                    Ordering::Equal
                } else {
                    compare_basis(&a.basis, &b.basis)
                }
            })
            .then_with(|| by_name(&a.player, &b.player))
    });
    candidates
}

fn basis_fn<'a>(
    m: &'a Match,
    roster: &'a [Player],
    history: &'a [Match],
    quarter: u8,
    position: Position,
) -> Box<dyn Fn(&Player) -> RankBasis + 'a> {
    if position.is_keeper() {
        let this_match = keeper::count_match_except(m, quarter);
        let earlier: Vec<Match> = history.iter().filter(|h| h.id != m.id).cloned().collect();
        let career = keeper::count(&earlier, &keeper::KeeperScope::Season);
        Box::new(move |p: &Player| {
            let here = this_match.get(&p.id).copied().unwrap_or(0);
            let before = career.get(&p.id).copied().unwrap_or(0);
            RankBasis::Keeper { this_match: here, all_time: here + before }
        })
    } else if quarter > 1 {
        let ledger = playtime::compute_through(m, roster, quarter - 1);
        Box::new(move |p: &Player| RankBasis::MinutesSoFar {
            minutes: ledger.get(&p.id).map(|e| e.total).unwrap_or(0.0),
        })
    } else {
        Box::new(|_: &Player| RankBasis::Alphabetical)
    }
}

fn compare_basis(a: &RankBasis, b: &RankBasis) -> Ordering {
    match (a, b) {
        (
            RankBasis::Keeper { this_match: am, all_time: aa },
            RankBasis::Keeper { this_match: bm, all_time: ba },
        ) => (am, aa).cmp(&(bm, ba)),
        (RankBasis::MinutesSoFar { minutes: a }, RankBasis::MinutesSoFar { minutes: b }) => {
            a.total_cmp(b)
        }
        _ => Ordering::Equal,
    }
}

fn by_name(a: &Player, b: &Player) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

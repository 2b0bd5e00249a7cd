//! Playtime ledger: minutes per player rebuilt from lineups and substitutions.
//!
//! Per filled position a quarter of `d` minutes credits either
//! - the starter with `d` regular minutes, or
//! - the starter with `d/2` regular and the substitute with `d/2` substitute
//!   minutes, when a substitution happens there.
//!
//! Roster players credited nothing in a quarter sit `d` minutes on the bench.
//! Absent players are never credited and never benched.

use crate::models::{Match, Player, PlayerId, Quarter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaytimeEntry {
    pub regular: f64,
    pub substitute: f64,
    pub bench: f64,
    /// `regular + substitute`
    pub total: f64,
}

impl PlaytimeEntry {
    fn credit_regular(&mut self, minutes: f64) {
        self.regular += minutes;
        self.total += minutes;
    }

    fn credit_substitute(&mut self, minutes: f64) {
        self.substitute += minutes;
        self.total += minutes;
    }

    fn accumulate(&mut self, other: &PlaytimeEntry) {
        self.regular += other.regular;
        self.substitute += other.substitute;
        self.bench += other.bench;
        self.total += other.total;
    }

    pub fn has_played(&self) -> bool {
        self.total > 0.0
    }
}

pub type Ledger = BTreeMap<PlayerId, PlaytimeEntry>;

/// Season totals for one player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonPlaytime {
    pub regular: f64,
    pub substitute: f64,
    pub bench: f64,
    pub total: f64,
    /// Matches with any nonzero contribution.
    pub matches_played: u32,
    /// `total / matches_played`, 0 for players who never played.
    pub average_per_match: f64,
}

/// Minutes credited on the pitch during one quarter (bench is always 0 here).
pub fn quarter_contributions(m: &Match, quarter: &Quarter) -> Ledger {
    let mut credits = Ledger::new();
    let full = quarter.duration_minutes;
    let half = quarter.substitution_minute();

    for (position, starter) in &quarter.lineup {
        if m.is_absent(starter) {
            log::warn!(
                "Match {}: absent player {} in quarter {} lineup ignored",
                m.id,
                starter,
                quarter.index
            );
            continue;
        }
        match quarter.incoming_at(*position) {
            Some(incoming) => {
                credits.entry(starter.clone()).or_default().credit_regular(half);
                if m.is_absent(incoming) {
                    log::warn!(
                        "Match {}: absent player {} substitution in quarter {} ignored",
                        m.id,
                        incoming,
                        quarter.index
                    );
                    continue;
                }
                credits.entry(incoming.clone()).or_default().credit_substitute(full - half);
            }
            None => credits.entry(starter.clone()).or_default().credit_regular(full),
        }
    }
    credits
}

/// Full-match ledger.
pub fn compute(m: &Match, roster: &[Player]) -> Ledger {
    compute_through(m, roster, u8::MAX)
}

/// Ledger over quarters `1..=last_quarter` only; `0` gives every roster
/// player an empty entry.
pub fn compute_through(m: &Match, roster: &[Player], last_quarter: u8) -> Ledger {
    let mut ledger: Ledger = roster
        .iter()
        .filter(|p| !m.is_absent(&p.id))
        .map(|p| (p.id.clone(), PlaytimeEntry::default()))
        .collect();

    for quarter in m.quarters.iter().filter(|q| q.index <= last_quarter) {
        let credits = quarter_contributions(m, quarter);
        for (player, credit) in &credits {
            ledger.entry(player.clone()).or_default().accumulate(credit);
        }
        for player in roster {
            if m.is_absent(&player.id) || credits.contains_key(&player.id) {
                continue;
            }
            if let Some(entry) = ledger.get_mut(&player.id) {
                entry.bench += quarter.duration_minutes;
            }
        }
    }

    log::debug!(
        "Match {}: ledger through quarter {} covers {} players",
        m.id,
        last_quarter.min(m.quarter_count() as u8),
        ledger.len()
    );
    ledger
}

/// Sums match ledgers over a team's history.
pub fn compute_season(matches: &[Match], roster: &[Player]) -> BTreeMap<PlayerId, SeasonPlaytime> {
    let mut season: BTreeMap<PlayerId, SeasonPlaytime> = roster
        .iter()
        .map(|p| (p.id.clone(), SeasonPlaytime::default()))
        .collect();

    for m in matches {
        for (player, entry) in compute(m, roster) {
            let totals = season.entry(player).or_default();
            totals.regular += entry.regular;
            totals.substitute += entry.substitute;
            totals.bench += entry.bench;
            totals.total += entry.total;
            if entry.has_played() {
                totals.matches_played += 1;
            }
        }
    }

    for totals in season.values_mut() {
        totals.average_per_match = if totals.matches_played > 0 {
            totals.total / totals.matches_played as f64
        } else {
            0.0
        };
    }
    season
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;
    use crate::models::{Formation, Position, Substitution};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn match_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn roster(ids: &[&str]) -> Vec<Player> {
        ids.iter().map(|id| Player::new(*id, id.to_uppercase())).collect()
    }

    fn two_a_side(quarters: u8) -> Match {
        let config = RotationConfig { quarters_per_match: quarters, ..RotationConfig::for_tests() };
        Match::new("team", match_day(), Formation::TwoASide, &config).with_id("m")
    }

    #[test]
    fn test_swapped_keepers_play_equal_minutes() {
        let mut m = two_a_side(2);
        m.quarters[0].lineup.insert(Position::Keeper, pid("a"));
        m.quarters[0].lineup.insert(Position::Field, pid("b"));
        m.quarters[1].lineup.insert(Position::Keeper, pid("b"));
        m.quarters[1].lineup.insert(Position::Field, pid("a"));

        let ledger = compute(&m, &roster(&["a", "b"]));
        assert_eq!(ledger[&pid("a")].total, 20.0);
        assert_eq!(ledger[&pid("b")].total, 20.0);
        assert_eq!(ledger[&pid("a")].bench, 0.0);
    }

    #[test]
    fn test_substitution_splits_quarter_at_half() {
        let mut m = two_a_side(1);
        m.quarters[0].lineup.insert(Position::Field, pid("a"));
        m.quarters[0].substitutions.push(Substitution::new(Position::Field, "c"));

        let ledger = compute(&m, &roster(&["a", "c"]));
        assert_eq!(ledger[&pid("a")].regular, 5.0);
        assert_eq!(ledger[&pid("a")].substitute, 0.0);
        assert_eq!(ledger[&pid("c")].substitute, 5.0);
        assert_eq!(ledger[&pid("c")].regular, 0.0);
        assert_eq!(ledger[&pid("a")].total + ledger[&pid("c")].total, 10.0);
        assert_eq!(ledger[&pid("c")].bench, 0.0);
    }

    #[test]
    fn test_bench_and_absent() {
        let mut m = two_a_side(4);
        for q in &mut m.quarters {
            q.lineup.insert(Position::Keeper, pid("a"));
        }
        m.absent_player_ids.insert(pid("d"));

        let ledger = compute(&m, &roster(&["a", "b", "d"]));
        assert_eq!(ledger[&pid("b")].bench, 40.0);
        assert_eq!(ledger[&pid("b")].total, 0.0);
        assert!(!ledger.contains_key(&pid("d")));
    }

    #[test]
    fn test_compute_through_prior_quarter() {
        let mut m = two_a_side(4);
        for q in &mut m.quarters {
            q.lineup.insert(Position::Field, pid("a"));
        }
        let ledger = compute_through(&m, &roster(&["a"]), 2);
        assert_eq!(ledger[&pid("a")].total, 20.0);
        assert_eq!(compute_through(&m, &roster(&["a"]), 0)[&pid("a")].total, 0.0);
    }

    #[test]
    fn test_season_average_counts_only_played_matches() {
        let mut played = two_a_side(2);
        played.quarters[0].lineup.insert(Position::Field, pid("a"));
        let mut idle = two_a_side(2).with_id("m2");
        idle.quarters[0].lineup.insert(Position::Field, pid("b"));

        let season = compute_season(&[played, idle], &roster(&["a", "b", "c"]));
        assert_eq!(season[&pid("a")].matches_played, 1);
        assert_eq!(season[&pid("a")].average_per_match, 10.0);
        assert_eq!(season[&pid("a")].bench, 30.0);
        assert_eq!(season[&pid("c")].matches_played, 0);
        assert_eq!(season[&pid("c")].average_per_match, 0.0);
    }

    fn arb_quarter() -> impl Strategy<Value = Quarter> {
        // 8 positions of an eight-a-side, each filled by a distinct player or
        // empty, with an optional substitution from a separate bench pool.
        let slots = proptest::collection::vec((any::<bool>(), any::<bool>()), 8);
        (slots, prop_oneof![Just(10.0), Just(12.5), Just(15.0)]).prop_map(|(slots, minutes)| {
            let mut q = Quarter::new(1, minutes);
            for (i, (&position, (filled, subbed))) in
                Formation::EightASide.positions().iter().zip(slots).enumerate()
            {
                if filled {
                    q.lineup.insert(position, PlayerId::new(format!("s{i}")));
                }
                if subbed {
                    q.substitutions.push(Substitution::new(position, format!("b{i}")));
                }
            }
            q
        })
    }

    proptest! {
        #[test]
        fn prop_quarter_minutes_are_conserved(quarter in arb_quarter()) {
            let config = RotationConfig { quarters_per_match: 1, ..RotationConfig::for_tests() };
            let mut m = Match::new("team", match_day(), Formation::EightASide, &config);
            m.quarters[0] = quarter.clone();

            let credited: f64 = quarter_contributions(&m, &quarter).values().map(|e| e.total).sum();
            prop_assert_eq!(credited, quarter.lineup.len() as f64 * quarter.duration_minutes);

            let roster: Vec<Player> = (0..8)
                .flat_map(|i| [Player::new(format!("s{i}"), "S"), Player::new(format!("b{i}"), "B")])
                .collect();
            prop_assert_eq!(compute(&m, &roster), compute(&m, &roster));
        }
    }
}

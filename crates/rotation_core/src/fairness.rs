//! # Season Fairness
//!
//! How evenly playing time is spread over a team's season.
//!
//! The Gini coefficient summarizes the spread of total minutes:
//! - 0.0 = everyone played exactly as much
//! - towards 1.0 = a few players got nearly all the minutes
//!
//! For youth rotation anything above ~0.15 usually means someone is being
//! left out.

use crate::engine::{keeper, playtime, KeeperScope, SeasonPlaytime};
use crate::models::{Match, Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Gini coefficient of non-negative values.
///
/// Uses the sorted-values formula:
/// G = (2 * Σ(i * x_i)) / (n * Σx_i) - (n+1)/n
///
/// # Returns
/// * `Some(gini)` in [0.0, 1.0]
/// * `None` for empty input
///
/// # Examples
/// ```
/// use rotation_core::fairness::gini_coefficient;
///
/// assert!(gini_coefficient(&[40.0, 40.0, 40.0]).unwrap() < 0.01);
/// assert!(gini_coefficient(&[100.0, 0.0, 0.0, 0.0, 0.0]).unwrap() > 0.75);
/// ```
pub fn gini_coefficient(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    let mut sorted: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let sum: f64 = sorted.iter().sum();
    if sum == 0.0 {
        // Nobody played: equally nothing.
        return Some(0.0);
    }

    // i+1 because the formula uses 1-indexed ranks
    let weighted_sum: f64 = sorted.iter().enumerate().map(|(i, v)| (i as f64 + 1.0) * v).sum();

    let n = n as f64;
    let gini = (2.0 * weighted_sum) / (n * sum) - (n + 1.0) / n;
    Some(gini.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonLine {
    pub player: Player,
    pub playtime: SeasonPlaytime,
    pub keeper_quarters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub matches: usize,
    /// Roster order.
    pub players: Vec<PlayerSeasonLine>,
    /// Gini of total minutes over roster players; `None` for an empty roster.
    pub minutes_gini: Option<f64>,
}

pub fn season_report(matches: &[Match], roster: &[Player]) -> SeasonReport {
    let season = playtime::compute_season(matches, roster);
    let keepers = keeper::count(matches, &KeeperScope::Season);

    let players: Vec<PlayerSeasonLine> = roster
        .iter()
        .map(|p| PlayerSeasonLine {
            player: p.clone(),
            playtime: season.get(&p.id).copied().unwrap_or_default(),
            keeper_quarters: keepers.get(&p.id).copied().unwrap_or(0),
        })
        .collect();

    let totals: Vec<f64> = players.iter().map(|line| line.playtime.total).collect();
    SeasonReport { matches: matches.len(), players, minutes_gini: gini_coefficient(&totals) }
}

impl SeasonReport {
    pub fn line(&self, player: &PlayerId) -> Option<&PlayerSeasonLine> {
        self.players.iter().find(|line| &line.player.id == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;
    use crate::models::{Formation, Position};
    use chrono::NaiveDate;

    fn match_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
    }

    #[test]
    fn test_gini_edge_cases() {
        assert_eq!(gini_coefficient(&[]), None);
        assert_eq!(gini_coefficient(&[0.0, 0.0]), Some(0.0));
        assert_eq!(gini_coefficient(&[25.0]), Some(0.0));
    }

    #[test]
    fn test_gini_half_share() {
        // Two players, one took everything: G = 0.5 for n=2.
        let g = gini_coefficient(&[50.0, 0.0]).unwrap();
        assert!((g - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_season_report() {
        let roster = vec![Player::new("a", "Anna"), Player::new("b", "Bram")];
        let config = RotationConfig::for_tests();
        let mut m = Match::new("team", match_day(), Formation::TwoASide, &config);
        for q in &mut m.quarters {
            q.lineup.insert(Position::Keeper, PlayerId::new("a"));
            q.lineup.insert(Position::Field, PlayerId::new("b"));
        }

        let report = season_report(&[m], &roster);
        assert_eq!(report.matches, 1);
        assert_eq!(report.minutes_gini, Some(0.0));
        let anna = report.line(&PlayerId::new("a")).unwrap();
        assert_eq!(anna.keeper_quarters, 4);
        assert_eq!(anna.playtime.total, 40.0);
        assert_eq!(report.line(&PlayerId::new("b")).unwrap().keeper_quarters, 0);
    }
}

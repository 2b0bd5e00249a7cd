//! Fairness rules evaluated per quarter.
//!
//! All warnings are advisory. They are recomputed from scratch on every
//! edit, so fixing a lineup simply makes the warning disappear.

use crate::config::RuleSwitches;
use crate::models::{Match, Player, PlayerId, Quarter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Keeper plays field in neither neighbouring quarter.
    KeeperFieldExperience,
    /// Inactive in two consecutive quarters.
    DoubleBench,
    /// Came on as a substitute, then sat out the next quarter.
    SubstituteThenBench,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// 1-based quarter the warning is attributed to.
    pub quarter: u8,
    pub rule: RuleKind,
    pub player: PlayerId,
    pub message: String,
}

/// Runs the enabled rules and returns warnings ordered by quarter, rule, player.
pub fn validate(m: &Match, roster: &[Player], rules: &RuleSwitches) -> Vec<Warning> {
    let names: BTreeMap<&PlayerId, &str> =
        roster.iter().map(|p| (&p.id, p.name.as_str())).collect();
    let name_of = |id: &PlayerId| -> String {
        names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string())
    };

    let mut warnings = Vec::new();
    if rules.keeper_field_experience {
        keeper_field_experience(m, &name_of, &mut warnings);
    }
    if rules.no_double_bench {
        double_bench(m, roster, &name_of, &mut warnings);
    }
    if rules.substitute_then_bench {
        substitute_then_bench(m, &name_of, &mut warnings);
    }

    warnings.sort_by(|a, b| {
        (a.quarter, a.rule, &a.player).cmp(&(b.quarter, b.rule, &b.player))
    });
    log::debug!("Match {}: {} fairness warnings", m.id, warnings.len());
    warnings
}

/// Warnings keyed by quarter for display.
pub fn group_by_quarter(warnings: &[Warning]) -> BTreeMap<u8, Vec<Warning>> {
    let mut grouped: BTreeMap<u8, Vec<Warning>> = BTreeMap::new();
    for w in warnings {
        grouped.entry(w.quarter).or_default().push(w.clone());
    }
    grouped
}

fn neighbours(m: &Match, position: usize) -> Vec<&Quarter> {
    let before = position.checked_sub(1).and_then(|i| m.quarters.get(i));
    let after = m.quarters.get(position + 1);
    before.into_iter().chain(after).collect()
}

fn keeper_field_experience(
    m: &Match,
    name_of: &dyn Fn(&PlayerId) -> String,
    warnings: &mut Vec<Warning>,
) {
    for (i, quarter) in m.quarters.iter().enumerate() {
        let around = neighbours(m, i);
        if around.is_empty() {
            continue;
        }
        for keeper in quarter.keepers() {
            if m.is_absent(keeper) {
                continue;
            }
            if around.iter().any(|q| q.plays_field(keeper)) {
                continue;
            }
            let adjacent: Vec<String> = around.iter().map(|q| q.index.to_string()).collect();
            warnings.push(Warning {
                quarter: quarter.index,
                rule: RuleKind::KeeperFieldExperience,
                player: keeper.clone(),
                message: format!(
                    "{} keeps goal in quarter {} but plays no field position in quarter {}",
                    name_of(keeper),
                    quarter.index,
                    adjacent.join(" or ")
                ),
            });
        }
    }
}

fn double_bench(
    m: &Match,
    roster: &[Player],
    name_of: &dyn Fn(&PlayerId) -> String,
    warnings: &mut Vec<Warning>,
) {
    for pair in m.quarters.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        for player in roster {
            if m.is_absent(&player.id) {
                continue;
            }
            if first.is_active(&player.id) || second.is_active(&player.id) {
                continue;
            }
            warnings.push(Warning {
                quarter: first.index,
                rule: RuleKind::DoubleBench,
                player: player.id.clone(),
                message: format!(
                    "{} sits on the bench in both quarter {} and quarter {}",
                    name_of(&player.id),
                    first.index,
                    second.index
                ),
            });
        }
    }
}

fn substitute_then_bench(
    m: &Match,
    name_of: &dyn Fn(&PlayerId) -> String,
    warnings: &mut Vec<Warning>,
) {
    for (i, quarter) in m.quarters.iter().enumerate() {
        let Some(next) = m.quarters.get(i + 1) else {
            continue;
        };
        for (_, incoming) in quarter.effective_substitutions() {
            if m.is_absent(incoming) || quarter.starts(incoming) || next.is_active(incoming) {
                continue;
            }
            warnings.push(Warning {
                quarter: quarter.index,
                rule: RuleKind::SubstituteThenBench,
                player: incoming.clone(),
                message: format!(
                    "{} comes on as a substitute in quarter {} and sits out quarter {}",
                    name_of(incoming),
                    quarter.index,
                    next.index
                ),
            });
        }
    }
}

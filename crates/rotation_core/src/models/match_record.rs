use super::{Formation, GoalId, MatchId, PlayerId, Position, TeamId};
use crate::config::RotationConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HomeAway {
    #[default]
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalSide {
    Own,
    Opponent,
}

/// A single replacement at `position`, happening at half of the quarter.
///
/// Freshly added substitutions are blank and filled in field by field, so
/// both halves are optional. Incomplete entries carry no minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Substitution {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default, alias = "incoming_player_id")]
    pub incoming: Option<PlayerId>,
}

impl Substitution {
    pub fn new(position: Position, incoming: impl Into<PlayerId>) -> Self {
        Self { position: Some(position), incoming: Some(incoming.into()) }
    }

    pub fn is_complete(&self) -> bool {
        self.position.is_some() && self.incoming.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub side: GoalSide,
    #[serde(default)]
    pub scorer: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quarter {
    /// 1-based.
    pub index: u8,
    pub duration_minutes: f64,
    #[serde(default)]
    pub lineup: BTreeMap<Position, PlayerId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub substitutions: Vec<Substitution>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub goals: Vec<Goal>,
}

/// Legacy records store `null` where an empty list is meant.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Quarter {
    pub fn new(index: u8, duration_minutes: f64) -> Self {
        Self {
            index,
            duration_minutes,
            lineup: BTreeMap::new(),
            substitutions: Vec::new(),
            goals: Vec::new(),
        }
    }

    /// Moment the substitute comes on.
    pub fn substitution_minute(&self) -> f64 {
        self.duration_minutes / 2.0
    }

    pub fn starter(&self, position: Position) -> Option<&PlayerId> {
        self.lineup.get(&position)
    }

    /// Substitutions that actually take effect: complete, at a filled
    /// position, first one wins per position.
    pub fn effective_substitutions(&self) -> impl Iterator<Item = (Position, &PlayerId)> + '_ {
        let mut seen = BTreeSet::new();
        self.substitutions.iter().filter_map(move |sub| {
            let position = sub.position?;
            let incoming = sub.incoming.as_ref()?;
            if !self.lineup.contains_key(&position) || !seen.insert(position) {
                return None;
            }
            Some((position, incoming))
        })
    }

    pub fn incoming_at(&self, position: Position) -> Option<&PlayerId> {
        self.effective_substitutions()
            .find(|(pos, _)| *pos == position)
            .map(|(_, player)| player)
    }

    pub fn starting_position(&self, player: &PlayerId) -> Option<Position> {
        self.lineup.iter().find(|(_, p)| *p == player).map(|(pos, _)| *pos)
    }

    pub fn incoming_position(&self, player: &PlayerId) -> Option<Position> {
        self.effective_substitutions()
            .find(|(_, p)| *p == player)
            .map(|(pos, _)| pos)
    }

    pub fn starts(&self, player: &PlayerId) -> bool {
        self.starting_position(player).is_some()
    }

    pub fn subs_in(&self, player: &PlayerId) -> bool {
        self.incoming_position(player).is_some()
    }

    /// In the lineup or coming on as a substitute.
    pub fn is_active(&self, player: &PlayerId) -> bool {
        self.starts(player) || self.subs_in(player)
    }

    /// Holds the keeper position at any point of the quarter.
    pub fn is_keeper(&self, player: &PlayerId) -> bool {
        self.starter(Position::Keeper) == Some(player)
            || self.incoming_at(Position::Keeper) == Some(player)
    }

    /// Active, and never in goal during this quarter.
    pub fn plays_field(&self, player: &PlayerId) -> bool {
        self.is_active(player) && !self.is_keeper(player)
    }

    /// Everyone holding the keeper position at some point, starter first.
    pub fn keepers(&self) -> Vec<&PlayerId> {
        let mut keepers: Vec<&PlayerId> = Vec::with_capacity(2);
        keepers.extend(self.starter(Position::Keeper));
        if let Some(incoming) = self.incoming_at(Position::Keeper) {
            if !keepers.contains(&incoming) {
                keepers.push(incoming);
            }
        }
        keepers
    }

    /// Lineup position or incoming-substitution position of `player`.
    pub fn occupied_position(&self, player: &PlayerId) -> Option<Position> {
        self.starting_position(player).or_else(|| self.incoming_position(player))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub team_id: TeamId,
    pub date: NaiveDate,
    #[serde(default)]
    pub opponent: String,
    #[serde(default)]
    pub home_away: HomeAway,
    pub formation: Formation,
    pub quarters: Vec<Quarter>,
    #[serde(default)]
    pub absent_player_ids: BTreeSet<PlayerId>,
}

impl Match {
    /// New match on `date` with empty quarters sized by `config`.
    pub fn new(
        team_id: impl Into<TeamId>,
        date: NaiveDate,
        formation: Formation,
        config: &RotationConfig,
    ) -> Self {
        let quarters = (1..=config.quarters_per_match)
            .map(|index| Quarter::new(index, config.default_quarter_minutes))
            .collect();

        Self {
            id: MatchId::generate(),
            team_id: team_id.into(),
            date,
            opponent: String::new(),
            home_away: HomeAway::Home,
            formation,
            quarters,
            absent_player_ids: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<MatchId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_opponent(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = opponent.into();
        self
    }

    pub fn with_home_away(mut self, home_away: HomeAway) -> Self {
        self.home_away = home_away;
        self
    }

    pub fn quarter_count(&self) -> usize {
        self.quarters.len()
    }

    /// Quarter by 1-based index.
    pub fn quarter(&self, index: u8) -> Option<&Quarter> {
        (index as usize).checked_sub(1).and_then(|i| self.quarters.get(i))
    }

    pub(crate) fn quarter_mut(&mut self, index: u8) -> Option<&mut Quarter> {
        (index as usize).checked_sub(1).and_then(move |i| self.quarters.get_mut(i))
    }

    pub fn is_absent(&self, player: &PlayerId) -> bool {
        self.absent_player_ids.contains(player)
    }

    /// (own, opponent) goals over all quarters.
    pub fn score(&self) -> (usize, usize) {
        self.quarters.iter().flat_map(|q| &q.goals).fold((0, 0), |(own, opp), goal| {
            match goal.side {
                GoalSide::Own => (own + 1, opp),
                GoalSide::Opponent => (own, opp + 1),
            }
        })
    }
}

use super::{sort_matches, MatchStore, RosterStore, StoreError};
use crate::models::{Match, MatchId, Player, PlayerId, TeamId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    players: Vec<Player>,
    matches: BTreeMap<MatchId, Match>,
}

impl MemoryStore {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players, matches: BTreeMap::new() }
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let pos = self.players.iter().position(|p| &p.id == id)?;
        Some(self.players.remove(pos))
    }
}

impl RosterStore for MemoryStore {
    fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.players.clone())
    }
}

impl MatchStore for MemoryStore {
    fn load_match(&self, id: &MatchId) -> Result<Match, StoreError> {
        self.matches
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::MatchNotFound { id: id.to_string() })
    }

    fn save_match(&mut self, m: &Match) -> Result<(), StoreError> {
        self.matches.insert(m.id.clone(), m.clone());
        Ok(())
    }

    fn list_matches_for_team(&self, team: &TeamId) -> Result<Vec<Match>, StoreError> {
        let mut matches: Vec<Match> =
            self.matches.values().filter(|m| &m.team_id == team).cloned().collect();
        sort_matches(&mut matches);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;
    use crate::models::Formation;
    use chrono::NaiveDate;

    #[test]
    fn test_roundtrip_and_team_listing() {
        let mut store = MemoryStore::new(vec![Player::new("a", "Anna")]);
        let config = RotationConfig::default();
        let day = |d| NaiveDate::from_ymd_opt(2026, 9, d).unwrap();

        let late = Match::new("t1", day(20), Formation::SixASide, &config).with_id("m2");
        let early = Match::new("t1", day(6), Formation::SixASide, &config).with_id("m1");
        let other = Match::new("t2", day(1), Formation::SixASide, &config).with_id("m3");
        for m in [&late, &early, &other] {
            store.save_match(m).unwrap();
        }

        assert_eq!(store.load_match(&MatchId::new("m1")).unwrap(), early);
        let ids: Vec<String> = store
            .list_matches_for_team(&TeamId::new("t1"))
            .unwrap()
            .iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert!(matches!(
            store.load_match(&MatchId::new("nope")),
            Err(StoreError::MatchNotFound { .. })
        ));
        assert_eq!(store.list_players().unwrap().len(), 1);
    }
}

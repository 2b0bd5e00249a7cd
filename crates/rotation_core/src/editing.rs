//! Coach edits on a match snapshot.
//!
//! Every operation checks all of its preconditions before touching the
//! match, so a failed edit leaves the snapshot unchanged. `Match::apply`
//! wraps the same operations and returns a fresh snapshot instead.

use crate::error::{LineupError, Result};
use crate::models::{Goal, GoalId, GoalSide, Match, PlayerId, Position, Quarter, Substitution};
use serde::{Deserialize, Serialize};

/// One field of a substitution being filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SubstitutionUpdate {
    Position(Option<Position>),
    Incoming(Option<PlayerId>),
}

/// Serializable edit, as sent by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MatchEdit {
    SetLineup { quarter: u8, position: Position, player: Option<PlayerId> },
    AddSubstitution { quarter: u8 },
    UpdateSubstitution { quarter: u8, index: usize, update: SubstitutionUpdate },
    RemoveSubstitution { quarter: u8, index: usize },
    ToggleAttendance { player: PlayerId },
    AddGoal { quarter: u8, side: GoalSide, scorer: Option<PlayerId> },
    RemoveGoal { quarter: u8, goal: GoalId },
}

impl Match {
    /// Applies `edit` to a copy of this match.
    pub fn apply(&self, edit: &MatchEdit) -> Result<Match> {
        let mut next = self.clone();
        match edit {
            MatchEdit::SetLineup { quarter, position, player } => {
                next.set_lineup(*quarter, *position, player.clone())?;
            }
            MatchEdit::AddSubstitution { quarter } => {
                next.add_substitution(*quarter)?;
            }
            MatchEdit::UpdateSubstitution { quarter, index, update } => {
                next.update_substitution(*quarter, *index, update.clone())?;
            }
            MatchEdit::RemoveSubstitution { quarter, index } => {
                next.remove_substitution(*quarter, *index)?;
            }
            MatchEdit::ToggleAttendance { player } => {
                next.toggle_attendance(player);
            }
            MatchEdit::AddGoal { quarter, side, scorer } => {
                next.add_goal(*quarter, *side, scorer.clone())?;
            }
            MatchEdit::RemoveGoal { quarter, goal } => {
                next.remove_goal(*quarter, goal)?;
            }
        }
        Ok(next)
    }

    /// Puts `player` at `position` for one quarter, or clears the slot.
    ///
    /// A player already starting elsewhere, or coming on as a substitute
    /// anywhere in that quarter, must be removed there first.
    pub fn set_lineup(
        &mut self,
        quarter: u8,
        position: Position,
        player: Option<PlayerId>,
    ) -> Result<()> {
        self.formation.check(position)?;
        let absent = player.as_ref().is_some_and(|p| self.is_absent(p));
        let q = self.existing_quarter(quarter)?;

        if let Some(player) = &player {
            if absent {
                return Err(LineupError::AbsentPlayer { player: player.clone() });
            }
            if let Some(occupied) = q.starting_position(player).filter(|pos| *pos != position) {
                return Err(LineupError::InvalidAssignment {
                    player: player.clone(),
                    quarter,
                    occupied,
                });
            }
            if let Some(occupied) = substitution_position_of(q, player, None) {
                return Err(LineupError::InvalidAssignment {
                    player: player.clone(),
                    quarter,
                    occupied,
                });
            }
        }

        let q = self.existing_quarter_mut(quarter)?;
        match player {
            Some(player) => {
                q.lineup.insert(position, player);
            }
            None => {
                q.lineup.remove(&position);
                if q.substitutions.iter().any(|s| s.position == Some(position)) {
                    log::debug!(
                        "Quarter {} {:?} cleared; its substitution no longer counts",
                        quarter,
                        position
                    );
                }
            }
        }
        Ok(())
    }

    /// Appends a blank substitution and returns its index.
    pub fn add_substitution(&mut self, quarter: u8) -> Result<usize> {
        let q = self.existing_quarter_mut(quarter)?;
        q.substitutions.push(Substitution::default());
        Ok(q.substitutions.len() - 1)
    }

    pub fn update_substitution(
        &mut self,
        quarter: u8,
        index: usize,
        update: SubstitutionUpdate,
    ) -> Result<()> {
        let q = self.existing_quarter(quarter)?;
        let current = q
            .substitutions
            .get(index)
            .ok_or(LineupError::SubstitutionNotFound { index, quarter })?;

        match &update {
            SubstitutionUpdate::Position(Some(position)) => {
                self.formation.check(*position)?;
                if !q.lineup.contains_key(position) {
                    return Err(LineupError::PositionNotFilled { position: *position, quarter });
                }
                let taken = q
                    .substitutions
                    .iter()
                    .enumerate()
                    .any(|(i, s)| i != index && s.position == Some(*position));
                if taken {
                    return Err(LineupError::DuplicateSubstitution { position: *position, quarter });
                }
                if let Some(incoming) = &current.incoming {
                    let occupied = q
                        .starting_position(incoming)
                        .or_else(|| substitution_position_of(q, incoming, Some(index)));
                    if let Some(occupied) = occupied {
                        return Err(LineupError::InvalidAssignment {
                            player: incoming.clone(),
                            quarter,
                            occupied,
                        });
                    }
                }
            }
            SubstitutionUpdate::Incoming(Some(player)) => {
                if self.is_absent(player) {
                    return Err(LineupError::AbsentPlayer { player: player.clone() });
                }
                let occupied = q
                    .starting_position(player)
                    .or_else(|| substitution_position_of(q, player, Some(index)));
                if let Some(occupied) = occupied {
                    return Err(LineupError::InvalidAssignment {
                        player: player.clone(),
                        quarter,
                        occupied,
                    });
                }
                let pending = q
                    .substitutions
                    .iter()
                    .enumerate()
                    .any(|(i, s)| i != index && s.incoming.as_ref() == Some(player));
                if pending {
                    return Err(LineupError::DuplicateIncoming { player: player.clone(), quarter });
                }
            }
            SubstitutionUpdate::Position(None) | SubstitutionUpdate::Incoming(None) => {}
        }

        let q = self.existing_quarter_mut(quarter)?;
        let sub = &mut q.substitutions[index];
        match update {
            SubstitutionUpdate::Position(position) => sub.position = position,
            SubstitutionUpdate::Incoming(player) => sub.incoming = player,
        }
        Ok(())
    }

    pub fn remove_substitution(&mut self, quarter: u8, index: usize) -> Result<Substitution> {
        let q = self.existing_quarter_mut(quarter)?;
        if index >= q.substitutions.len() {
            return Err(LineupError::SubstitutionNotFound { index, quarter });
        }
        Ok(q.substitutions.remove(index))
    }

    /// Flips a player's attendance and returns whether they are now absent.
    ///
    /// Marking a player absent also takes them out of every lineup slot and
    /// substitution of this match. Substitutions replacing them lose their
    /// position, so refilling the slot later does not revive them.
    pub fn toggle_attendance(&mut self, player: &PlayerId) -> bool {
        if self.absent_player_ids.remove(player) {
            log::info!("Player {} marked present", player);
            return false;
        }

        self.absent_player_ids.insert(player.clone());
        let mut cleared = 0usize;
        for q in &mut self.quarters {
            let vacated = q.starting_position(player);
            q.lineup.retain(|_, p| p != player);
            for sub in &mut q.substitutions {
                if sub.incoming.as_ref() == Some(player) {
                    sub.incoming = None;
                    cleared += 1;
                }
                // Going off at a slot nobody holds any more.
                if vacated.is_some() && sub.position == vacated {
                    sub.position = None;
                }
            }
            cleared += usize::from(vacated.is_some());
        }
        log::info!("Player {} marked absent ({} assignments cleared)", player, cleared);
        true
    }

    pub fn add_goal(
        &mut self,
        quarter: u8,
        side: GoalSide,
        scorer: Option<PlayerId>,
    ) -> Result<GoalId> {
        let q = self.existing_quarter_mut(quarter)?;
        let id = GoalId::generate();
        q.goals.push(Goal { id: id.clone(), side, scorer });
        Ok(id)
    }

    pub fn remove_goal(&mut self, quarter: u8, goal: &GoalId) -> Result<Goal> {
        let q = self.existing_quarter_mut(quarter)?;
        let pos = q.goals.iter().position(|g| &g.id == goal).ok_or_else(|| {
            LineupError::GoalNotFound { goal: goal.to_string(), quarter }
        })?;
        Ok(q.goals.remove(pos))
    }

    fn existing_quarter(&self, quarter: u8) -> Result<&Quarter> {
        let count = self.quarter_count();
        self.quarter(quarter).ok_or(LineupError::QuarterOutOfRange { quarter, count })
    }

    fn existing_quarter_mut(&mut self, quarter: u8) -> Result<&mut Quarter> {
        let count = self.quarter_count();
        self.quarter_mut(quarter).ok_or(LineupError::QuarterOutOfRange { quarter, count })
    }
}

/// Position of a positioned substitution bringing `player` on, skipping `except`.
fn substitution_position_of(
    q: &Quarter,
    player: &PlayerId,
    except: Option<usize>,
) -> Option<Position> {
    q.substitutions.iter().enumerate().find_map(|(i, s)| {
        if Some(i) == except || s.incoming.as_ref() != Some(player) {
            return None;
        }
        s.position
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;
    use crate::models::Formation;
    use chrono::NaiveDate;

    fn match_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
    }

    fn six_a_side() -> Match {
        Match::new("team", match_day(), Formation::SixASide, &RotationConfig::for_tests())
            .with_id("m1")
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_set_lineup_rejects_second_position() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Keeper, Some(pid("a"))).unwrap();
        let err = m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap_err();
        assert_eq!(
            err,
            LineupError::InvalidAssignment { player: pid("a"), quarter: 1, occupied: Position::Keeper }
        );
        // Same slot again is a no-op re-selection.
        m.set_lineup(1, Position::Keeper, Some(pid("a"))).unwrap();
        // Other quarters are independent.
        m.set_lineup(2, Position::Left, Some(pid("a"))).unwrap();
    }

    #[test]
    fn test_set_lineup_checks_formation_and_quarter() {
        let mut m = six_a_side();
        assert!(matches!(
            m.set_lineup(1, Position::LeftBack, Some(pid("a"))),
            Err(LineupError::PositionNotInFormation { .. })
        ));
        assert_eq!(
            m.set_lineup(5, Position::Keeper, Some(pid("a"))),
            Err(LineupError::QuarterOutOfRange { quarter: 5, count: 4 })
        );
    }

    #[test]
    fn test_substitution_flow() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap();
        let idx = m.add_substitution(1).unwrap();

        assert_eq!(
            m.update_substitution(1, idx, SubstitutionUpdate::Position(Some(Position::Right))),
            Err(LineupError::PositionNotFilled { position: Position::Right, quarter: 1 })
        );
        m.update_substitution(1, idx, SubstitutionUpdate::Position(Some(Position::Left))).unwrap();
        assert!(matches!(
            m.update_substitution(1, idx, SubstitutionUpdate::Incoming(Some(pid("a")))),
            Err(LineupError::InvalidAssignment { .. })
        ));
        m.update_substitution(1, idx, SubstitutionUpdate::Incoming(Some(pid("b")))).unwrap();
        assert_eq!(m.quarter(1).unwrap().incoming_at(Position::Left), Some(&pid("b")));

        let second = m.add_substitution(1).unwrap();
        assert_eq!(
            m.update_substitution(1, second, SubstitutionUpdate::Position(Some(Position::Left))),
            Err(LineupError::DuplicateSubstitution { position: Position::Left, quarter: 1 })
        );

        let removed = m.remove_substitution(1, idx).unwrap();
        assert_eq!(removed, Substitution::new(Position::Left, "b"));
        assert_eq!(
            m.remove_substitution(1, 7),
            Err(LineupError::SubstitutionNotFound { index: 7, quarter: 1 })
        );
    }

    #[test]
    fn test_incoming_player_only_once_per_quarter() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap();
        m.set_lineup(1, Position::Right, Some(pid("c"))).unwrap();

        // Player first, position second.
        let first = m.add_substitution(1).unwrap();
        m.update_substitution(1, first, SubstitutionUpdate::Incoming(Some(pid("b")))).unwrap();
        let second = m.add_substitution(1).unwrap();
        m.update_substitution(1, second, SubstitutionUpdate::Position(Some(Position::Left)))
            .unwrap();
        assert_eq!(
            m.update_substitution(1, second, SubstitutionUpdate::Incoming(Some(pid("b")))),
            Err(LineupError::DuplicateIncoming { player: pid("b"), quarter: 1 })
        );

        // Position first, player second.
        m.update_substitution(1, first, SubstitutionUpdate::Position(Some(Position::Right)))
            .unwrap();
        assert_eq!(
            m.update_substitution(1, second, SubstitutionUpdate::Incoming(Some(pid("b")))),
            Err(LineupError::InvalidAssignment {
                player: pid("b"),
                quarter: 1,
                occupied: Position::Right
            })
        );
        let effective: Vec<_> = m.quarter(1).unwrap().effective_substitutions().collect();
        assert_eq!(effective, vec![(Position::Right, &pid("b"))]);
    }

    #[test]
    fn test_positioning_a_second_entry_for_the_same_player_is_rejected() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap();
        m.set_lineup(1, Position::Right, Some(pid("c"))).unwrap();

        let first = m.add_substitution(1).unwrap();
        m.update_substitution(1, first, SubstitutionUpdate::Position(Some(Position::Left)))
            .unwrap();
        m.update_substitution(1, first, SubstitutionUpdate::Incoming(Some(pid("b")))).unwrap();

        // A stored record may carry the same player twice with one position open.
        m.quarters[0].substitutions.push(Substitution { position: None, incoming: Some(pid("b")) });
        let second = m.quarters[0].substitutions.len() - 1;
        assert_eq!(
            m.update_substitution(1, second, SubstitutionUpdate::Position(Some(Position::Right))),
            Err(LineupError::InvalidAssignment {
                player: pid("b"),
                quarter: 1,
                occupied: Position::Left
            })
        );

        let ledger = crate::engine::playtime::compute(&m, &[]);
        assert_eq!(ledger[&pid("b")].substitute, 5.0);
    }

    #[test]
    fn test_absent_player_cannot_be_used() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap();
        assert!(m.toggle_attendance(&pid("d")));

        assert_eq!(
            m.set_lineup(1, Position::Right, Some(pid("d"))),
            Err(LineupError::AbsentPlayer { player: pid("d") })
        );
        let idx = m.add_substitution(1).unwrap();
        assert_eq!(
            m.update_substitution(1, idx, SubstitutionUpdate::Incoming(Some(pid("d")))),
            Err(LineupError::AbsentPlayer { player: pid("d") })
        );

        assert!(!m.toggle_attendance(&pid("d")));
        assert!(!m.is_absent(&pid("d")));
    }

    #[test]
    fn test_marking_absent_clears_assignments() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap();
        m.set_lineup(2, Position::Keeper, Some(pid("b"))).unwrap();
        let idx = m.add_substitution(2).unwrap();
        m.update_substitution(2, idx, SubstitutionUpdate::Position(Some(Position::Keeper))).unwrap();
        m.update_substitution(2, idx, SubstitutionUpdate::Incoming(Some(pid("a")))).unwrap();

        m.toggle_attendance(&pid("a"));
        assert!(m.quarter(1).unwrap().lineup.is_empty());
        assert_eq!(m.quarter(2).unwrap().substitutions[idx].incoming, None);
    }

    #[test]
    fn test_substitution_for_absent_starter_does_not_revive() {
        let mut m = six_a_side();
        m.set_lineup(1, Position::Left, Some(pid("a"))).unwrap();
        let idx = m.add_substitution(1).unwrap();
        m.update_substitution(1, idx, SubstitutionUpdate::Position(Some(Position::Left))).unwrap();
        m.update_substitution(1, idx, SubstitutionUpdate::Incoming(Some(pid("b")))).unwrap();

        m.toggle_attendance(&pid("a"));
        let sub = &m.quarter(1).unwrap().substitutions[idx];
        assert_eq!(sub.position, None);
        assert_eq!(sub.incoming, Some(pid("b")));

        m.set_lineup(1, Position::Left, Some(pid("c"))).unwrap();
        assert_eq!(m.quarter(1).unwrap().incoming_at(Position::Left), None);
        let ledger = crate::engine::playtime::compute(&m, &[]);
        assert_eq!(ledger[&pid("c")].regular, 10.0);
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let m = six_a_side();
        let edit = MatchEdit::SetLineup { quarter: 1, position: Position::Keeper, player: Some(pid("a")) };
        let next = m.apply(&edit).unwrap();
        assert!(m.quarter(1).unwrap().lineup.is_empty());
        assert_eq!(next.quarter(1).unwrap().starter(Position::Keeper), Some(&pid("a")));

        let bad = MatchEdit::RemoveGoal { quarter: 1, goal: GoalId::new("nope") };
        assert!(matches!(next.apply(&bad), Err(LineupError::GoalNotFound { .. })));
    }

    #[test]
    fn test_goals() {
        let mut m = six_a_side();
        let own = m.add_goal(2, GoalSide::Own, Some(pid("a"))).unwrap();
        m.add_goal(3, GoalSide::Opponent, None).unwrap();
        assert_eq!(m.score(), (1, 1));
        m.remove_goal(2, &own).unwrap();
        assert_eq!(m.score(), (0, 1));
    }

    #[test]
    fn test_edit_wire_format() {
        let raw = r#"{"op": "update_substitution", "quarter": 2, "index": 0,
                      "update": {"field": "incoming", "value": "p9"}}"#;
        let edit: MatchEdit = serde_json::from_str(raw).unwrap();
        assert_eq!(
            edit,
            MatchEdit::UpdateSubstitution {
                quarter: 2,
                index: 0,
                update: SubstitutionUpdate::Incoming(Some(pid("p9"))),
            }
        );
    }
}

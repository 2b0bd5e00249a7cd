//! Persistence collaborators.
//!
//! The engine only ever sees snapshots; these traits are how callers get
//! them. `FileStore` keeps JSON files on disk, `MemoryStore` is for tests
//! and embedding.

pub mod error;
pub mod file;
pub mod memory;
pub mod migration;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use migration::{migrate_match, StoredMatch};

use crate::models::{Match, MatchId, Player, TeamId};

pub const MATCH_SCHEMA_VERSION: u32 = 1;

pub trait RosterStore {
    fn list_players(&self) -> Result<Vec<Player>, StoreError>;
}

pub trait MatchStore {
    fn load_match(&self, id: &MatchId) -> Result<Match, StoreError>;
    fn save_match(&mut self, m: &Match) -> Result<(), StoreError>;
    /// All matches of a team, oldest first.
    fn list_matches_for_team(&self, team: &TeamId) -> Result<Vec<Match>, StoreError>;
}

/// Chronological order with id as tie-break.
pub(crate) fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}

/// Rejects snapshots the engine cannot trust.
pub fn check_match(m: &Match) -> Result<(), StoreError> {
    for q in &m.quarters {
        if !(q.duration_minutes.is_finite() && q.duration_minutes > 0.0) {
            return Err(StoreError::Corrupted(format!(
                "match {} quarter {} has duration {}",
                m.id, q.index, q.duration_minutes
            )));
        }
        for position in q.lineup.keys() {
            if !m.formation.contains(*position) {
                return Err(StoreError::Corrupted(format!(
                    "match {} quarter {} uses {:?}, not in formation {}",
                    m.id,
                    q.index,
                    position,
                    m.formation.code()
                )));
            }
        }
    }
    for (i, q) in m.quarters.iter().enumerate() {
        if q.index as usize != i + 1 {
            return Err(StoreError::Corrupted(format!(
                "match {} quarter at slot {} has index {}",
                m.id,
                i + 1,
                q.index
            )));
        }
    }
    Ok(())
}

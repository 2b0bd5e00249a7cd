use super::migration::{migrate_match, StoredMatch};
use super::{check_match, sort_matches, MatchStore, RosterStore, StoreError};
use crate::models::{Match, MatchId, Player, TeamId};
use std::fs::{read_dir, rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const ROSTER_FILE: &str = "roster.json";
const MATCH_DIR: &str = "matches";

/// Directory-backed store:
///
/// ```text
/// <root>/roster.json
/// <root>/matches/<match_id>.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(root.join(MATCH_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save_roster(&self, players: &[Player]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(players)?;
        write_atomic(&self.root.join(ROSTER_FILE), &data)?;
        log::info!("Roster saved ({} players)", players.len());
        Ok(())
    }

    fn match_path(&self, id: &MatchId) -> Result<PathBuf, StoreError> {
        let raw = id.as_str();
        let safe = !raw.is_empty()
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StoreError::Corrupted(format!("match id {raw:?} is not a valid file name")));
        }
        Ok(self.root.join(MATCH_DIR).join(format!("{raw}.json")))
    }

    fn read_match_file(path: &Path) -> Result<Match, StoreError> {
        let data = std::fs::read(path)?;
        let raw: serde_json::Value = serde_json::from_slice(&data)?;
        let m = migrate_match(raw)?;
        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(m)
    }
}

impl RosterStore for FileStore {
    fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        let path = self.root.join(ROSTER_FILE);
        if !path.exists() {
            log::warn!("No roster at {:?}; using an empty roster", path);
            return Ok(Vec::new());
        }
        let data = std::fs::read(&path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl MatchStore for FileStore {
    fn load_match(&self, id: &MatchId) -> Result<Match, StoreError> {
        let path = self.match_path(id)?;
        if !path.exists() {
            return Err(StoreError::MatchNotFound { id: id.to_string() });
        }
        Self::read_match_file(&path)
    }

    fn save_match(&mut self, m: &Match) -> Result<(), StoreError> {
        check_match(m)?;
        let path = self.match_path(&m.id)?;
        let data = serde_json::to_vec_pretty(&StoredMatch::current(m.clone()))?;
        write_atomic(&path, &data)?;
        log::info!("Match {} saved", m.id);
        Ok(())
    }

    fn list_matches_for_team(&self, team: &TeamId) -> Result<Vec<Match>, StoreError> {
        let mut matches = Vec::new();
        for entry in read_dir(self.root.join(MATCH_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_match_file(&path) {
                Ok(m) if &m.team_id == team => matches.push(m),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable match file {:?}: {}", path, e),
            }
        }
        sort_matches(&mut matches);
        Ok(matches)
    }
}

/// Write to a temp file, then rename over the target.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;
    log::debug!("Saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;
    use crate::models::{Formation, PlayerId, Position};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn match_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
    }

    fn sample_match(id: &str, team: &str) -> Match {
        let config = RotationConfig::default();
        let mut m = Match::new(team, match_day(), Formation::SixASide, &config).with_id(id);
        m.set_lineup(1, Position::Keeper, Some(PlayerId::new("a"))).unwrap();
        m
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let m = sample_match("m1", "t1");

        store.save_match(&m).unwrap();
        assert_eq!(store.load_match(&m.id).unwrap(), m);
        assert!(!dir.path().join("matches/m1.tmp").exists());
    }

    #[test]
    fn test_roster_roundtrip_and_missing_roster() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.list_players().unwrap().is_empty());

        store.save_roster(&[Player::new("a", "Anna")]).unwrap();
        assert_eq!(store.list_players().unwrap(), vec![Player::new("a", "Anna")]);
    }

    #[test]
    fn test_team_listing_skips_other_teams_and_bad_files() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.save_match(&sample_match("m1", "t1")).unwrap();
        store.save_match(&sample_match("m2", "t2")).unwrap();
        std::fs::write(dir.path().join("matches/broken.json"), "{not json").unwrap();

        let listed = store.list_matches_for_team(&TeamId::new("t1")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, MatchId::new("m1"));
    }

    #[test]
    fn test_legacy_file_is_migrated_on_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let legacy = r#"{"id": "old", "teamId": "t1", "date": "2024-05-11",
            "formation": "1-1",
            "quarters": [{"durationMinutes": 10, "lineup": {"GK": "a", "Field": "b"},
                          "substitutions": null, "goals": null}]}"#;
        std::fs::write(dir.path().join("matches/old.json"), legacy).unwrap();

        let m = store.load_match(&MatchId::new("old")).unwrap();
        assert_eq!(m.quarters[0].index, 1);
        assert_eq!(m.quarters[0].lineup.len(), 2);
        assert!(m.quarters[0].substitutions.is_empty());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load_match(&MatchId::new("../roster")),
            Err(StoreError::Corrupted(_))
        ));
        assert!(matches!(
            store.load_match(&MatchId::new("missing")),
            Err(StoreError::MatchNotFound { .. })
        ));
    }
}

//! On-disk match records and their upgrade path.
//!
//! Version 0 is the bare, loosely-typed record written by older clients:
//! camelCase keys, free-form position strings, `null` or missing
//! substitution/goal lists, quarters without an index. Everything is
//! normalized here so the engine never sees a half-filled record.

use super::{check_match, StoreError, MATCH_SCHEMA_VERSION};
use crate::config::DEFAULT_QUARTER_MINUTES;
use crate::models::{GoalId, Match, Position};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Versioned envelope written by `FileStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatch {
    pub schema_version: u32,
    #[serde(rename = "match")]
    pub record: Match,
}

impl StoredMatch {
    pub fn current(record: Match) -> Self {
        Self { schema_version: MATCH_SCHEMA_VERSION, record }
    }
}

/// Reads any known record layout into a checked current-version `Match`.
pub fn migrate_match(raw: Value) -> Result<Match, StoreError> {
    let version = raw.get("schema_version").and_then(Value::as_u64);

    let record = match version {
        None => from_legacy(raw)?,
        Some(0) => {
            let inner = match raw {
                Value::Object(mut envelope) => envelope.remove("match").unwrap_or(Value::Null),
                _ => Value::Null,
            };
            from_legacy(inner)?
        }
        Some(v) if v == MATCH_SCHEMA_VERSION as u64 => {
            serde_json::from_value::<StoredMatch>(raw)?.record
        }
        Some(v) if v > MATCH_SCHEMA_VERSION as u64 => {
            log::warn!(
                "Loading match from future schema version {} (current: {})",
                v,
                MATCH_SCHEMA_VERSION
            );
            serde_json::from_value::<StoredMatch>(raw)?.record
        }
        Some(v) => {
            return Err(StoreError::VersionMismatch {
                found: u32::try_from(v).unwrap_or(u32::MAX),
                expected: MATCH_SCHEMA_VERSION,
            });
        }
    };

    check_match(&record)?;
    Ok(record)
}

fn from_legacy(raw: Value) -> Result<Match, StoreError> {
    let normalized = normalize_v0(raw)?;
    let mut record: Match = serde_json::from_value(normalized)?;

    // Old clients let positions from a previous formation linger.
    let formation = record.formation;
    for q in &mut record.quarters {
        let index = q.index;
        q.lineup.retain(|position, player| {
            let keep = formation.contains(*position);
            if !keep {
                log::warn!(
                    "Match {} quarter {}: dropping {} at {:?}, not in {}",
                    record.id,
                    index,
                    player,
                    position,
                    formation.code()
                );
            }
            keep
        });
    }

    log::info!("Migrated match {} from schema version 0 to {}", record.id, MATCH_SCHEMA_VERSION);
    Ok(record)
}

fn normalize_v0(mut raw: Value) -> Result<Value, StoreError> {
    let obj = raw
        .as_object_mut()
        .ok_or_else(|| StoreError::Corrupted("match record is not a JSON object".to_string()))?;

    rename_keys(
        obj,
        &[
            ("teamId", "team_id"),
            ("homeAway", "home_away"),
            ("absentPlayerIds", "absent_player_ids"),
        ],
    );
    null_to(obj, "absent_player_ids", Value::Array(Vec::new()));
    null_to(obj, "opponent", Value::String(String::new()));
    if let Some(Value::String(side)) = obj.get_mut("home_away") {
        *side = side.to_ascii_lowercase();
    }

    let quarters = match obj.get_mut("quarters") {
        Some(Value::Array(quarters)) => quarters,
        _ => return Err(StoreError::Corrupted("match record has no quarters".to_string())),
    };

    for (i, quarter) in quarters.iter_mut().enumerate() {
        let q = quarter.as_object_mut().ok_or_else(|| {
            StoreError::Corrupted(format!("quarter {} is not a JSON object", i + 1))
        })?;
        normalize_quarter(q, i + 1);
    }

    Ok(raw)
}

fn normalize_quarter(q: &mut Map<String, Value>, slot: usize) {
    rename_keys(q, &[("durationMinutes", "duration_minutes")]);
    if q.get("index").map_or(true, Value::is_null) {
        q.insert("index".to_string(), Value::from(slot));
    }
    if q.get("duration_minutes").map_or(true, Value::is_null) {
        log::warn!("Quarter {} has no duration, assuming {}", slot, DEFAULT_QUARTER_MINUTES);
        q.insert("duration_minutes".to_string(), Value::from(DEFAULT_QUARTER_MINUTES));
    }

    let lineup = match q.remove("lineup") {
        Some(Value::Object(slots)) => slots
            .into_iter()
            .filter_map(|(raw_position, player)| {
                let player = match player {
                    Value::String(p) if !p.is_empty() => p,
                    _ => return None,
                };
                let position = wire_position(&raw_position, slot)?;
                Some((position, Value::String(player)))
            })
            .collect(),
        _ => Map::new(),
    };
    q.insert("lineup".to_string(), Value::Object(lineup));

    null_to(q, "substitutions", Value::Array(Vec::new()));
    if let Some(Value::Array(subs)) = q.get_mut("substitutions") {
        for sub in subs.iter_mut().filter_map(Value::as_object_mut) {
            rename_keys(sub, &[("incomingPlayerId", "incoming")]);
            blank_to_null(sub, "incoming");
            let position = match sub.get("position") {
                Some(Value::String(raw)) if !raw.is_empty() => wire_position(raw, slot)
                    .map(Value::String)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            };
            sub.insert("position".to_string(), position);
        }
    }

    null_to(q, "goals", Value::Array(Vec::new()));
    if let Some(Value::Array(goals)) = q.get_mut("goals") {
        for goal in goals.iter_mut().filter_map(Value::as_object_mut) {
            rename_keys(goal, &[("scorerId", "scorer")]);
            blank_to_null(goal, "scorer");
            if goal.get("id").map_or(true, Value::is_null) {
                goal.insert("id".to_string(), Value::String(GoalId::generate().to_string()));
            }
            if let Some(Value::String(side)) = goal.get_mut("side") {
                *side = side.to_ascii_lowercase();
            }
        }
    }
}

/// Loose position string to its snake_case wire name.
fn wire_position(raw: &str, quarter: usize) -> Option<String> {
    match raw.parse::<Position>() {
        Ok(position) => match serde_json::to_value(position) {
            Ok(Value::String(name)) => Some(name),
            _ => None,
        },
        Err(_) => {
            log::warn!("Quarter {}: dropping unknown position {:?}", quarter, raw);
            None
        }
    }
}

fn rename_keys(obj: &mut Map<String, Value>, pairs: &[(&str, &str)]) {
    for (from, to) in pairs {
        if let Some(value) = obj.remove(*from) {
            obj.entry(to.to_string()).or_insert(value);
        }
    }
}

fn null_to(obj: &mut Map<String, Value>, key: &str, empty: Value) {
    if obj.get(key).map_or(true, Value::is_null) {
        obj.insert(key.to_string(), empty);
    }
}

fn blank_to_null(obj: &mut Map<String, Value>, key: &str) {
    if matches!(obj.get(key), Some(Value::String(s)) if s.is_empty()) {
        obj.insert(key.to_string(), Value::Null);
    }
}

// Fair-rotation JSON API layer
// Every call takes the snapshots it needs in the request; nothing is cached.

use crate::config::RotationConfig;
use crate::editing::MatchEdit;
use crate::engine::{
    keeper, playtime, recommender, validator, Candidate, KeeperCounts, KeeperScope, Ledger, Warning,
};
use crate::fairness::{season_report, SeasonReport};
use crate::models::{Match, Player, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type RankFn = fn(&Match, &[Player], &[Match], u8, Position) -> Vec<Candidate>;

// ========== Request/Response Structures ==========

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaytimeRequest {
    #[serde(rename = "match")]
    pub match_record: Match,
    pub roster: Vec<Player>,
    /// Limit to quarters `1..=through_quarter`.
    #[serde(default)]
    pub through_quarter: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaytimeResponse {
    pub success: bool,
    pub ledger: Option<Ledger>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeasonRequest {
    pub matches: Vec<Match>,
    pub roster: Vec<Player>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeasonResponse {
    pub success: bool,
    pub report: Option<SeasonReport>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeeperCountsRequest {
    pub matches: Vec<Match>,
    pub scope: KeeperScope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeeperCountsResponse {
    pub success: bool,
    pub counts: Option<KeeperCounts>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(rename = "match")]
    pub match_record: Match,
    pub roster: Vec<Player>,
    #[serde(default)]
    pub config: Option<RotationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub warnings: Vec<Warning>,
    pub by_quarter: BTreeMap<u8, Vec<Warning>>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankRequest {
    #[serde(rename = "match")]
    pub match_record: Match,
    pub roster: Vec<Player>,
    #[serde(default)]
    pub history: Vec<Match>,
    pub quarter: u8,
    /// Position name; loose spellings ("GK", "left back") are accepted.
    pub position: String,
    /// Also list players already placed elsewhere, at the bottom.
    #[serde(default)]
    pub include_assigned: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankResponse {
    pub success: bool,
    pub candidates: Vec<Candidate>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditRequest {
    #[serde(rename = "match")]
    pub match_record: Match,
    pub edit: MatchEdit,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub match_record: Option<Match>,
    pub error: Option<String>,
}

// ========== Public API Functions ==========

pub fn playtime_json(request_json: &str) -> String {
    let response = match serde_json::from_str::<PlaytimeRequest>(request_json) {
        Ok(req) => {
            let last = req.through_quarter.unwrap_or(u8::MAX);
            PlaytimeResponse {
                success: true,
                ledger: Some(playtime::compute_through(&req.match_record, &req.roster, last)),
                error: None,
            }
        }
        Err(e) => PlaytimeResponse { success: false, ledger: None, error: Some(invalid(e)) },
    };
    to_json(&response)
}

pub fn season_playtime_json(request_json: &str) -> String {
    let response = match serde_json::from_str::<SeasonRequest>(request_json) {
        Ok(req) => SeasonResponse {
            success: true,
            report: Some(season_report(&req.matches, &req.roster)),
            error: None,
        },
        Err(e) => SeasonResponse { success: false, report: None, error: Some(invalid(e)) },
    };
    to_json(&response)
}

pub fn keeper_counts_json(request_json: &str) -> String {
    let response = match serde_json::from_str::<KeeperCountsRequest>(request_json) {
        Ok(req) => KeeperCountsResponse {
            success: true,
            counts: Some(keeper::count(&req.matches, &req.scope)),
            error: None,
        },
        Err(e) => KeeperCountsResponse { success: false, counts: None, error: Some(invalid(e)) },
    };
    to_json(&response)
}

pub fn validate_json(request_json: &str) -> String {
    let response = match serde_json::from_str::<ValidateRequest>(request_json) {
        Ok(req) => {
            let config = req.config.unwrap_or_default();
            let warnings = validator::validate(&req.match_record, &req.roster, &config.rules);
            let by_quarter = validator::group_by_quarter(&warnings);
            ValidateResponse { success: true, warnings, by_quarter, error: None }
        }
        Err(e) => ValidateResponse {
            success: false,
            warnings: vec![],
            by_quarter: BTreeMap::new(),
            error: Some(invalid(e)),
        },
    };
    to_json(&response)
}

pub fn rank_json(request_json: &str) -> String {
    let req = match serde_json::from_str::<RankRequest>(request_json) {
        Ok(req) => req,
        Err(e) => {
            return to_json(&RankResponse {
                success: false,
                candidates: vec![],
                error: Some(invalid(e)),
            })
        }
    };

    let response = match req.match_record.formation.parse_position(&req.position) {
        Ok(position) => {
            let rank: RankFn =
                if req.include_assigned { recommender::rank_all } else { recommender::rank };
            RankResponse {
                success: true,
                candidates: rank(
                    &req.match_record,
                    &req.roster,
                    &req.history,
                    req.quarter,
                    position,
                ),
                error: None,
            }
        }
        Err(e) => RankResponse { success: false, candidates: vec![], error: Some(e.to_string()) },
    };
    to_json(&response)
}

/// Applies one edit and returns the new snapshot; the request's match is
/// returned untouched on failure.
pub fn apply_edit_json(request_json: &str) -> String {
    let req = match serde_json::from_str::<EditRequest>(request_json) {
        Ok(req) => req,
        Err(e) => {
            return to_json(&EditResponse {
                success: false,
                match_record: None,
                error: Some(invalid(e)),
            })
        }
    };

    let response = match req.match_record.apply(&req.edit) {
        Ok(next) => EditResponse { success: true, match_record: Some(next), error: None },
        Err(e) => EditResponse {
            success: false,
            match_record: Some(req.match_record),
            error: Some(e.to_string()),
        },
    };
    to_json(&response)
}

fn invalid(e: serde_json::Error) -> String {
    format!("Invalid request format: {}", e)
}

fn to_json<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response)
        .unwrap_or_else(|_| r#"{"success":false,"error":"Serialization failed"}"#.to_string())
}

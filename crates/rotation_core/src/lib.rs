//! # rotation_core - Fair-Rotation Engine for Youth Football
//!
//! Tracks who plays where across the quarters of a match and keeps playing
//! time, keeper duty and bench time fair over a season.
//!
//! ## Features
//! - Exact minutes per player from lineups and half-time substitutions
//! - Keeper rotation counts per match and over a team's history
//! - Advisory fairness warnings per quarter
//! - Deterministic candidate ranking for an open position
//! - JSON API and file store for front ends
//!
//! The engine is a set of pure functions over a `Match` snapshot and the
//! roster. Edits go through `Match` methods that guard the lineup
//! invariants, and everything is recomputed after each edit.

pub mod api;
pub mod config;
pub mod editing;
pub mod engine;
pub mod error;
pub mod fairness;
pub mod models;
pub mod store;

pub use config::{RotationConfig, RuleSwitches};
pub use editing::{MatchEdit, SubstitutionUpdate};
pub use engine::{
    Candidate, KeeperCounts, KeeperScope, Ledger, PlaytimeEntry, RankBasis, RuleKind,
    SeasonPlaytime, Warning,
};
pub use error::{LineupError, Result};
pub use models::{
    Formation, Goal, GoalId, GoalSide, HomeAway, Match, MatchId, Player, PlayerId, Position,
    Quarter, Substitution, TeamId,
};
pub use store::{FileStore, MatchStore, MemoryStore, RosterStore, StoreError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::models::{Formation, PlayerId, Position};
use thiserror::Error;

/// Errors raised at the editing boundary, before a snapshot is produced.
///
/// The engine itself never fails; these guard the invariants it relies on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineupError {
    #[error("Player {player} already plays {occupied:?} in quarter {quarter}; clear that slot first")]
    InvalidAssignment { player: PlayerId, quarter: u8, occupied: Position },

    #[error("Player {player} is marked absent for this match")]
    AbsentPlayer { player: PlayerId },

    #[error("Quarter {quarter} does not exist (match has {count} quarters)")]
    QuarterOutOfRange { quarter: u8, count: usize },

    #[error("Position {position:?} is not part of formation {formation:?}")]
    PositionNotInFormation { position: Position, formation: Formation },

    #[error("Position {position:?} is empty in quarter {quarter}; nobody to substitute")]
    PositionNotFilled { position: Position, quarter: u8 },

    #[error("Quarter {quarter} already has a substitution at {position:?}")]
    DuplicateSubstitution { position: Position, quarter: u8 },

    #[error("Player {player} already comes on in another substitution in quarter {quarter}")]
    DuplicateIncoming { player: PlayerId, quarter: u8 },

    #[error("Substitution #{index} not found in quarter {quarter}")]
    SubstitutionNotFound { index: usize, quarter: u8 },

    #[error("Goal {goal} not found in quarter {quarter}")]
    GoalNotFound { goal: String, quarter: u8 },

    #[error("Unknown position: {0}")]
    UnknownPosition(String),
}

pub type Result<T> = std::result::Result<T, LineupError>;

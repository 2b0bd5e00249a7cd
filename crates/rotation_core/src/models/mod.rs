pub mod formation;
pub mod ids;
pub mod match_record;
pub mod player;

pub use formation::{Formation, Position};
pub use ids::{GoalId, MatchId, PlayerId, TeamId};
pub use match_record::{Goal, GoalSide, HomeAway, Match, Quarter, Substitution};
pub use player::Player;

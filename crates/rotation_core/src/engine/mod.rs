//! # Fair-Rotation Engine
//!
//! Pure functions over a match snapshot and the roster:
//!
//! - [`playtime`]: minutes per player (regular / substitute / bench)
//! - [`keeper`]: keeper quarters per player, per match or over a season
//! - [`validator`]: advisory fairness warnings per quarter
//! - [`recommender`]: ranked candidates for an open position
//!
//! Nothing here mutates its inputs or keeps state between calls; callers
//! simply recompute after every edit.

pub mod keeper;
pub mod playtime;
pub mod recommender;
pub mod validator;

pub use keeper::{KeeperCounts, KeeperScope};
pub use playtime::{Ledger, PlaytimeEntry, SeasonPlaytime};
pub use recommender::{Candidate, RankBasis};
pub use validator::{RuleKind, Warning};

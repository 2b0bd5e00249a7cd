use crate::error::LineupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A slot on the pitch. Only the positions of the match's formation are valid
/// lineup keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Keeper,
    Field,
    Back,
    LeftBack,
    CenterBack,
    RightBack,
    Left,
    Center,
    Right,
    Forward,
}

impl Position {
    pub fn is_keeper(&self) -> bool {
        matches!(self, Position::Keeper)
    }

    /// Short display label used in warnings and CLI tables.
    pub fn label(&self) -> &'static str {
        match self {
            Position::Keeper => "Keeper",
            Position::Field => "Field",
            Position::Back => "Back",
            Position::LeftBack => "Left back",
            Position::CenterBack => "Center back",
            Position::RightBack => "Right back",
            Position::Left => "Left",
            Position::Center => "Center",
            Position::Right => "Right",
            Position::Forward => "Forward",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = LineupError;

    /// Accepts the snake_case wire names as well as the loose spellings found
    /// in older saved lineups ("GK", "Left Back", "centre", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        let position = match key.as_str() {
            "keeper" | "goalkeeper" | "gk" | "keep" => Position::Keeper,
            "field" | "player" => Position::Field,
            "back" | "defender" | "def" => Position::Back,
            "leftback" | "lb" => Position::LeftBack,
            "centerback" | "centreback" | "cb" => Position::CenterBack,
            "rightback" | "rb" => Position::RightBack,
            "left" | "leftwing" | "lw" | "lm" => Position::Left,
            "center" | "centre" | "middle" | "cm" => Position::Center,
            "right" | "rightwing" | "rw" | "rm" => Position::Right,
            "forward" | "striker" | "st" | "fw" => Position::Forward,
            _ => return Err(LineupError::UnknownPosition(s.to_string())),
        };
        Ok(position)
    }
}

/// Closed set of youth-football layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    /// Keeper plus one field player; used for drills and small-sided tests.
    #[serde(rename = "1-1")]
    TwoASide,
    #[serde(rename = "1-1-1-1")]
    FourASide,
    #[serde(rename = "1-3-1-1")]
    SixASide,
    #[serde(rename = "1-3-3-1")]
    EightASide,
}

impl Formation {
    /// Positions in display order, keeper first.
    pub fn positions(&self) -> &'static [Position] {
        use Position::*;
        match self {
            Formation::TwoASide => &[Keeper, Field],
            Formation::FourASide => &[Keeper, Back, Center, Forward],
            Formation::SixASide => &[Keeper, Back, Left, Center, Right, Forward],
            Formation::EightASide => {
                &[Keeper, LeftBack, CenterBack, RightBack, Left, Center, Right, Forward]
            }
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.positions().contains(&position)
    }

    pub fn player_count(&self) -> usize {
        self.positions().len()
    }

    /// Canonical formation code (e.g. "1-3-1-1").
    pub fn code(&self) -> &'static str {
        match self {
            Formation::TwoASide => "1-1",
            Formation::FourASide => "1-1-1-1",
            Formation::SixASide => "1-3-1-1",
            Formation::EightASide => "1-3-3-1",
        }
    }

    /// Parses a position name and checks it belongs to this formation.
    pub fn parse_position(&self, raw: &str) -> Result<Position, LineupError> {
        let position: Position = raw.parse()?;
        self.check(position)?;
        Ok(position)
    }

    pub fn check(&self, position: Position) -> Result<(), LineupError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(LineupError::PositionNotInFormation { position, formation: *self })
        }
    }
}

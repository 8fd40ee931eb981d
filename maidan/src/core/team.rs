//! Team and robot identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Robot id as carried in the 4-bit wire field (valid ids are 0..=14).
pub type RobotId = u8;

/// Largest robot id the radio frame can address. Id 15 is the empty-slot
/// sentinel.
pub const MAX_ROBOT_ID: RobotId = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Yellow,
}

impl Team {
    /// The opposing team.
    #[inline]
    pub fn other(self) -> Team {
        match self {
            Team::Blue => Team::Yellow,
            Team::Yellow => Team::Blue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Yellow => "yellow",
        }
    }
}

/// Free-function form of [`Team::other`].
#[inline]
pub fn other_team(team: Team) -> Team {
    team.other()
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Ok(Team::Blue),
            "yellow" => Ok(Team::Yellow),
            other => Err(format!("unknown team '{}'", other)),
        }
    }
}

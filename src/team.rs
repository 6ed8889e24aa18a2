use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::HOME_ADVANTAGE;

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team #{}", self.0)
    }
}

/// League participant with a fixed strength rating.
///
/// Teams are immutable while a season is being simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,

    pub name: String,

    /// Positive rating; higher means more goals and more wins
    pub strength: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Team {
    /// Create a team without a logo.
    pub fn new(id: u32, name: impl Into<String>, strength: u32) -> Self {
        Team {
            id: TeamId(id),
            name: name.into(),
            strength,
            logo: None,
        }
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    /// Strength used when this team plays at home
    pub fn home_strength(&self) -> u32 {
        self.strength.saturating_add(HOME_ADVANTAGE)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.strength)
    }
}

/// The four-club roster the league ships with.
pub fn default_roster() -> Vec<Team> {
    vec![
        Team::new(1, "Manchester City", 90),
        Team::new(2, "Bayern Munich", 85),
        Team::new(3, "Real Madrid", 88),
        Team::new(4, "Barcelona", 82),
    ]
}

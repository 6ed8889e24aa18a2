use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::team::{Team, TeamId};

/// Unique identifier for a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u32);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match #{}", self.0)
    }
}

/// Final score of a played match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_goals: u8,
    pub away_goals: u8,
}

/// Result category from the home side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl MatchResult {
    pub fn new(home_goals: u8, away_goals: u8) -> Self {
        MatchResult {
            home_goals,
            away_goals,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self.home_goals.cmp(&self.away_goals) {
            Ordering::Greater => Outcome::HomeWin,
            Ordering::Less => Outcome::AwayWin,
            Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.outcome() == Outcome::Draw
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home_goals, self.away_goals)
    }
}

/// A scheduled fixture. `result` is present exactly when the match is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub home: TeamId,
    pub away: TeamId,
    pub week: u32,
    pub result: Option<MatchResult>,
}

impl Match {
    /// Create an unplayed fixture.
    pub fn new(id: MatchId, home: TeamId, away: TeamId, week: u32) -> Self {
        Match {
            id,
            home,
            away,
            week,
            result: None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.result.is_some()
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

/// A fixture joined with both teams' data, as handed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetails {
    #[serde(flatten)]
    pub fixture: Match,
    pub home_team: Team,
    pub away_team: Team,
}

impl fmt::Display for MatchDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixture.result {
            Some(result) => write!(
                f,
                "Week {}: {} {} {}",
                self.fixture.week, self.home_team.name, result, self.away_team.name
            ),
            None => write!(
                f,
                "Week {}: {} vs {}",
                self.fixture.week, self.home_team.name, self.away_team.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_score() {
        assert_eq!(MatchResult::new(2, 1).outcome(), Outcome::HomeWin);
        assert_eq!(MatchResult::new(0, 3).outcome(), Outcome::AwayWin);
        assert_eq!(MatchResult::new(2, 2).outcome(), Outcome::Draw);
        assert!(MatchResult::new(0, 0).is_draw());
    }

    #[test]
    fn test_new_match_is_unplayed() {
        let fixture = Match::new(MatchId(1), TeamId(1), TeamId(2), 1);
        assert!(!fixture.is_played());
        assert!(fixture.involves(TeamId(2)));
        assert!(!fixture.involves(TeamId(3)));
    }

    #[test]
    fn test_details_display() {
        let mut fixture = Match::new(MatchId(1), TeamId(1), TeamId(2), 3);
        let details = MatchDetails {
            fixture: fixture.clone(),
            home_team: Team::new(1, "Home", 80),
            away_team: Team::new(2, "Away", 70),
        };
        assert_eq!(details.to_string(), "Week 3: Home vs Away");

        fixture.result = Some(MatchResult::new(1, 0));
        let details = MatchDetails { fixture, ..details };
        assert_eq!(details.to_string(), "Week 3: Home 1-0 Away");
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::MIN_TEAMS;
use crate::error::{LeagueError, Result};
use crate::matches::Match;
use crate::team::TeamId;

/// One generated pairing before it is stored as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixture {
    pub home: TeamId,
    pub away: TeamId,
    pub week: u32,
}

/// Check that a roster can play a double round-robin.
pub fn validate_team_count(count: usize) -> Result<()> {
    if count < MIN_TEAMS {
        return Err(LeagueError::InsufficientTeams {
            required: MIN_TEAMS,
            actual: count,
        });
    }
    if count % 2 != 0 {
        return Err(LeagueError::OddTeamCount(count));
    }
    Ok(())
}

/// Generate a double round-robin schedule with the circle method.
///
/// The last team holds the fixed slot of the circle while the others rotate
/// one place per round. The first N-1 weeks give every pair one meeting;
/// the next N-1 weeks repeat them in the same order with home and away
/// swapped.
///
/// # Arguments
/// * `teams` - Team identifiers in roster order; the order fully determines
///   the schedule
///
/// # Returns
/// N(N-1) fixtures, N/2 per week, weeks numbered 1..=2(N-1)
pub fn generate_round_robin(teams: &[TeamId]) -> Result<Vec<Fixture>> {
    validate_team_count(teams.len())?;

    let mut seen = HashSet::with_capacity(teams.len());
    for &team in teams {
        if !seen.insert(team) {
            return Err(LeagueError::DuplicateTeam(team));
        }
    }

    let n = teams.len();
    let rotating = n - 1;
    let rounds = rotating as u32;
    let mut fixtures = Vec::with_capacity(n * rotating);

    for round in 0..rotating {
        for i in 0..n / 2 {
            let home = (round + i) % rotating;
            let away = if i == 0 {
                rotating
            } else {
                (rotating - i + round) % rotating
            };

            fixtures.push(Fixture {
                home: teams[home],
                away: teams[away],
                week: round as u32 + 1,
            });
        }
    }

    let mirrored: Vec<Fixture> = fixtures
        .iter()
        .map(|f| Fixture {
            home: f.away,
            away: f.home,
            week: f.week + rounds,
        })
        .collect();
    fixtures.extend(mirrored);

    Ok(fixtures)
}

/// Where the season currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekStatus {
    pub current_week: u32,
    pub total_weeks: u32,
    pub all_matches_played: bool,
}

/// Number of weeks in a fixture list.
pub fn total_weeks(matches: &[Match]) -> u32 {
    matches.iter().map(|m| m.week).max().unwrap_or(0)
}

/// Derive the current week from the fixture list.
///
/// The current week is the earliest week with an unplayed match; once every
/// match is played it stays on the final week.
pub fn week_status(matches: &[Match]) -> WeekStatus {
    let total_weeks = total_weeks(matches);
    let next_unplayed = matches
        .iter()
        .filter(|m| !m.is_played())
        .map(|m| m.week)
        .min();

    WeekStatus {
        current_week: next_unplayed.unwrap_or(total_weeks),
        total_weeks,
        all_matches_played: !matches.is_empty() && next_unplayed.is_none(),
    }
}

/// The last week `w` such that every week in `1..=w` is fully played.
pub fn highest_completed_week(matches: &[Match]) -> u32 {
    let total = total_weeks(matches);
    let mut completed = 0;

    for week in 1..=total {
        let mut in_week = matches.iter().filter(|m| m.week == week).peekable();
        if in_week.peek().is_none() || !in_week.all(|m| m.is_played()) {
            break;
        }
        completed = week;
    }

    completed
}

use thiserror::Error;

use crate::matches::MatchId;
use crate::team::TeamId;

/// Errors raised by league operations.
///
/// Every variant stems from invalid input or state; none is transient, so
/// callers should not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    #[error("at least {required} teams are required for the league, {actual} found")]
    InsufficientTeams { required: usize, actual: usize },

    #[error("an even number of teams is required for round-robin fixtures, {0} provided")]
    OddTeamCount(usize),

    #[error("{0} appears more than once in the roster")]
    DuplicateTeam(TeamId),

    #[error("{team} has invalid strength {strength}; strength must be between 1 and {max}", max = crate::constants::MAX_STRENGTH)]
    InvalidStrength { team: TeamId, strength: u32 },

    #[error("{0} not found")]
    TeamNotFound(TeamId),

    #[error("{0} has more than one standing record")]
    DuplicateStanding(TeamId),

    #[error("no standing record supplied for {0}")]
    StandingNotLoaded(TeamId),

    #[error("standing record of {0} does not add up")]
    InconsistentStanding(TeamId),

    #[error("{0} appears more than once in the fixture list")]
    DuplicateMatch(MatchId),

    #[error("{match_id} pairs {team} with itself")]
    SelfFixture { team: TeamId, match_id: MatchId },

    #[error("{0} not found")]
    MatchNotFound(MatchId),

    #[error("week {week} is outside the schedule (1..={total_weeks})")]
    WeekOutOfRange { week: u32, total_weeks: u32 },

    #[error("standing record not found for {team} in {match_id}")]
    MissingStanding { team: TeamId, match_id: MatchId },

    #[error("{0} has no applied result to reverse")]
    ResultNotApplied(MatchId),

    #[error("reversing {match_id} would drive the standing of {team} below zero")]
    LedgerUnderflow { team: TeamId, match_id: MatchId },
}

pub type Result<T> = std::result::Result<T, LeagueError>;

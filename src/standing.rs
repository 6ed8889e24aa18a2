use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::constants::{POINTS_FOR_DRAW, POINTS_FOR_WIN};
use crate::error::{LeagueError, Result};
use crate::matches::{Match, MatchId, MatchResult};
use crate::team::TeamId;

/// Cumulative season statistics for one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Standing {
    pub team: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl Standing {
    /// An empty record for a team that has not played yet.
    pub fn new(team: TeamId) -> Self {
        Standing {
            team,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    /// Add one match from this team's perspective.
    fn record(&mut self, scored: u8, conceded: u8) {
        self.played += 1;
        self.goals_for += scored as u32;
        self.goals_against += conceded as u32;

        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Less => self.lost += 1,
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
        }

        self.refresh_goal_difference();
    }

    /// Remove one match from this team's perspective.
    ///
    /// Returns `None` without touching `self` if any counter would go
    /// negative.
    fn unrecorded(&self, scored: u8, conceded: u8) -> Option<Standing> {
        let mut next = *self;
        next.played = next.played.checked_sub(1)?;
        next.goals_for = next.goals_for.checked_sub(scored as u32)?;
        next.goals_against = next.goals_against.checked_sub(conceded as u32)?;

        match scored.cmp(&conceded) {
            Ordering::Greater => {
                next.won = next.won.checked_sub(1)?;
                next.points = next.points.checked_sub(POINTS_FOR_WIN)?;
            }
            Ordering::Less => next.lost = next.lost.checked_sub(1)?,
            Ordering::Equal => {
                next.drawn = next.drawn.checked_sub(1)?;
                next.points = next.points.checked_sub(POINTS_FOR_DRAW)?;
            }
        }

        next.refresh_goal_difference();
        Some(next)
    }

    fn refresh_goal_difference(&mut self) {
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
    }

    /// Check the bookkeeping identities that every ledger operation preserves.
    pub fn is_consistent(&self) -> bool {
        let (won, drawn, lost) = (self.won as u64, self.drawn as u64, self.lost as u64);
        self.goal_difference as i64 == self.goals_for as i64 - self.goals_against as i64
            && self.played as u64 == won + drawn + lost
            && self.points as u64 == POINTS_FOR_WIN as u64 * won + POINTS_FOR_DRAW as u64 * drawn
    }

    /// Whether two records cannot be separated by the ranking criteria.
    pub fn ties_with(&self, other: &Standing) -> bool {
        compare_standings(self, other) == Ordering::Equal
    }
}

/// League table ordering: points, then goal difference, then goals scored,
/// all descending.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// Per-team standings, kept in roster order.
///
/// `apply` and `reverse` are the only ways results enter or leave the
/// table. Cloning a ledger gives a fully independent copy, which is how the
/// season simulator runs trials without touching the real table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandingsLedger {
    standings: Vec<Standing>,
}

impl StandingsLedger {
    /// Create zeroed standings for the given teams, in the given order.
    pub fn new(teams: impl IntoIterator<Item = TeamId>) -> Self {
        StandingsLedger {
            standings: teams.into_iter().map(Standing::new).collect(),
        }
    }

    /// Wrap existing records, e.g. standings loaded by a collaborator.
    pub fn from_standings(standings: Vec<Standing>) -> Self {
        StandingsLedger { standings }
    }

    pub fn len(&self) -> usize {
        self.standings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }

    pub fn get(&self, team: TeamId) -> Option<&Standing> {
        self.standings.iter().find(|s| s.team == team)
    }

    /// Records in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Standing> {
        self.standings.iter()
    }

    fn position(&self, team: TeamId, match_id: MatchId) -> Result<usize> {
        self.standings
            .iter()
            .position(|s| s.team == team)
            .ok_or(LeagueError::MissingStanding { team, match_id })
    }

    fn positions(&self, fixture: &Match) -> Result<(usize, usize)> {
        Ok((
            self.position(fixture.home, fixture.id)?,
            self.position(fixture.away, fixture.id)?,
        ))
    }

    /// Add a result for `fixture` to both teams' records.
    ///
    /// The fixture's own stored result is ignored; `result` is what gets
    /// recorded. Both records are located before either is changed.
    pub fn apply(&mut self, fixture: &Match, result: MatchResult) -> Result<()> {
        let (home, away) = self.positions(fixture)?;
        self.standings[home].record(result.home_goals, result.away_goals);
        self.standings[away].record(result.away_goals, result.home_goals);
        Ok(())
    }

    /// Remove the effect of `fixture`'s stored result from both records.
    ///
    /// Exact inverse of the `apply` call that recorded that result. Fails
    /// without changing anything if the fixture has no result or if the
    /// records could not have contained it.
    pub fn reverse(&mut self, fixture: &Match) -> Result<()> {
        let result = fixture.result.ok_or(LeagueError::ResultNotApplied(fixture.id))?;
        let (home, away) = self.positions(fixture)?;

        let underflow = |team| LeagueError::LedgerUnderflow {
            team,
            match_id: fixture.id,
        };
        let new_home = self.standings[home]
            .unrecorded(result.home_goals, result.away_goals)
            .ok_or_else(|| underflow(fixture.home))?;
        let new_away = self.standings[away]
            .unrecorded(result.away_goals, result.home_goals)
            .ok_or_else(|| underflow(fixture.away))?;

        self.standings[home] = new_home;
        self.standings[away] = new_away;
        Ok(())
    }

    /// Zero every record, keeping the roster.
    pub fn reset(&mut self) {
        for standing in &mut self.standings {
            *standing = Standing::new(standing.team);
        }
    }

    /// Records in league table order. Exact ties keep roster order.
    pub fn ranked(&self) -> Vec<Standing> {
        let mut table = self.standings.clone();
        table.sort_by(compare_standings);
        table
    }

    /// The team on top of the table, if there are any teams at all.
    pub fn leader(&self) -> Option<&Standing> {
        self.standings
            .iter()
            .reduce(|best, s| {
                if compare_standings(s, best) == Ordering::Less {
                    s
                } else {
                    best
                }
            })
    }

    /// Teams sharing first place on every ranking criterion, in roster order.
    pub fn tied_leaders(&self) -> Vec<TeamId> {
        match self.leader() {
            Some(leader) => self
                .standings
                .iter()
                .filter(|s| s.ties_with(leader))
                .map(|s| s.team)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Count outcomes recorded so far: (decisive, drawn) matches.
    pub fn result_counts(&self) -> (u32, u32) {
        let won: u32 = self.standings.iter().map(|s| s.won).sum();
        let drawn: u32 = self.standings.iter().map(|s| s.drawn).sum();
        (won, drawn / 2)
    }
}

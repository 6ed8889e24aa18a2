use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_MIN_COMPLETED_WEEKS, MAX_STRENGTH};
use crate::error::{LeagueError, Result};
use crate::matches::{Match, MatchDetails, MatchId, MatchResult};
use crate::outcome::simulate_result;
use crate::schedule::{self, generate_round_robin, WeekStatus};
use crate::season::{ChampionshipProbability, SeasonSimulator};
use crate::standing::{Standing, StandingsLedger};
use crate::team::{Team, TeamId};

/// When championship predictions are worth showing.
///
/// The estimator works at any point of the season; this is the caller-side
/// gate the league applies before publishing numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionPolicy {
    /// Consecutive fully played weeks, counted from week 1
    pub min_completed_weeks: u32,
}

impl Default for PredictionPolicy {
    fn default() -> Self {
        PredictionPolicy {
            min_completed_weeks: DEFAULT_MIN_COMPLETED_WEEKS,
        }
    }
}

/// Everything that changes as the season is played.
#[derive(Debug, Clone, Default)]
struct LeagueState {
    standings: StandingsLedger,
    matches: Vec<Match>,
}

impl LeagueState {
    fn index_of(&self, id: MatchId) -> Result<usize> {
        self.matches
            .iter()
            .position(|m| m.id == id)
            .ok_or(LeagueError::MatchNotFound(id))
    }

    /// Score an unplayed match and record it. Played matches are left alone.
    fn play<R: Rng + ?Sized>(&mut self, teams: &[Team], index: usize, rng: &mut R) -> Result<Match> {
        let fixture = &self.matches[index];
        if fixture.is_played() {
            return Ok(fixture.clone());
        }

        let home = find_team(teams, fixture.home)?;
        let away = find_team(teams, fixture.away)?;
        let result = simulate_result(home, away, rng);

        self.standings.apply(fixture, result)?;
        let fixture = &mut self.matches[index];
        fixture.result = Some(result);

        debug!(
            match_id = fixture.id.0,
            week = fixture.week,
            home = %home.name,
            away = %away.name,
            score = %result,
            "match simulated"
        );
        Ok(fixture.clone())
    }
}

fn validate_roster(teams: &[Team]) -> Result<()> {
    let mut seen = HashSet::with_capacity(teams.len());
    for team in teams {
        if !seen.insert(team.id) {
            return Err(LeagueError::DuplicateTeam(team.id));
        }
        if team.strength == 0 || team.strength > MAX_STRENGTH {
            return Err(LeagueError::InvalidStrength {
                team: team.id,
                strength: team.strength,
            });
        }
    }
    Ok(())
}

fn find_team(teams: &[Team], id: TeamId) -> Result<&Team> {
    teams
        .iter()
        .find(|t| t.id == id)
        .ok_or(LeagueError::TeamNotFound(id))
}

fn number_fixtures(teams: &[Team]) -> Result<Vec<Match>> {
    let ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    let fixtures = generate_round_robin(&ids)?;
    Ok(fixtures
        .into_iter()
        .enumerate()
        .map(|(i, f)| Match::new(MatchId(i as u32 + 1), f.home, f.away, f.week))
        .collect())
}

/// A league: a fixed roster plus its standings and fixture list.
///
/// Every operation that changes standings or fixtures holds the write lock
/// for its whole duration, so readers never see a played match without its
/// standings update or a fixture list that is partly replaced.
#[derive(Debug)]
pub struct League {
    teams: Vec<Team>,
    state: RwLock<LeagueState>,
}

impl League {
    /// Create a league with zeroed standings and no fixtures.
    ///
    /// Team ids must be unique and strengths within `1..=MAX_STRENGTH`.
    /// Fixture-related roster rules are checked by
    /// [`League::generate_fixtures`].
    pub fn new(teams: Vec<Team>) -> Result<Self> {
        let standings = teams.iter().map(|t| Standing::new(t.id)).collect();
        League::from_parts(teams, standings, Vec::new())
    }

    /// Resume a season from stored standings and fixtures.
    ///
    /// Every team needs exactly one standing record whose totals add up,
    /// and every fixture must pair two different known teams under a
    /// unique id. Records are reordered to roster order; the stored
    /// standings are taken as they are and not recomputed from results.
    pub fn from_parts(
        teams: Vec<Team>,
        standings: Vec<Standing>,
        matches: Vec<Match>,
    ) -> Result<Self> {
        validate_roster(&teams)?;

        let mut by_team: HashMap<TeamId, Standing> = HashMap::with_capacity(standings.len());
        for standing in standings {
            find_team(&teams, standing.team)?;
            if !standing.is_consistent() {
                return Err(LeagueError::InconsistentStanding(standing.team));
            }
            if by_team.insert(standing.team, standing).is_some() {
                return Err(LeagueError::DuplicateStanding(standing.team));
            }
        }
        let ordered = teams
            .iter()
            .map(|t| by_team.remove(&t.id).ok_or(LeagueError::StandingNotLoaded(t.id)))
            .collect::<Result<Vec<Standing>>>()?;

        let mut ids = HashSet::with_capacity(matches.len());
        for m in &matches {
            if !ids.insert(m.id) {
                return Err(LeagueError::DuplicateMatch(m.id));
            }
            find_team(&teams, m.home)?;
            find_team(&teams, m.away)?;
            if m.home == m.away {
                return Err(LeagueError::SelfFixture {
                    team: m.home,
                    match_id: m.id,
                });
            }
        }

        let state = LeagueState {
            standings: StandingsLedger::from_standings(ordered),
            matches,
        };

        Ok(League {
            teams,
            state: RwLock::new(state),
        })
    }

    /// Create a league and generate its fixtures in one go.
    pub fn with_fixtures(teams: Vec<Team>) -> Result<Self> {
        let league = League::new(teams)?;
        league.generate_fixtures()?;
        Ok(league)
    }

    fn read(&self) -> RwLockReadGuard<'_, LeagueState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LeagueState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        find_team(&self.teams, id)
    }

    /// The league table, best first.
    pub fn standings(&self) -> Vec<Standing> {
        self.read().standings.ranked()
    }

    /// A copy of the ledger in roster order.
    pub fn ledger(&self) -> StandingsLedger {
        self.read().standings.clone()
    }

    /// Fixtures ordered by week then id, optionally for one week only.
    pub fn matches(&self, week: Option<u32>) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .read()
            .matches
            .iter()
            .filter(|m| week.map_or(true, |w| m.week == w))
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.week, m.id));
        matches
    }

    /// Fixtures joined with their teams, ordered like [`League::matches`].
    pub fn matches_with_teams(&self, week: Option<u32>) -> Result<Vec<MatchDetails>> {
        self.matches(week)
            .into_iter()
            .map(|fixture| self.details(fixture))
            .collect()
    }

    fn details(&self, fixture: Match) -> Result<MatchDetails> {
        Ok(MatchDetails {
            home_team: self.team(fixture.home)?.clone(),
            away_team: self.team(fixture.away)?.clone(),
            fixture,
        })
    }

    pub fn find_match(&self, id: MatchId) -> Result<Match> {
        let state = self.read();
        let index = state.index_of(id)?;
        Ok(state.matches[index].clone())
    }

    /// Unplayed fixtures in schedule order.
    pub fn unplayed_matches(&self) -> Vec<Match> {
        let mut matches = self.matches(None);
        matches.retain(|m| !m.is_played());
        matches
    }

    pub fn week_status(&self) -> WeekStatus {
        schedule::week_status(&self.read().matches)
    }

    pub fn highest_completed_week(&self) -> u32 {
        schedule::highest_completed_week(&self.read().matches)
    }

    /// Replace the fixture list with a fresh double round-robin.
    ///
    /// The roster is validated before anything is written; on error the
    /// previous fixtures stay as they were. Standings are not touched.
    pub fn generate_fixtures(&self) -> Result<Vec<MatchDetails>> {
        let matches = match number_fixtures(&self.teams) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "fixture generation rejected");
                return Err(e);
            }
        };

        self.write().matches = matches.clone();
        info!(
            teams = self.teams.len(),
            fixtures = matches.len(),
            weeks = schedule::total_weeks(&matches),
            "fixtures generated"
        );

        matches.into_iter().map(|m| self.details(m)).collect()
    }

    /// Zero the standings and regenerate the fixtures as one step.
    pub fn reset_league(&self) -> Result<Vec<MatchDetails>> {
        let matches = number_fixtures(&self.teams)?;

        {
            let mut state = self.write();
            state.standings.reset();
            state.matches = matches.clone();
        }
        info!(fixtures = matches.len(), "league reset");

        matches.into_iter().map(|m| self.details(m)).collect()
    }

    /// Play one match with the committed-match model.
    ///
    /// A match that is already played is returned unchanged.
    pub fn simulate_match<R: Rng + ?Sized>(&self, id: MatchId, rng: &mut R) -> Result<Match> {
        let mut state = self.write();
        let index = state.index_of(id)?;
        state.play(&self.teams, index, rng)
    }

    /// Play every unplayed match of `week`.
    ///
    /// Returns the matches that were played by this call.
    pub fn simulate_week<R: Rng + ?Sized>(&self, week: u32, rng: &mut R) -> Result<Vec<Match>> {
        let mut state = self.write();
        let total_weeks = schedule::total_weeks(&state.matches);
        if week == 0 || week > total_weeks {
            return Err(LeagueError::WeekOutOfRange { week, total_weeks });
        }

        let played = self.play_where(&mut state, rng, |m| m.week == week)?;
        info!(week, matches = played.len(), "week simulated");
        Ok(played)
    }

    /// Play every remaining match of the season.
    pub fn simulate_all_matches<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Match>> {
        let mut state = self.write();
        let played = self.play_where(&mut state, rng, |_| true)?;
        info!(matches = played.len(), "remaining season simulated");
        Ok(played)
    }

    fn play_where<R, F>(&self, state: &mut LeagueState, rng: &mut R, filter: F) -> Result<Vec<Match>>
    where
        R: Rng + ?Sized,
        F: Fn(&Match) -> bool,
    {
        let mut pending: Vec<(u32, MatchId, usize)> = state
            .matches
            .iter()
            .enumerate()
            .filter(|&(_, m)| !m.is_played() && filter(m))
            .map(|(i, m)| (m.week, m.id, i))
            .collect();
        pending.sort();

        pending
            .into_iter()
            .map(|(_, _, index)| state.play(&self.teams, index, rng))
            .collect()
    }

    /// Record a result entered by hand, replacing any earlier result.
    ///
    /// An earlier result is reversed out of the standings before the new one
    /// is applied; both happen under the same lock.
    pub fn update_match_result(&self, id: MatchId, result: MatchResult) -> Result<Match> {
        let mut state = self.write();
        let index = state.index_of(id)?;
        let fixture = state.matches[index].clone();

        let mut standings = state.standings.clone();
        if fixture.is_played() {
            standings.reverse(&fixture)?;
        }
        standings.apply(&fixture, result)?;

        state.standings = standings;
        state.matches[index].result = Some(result);

        info!(
            match_id = id.0,
            previous = ?fixture.result.map(|r| r.to_string()),
            score = %result,
            "match result updated"
        );
        Ok(state.matches[index].clone())
    }

    /// Estimate each team's chance of winning the league from the current
    /// standings. Nothing in the league is modified.
    pub fn championship_probabilities(
        &self,
        simulator: &SeasonSimulator,
    ) -> Result<Vec<ChampionshipProbability>> {
        let (standings, matches) = {
            let state = self.read();
            (state.standings.clone(), state.matches.clone())
        };
        simulator.championship_probabilities(&self.teams, &standings, &matches)
    }

    /// Championship probabilities once `policy` allows them, `None` before.
    pub fn predictions_if_ready(
        &self,
        policy: &PredictionPolicy,
        simulator: &SeasonSimulator,
    ) -> Result<Option<Vec<ChampionshipProbability>>> {
        let completed = self.highest_completed_week();
        if completed < policy.min_completed_weeks {
            debug!(
                completed,
                required = policy.min_completed_weeks,
                "predictions not available yet"
            );
            return Ok(None);
        }
        self.championship_probabilities(simulator).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::default_roster;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn league() -> League {
        League::with_fixtures(default_roster()).unwrap()
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let mut teams = default_roster();
        teams[3].id = TeamId(1);
        assert_eq!(
            League::new(teams).unwrap_err(),
            LeagueError::DuplicateTeam(TeamId(1))
        );
    }

    #[test]
    fn test_new_rejects_zero_strength() {
        let mut teams = default_roster();
        teams[2].strength = 0;
        assert_eq!(
            League::new(teams).unwrap_err(),
            LeagueError::InvalidStrength {
                team: TeamId(3),
                strength: 0
            }
        );
    }

    #[test]
    fn test_new_rejects_oversized_strength() {
        let mut teams = default_roster();
        teams[0].strength = u32::MAX;
        assert_eq!(
            League::new(teams).unwrap_err(),
            LeagueError::InvalidStrength {
                team: TeamId(1),
                strength: u32::MAX
            }
        );

        let mut teams = default_roster();
        teams[0].strength = MAX_STRENGTH;
        let league = League::with_fixtures(teams).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let played = league.simulate_match(MatchId(1), &mut rng).unwrap();
        assert_eq!(played.result.map(|r| r.home_goals), Some(5));
    }

    /// Week 1 and 2 played, weeks 3 to 6 still open.
    fn half_played() -> (Vec<Standing>, Vec<Match>) {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        league.simulate_week(1, &mut rng).unwrap();
        league.simulate_week(2, &mut rng).unwrap();
        (league.ledger().iter().copied().collect(), league.matches(None))
    }

    #[test]
    fn test_from_parts_resumes_season() {
        let (mut standings, matches) = half_played();
        standings.reverse();
        let league = League::from_parts(default_roster(), standings, matches.clone()).unwrap();

        let order: Vec<TeamId> = league.ledger().iter().map(|s| s.team).collect();
        assert_eq!(order, vec![TeamId(1), TeamId(2), TeamId(3), TeamId(4)]);
        assert_eq!(league.week_status().current_week, 3);
        assert_eq!(league.highest_completed_week(), 2);
        assert_eq!(league.find_match(matches[0].id).unwrap(), matches[0]);

        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let played = league.simulate_all_matches(&mut rng).unwrap();
        assert_eq!(played.len(), 8);
        assert!(league.ledger().iter().all(|s| s.played == 6 && s.is_consistent()));
        assert!(league.week_status().all_matches_played);
    }

    #[test]
    fn test_from_parts_can_edit_loaded_result() {
        let (standings, matches) = half_played();
        let league = League::from_parts(default_roster(), standings, matches).unwrap();

        let first = league.find_match(MatchId(1)).unwrap();
        assert!(first.is_played());
        league.update_match_result(first.id, MatchResult::new(0, 0)).unwrap();

        let ledger = league.ledger();
        assert_eq!(ledger.get(first.home).unwrap().played, 2);
        let (_, draws) = ledger.result_counts();
        assert!(draws >= 1);
    }

    #[test]
    fn test_from_parts_rejects_bad_standings() {
        let (standings, matches) = half_played();

        let missing = standings[1..].to_vec();
        assert_eq!(
            League::from_parts(default_roster(), missing, matches.clone()).unwrap_err(),
            LeagueError::StandingNotLoaded(TeamId(1))
        );

        let mut doubled = standings.clone();
        doubled.push(standings[2]);
        assert_eq!(
            League::from_parts(default_roster(), doubled, matches.clone()).unwrap_err(),
            LeagueError::DuplicateStanding(TeamId(3))
        );

        let mut broken = standings.clone();
        broken[0].points += 1;
        assert_eq!(
            League::from_parts(default_roster(), broken, matches.clone()).unwrap_err(),
            LeagueError::InconsistentStanding(TeamId(1))
        );

        let mut stranger = standings;
        stranger.push(Standing::new(TeamId(9)));
        assert_eq!(
            League::from_parts(default_roster(), stranger, matches).unwrap_err(),
            LeagueError::TeamNotFound(TeamId(9))
        );
    }

    #[test]
    fn test_from_parts_rejects_bad_fixtures() {
        let (standings, matches) = half_played();

        let mut repeated = matches.clone();
        repeated.push(matches[4].clone());
        assert_eq!(
            League::from_parts(default_roster(), standings.clone(), repeated).unwrap_err(),
            LeagueError::DuplicateMatch(matches[4].id)
        );

        let mut unknown = matches.clone();
        unknown.push(Match::new(MatchId(99), TeamId(1), TeamId(7), 7));
        assert_eq!(
            League::from_parts(default_roster(), standings.clone(), unknown).unwrap_err(),
            LeagueError::TeamNotFound(TeamId(7))
        );

        let mut own = matches;
        own.push(Match::new(MatchId(99), TeamId(2), TeamId(2), 7));
        assert_eq!(
            League::from_parts(default_roster(), standings, own).unwrap_err(),
            LeagueError::SelfFixture {
                team: TeamId(2),
                match_id: MatchId(99)
            }
        );
    }

    #[test]
    fn test_generate_fixtures_joins_teams() {
        let league = League::new(default_roster()).unwrap();
        let details = league.generate_fixtures().unwrap();

        assert_eq!(details.len(), 12);
        assert!(details.iter().all(|d| !d.fixture.is_played()));
        assert_eq!(details[0].home_team.name, "Manchester City");
        assert_eq!(details[0].away_team.name, "Barcelona");
        assert_eq!(league.matches(Some(1)).len(), 2);
        assert_eq!(league.week_status().total_weeks, 6);
    }

    #[test]
    fn test_failed_generation_keeps_old_fixtures() {
        let mut teams = default_roster();
        teams.push(Team::new(5, "Ajax", 75));
        let league = League::new(teams).unwrap();

        assert_eq!(league.generate_fixtures().unwrap_err(), LeagueError::OddTeamCount(5));
        assert!(league.matches(None).is_empty());

        let small = League::new(default_roster()[..2].to_vec()).unwrap();
        assert_eq!(
            small.reset_league().unwrap_err(),
            LeagueError::InsufficientTeams { required: 4, actual: 2 }
        );
    }

    #[test]
    fn test_regeneration_replaces_played_fixtures() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        league.simulate_week(1, &mut rng).unwrap();

        league.generate_fixtures().unwrap();
        let matches = league.matches(None);
        assert_eq!(matches.len(), 12);
        assert!(matches.iter().all(|m| !m.is_played()));
    }

    #[test]
    fn test_simulate_match_is_idempotent() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let first = league.simulate_match(MatchId(1), &mut rng).unwrap();
        assert!(first.is_played());
        let table = league.ledger();

        let second = league.simulate_match(MatchId(1), &mut rng).unwrap();
        assert_eq!(first, second);
        assert_eq!(league.ledger(), table);
    }

    #[test]
    fn test_simulate_match_unknown_id() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            league.simulate_match(MatchId(99), &mut rng).unwrap_err(),
            LeagueError::MatchNotFound(MatchId(99))
        );
    }

    #[test]
    fn test_simulate_week() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let played = league.simulate_week(1, &mut rng).unwrap();
        assert_eq!(played.len(), 2);
        assert!(played.iter().all(|m| m.week == 1 && m.is_played()));
        assert_eq!(league.week_status().current_week, 2);

        // Nothing left to play in week 1
        assert!(league.simulate_week(1, &mut rng).unwrap().is_empty());

        assert_eq!(
            league.simulate_week(7, &mut rng).unwrap_err(),
            LeagueError::WeekOutOfRange { week: 7, total_weeks: 6 }
        );
    }

    #[test]
    fn test_simulate_all_matches() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        league.simulate_week(1, &mut rng).unwrap();

        let played = league.simulate_all_matches(&mut rng).unwrap();
        assert_eq!(played.len(), 10);
        assert!(league.week_status().all_matches_played);
        assert_eq!(league.highest_completed_week(), 6);
        assert!(league.standings().iter().all(|s| s.played == 6 && s.is_consistent()));
    }

    #[test]
    fn test_update_unplayed_match_result() {
        let league = league();
        let updated = league.update_match_result(MatchId(1), MatchResult::new(2, 0)).unwrap();
        assert_eq!(updated.result, Some(MatchResult::new(2, 0)));

        let ledger = league.ledger();
        assert_eq!(ledger.get(updated.home).unwrap().points, 3);
        assert_eq!(ledger.get(updated.away).unwrap().lost, 1);
    }

    #[test]
    fn test_update_played_match_replaces_result() {
        let league = league();
        league.update_match_result(MatchId(1), MatchResult::new(2, 0)).unwrap();
        let updated = league.update_match_result(MatchId(1), MatchResult::new(1, 1)).unwrap();

        let ledger = league.ledger();
        let home = ledger.get(updated.home).unwrap();
        let away = ledger.get(updated.away).unwrap();
        assert_eq!((home.played, home.won, home.drawn, home.points), (1, 0, 1, 1));
        assert_eq!((away.played, away.lost, away.drawn, away.points), (1, 0, 1, 1));
        assert_eq!((home.goals_for, home.goals_against), (1, 1));
    }

    #[test]
    fn test_reset_league() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        league.simulate_all_matches(&mut rng).unwrap();

        let fixtures = league.reset_league().unwrap();
        assert_eq!(fixtures.len(), 12);
        assert!(league.standings().iter().all(|s| *s == Standing::new(s.team)));
        assert_eq!(league.week_status().current_week, 1);
    }

    #[test]
    fn test_predictions_gated_by_policy() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let sim = SeasonSimulator::new(200).with_seed(1);
        let policy = PredictionPolicy::default();

        for week in 1..=3 {
            league.simulate_week(week, &mut rng).unwrap();
            assert!(league.predictions_if_ready(&policy, &sim).unwrap().is_none());
        }

        league.simulate_week(4, &mut rng).unwrap();
        let predictions = league.predictions_if_ready(&policy, &sim).unwrap().unwrap();
        assert_eq!(predictions.len(), 4);
    }

    #[test]
    fn test_probabilities_do_not_mutate_league() {
        let league = league();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        league.simulate_week(1, &mut rng).unwrap();

        let ledger = league.ledger();
        let matches = league.matches(None);
        league
            .championship_probabilities(&SeasonSimulator::new(300).with_seed(2))
            .unwrap();

        assert_eq!(league.ledger(), ledger);
        assert_eq!(league.matches(None), matches);
    }
}

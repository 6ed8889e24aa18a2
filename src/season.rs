use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::constants::{
    round_percentage, DEFAULT_SIMULATION_COUNT, DRAW_PROBABILITY, DRAW_SCORE_RANGE,
    LOSER_SCORE_RANGE, WINNER_SCORE_RANGE,
};
use crate::error::{LeagueError, Result};
use crate::matches::{Match, MatchResult};
use crate::standing::StandingsLedger;
use crate::team::{Team, TeamId};

/// Chance that a team finishes the season on top of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionshipProbability {
    pub team: Team,

    /// Percentage in [0, 100], rounded to two decimals
    pub probability: f64,
}

/// Home win, away win and draw probabilities for one fixture in the
/// season model.
///
/// A fixed quarter of the probability mass goes to the draw; the rest is
/// split in proportion to home strength (with home advantage) and away
/// strength.
pub fn outcome_probabilities(home: &Team, away: &Team) -> (f64, f64, f64) {
    let home_strength = home.home_strength() as f64;
    let away_strength = away.strength as f64;
    let total = home_strength + away_strength;

    let (home_share, away_share) = if total == 0.0 {
        (0.5, 0.5)
    } else {
        (home_strength / total, away_strength / total)
    };

    let home_win = home_share * (1.0 - DRAW_PROBABILITY);
    let away_win = away_share * (1.0 - DRAW_PROBABILITY);
    (home_win, away_win, 1.0 - home_win - away_win)
}

/// Draw a plausible score for a fixture that has not been played yet.
///
/// First picks the result category, then a score consistent with it:
/// winners score 1-4, losers 0-2, and draws share a score of 0-3.
pub fn simulate_category_result<R: Rng + ?Sized>(
    home: &Team,
    away: &Team,
    rng: &mut R,
) -> MatchResult {
    let (home_win, away_win, _) = outcome_probabilities(home, away);
    let roll: f64 = rng.gen();

    if roll < home_win {
        let home_goals = rng.gen_range(WINNER_SCORE_RANGE.0..=WINNER_SCORE_RANGE.1);
        let away_goals = rng.gen_range(LOSER_SCORE_RANGE.0..=LOSER_SCORE_RANGE.1);
        MatchResult::new(home_goals, away_goals)
    } else if roll < home_win + away_win {
        let home_goals = rng.gen_range(LOSER_SCORE_RANGE.0..=LOSER_SCORE_RANGE.1);
        let away_goals = rng.gen_range(WINNER_SCORE_RANGE.0..=WINNER_SCORE_RANGE.1);
        MatchResult::new(home_goals, away_goals)
    } else {
        let goals = rng.gen_range(DRAW_SCORE_RANGE.0..=DRAW_SCORE_RANGE.1);
        MatchResult::new(goals, goals)
    }
}

/// An unplayed fixture with both teams looked up.
type ResolvedFixture<'a> = (&'a Match, &'a Team, &'a Team);

fn resolve_remaining<'a>(
    teams: &HashMap<TeamId, &'a Team>,
    matches: &'a [Match],
) -> Result<Vec<ResolvedFixture<'a>>> {
    let mut remaining: Vec<&Match> = matches.iter().filter(|m| !m.is_played()).collect();
    remaining.sort_by_key(|m| (m.week, m.id));

    remaining
        .into_iter()
        .map(|m| -> Result<ResolvedFixture<'a>> {
            let home = teams.get(&m.home).ok_or(LeagueError::TeamNotFound(m.home))?;
            let away = teams.get(&m.away).ok_or(LeagueError::TeamNotFound(m.away))?;
            Ok((m, *home, *away))
        })
        .collect()
}

fn complete_season<R: Rng + ?Sized>(
    base: &StandingsLedger,
    remaining: &[ResolvedFixture<'_>],
    rng: &mut R,
) -> Result<StandingsLedger> {
    let mut ledger = base.clone();
    for (fixture, home, away) in remaining {
        let result = simulate_category_result(home, away, rng);
        ledger.apply(fixture, result)?;
    }
    Ok(ledger)
}

/// Monte Carlo estimator of championship chances.
///
/// Each trial plays out every unplayed fixture on a private copy of the
/// standings with the category-based score model and records who tops the
/// final table. Trials are independent and run on the rayon pool, each with
/// its own generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSimulator {
    /// Number of season completions; always at least one
    pub simulations: usize,

    /// Master seed; `None` draws one from the OS
    pub seed: Option<u64>,

    /// Spread trials over the rayon pool
    pub parallel: bool,
}

impl Default for SeasonSimulator {
    fn default() -> Self {
        SeasonSimulator {
            simulations: DEFAULT_SIMULATION_COUNT,
            seed: None,
            parallel: true,
        }
    }
}

impl SeasonSimulator {
    pub fn new(simulations: usize) -> Self {
        SeasonSimulator {
            simulations: simulations.max(1),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Play out the rest of the season once on a copy of `standings`.
    ///
    /// Unplayed fixtures are taken in schedule order (week, then id). The
    /// input ledger is never modified.
    pub fn simulate_remaining<R: Rng + ?Sized>(
        &self,
        teams: &[Team],
        standings: &StandingsLedger,
        matches: &[Match],
        rng: &mut R,
    ) -> Result<StandingsLedger> {
        let lookup: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, t)).collect();
        let remaining = resolve_remaining(&lookup, matches)?;
        complete_season(standings, &remaining, rng)
    }

    /// Estimate each team's chance of winning the league.
    ///
    /// With no fixtures left the table is final: every team level with the
    /// leader on points, goal difference and goals scored gets an equal
    /// share of 100 and everyone else gets 0.
    ///
    /// # Arguments
    /// * `teams` - Roster used to look up strengths
    /// * `standings` - Current table; left untouched
    /// * `matches` - Full fixture list; played fixtures are skipped
    ///
    /// # Returns
    /// Probabilities in percent, highest first. Equal probabilities keep the
    /// current table order.
    pub fn championship_probabilities(
        &self,
        teams: &[Team],
        standings: &StandingsLedger,
        matches: &[Match],
    ) -> Result<Vec<ChampionshipProbability>> {
        let lookup: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, t)).collect();
        let table = standings.ranked();
        let order: Vec<&Team> = table
            .iter()
            .map(|s| lookup.get(&s.team).copied().ok_or(LeagueError::TeamNotFound(s.team)))
            .collect::<Result<_>>()?;

        let remaining = resolve_remaining(&lookup, matches)?;

        let probabilities: Vec<f64> = if remaining.is_empty() {
            let leaders = standings.tied_leaders();
            debug!(leaders = leaders.len(), "season complete, splitting title between tied leaders");
            let share = if leaders.is_empty() {
                0.0
            } else {
                round_percentage(100.0 / leaders.len() as f64)
            };
            order
                .iter()
                .map(|t| if leaders.contains(&t.id) { share } else { 0.0 })
                .collect()
        } else {
            let wins = self.count_titles(&order, standings, &remaining)?;
            wins.iter()
                .map(|&w| round_percentage(w as f64 / self.simulations as f64 * 100.0))
                .collect()
        };

        let mut result: Vec<ChampionshipProbability> = order
            .into_iter()
            .zip(probabilities)
            .map(|(team, probability)| ChampionshipProbability {
                team: team.clone(),
                probability,
            })
            .collect();
        result.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        Ok(result)
    }

    /// Run every trial and count titles per team, indexed like `order`.
    fn count_titles(
        &self,
        order: &[&Team],
        standings: &StandingsLedger,
        remaining: &[ResolvedFixture<'_>],
    ) -> Result<Vec<u32>> {
        let started = Instant::now();
        let index: HashMap<TeamId, usize> =
            order.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        let mut master = match self.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..self.simulations).map(|_| master.gen::<u64>()).collect();

        let tally = |mut counts: Vec<u32>, seed: &u64| -> Result<Vec<u32>> {
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            let final_table = complete_season(standings, remaining, &mut rng)?;
            if let Some(champion) = final_table.leader() {
                if let Some(&i) = index.get(&champion.team) {
                    counts[i] += 1;
                }
            }
            Ok(counts)
        };

        let counts = if self.parallel {
            seeds
                .par_iter()
                .try_fold(|| vec![0u32; order.len()], tally)
                .try_reduce(
                    || vec![0u32; order.len()],
                    |mut a, b| {
                        for (x, y) in a.iter_mut().zip(b) {
                            *x += y;
                        }
                        Ok(a)
                    },
                )?
        } else {
            seeds.iter().try_fold(vec![0u32; order.len()], tally)?
        };

        info!(
            simulations = self.simulations,
            remaining = remaining.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "championship simulation finished"
        );

        Ok(counts)
    }
}

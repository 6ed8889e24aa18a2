//! Python bindings for the league.
//!
//! Results cross the boundary as plain tuples so the Python side needs no
//! extra classes beyond `League`.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::constants::{DEFAULT_MIN_COMPLETED_WEEKS, DEFAULT_SIMULATION_COUNT};
use crate::error::LeagueError;
use crate::league::{League, PredictionPolicy};
use crate::matches::{Match, MatchId, MatchResult};
use crate::season::SeasonSimulator;
use crate::team::{default_roster, Team};

/// (id, week, home, away, score)
type PyMatch = (u32, u32, String, String, Option<(u8, u8)>);

/// (team, played, won, drawn, lost, goals for, goals against, goal difference, points)
type PyStanding = (String, u32, u32, u32, u32, u32, u32, i32, u32);

fn to_py_err(e: LeagueError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyclass(name = "League")]
pub struct PyLeague {
    league: League,
    rng: ChaCha8Rng,
}

impl PyLeague {
    fn team_name(&self, id: crate::team::TeamId) -> String {
        self.league
            .team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    fn to_py_match(&self, m: &Match) -> PyMatch {
        (
            m.id.0,
            m.week,
            self.team_name(m.home),
            self.team_name(m.away),
            m.result.map(|r| (r.home_goals, r.away_goals)),
        )
    }
}

#[pymethods]
impl PyLeague {
    /// Create a league from `(id, name, strength)` tuples, or the default
    /// roster when `teams` is omitted. Fixtures are generated immediately.
    #[new]
    #[pyo3(signature = (teams = None, seed = None))]
    fn new(teams: Option<Vec<(u32, String, u32)>>, seed: Option<u64>) -> PyResult<Self> {
        let roster = match teams {
            Some(list) => list
                .into_iter()
                .map(|(id, name, strength)| Team::new(id, name, strength))
                .collect(),
            None => default_roster(),
        };
        let league = League::with_fixtures(roster).map_err(to_py_err)?;
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(PyLeague { league, rng })
    }

    #[pyo3(signature = (week = None))]
    fn matches(&self, week: Option<u32>) -> Vec<PyMatch> {
        self.league
            .matches(week)
            .iter()
            .map(|m| self.to_py_match(m))
            .collect()
    }

    fn standings(&self) -> Vec<PyStanding> {
        self.league
            .ledger()
            .ranked()
            .into_iter()
            .map(|s| {
                (
                    self.team_name(s.team),
                    s.played,
                    s.won,
                    s.drawn,
                    s.lost,
                    s.goals_for,
                    s.goals_against,
                    s.goal_difference,
                    s.points,
                )
            })
            .collect()
    }

    /// `(current_week, total_weeks, all_matches_played)`
    fn week_status(&self) -> (u32, u32, bool) {
        let status = self.league.week_status();
        (
            status.current_week,
            status.total_weeks,
            status.all_matches_played,
        )
    }

    fn reset(&self) -> PyResult<()> {
        self.league.reset_league().map(|_| ()).map_err(to_py_err)
    }

    fn simulate_week(&mut self, week: u32) -> PyResult<Vec<PyMatch>> {
        let played = self
            .league
            .simulate_week(week, &mut self.rng)
            .map_err(to_py_err)?;
        Ok(played.iter().map(|m| self.to_py_match(m)).collect())
    }

    fn simulate_all(&mut self) -> PyResult<Vec<PyMatch>> {
        let played = self
            .league
            .simulate_all_matches(&mut self.rng)
            .map_err(to_py_err)?;
        Ok(played.iter().map(|m| self.to_py_match(m)).collect())
    }

    fn update_result(&self, match_id: u32, home_goals: u8, away_goals: u8) -> PyResult<PyMatch> {
        let updated = self
            .league
            .update_match_result(MatchId(match_id), MatchResult::new(home_goals, away_goals))
            .map_err(to_py_err)?;
        Ok(self.to_py_match(&updated))
    }

    /// Championship chances in percent, highest first. Returns `None` until
    /// `min_completed_weeks` weeks are fully played.
    #[pyo3(signature = (simulations = DEFAULT_SIMULATION_COUNT, seed = None, min_completed_weeks = DEFAULT_MIN_COMPLETED_WEEKS))]
    fn predictions(
        &self,
        py: Python<'_>,
        simulations: usize,
        seed: Option<u64>,
        min_completed_weeks: u32,
    ) -> PyResult<Option<Vec<(String, f64)>>> {
        let mut simulator = SeasonSimulator::new(simulations);
        simulator.seed = seed;
        let policy = PredictionPolicy {
            min_completed_weeks,
        };

        let league = &self.league;
        let result = py
            .allow_threads(|| league.predictions_if_ready(&policy, &simulator))
            .map_err(to_py_err)?;

        Ok(result.map(|list| {
            list.into_iter()
                .map(|p| (p.team.name, p.probability))
                .collect()
        }))
    }
}

/// Python module definition
#[pymodule]
fn league_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLeague>()?;

    m.add("HOME_ADVANTAGE", crate::constants::HOME_ADVANTAGE)?;
    m.add("POINTS_FOR_WIN", crate::constants::POINTS_FOR_WIN)?;
    m.add("POINTS_FOR_DRAW", crate::constants::POINTS_FOR_DRAW)?;

    Ok(())
}

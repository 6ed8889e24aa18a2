//! League Core - football league simulation and championship prediction.
//!
//! This library schedules a double round-robin season, plays matches from
//! team strength ratings, keeps the league table and estimates each team's
//! chance of winning the title by Monte Carlo simulation. Python bindings
//! via PyO3 are available behind the `python` feature.

pub mod config;
pub mod constants;
pub mod error;
pub mod league;
pub mod matches;
pub mod outcome;
pub mod schedule;
pub mod season;
pub mod standing;
pub mod team;

#[cfg(feature = "python")]
mod python;

pub use config::{load_config, ConfigError, LeagueConfig};
pub use constants::{HOME_ADVANTAGE, POINTS_FOR_DRAW, POINTS_FOR_WIN};
pub use error::{LeagueError, Result};
pub use league::{League, PredictionPolicy};
pub use matches::{Match, MatchDetails, MatchId, MatchResult, Outcome};
pub use outcome::{generate_goals, simulate_result};
pub use schedule::{generate_round_robin, Fixture, WeekStatus};
pub use season::{ChampionshipProbability, SeasonSimulator};
pub use standing::{compare_standings, Standing, StandingsLedger};
pub use team::{default_roster, Team, TeamId};

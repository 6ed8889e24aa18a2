//! League CLI
//!
//! Prints the fixture list, plays a season week by week or estimates
//! championship chances after a number of weeks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

use league_core::config::load_or_default;
use league_core::{ChampionshipProbability, League, LeagueConfig, SeasonSimulator};

#[derive(Parser)]
#[command(name = "league")]
#[command(about = "Simulate a football league and predict its champion", long_about = None)]
struct Cli {
    /// TOML file with the roster and simulation settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for match results and season simulations
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of season simulations per prediction
    #[arg(long, global = true)]
    simulations: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the double round-robin schedule
    Fixtures,

    /// Play the whole season week by week
    Season,

    /// Play some weeks, then print championship probabilities
    Predict {
        /// Weeks to play before predicting
        #[arg(long, default_value = "4")]
        weeks: u32,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to build default config".to_string(),
    })?;

    let mut simulator = config.simulator();
    if let Some(n) = cli.simulations {
        simulator = SeasonSimulator {
            simulations: n.max(1),
            ..simulator
        };
    }
    if let Some(seed) = cli.seed {
        simulator.seed = Some(seed);
    }

    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let league = League::with_fixtures(config.teams.clone()).context("failed to create league")?;
    info!(teams = league.teams().len(), "league created");

    match cli.command {
        Commands::Fixtures => print_fixtures(&league, None)?,
        Commands::Season => run_season(&league, &config, &simulator, &mut rng)?,
        Commands::Predict { weeks } => {
            let total = league.week_status().total_weeks;
            for week in 1..=weeks.min(total) {
                league.simulate_week(week, &mut rng)?;
            }
            print_fixtures(&league, None)?;
            print_table(&league)?;
            let probabilities = league
                .championship_probabilities(&simulator)
                .context("championship simulation failed")?;
            print_probabilities(&probabilities);
        }
    }

    Ok(())
}

fn run_season(
    league: &League,
    config: &LeagueConfig,
    simulator: &SeasonSimulator,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let policy = config.prediction_policy();
    let total = league.week_status().total_weeks;

    for week in 1..=total {
        league.simulate_week(week, rng)?;
        print_fixtures(league, Some(week))?;
        print_table(league)?;

        if let Some(probabilities) = league.predictions_if_ready(&policy, simulator)? {
            print_probabilities(&probabilities);
        }
    }

    Ok(())
}

fn print_fixtures(league: &League, week: Option<u32>) -> Result<()> {
    let mut current = 0;
    for details in league.matches_with_teams(week)? {
        if details.fixture.week != current {
            current = details.fixture.week;
            println!();
        }
        println!("{}", details);
    }
    Ok(())
}

fn print_table(league: &League) -> Result<()> {
    println!();
    println!(
        "{:<3} {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for (pos, s) in league.standings().iter().enumerate() {
        let team = league.team(s.team)?;
        println!(
            "{:<3} {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
            pos + 1,
            team.name,
            s.played,
            s.won,
            s.drawn,
            s.lost,
            s.goals_for,
            s.goals_against,
            s.goal_difference,
            s.points
        );
    }
    Ok(())
}

fn print_probabilities(probabilities: &[ChampionshipProbability]) {
    println!();
    println!("Championship probabilities");
    for p in probabilities {
        println!("  {:<20} {:>6.2}%", p.team.name, p.probability);
    }
}

/// Log to stderr so table output on stdout stays clean.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("league_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

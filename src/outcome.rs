use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::Binomial;
use statrs::statistics::Distribution as Moments;

use crate::constants::{goal_probability, MAX_GOAL_ATTEMPTS};
use crate::matches::MatchResult;
use crate::team::Team;

fn goal_distribution(strength: u32) -> Binomial {
    Binomial::new(goal_probability(strength), MAX_GOAL_ATTEMPTS)
        .expect("goal probability is clamped to [0, 1]")
}

/// Draw a goal count for one side of a committed match.
///
/// Each of the five scoring attempts succeeds independently with
/// probability `strength / 30 * 20%`, capped at certainty, so the result is
/// always in `0..=5`.
pub fn generate_goals<R: Rng + ?Sized>(strength: u32, rng: &mut R) -> u8 {
    let goals: f64 = goal_distribution(strength).sample(rng);
    goals as u8
}

/// Mean goal count for a side of the given effective strength.
pub fn expected_goals(strength: u32) -> f64 {
    goal_distribution(strength).mean().unwrap_or(0.0)
}

/// Score a committed match.
///
/// The home side plays with its home strength; the two goal counts are
/// drawn independently.
pub fn simulate_result<R: Rng + ?Sized>(home: &Team, away: &Team, rng: &mut R) -> MatchResult {
    let home_goals = generate_goals(home.home_strength(), rng);
    let away_goals = generate_goals(away.strength, rng);
    MatchResult::new(home_goals, away_goals)
}

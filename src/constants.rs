/// Strength bonus added to the home side in both scoring models
pub const HOME_ADVANTAGE: u32 = 10;

/// Strength points per expected goal in the committed-match model
pub const STRENGTH_DIVISOR: f64 = 30.0;

/// Per-attempt scoring chance as a fraction of the expected goals
pub const GOAL_PROBABILITY_MULTIPLIER: f64 = 0.20;

/// Scoring attempts per side in the committed-match model
pub const MAX_GOAL_ATTEMPTS: u64 = 5;

/// League points for a win
pub const POINTS_FOR_WIN: u32 = 3;

/// League points for a draw
pub const POINTS_FOR_DRAW: u32 = 1;

/// Largest accepted team strength; ratings above it add nothing since
/// scoring is already certain well below this value
pub const MAX_STRENGTH: u32 = 1_000;

/// Smallest roster a double round-robin is generated for
pub const MIN_TEAMS: usize = 4;

/// Probability mass reserved for draws in the season model
pub const DRAW_PROBABILITY: f64 = 0.25;

/// Default number of Monte Carlo season completions
pub const DEFAULT_SIMULATION_COUNT: usize = 10_000;

/// Completed weeks required before predictions are shown
pub const DEFAULT_MIN_COMPLETED_WEEKS: u32 = 4;

/// Winner's score range in the season model (inclusive)
pub const WINNER_SCORE_RANGE: (u8, u8) = (1, 4);

/// Loser's score range in the season model (inclusive)
pub const LOSER_SCORE_RANGE: (u8, u8) = (0, 2);

/// Shared score range for a simulated draw (inclusive)
pub const DRAW_SCORE_RANGE: (u8, u8) = (0, 3);

/// Probability of scoring on one attempt for a given effective strength.
pub fn goal_probability(strength: u32) -> f64 {
    let average_goals = strength as f64 / STRENGTH_DIVISOR;
    (average_goals * GOAL_PROBABILITY_MULTIPLIER).clamp(0.0, 1.0)
}

/// Round a percentage to two decimal places.
pub fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_probability_scales_with_strength() {
        assert!((goal_probability(30) - 0.2).abs() < 1e-12);
        assert!((goal_probability(90) - 0.6).abs() < 1e-12);
        assert!(goal_probability(85) < goal_probability(95));
    }

    #[test]
    fn test_goal_probability_capped_at_certainty() {
        assert_eq!(goal_probability(150), 1.0);
        assert_eq!(goal_probability(500), 1.0);
    }

    #[test]
    fn test_round_percentage() {
        assert_eq!(round_percentage(33.33333), 33.33);
        assert_eq!(round_percentage(66.666666), 66.67);
        assert_eq!(round_percentage(50.0), 50.0);
    }
}

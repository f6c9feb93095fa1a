// Static position evaluation
//
// Each side is rated as a weighted sum of its banked store seeds and the seeds
// still sitting in its own pits. The store weight dominates: stored seeds are
// permanent, pit seeds can still be captured or swept.

use crate::board::GameState;
use crate::config::EvaluationConfig;
use crate::types::Player;

/// Linear store/pit heuristic with fixed coefficients
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    store_weight: f64,
    pit_weight: f64,
}

impl Evaluator {
    pub fn new(config: &EvaluationConfig) -> Self {
        Evaluator {
            store_weight: config.store_weight,
            pit_weight: config.pit_weight,
        }
    }

    /// Rates `state` from `player`'s point of view against `opponent`
    ///
    /// Positive values favour `player`.
    pub fn evaluate(&self, state: &GameState, player: Player, opponent: Player) -> i32 {
        self.rate_side(state, player) - self.rate_side(state, opponent)
    }

    fn rate_side(&self, state: &GameState, player: Player) -> i32 {
        let in_store = state.score(player) as f64;
        let in_pits = state.pit_total(player) as f64;
        (self.store_weight * in_store + self.pit_weight * in_pits) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn evaluator() -> Evaluator {
        Evaluator::new(&Config::default_hardcoded().evaluation)
    }

    #[test]
    fn test_symmetric_position_is_even() {
        let state = GameState::default();
        assert_eq!(evaluator().evaluate(&state, Player::One, Player::Two), 0);
    }

    #[test]
    fn test_store_outweighs_pits() {
        // Same seed count per side, but player 1 has banked more of them
        let state = GameState::from_layout(Player::One, [1, 1, 1, 1, 1, 1], 10, [3, 3, 3, 3, 2, 2], 0);
        let eval = evaluator();
        assert!(eval.evaluate(&state, Player::One, Player::Two) > 0);
        assert_eq!(
            eval.evaluate(&state, Player::One, Player::Two),
            -eval.evaluate(&state, Player::Two, Player::One)
        );
    }

    #[test]
    fn test_rating_truncates_per_side() {
        let state = GameState::from_layout(Player::One, [1, 0, 0, 0, 0, 0], 2, [0, 0, 0, 0, 0, 1], 0);
        // 183.14... - 16.85... after truncating each side separately
        assert_eq!(evaluator().evaluate(&state, Player::One, Player::Two), 167);
    }
}

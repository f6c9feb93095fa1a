// Local match runner
//
// Plays two agents against each other on one board, handing the turn to
// whichever player the rules say moves next. Stands in for the remote game
// server when evaluating the bot offline.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::GameState;
use crate::bot::{Bot, MoveDecision};
use crate::debug_logger::DebugLogger;
use crate::types::{DecisionSource, Outcome, Player, NO_MOVE};

/// Upper bound on moves in one match before it is declared broken
const MAX_MOVES_PER_MATCH: u32 = 10_000;

/// Anything that can pick a move for the player to move
pub trait Agent {
    fn name(&self) -> &str;

    /// Picks a pit for `state.next_player()`
    fn select_move(&mut self, state: &GameState) -> MoveDecision;
}

impl Agent for Bot {
    fn name(&self) -> &str {
        "bot"
    }

    fn select_move(&mut self, state: &GameState) -> MoveDecision {
        self.choose_move(state, state.next_player())
    }
}

/// Plays a uniformly random legal pit
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    /// Random agent; a seed makes its choices reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RandomAgent { rng }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn select_move(&mut self, state: &GameState) -> MoveDecision {
        let legal = state.legal_moves();
        let pit = if legal.is_empty() {
            NO_MOVE
        } else {
            legal[self.rng.random_range(0..legal.len())]
        };
        MoveDecision {
            pit,
            source: DecisionSource::Random,
            value: 0,
            depth: 0,
            elapsed_ms: 0,
        }
    }
}

/// Summary of a finished match
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: Outcome,
    pub final_state: GameState,
    pub moves: u32,
}

impl MatchResult {
    pub fn score(&self, player: Player) -> u32 {
        self.final_state.score(player)
    }
}

/// Plays `first` as player 1 and `second` as player 2 from `start` until the game ends
///
/// # Returns
/// * `Err` if an agent answers with an illegal pit or the match never terminates
pub fn play_match(
    first: &mut dyn Agent,
    second: &mut dyn Agent,
    start: GameState,
    logger: &mut DebugLogger,
) -> Result<MatchResult, String> {
    let mut state = start;
    let mut moves = 0;

    while !state.game_ended() {
        if moves >= MAX_MOVES_PER_MATCH {
            return Err(format!("Match exceeded {} moves", MAX_MOVES_PER_MATCH));
        }

        let player = state.next_player();
        let decision = match player {
            Player::One => first.select_move(&state),
            Player::Two => second.select_move(&state),
        };

        if !state.is_move_legal(decision.pit) {
            let name = match player {
                Player::One => first.name(),
                Player::Two => second.name(),
            };
            return Err(format!(
                "Agent '{}' (player {}) chose illegal pit {} in {}",
                name,
                player,
                decision.pit,
                state
            ));
        }

        debug!("Move {}: player {} plays {}", moves, player, decision.pit);
        logger.log_decision(moves, player, &state, &decision);
        state.apply_move(decision.pit);
        moves += 1;
    }

    let outcome = state
        .winner()
        .ok_or_else(|| "Finished game has no result".to_string())?;
    info!(
        "Match over after {} moves: {} ({} - {})",
        moves,
        outcome.as_str(),
        state.score(Player::One),
        state.score(Player::Two)
    );

    Ok(MatchResult {
        outcome,
        final_state: state,
        moves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAgent(u8);

    impl Agent for FixedAgent {
        fn name(&self) -> &str {
            "fixed"
        }

        fn select_move(&mut self, _state: &GameState) -> MoveDecision {
            MoveDecision {
                pit: self.0,
                source: DecisionSource::Random,
                value: 0,
                depth: 0,
                elapsed_ms: 0,
            }
        }
    }

    #[test]
    fn test_random_match_terminates_and_conserves_seeds() {
        let mut first = RandomAgent::new(Some(7));
        let mut second = RandomAgent::new(Some(11));
        let result = play_match(&mut first, &mut second, GameState::default(), &mut DebugLogger::disabled())
            .unwrap();
        assert!(result.final_state.game_ended());
        assert_eq!(result.score(Player::One) + result.score(Player::Two), 72);
        assert!(result.moves > 0);
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let mut first = FixedAgent(9);
        let mut second = RandomAgent::new(Some(1));
        let err = play_match(&mut first, &mut second, GameState::default(), &mut DebugLogger::disabled())
            .unwrap_err();
        assert!(err.contains("illegal pit 9"));
    }
}

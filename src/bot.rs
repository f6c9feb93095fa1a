// Kalaha decision engine
//
// The Bot owns the static configuration, the evaluator and the optional
// opening book. Every move request first consults the book and otherwise runs
// a fresh time-bounded iterative-deepening search.

use log::{error, info, warn};
use rand::Rng;
use std::time::Instant;

use crate::board::GameState;
use crate::book::OpeningBook;
use crate::config::Config;
use crate::evaluator::Evaluator;
use crate::search::SearchEngine;
use crate::types::{DecisionSource, Player, NO_MOVE};

/// A chosen move and how it was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDecision {
    /// Pit 1..=6, or NO_MOVE if the position had no legal move
    pub pit: u8,
    pub source: DecisionSource,
    pub value: i32,
    /// Deepest search iteration reached; 0 for book and random moves
    pub depth: u32,
    pub elapsed_ms: u128,
}

/// Kalaha Bot with OOP-style API
/// Takes static configuration dependencies and exposes the move decision entry points
pub struct Bot {
    config: Config,
    evaluator: Evaluator,
    engine: SearchEngine,
    book: Option<OpeningBook>,
}

impl Bot {
    /// Creates a new Bot, loading the opening book if the configuration enables it
    ///
    /// A missing or malformed book is logged and ignored; the bot then always searches.
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        let book = if config.opening_book.enabled {
            match OpeningBook::load(&config.opening_book.path) {
                Ok(book) => {
                    info!(
                        "Loaded opening book from {} ({} positions)",
                        config.opening_book.path,
                        book.len()
                    );
                    Some(book)
                }
                Err(e) => {
                    warn!("Could not read opening book, searching every move: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self::with_book(config, book)
    }

    /// Creates a Bot with an already loaded (or absent) opening book
    pub fn with_book(config: Config, book: Option<OpeningBook>) -> Self {
        let evaluator = Evaluator::new(&config.evaluation);
        let engine = SearchEngine::new(&config.timing, evaluator);
        Bot {
            config,
            evaluator,
            engine,
            book,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_book(&self) -> bool {
        self.book.is_some()
    }

    /// Chooses a move for `me` in `state`
    ///
    /// # Arguments
    /// * `state` - Current position, expected to have `me` to move
    /// * `me` - The player this bot plays as
    ///
    /// # Returns
    /// * `MoveDecision` - pit is NO_MOVE only for positions without a legal move
    pub fn choose_move(&self, state: &GameState, me: Player) -> MoveDecision {
        let start_time = Instant::now();

        if state.next_player() != me {
            warn!(
                "Asked to move as player {} but player {} is to move",
                me,
                state.next_player()
            );
        }

        if let Some(book) = &self.book {
            if let Some((pit, value)) = book.best_move(state, me, &self.evaluator) {
                info!("Opening book move {} (value: {})", pit, value);
                return MoveDecision {
                    pit,
                    source: DecisionSource::Book,
                    value,
                    depth: 0,
                    elapsed_ms: start_time.elapsed().as_millis(),
                };
            }
        }

        let outcome = self.engine.find_best_move(state, me);
        match outcome.best_move {
            Some(pit) => {
                info!(
                    "Chose {} (value: {}, depth: {}, nodes: {}, time: {}ms)",
                    pit, outcome.value, outcome.depth, outcome.nodes, outcome.elapsed_ms
                );
                MoveDecision {
                    pit,
                    source: DecisionSource::Search,
                    value: outcome.value,
                    depth: outcome.depth,
                    elapsed_ms: start_time.elapsed().as_millis(),
                }
            }
            None => {
                let pit = Self::random_legal_move(state).unwrap_or(NO_MOVE);
                if pit == NO_MOVE {
                    error!("No legal move in position {}", state);
                } else {
                    warn!("Search produced no move, playing random pit {}", pit);
                }
                MoveDecision {
                    pit,
                    source: DecisionSource::Random,
                    value: outcome.value,
                    depth: 0,
                    elapsed_ms: start_time.elapsed().as_millis(),
                }
            }
        }
    }

    /// Move index for the player to move in `state`; NO_MOVE if none exists
    pub fn find_best_move(&self, state: &GameState) -> u8 {
        self.choose_move(state, state.next_player()).pit
    }

    /// Uniformly random legal pit for the player to move
    pub fn random_legal_move(state: &GameState) -> Option<u8> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return None;
        }
        let idx = rand::rng().random_range(0..legal.len());
        Some(legal[idx])
    }
}

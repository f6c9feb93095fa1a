// Core Kalaha types shared by the rule engine, search and tooling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pits each player owns
pub const PITS_PER_PLAYER: usize = 6;

/// Move index returned when no legal move could be determined
pub const NO_MOVE: u8 = 0;

/// One of the two players. Player 1 moves first from the initial position.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Returns both players in seating order
    pub fn all() -> [Player; 2] {
        [Player::One, Player::Two]
    }

    /// Returns the other player
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Player number as used in the text encoding (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Parses a player number (1 or 2)
    pub fn from_number(n: u8) -> Option<Player> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Zero-based seat index, used to address per-player storage
    pub(crate) fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Final result of a finished game
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Player),
    Draw,
}

impl Outcome {
    /// Short label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Winner(Player::One) => "player 1 wins",
            Outcome::Winner(Player::Two) => "player 2 wins",
            Outcome::Draw => "draw",
        }
    }
}

/// Where a move decision came from
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Backward induction over the opening book subtree
    Book,
    /// Iterative-deepening alpha-beta search
    Search,
    /// Uniformly random legal pit
    Random,
}

impl DecisionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionSource::Book => "book",
            DecisionSource::Search => "search",
            DecisionSource::Random => "random",
        }
    }
}

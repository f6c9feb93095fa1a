// Kalaha position and rule engine
//
// The board is stored as fourteen cells walked counter-clockwise:
//   0..=5   player 1 pits 1..6
//   6       player 1 store
//   7..=12  player 2 pits 1..6
//   13      player 2 store
// Pit k of one player faces pit 7-k of the other, so the cell opposite
// index i is always 12 - i.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{Outcome, Player, PITS_PER_PLAYER};

const CELLS: usize = 2 * (PITS_PER_PLAYER + 1);
const ENCODED_FIELDS: usize = 1 + CELLS;

/// Seeds placed in every pit of the standard starting position
pub const DEFAULT_SEEDS_PER_PIT: u32 = 6;

/// A complete Kalaha position: every pit and store count plus the player to move
///
/// Two positions are equal exactly when their text encodings are equal.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    next_player: Player,
    cells: [u32; CELLS],
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(DEFAULT_SEEDS_PER_PIT)
    }
}

impl GameState {
    /// Creates the symmetric starting position with player 1 to move
    pub fn new(seeds_per_pit: u32) -> Self {
        let pits = [seeds_per_pit; PITS_PER_PLAYER];
        GameState::from_layout(Player::One, pits, 0, pits, 0)
    }

    /// Builds a position from explicit pit and store counts
    ///
    /// If either side has no seeds left in its pits the game is over and the
    /// remaining pit seeds are swept into their owners' stores immediately.
    pub fn from_layout(
        next_player: Player,
        pits_one: [u32; PITS_PER_PLAYER],
        store_one: u32,
        pits_two: [u32; PITS_PER_PLAYER],
        store_two: u32,
    ) -> Self {
        let mut cells = [0; CELLS];
        cells[..PITS_PER_PLAYER].copy_from_slice(&pits_one);
        cells[Self::store_index(Player::One)] = store_one;
        cells[PITS_PER_PLAYER + 1..CELLS - 1].copy_from_slice(&pits_two);
        cells[Self::store_index(Player::Two)] = store_two;

        let mut state = GameState { next_player, cells };
        state.sweep_if_finished();
        state
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    /// Seeds banked in the player's store
    pub fn score(&self, player: Player) -> u32 {
        self.cells[Self::store_index(player)]
    }

    /// Seeds in pit `pit` (1..=6) of `player`; 0 for an out-of-range pit
    pub fn seeds(&self, pit: u8, player: Player) -> u32 {
        Self::pit_offset(pit)
            .map(|offset| self.pits(player)[offset])
            .unwrap_or(0)
    }

    /// The player's six pits in order 1..=6
    pub fn pits(&self, player: Player) -> &[u32] {
        let start = player.index() * (PITS_PER_PLAYER + 1);
        &self.cells[start..start + PITS_PER_PLAYER]
    }

    /// Sum of the seeds still in the player's pits
    pub fn pit_total(&self, player: Player) -> u32 {
        self.pits(player).iter().sum()
    }

    /// Total seeds on the board, stores included. Constant under legal play.
    pub fn total_seeds(&self) -> u32 {
        self.cells.iter().sum()
    }

    /// True iff `pit` is in 1..=6 and the player to move has seeds there
    pub fn is_move_legal(&self, pit: u8) -> bool {
        self.seeds(pit, self.next_player) > 0
    }

    /// All legal pits for the player to move, in ascending order
    pub fn legal_moves(&self) -> Vec<u8> {
        (1..=PITS_PER_PLAYER as u8)
            .filter(|&pit| self.is_move_legal(pit))
            .collect()
    }

    /// Sows the seeds from `pit` for the player to move
    ///
    /// Returns false and leaves the position untouched if the move is illegal.
    pub fn apply_move(&mut self, pit: u8) -> bool {
        if !self.is_move_legal(pit) {
            return false;
        }

        let mover = self.next_player;
        let skipped = Self::store_index(mover.opponent());
        let own_store = Self::store_index(mover);

        let mut pos = Self::cell_index(mover, pit);
        let mut hand = std::mem::take(&mut self.cells[pos]);
        while hand > 0 {
            pos = (pos + 1) % CELLS;
            if pos == skipped {
                continue;
            }
            self.cells[pos] += 1;
            hand -= 1;
        }

        if pos != own_store {
            // A single seed means the pit was empty before the last seed landed
            if Self::owner(pos) == Some(mover) && self.cells[pos] == 1 {
                let opposite = CELLS - 2 - pos;
                let captured = self.cells[pos] + self.cells[opposite];
                self.cells[pos] = 0;
                self.cells[opposite] = 0;
                self.cells[own_store] += captured;
            }
            self.next_player = mover.opponent();
        }

        self.sweep_if_finished();
        true
    }

    /// True iff either player has no seeds left in their pits
    pub fn game_ended(&self) -> bool {
        Player::all().iter().any(|&p| self.pit_total(p) == 0)
    }

    /// Result of a finished game, or None while the game is still running
    pub fn winner(&self) -> Option<Outcome> {
        if !self.game_ended() {
            return None;
        }
        let one = self.score(Player::One);
        let two = self.score(Player::Two);
        Some(if one > two {
            Outcome::Winner(Player::One)
        } else if two > one {
            Outcome::Winner(Player::Two)
        } else {
            Outcome::Draw
        })
    }

    /// Moves every player's remaining pit seeds into their own store once the game is over
    fn sweep_if_finished(&mut self) {
        if !self.game_ended() {
            return;
        }
        for player in Player::all() {
            let start = player.index() * (PITS_PER_PLAYER + 1);
            let remaining: u32 = self.cells[start..start + PITS_PER_PLAYER].iter().sum();
            self.cells[start..start + PITS_PER_PLAYER].fill(0);
            self.cells[Self::store_index(player)] += remaining;
        }
    }

    fn pit_offset(pit: u8) -> Option<usize> {
        if (1..=PITS_PER_PLAYER as u8).contains(&pit) {
            Some(pit as usize - 1)
        } else {
            None
        }
    }

    fn cell_index(player: Player, pit: u8) -> usize {
        player.index() * (PITS_PER_PLAYER + 1) + (pit as usize - 1)
    }

    fn store_index(player: Player) -> usize {
        player.index() * (PITS_PER_PLAYER + 1) + PITS_PER_PLAYER
    }

    /// Owner of a pit cell; None for stores
    fn owner(cell: usize) -> Option<Player> {
        match cell {
            c if c < PITS_PER_PLAYER => Some(Player::One),
            c if c > PITS_PER_PLAYER && c < CELLS - 1 => Some(Player::Two),
            _ => None,
        }
    }
}

/// Text encoding: `next;p1..p6;store1;q1..q6;store2`
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.next_player.number())?;
        for count in &self.cells {
            write!(f, ";{}", count)?;
        }
        Ok(())
    }
}

impl FromStr for GameState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(';').collect();
        if fields.len() != ENCODED_FIELDS {
            return Err(format!(
                "Expected {} fields in board encoding, found {}",
                ENCODED_FIELDS,
                fields.len()
            ));
        }

        let player_number = fields[0]
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("Invalid player field '{}': {}", fields[0], e))?;
        let next_player = Player::from_number(player_number)
            .ok_or_else(|| format!("Player must be 1 or 2, got {}", player_number))?;

        let mut cells = [0u32; CELLS];
        for (i, field) in fields[1..].iter().enumerate() {
            cells[i] = field
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid seed count '{}' at field {}: {}", field, i + 1, e))?;
        }

        cells
            .iter()
            .try_fold(0u32, |total, &count| total.checked_add(count))
            .ok_or_else(|| "Seed total overflows".to_string())?;

        let mut pits_one = [0; PITS_PER_PLAYER];
        let mut pits_two = [0; PITS_PER_PLAYER];
        pits_one.copy_from_slice(&cells[..PITS_PER_PLAYER]);
        pits_two.copy_from_slice(&cells[PITS_PER_PLAYER + 1..CELLS - 1]);

        Ok(GameState::from_layout(
            next_player,
            pits_one,
            cells[PITS_PER_PLAYER],
            pits_two,
            cells[CELLS - 1],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position() {
        let state = GameState::default();
        assert_eq!(state.next_player(), Player::One);
        assert_eq!(state.total_seeds(), 72);
        assert_eq!(state.score(Player::One), 0);
        assert_eq!(state.score(Player::Two), 0);
        assert_eq!(state.legal_moves(), vec![1, 2, 3, 4, 5, 6]);
        assert!(!state.game_ended());
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_encoding_format() {
        let state = GameState::new(4);
        assert_eq!(state.to_string(), "1;4;4;4;4;4;4;0;4;4;4;4;4;4;0");
    }

    #[test]
    fn test_parse_round_trip() {
        let state = GameState::from_layout(Player::Two, [0, 1, 2, 3, 4, 5], 7, [5, 0, 0, 2, 1, 9], 11);
        let parsed: GameState = state.to_string().parse().unwrap();
        assert_eq!(parsed, state);
        assert_eq!(parsed.to_string(), state.to_string());
    }

    #[test]
    fn test_parse_errors() {
        assert!("1;2;3".parse::<GameState>().is_err());
        assert!("3;6;6;6;6;6;6;0;6;6;6;6;6;6;0".parse::<GameState>().is_err());
        assert!("1;6;x;6;6;6;6;0;6;6;6;6;6;6;0".parse::<GameState>().is_err());
        assert!("1;6;-1;6;6;6;6;0;6;6;6;6;6;6;0".parse::<GameState>().is_err());
    }

    #[test]
    fn test_parse_rejects_overflowing_seed_total() {
        let err = "1;4294967295;1;1;1;1;1;0;1;1;1;1;1;1;0"
            .parse::<GameState>()
            .unwrap_err();
        assert_eq!(err, "Seed total overflows");
        assert!("2;0;0;0;0;0;0;4294967295;0;0;0;0;0;0;1"
            .parse::<GameState>()
            .is_err());
        assert!("1;0;0;0;0;0;0;4294967294;0;0;0;0;0;0;1"
            .parse::<GameState>()
            .is_ok());
    }

    #[test]
    fn test_sowing_skips_opponent_store() {
        // 13 seeds from player 1 pit 1 lap the board once, skipping store 2
        let mut state = GameState::from_layout(Player::One, [13, 0, 0, 0, 0, 1], 0, [1, 1, 1, 1, 1, 1], 0);
        assert!(state.apply_move(1));
        assert_eq!(state.score(Player::Two), 0);
        assert_eq!(state.total_seeds(), 20);
    }

    #[test]
    fn test_illegal_move_is_noop() {
        let mut state = GameState::from_layout(Player::One, [0, 3, 0, 0, 0, 0], 0, [1, 0, 0, 0, 0, 0], 0);
        let before = state.clone();
        assert!(!state.apply_move(1));
        assert!(!state.apply_move(0));
        assert!(!state.apply_move(7));
        assert_eq!(state, before);
    }

    #[test]
    fn test_player_two_capture() {
        // Player 2 pit 1 has one seed, pit 2 is empty; opposite of pit 2 is player 1 pit 5
        let mut state = GameState::from_layout(Player::Two, [1, 1, 1, 1, 4, 1], 0, [1, 0, 2, 0, 0, 0], 0);
        assert!(state.apply_move(1));
        assert_eq!(state.score(Player::Two), 5);
        assert_eq!(state.seeds(2, Player::Two), 0);
        assert_eq!(state.seeds(5, Player::One), 0);
        assert_eq!(state.next_player(), Player::One);
    }
}

// Opening book: a precomputed game tree rooted at the initial position
//
// Nodes live in an arena and refer to their children by index. The file
// format is a pre-order walk with one encoded position per line and the
// literal `null` for every absent child, children written for pits 1..6.

use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::board::GameState;
use crate::evaluator::Evaluator;
use crate::search::{decided_value, Polarity};
use crate::types::{Player, PITS_PER_PLAYER};

/// Line written in place of a child that does not exist
pub const ABSENT_MARKER: &str = "null";

pub type NodeId = usize;

/// A book position and the positions reached by each pit (None if illegal or unexplored)
#[derive(Debug, Clone)]
pub struct BookNode {
    pub state: GameState,
    pub children: [Option<NodeId>; PITS_PER_PLAYER],
}

impl BookNode {
    fn new(state: GameState) -> Self {
        BookNode {
            state,
            children: [None; PITS_PER_PLAYER],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Arena-backed opening book tree. Node 0 is the root.
#[derive(Debug, Clone)]
pub struct OpeningBook {
    nodes: Vec<BookNode>,
}

impl OpeningBook {
    const ROOT: NodeId = 0;

    /// Expands every legal move from `root` down to `depth` plies
    pub fn build(root: GameState, depth: u32) -> Self {
        let mut nodes = vec![BookNode::new(root)];
        let mut pending: Vec<(NodeId, u32)> = vec![(Self::ROOT, depth)];

        while let Some((id, remaining)) = pending.pop() {
            if remaining == 0 {
                continue;
            }
            for pit in 1..=PITS_PER_PLAYER as u8 {
                let mut child = nodes[id].state.clone();
                if child.apply_move(pit) {
                    let child_id = nodes.len();
                    nodes.push(BookNode::new(child));
                    nodes[id].children[pit as usize - 1] = Some(child_id);
                    pending.push((child_id, remaining - 1));
                }
            }
        }

        OpeningBook { nodes }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &BookNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in pre-order: node, then the subtrees of pits 1..6
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev().flatten());
        }
        order
    }

    /// First node, in pre-order, whose position equals `target`
    pub fn find(&self, target: &GameState) -> Option<NodeId> {
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            if self.nodes[id].state == *target {
                return Some(id);
            }
            stack.extend(self.nodes[id].children.iter().rev().flatten());
        }
        None
    }

    /// Chooses a move for `me` by backward induction over the book subtree at `state`
    ///
    /// # Returns
    /// * `Some((pit, value))` - the chosen pit and its backed-up value
    /// * `None` - the position is not in the book or has no stored continuations
    pub fn best_move(
        &self,
        state: &GameState,
        me: Player,
        evaluator: &Evaluator,
    ) -> Option<(u8, i32)> {
        let node = self.node(self.find(state)?);
        if node.is_leaf() {
            return None;
        }

        let polarity = Polarity::for_state(&node.state, me);
        let mut best: Option<(u8, i32)> = None;
        for (slot, child) in node.children.iter().enumerate() {
            if let Some(child) = *child {
                let value = self.backed_up_value(child, me, evaluator);
                if best.map_or(true, |(_, b)| polarity.prefers(value, b)) {
                    best = Some((slot as u8 + 1, value));
                }
            }
        }

        best
    }

    /// Minimax value of a book node; decided positions score as sentinels and
    /// open leaves fall back to the evaluator
    fn backed_up_value(&self, id: NodeId, me: Player, evaluator: &Evaluator) -> i32 {
        let node = &self.nodes[id];
        if let Some(value) = decided_value(&node.state, me) {
            return value;
        }

        let polarity = Polarity::for_state(&node.state, me);
        node.children
            .iter()
            .flatten()
            .map(|&child| self.backed_up_value(child, me, evaluator))
            .fold(None, |best: Option<i32>, value| match best {
                Some(b) if !polarity.prefers(value, b) => Some(b),
                _ => Some(value),
            })
            .unwrap_or_else(|| evaluator.evaluate(&node.state, me, me.opponent()))
    }

    /// Writes the book in its pre-order text format
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), String> {
        let mut stack: Vec<Option<NodeId>> = vec![Some(Self::ROOT)];
        while let Some(entry) = stack.pop() {
            match entry {
                Some(id) => {
                    writeln!(writer, "{}", self.nodes[id].state)
                        .map_err(|e| format!("Failed to write opening book: {}", e))?;
                    stack.extend(self.nodes[id].children.iter().rev().copied());
                }
                None => writeln!(writer, "{}", ABSENT_MARKER)
                    .map_err(|e| format!("Failed to write opening book: {}", e))?,
            }
        }
        writer
            .flush()
            .map_err(|e| format!("Failed to flush opening book: {}", e))
    }

    /// Saves the book to a file, replacing any existing one
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let file = File::create(path.as_ref())
            .map_err(|e| format!("Failed to create opening book file: {}", e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        info!(
            "Wrote opening book with {} positions to {}",
            self.nodes.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Reads a book from its pre-order text format
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, String> {
        let mut lines = reader.lines().enumerate();
        let mut next_line = move || -> Result<Option<(usize, String)>, String> {
            match lines.next() {
                Some((n, Ok(line))) => Ok(Some((n + 1, line))),
                Some((n, Err(e))) => Err(format!("Failed to read line {}: {}", n + 1, e)),
                None => Ok(None),
            }
        };

        let (line_num, root_line) = next_line()?.ok_or("Opening book is empty")?;
        if root_line.trim() == ABSENT_MARKER {
            return Err("Opening book has no root position".to_string());
        }
        let root = Self::parse_line(line_num, &root_line)?;

        let mut nodes = vec![BookNode::new(root)];
        // (node, next child slot to fill)
        let mut stack: Vec<(NodeId, usize)> = vec![(Self::ROOT, 0)];

        while let Some(top) = stack.last_mut() {
            if top.1 == PITS_PER_PLAYER {
                stack.pop();
                continue;
            }
            let (parent, slot) = *top;
            top.1 += 1;

            let (line_num, line) = next_line()?
                .ok_or_else(|| "Opening book ended in the middle of a node".to_string())?;
            if line.trim() == ABSENT_MARKER {
                continue;
            }

            let child_id = nodes.len();
            nodes.push(BookNode::new(Self::parse_line(line_num, &line)?));
            nodes[parent].children[slot] = Some(child_id);
            stack.push((child_id, 0));
        }

        while let Some((line_num, line)) = next_line()? {
            if !line.trim().is_empty() {
                return Err(format!("Unexpected content after opening book at line {}", line_num));
            }
        }

        Ok(OpeningBook { nodes })
    }

    /// Loads a book from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file = File::open(path.as_ref())
            .map_err(|e| format!("Failed to open opening book: {}", e))?;
        Self::read_from(BufReader::new(file))
    }

    fn parse_line(line_num: usize, line: &str) -> Result<GameState, String> {
        line.parse::<GameState>()
            .map_err(|e| format!("Invalid position on line {}: {}", line_num, e))
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
    fn test_build_depth_one() {
        let book = OpeningBook::build(GameState::default(), 1);
        assert_eq!(book.len(), 7);
        let root = book.node(book.root());
        assert!(root.children.iter().all(Option::is_some));
        for id in root.children.iter().flatten() {
            assert!(book.node(*id).is_leaf());
        }
    }

    #[test]
    fn test_build_skips_illegal_moves() {
        let state = GameState::from_layout(Player::One, [0, 2, 0, 0, 0, 1], 0, [3, 3, 3, 3, 3, 3], 0);
        let book = OpeningBook::build(state, 1);
        let root = book.node(book.root());
        assert_eq!(root.children.iter().flatten().count(), 2);
        assert!(root.children[0].is_none());
        assert!(root.children[1].is_some());
        assert!(root.children[5].is_some());
    }

    #[test]
    fn test_read_rejects_truncated_book() {
        let text = "1;6;6;6;6;6;6;0;6;6;6;6;6;6;0\nnull\nnull\n";
        assert!(OpeningBook::read_from(text.as_bytes()).is_err());
    }

    #[test]
    fn test_read_rejects_garbage() {
        assert!(OpeningBook::read_from("".as_bytes()).is_err());
        assert!(OpeningBook::read_from("null\n".as_bytes()).is_err());
        assert!(OpeningBook::read_from("not a board\n".as_bytes()).is_err());
    }

    #[test]
    fn test_single_node_round_trip() {
        let text = "1;6;6;6;6;6;6;0;6;6;6;6;6;6;0\nnull\nnull\nnull\nnull\nnull\nnull\n";
        let book = OpeningBook::read_from(text.as_bytes()).unwrap();
        assert_eq!(book.len(), 1);
        let mut out = Vec::new();
        book.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), text);
    }

    #[test]
    fn test_best_move_finds_decisive_capture() {
        // Pit 4 captures the 9 seeds opposite pit 5, more than half the board
        let state = GameState::from_layout(Player::One, [0, 0, 0, 1, 0, 1], 0, [1, 9, 1, 1, 1, 1], 0);
        let book = OpeningBook::build(state.clone(), 2);
        assert_eq!(
            book.best_move(&state, Player::One, &evaluator()),
            Some((4, crate::search::WIN_SCORE))
        );
    }

    #[test]
    fn test_unknown_position_is_not_in_book() {
        let book = OpeningBook::build(GameState::default(), 2);
        let stranger = GameState::from_layout(Player::Two, [1, 1, 1, 1, 1, 1], 30, [5, 5, 5, 5, 5, 5], 0);
        assert_eq!(book.find(&stranger), None);
        assert_eq!(book.best_move(&stranger, Player::Two, &evaluator()), None);
    }

    #[test]
    fn test_leaf_position_defers_to_search() {
        let book = OpeningBook::build(GameState::default(), 1);
        let mut after = GameState::default();
        after.apply_move(1);
        assert!(book.find(&after).is_some());
        assert_eq!(book.best_move(&after, after.next_player(), &evaluator()), None);
    }
}

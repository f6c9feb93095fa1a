// Iterative-deepening minimax with alpha-beta pruning
//
// Values are always from the searching player's point of view. The side to
// move in a child is read from the child position itself, so extra turns keep
// the same polarity instead of alternating blindly.

use log::debug;
use std::cmp::Reverse;
use std::time::{Duration, Instant};

use crate::board::GameState;
use crate::config::TimingConfig;
use crate::evaluator::Evaluator;
use crate::types::{Outcome, Player};

/// Proven win for the searching player; greater than any heuristic value
pub const WIN_SCORE: i32 = i32::MAX;
/// Proven loss for the searching player; less than any heuristic value
pub const LOSS_SCORE: i32 = i32::MIN;

/// True once the result can no longer change: the game is over or one store
/// already holds more than half of all seeds
pub fn is_decided(state: &GameState) -> bool {
    state.game_ended() || Player::all().iter().any(|&p| holds_majority(state, p))
}

fn holds_majority(state: &GameState, player: Player) -> bool {
    u64::from(state.score(player)) * 2 > u64::from(state.total_seeds())
}

/// Sentinel value of a decided position for `me`, or None if still open
pub fn decided_value(state: &GameState, me: Player) -> Option<i32> {
    if !is_decided(state) {
        return None;
    }

    let winner = state.winner();
    if winner == Some(Outcome::Winner(me)) || holds_majority(state, me) {
        Some(WIN_SCORE)
    } else if winner == Some(Outcome::Winner(me.opponent()))
        || holds_majority(state, me.opponent())
    {
        Some(LOSS_SCORE)
    } else {
        Some(0)
    }
}

/// Maximizing or minimizing, expressed as one signed comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
    Maximizing,
    Minimizing,
}

impl Polarity {
    pub(crate) fn for_state(state: &GameState, me: Player) -> Self {
        if state.next_player() == me {
            Polarity::Maximizing
        } else {
            Polarity::Minimizing
        }
    }

    fn sign(self) -> i64 {
        match self {
            Polarity::Maximizing => 1,
            Polarity::Minimizing => -1,
        }
    }

    /// True if `a` is strictly better than `b` for this side
    pub(crate) fn prefers(self, a: i32, b: i32) -> bool {
        self.sign() * a as i64 > self.sign() * b as i64
    }

    /// Splits (alpha, beta) into (own bound, opposing bound)
    fn split(self, alpha: i32, beta: i32) -> (i32, i32) {
        match self {
            Polarity::Maximizing => (alpha, beta),
            Polarity::Minimizing => (beta, alpha),
        }
    }

    /// Inverse of `split`
    fn window(self, own: i32, other: i32) -> (i32, i32) {
        match self {
            Polarity::Maximizing => (own, other),
            Polarity::Minimizing => (other, own),
        }
    }
}

/// A legal move paired with the position it produces and its static value
#[derive(Debug, Clone)]
struct Candidate {
    pit: u8,
    state: GameState,
    score: i32,
}

/// Node and cutoff counters for one search call
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

/// Per-call search state: who is searching, the clock, and counters
///
/// Created fresh for every decision so repeated searches never share timing state.
pub struct SearchContext {
    evaluator: Evaluator,
    me: Player,
    started: Instant,
    budget: Option<Duration>,
    stats: SearchStats,
}

impl SearchContext {
    /// Context whose clock starts now and expires after `budget`
    pub fn new(evaluator: Evaluator, me: Player, budget: Duration) -> Self {
        SearchContext {
            evaluator,
            me,
            started: Instant::now(),
            budget: Some(budget),
            stats: SearchStats::default(),
        }
    }

    /// Context without a deadline, for fixed-depth analysis
    pub fn unbounded(evaluator: Evaluator, me: Player) -> Self {
        SearchContext {
            evaluator,
            me,
            started: Instant::now(),
            budget: None,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn time_exhausted(&self) -> bool {
        match self.budget {
            Some(budget) => self.started.elapsed() >= budget,
            None => false,
        }
    }

    fn evaluate(&self, state: &GameState) -> i32 {
        self.evaluator.evaluate(state, self.me, self.me.opponent())
    }

    /// Full-window alpha-beta search from the root
    ///
    /// # Returns
    /// * `(value, move)` - backed-up value and the root move that produced it;
    ///   the move is None when no root move improved on the initial bound
    pub fn search_root(&mut self, state: &GameState, depth: u32) -> (i32, Option<u8>) {
        self.expand(state, depth, LOSS_SCORE, WIN_SCORE)
    }

    /// Alpha-beta value of `state` searched to `depth` plies within (alpha, beta)
    pub fn alpha_beta(&mut self, state: &GameState, depth: u32, alpha: i32, beta: i32) -> i32 {
        self.expand(state, depth, alpha, beta).0
    }

    fn expand(&mut self, state: &GameState, depth: u32, alpha: i32, beta: i32) -> (i32, Option<u8>) {
        self.stats.nodes += 1;

        if let Some(value) = decided_value(state, self.me) {
            return (value, None);
        }
        if depth == 0 {
            return (self.evaluate(state), None);
        }

        let polarity = Polarity::for_state(state, self.me);

        // Out of time: trust the heuristic for our own nodes, assume the worst for the opponent's
        if self.time_exhausted() {
            let value = match polarity {
                Polarity::Maximizing => self.evaluate(state),
                Polarity::Minimizing => LOSS_SCORE,
            };
            return (value, None);
        }

        let (mut own, other) = polarity.split(alpha, beta);
        let mut best_move = None;

        for candidate in self.ordered_candidates(state, polarity) {
            let (child_alpha, child_beta) = polarity.window(own, other);
            let (value, _) = self.expand(&candidate.state, depth - 1, child_alpha, child_beta);

            if polarity.prefers(value, own) {
                own = value;
                best_move = Some(candidate.pit);
            }
            if !polarity.prefers(other, own) {
                self.stats.cutoffs += 1;
                break;
            }
        }

        (own, best_move)
    }

    /// Expands every legal move into its own copy and orders the children by
    /// static value, best first for the side to move
    fn ordered_candidates(&self, state: &GameState, polarity: Polarity) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = state
            .legal_moves()
            .into_iter()
            .map(|pit| {
                let mut child = state.clone();
                let applied = child.apply_move(pit);
                debug_assert!(applied, "legal_moves produced an illegal pit {}", pit);
                let score = self.evaluate(&child);
                Candidate {
                    pit,
                    state: child,
                    score,
                }
            })
            .collect();

        candidates.sort_by_key(|c| Reverse(polarity.sign() * c.score as i64));
        candidates
    }

    /// Plain minimax without pruning or ordering
    ///
    /// Same leaf and cutoff semantics as `alpha_beta`; used as a reference when
    /// checking that pruning never changes the root value.
    pub fn full_minimax(&mut self, state: &GameState, depth: u32) -> i32 {
        self.stats.nodes += 1;

        if let Some(value) = decided_value(state, self.me) {
            return value;
        }
        if depth == 0 {
            return self.evaluate(state);
        }

        let polarity = Polarity::for_state(state, self.me);
        if self.time_exhausted() {
            return match polarity {
                Polarity::Maximizing => self.evaluate(state),
                Polarity::Minimizing => LOSS_SCORE,
            };
        }

        let mut best: Option<i32> = None;
        for pit in state.legal_moves() {
            let mut child = state.clone();
            child.apply_move(pit);
            let value = self.full_minimax(&child, depth - 1);
            best = match best {
                Some(b) if !polarity.prefers(value, b) => Some(b),
                _ => Some(value),
            };
        }

        best.unwrap_or_else(|| self.evaluate(state))
    }
}

/// Whether a finished depth replaces the accepted result
///
/// A level that completed after the deadline may rest on truncated branches,
/// so it only replaces the accepted value if it is strictly better.
fn accept_level(best_value: i32, level_value: i32, deadline_passed: bool) -> bool {
    level_value > best_value || !deadline_passed
}

/// Result of one iterative-deepening run
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Chosen pit, None only if the position had no legal move
    pub best_move: Option<u8>,
    pub value: i32,
    /// Deepest iteration that ran to completion or cutoff
    pub depth: u32,
    pub nodes: u64,
    pub elapsed_ms: u128,
}

/// Time-bounded iterative-deepening driver
#[derive(Debug, Clone)]
pub struct SearchEngine {
    evaluator: Evaluator,
    budget: Duration,
    initial_depth: u32,
    max_depth: u32,
}

impl SearchEngine {
    pub fn new(timing: &TimingConfig, evaluator: Evaluator) -> Self {
        SearchEngine {
            evaluator,
            budget: Duration::from_millis(timing.move_time_budget_ms),
            initial_depth: timing.initial_depth.max(1),
            max_depth: timing.max_search_depth.max(1),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Searches deeper and deeper until the budget runs out or the result is proven
    ///
    /// # Arguments
    /// * `state` - Position to move from
    /// * `me` - The player whose move is being chosen
    pub fn find_best_move(&self, state: &GameState, me: Player) -> SearchOutcome {
        let mut ctx = SearchContext::new(self.evaluator, me, self.budget);

        let mut best_move = state.legal_moves().first().copied();
        let mut best_value = LOSS_SCORE;
        let mut depth = self.initial_depth - 1;

        if best_move.is_none() {
            return SearchOutcome {
                best_move: None,
                value: LOSS_SCORE,
                depth: 0,
                nodes: 0,
                elapsed_ms: ctx.elapsed().as_millis(),
            };
        }

        while !ctx.time_exhausted() && depth < self.max_depth {
            depth += 1;

            let (level_value, level_move) = ctx.search_root(state, depth);

            if accept_level(best_value, level_value, ctx.time_exhausted()) {
                if let Some(pit) = level_move {
                    best_move = Some(pit);
                }
                best_value = level_value;
            }

            debug!(
                "Depth {}: value {}, move {:?}, nodes {}, {}ms",
                depth,
                level_value,
                level_move,
                ctx.stats().nodes,
                ctx.elapsed().as_millis()
            );

            if level_value == WIN_SCORE || level_value == LOSS_SCORE {
                break;
            }
        }

        SearchOutcome {
            best_move,
            value: best_value,
            depth,
            nodes: ctx.stats().nodes,
            elapsed_ms: ctx.elapsed().as_millis(),
        }
    }
}

// Decision log replay
//
// Reads the JSONL log written during matches, asks the bot again for every
// logged position and reports where today's pick differs from the logged one.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::board::GameState;
use crate::bot::Bot;
use crate::config::Config;
use crate::types::{DecisionSource, Player};

/// Represents a single log entry from the decision JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub turn: u32,
    pub player: Player,
    /// Position in the board text encoding
    pub state: String,
    pub chosen_move: u8,
    pub source: DecisionSource,
    pub value: i32,
    pub depth: u32,
    pub timestamp: String,
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: u32,
    pub original_move: u8,
    pub replayed_move: u8,
    pub matches: bool,
    pub original_value: i32,
    pub replayed_value: i32,
    pub replayed_source: DecisionSource,
    pub search_depth: u32,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    bot: Bot,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            bot: Bot::new(config),
            verbose,
        }
    }

    /// Creates a replay engine around an existing bot
    pub fn with_bot(bot: Bot, verbose: bool) -> Self {
        ReplayEngine { bot, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let state: GameState = entry
            .state
            .parse()
            .map_err(|e| format!("Turn {}: {}", entry.turn, e))?;

        let decision = self.bot.choose_move(&state, entry.player);
        let matches = decision.pit == entry.chosen_move;

        let result = ReplayResult {
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed_move: decision.pit,
            matches,
            original_value: entry.value,
            replayed_value: decision.value,
            replayed_source: decision.source,
            search_depth: decision.depth,
            computation_time_ms: decision.elapsed_ms,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({}, value: {}, depth: {}, time: {}ms)",
                    entry.turn,
                    decision.pit,
                    decision.source.as_str(),
                    decision.value,
                    decision.depth,
                    decision.elapsed_ms
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} ({}, value: {}, depth: {}, time: {}ms)",
                    entry.turn,
                    entry.chosen_move,
                    decision.pit,
                    decision.source.as_str(),
                    decision.value,
                    decision.depth,
                    decision.elapsed_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints the replay summary followed by one row per disagreeing turn
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);
        let count = results.len().max(1) as f64;
        let mean_depth = results.iter().map(|r| r.search_depth as f64).sum::<f64>() / count;
        let mean_time = results
            .iter()
            .map(|r| r.computation_time_ms as f64)
            .sum::<f64>()
            / count;
        let book_moves = results
            .iter()
            .filter(|r| r.replayed_source == DecisionSource::Book)
            .count();

        println!();
        println!("Replay summary");
        println!("  turns replayed   {}", stats.total_turns);
        println!("  same pit         {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("  different pit    {}", stats.mismatches);
        println!("  book moves       {}", book_moves);
        println!("  mean depth       {:.1}", mean_depth);
        println!("  mean time        {:.1}ms", mean_time);

        if stats.mismatches == 0 {
            return;
        }

        println!();
        println!("{:>5}  {:>6}  {:>8}  {:>24}  {:>5}", "turn", "logged", "replayed", "value logged -> now", "depth");
        for result in results.iter().filter(|r| !r.matches) {
            println!(
                "{:>5}  {:>6}  {:>8}  {:>24}  {:>5}",
                result.turn,
                result.original_move,
                result.replayed_move,
                format!("{} -> {}", result.original_value, result.replayed_value),
                result.search_depth
            );
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u32, Vec<u8>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn, acceptable, entry.chosen_move
                ));
            }
        }

        Ok(())
    }

    /// Parses a pit number as written on the command line or in a log
    pub fn parse_pit(s: &str) -> Result<u8, String> {
        match s.trim().parse::<u8>() {
            Ok(pit) if (1..=6).contains(&pit) => Ok(pit),
            _ => Err(format!("Invalid pit: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(turn: u32, chosen_move: u8) -> LogEntry {
        LogEntry {
            turn,
            player: Player::One,
            state: GameState::default().to_string(),
            chosen_move,
            source: DecisionSource::Search,
            value: 0,
            depth: 3,
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn engine() -> ReplayEngine {
        let mut config = Config::default_hardcoded();
        config.timing.move_time_budget_ms = 20;
        ReplayEngine::with_bot(Bot::with_book(config, None), false)
    }

    #[test]
    fn test_parse_pit() {
        assert_eq!(ReplayEngine::parse_pit("1").unwrap(), 1);
        assert_eq!(ReplayEngine::parse_pit(" 6 ").unwrap(), 6);
        assert!(ReplayEngine::parse_pit("0").is_err());
        assert!(ReplayEngine::parse_pit("7").is_err());
        assert!(ReplayEngine::parse_pit("up").is_err());
    }

    #[test]
    fn test_validate_expected_moves() {
        let engine = engine();
        let entries = vec![entry(0, 3), entry(1, 5)];
        assert!(engine
            .validate_expected_moves(&entries, &[(0, vec![3]), (1, vec![4, 5])])
            .is_ok());
        assert!(engine
            .validate_expected_moves(&entries, &[(1, vec![1])])
            .is_err());
        assert!(engine
            .validate_expected_moves(&entries, &[(9, vec![1])])
            .is_err());
    }

    #[test]
    fn test_generate_stats() {
        let engine = engine();
        let results = engine.replay_all(&[entry(0, 1)]);
        let stats = engine.generate_stats(&results);
        assert_eq!(stats.total_turns, 1);
        assert_eq!(stats.matches + stats.mismatches, 1);
    }

    #[test]
    fn test_log_entry_json_shape() {
        let json = serde_json::to_string(&entry(4, 2)).unwrap();
        assert!(json.contains("\"source\":\"search\""));
        assert!(json.contains("\"player\":\"One\""));
        let parsed: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.chosen_move, 2);
    }
}

// Debug logging module for per-move decision logging
//
// Each decision made during a match is appended to a JSONL file so games can
// be replayed and analysed afterwards with the replay tool.

use log::{error, info};
use std::fs::{File, OpenOptions};
use std::io::Write;

use crate::board::GameState;
use crate::bot::MoveDecision;
use crate::replay::LogEntry;
use crate::types::Player;

/// Writes one JSON line per decision when enabled, otherwise does nothing
pub struct DebugLogger {
    file: Option<File>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                info!("Debug logging enabled: {}", log_file_path);
                DebugLogger { file: Some(file) }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Appends the decision taken in `state` by `player`
    pub fn log_decision(&mut self, turn: u32, player: Player, state: &GameState, decision: &MoveDecision) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let entry = LogEntry {
            turn,
            player,
            state: state.to_string(),
            chosen_move: decision.pit,
            source: decision.source,
            value: decision.value,
            depth: decision.depth,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        match serde_json::to_string(&entry) {
            Ok(json_line) => {
                if let Err(e) = writeln!(file, "{}", json_line) {
                    error!("Failed to write debug log entry: {}", e);
                } else if let Err(e) = file.flush() {
                    error!("Failed to flush debug log: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
            }
        }
    }
}

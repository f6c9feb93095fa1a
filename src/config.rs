// Configuration module for reading Kalaha.toml
// This module provides OOP-style configuration management for the Kalaha agent

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub evaluation: EvaluationConfig,
    pub rules: RulesConfig,
    pub opening_book: OpeningBookConfig,
    pub debug: DebugConfig,
}

/// Search time management
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Wall-clock budget for one move decision
    pub move_time_budget_ms: u64,
    pub initial_depth: u32,
    /// Safety cap for iterative deepening in tiny endgames
    pub max_search_depth: u32,
}

/// Evaluator coefficients (derived offline with a genetic algorithm)
#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    pub store_weight: f64,
    pub pit_weight: f64,
}

/// Game setup constants
#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    pub seeds_per_pit: u32,
}

/// Opening book location and generation depth
#[derive(Debug, Deserialize, Clone)]
pub struct OpeningBookConfig {
    pub enabled: bool,
    pub path: String,
    pub build_depth: u32,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Kalaha.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Kalaha.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Kalaha.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Kalaha.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                move_time_budget_ms: 5000,
                initial_depth: 1,
                max_search_depth: 64,
            },
            evaluation: EvaluationConfig {
                store_weight: 83.1429105,
                pit_weight: 16.8570895,
            },
            rules: RulesConfig { seeds_per_pit: 6 },
            opening_book: OpeningBookConfig {
                enabled: true,
                path: "openBook.txt".to_string(),
                build_depth: 5,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "kalaha_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Kalaha.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Loads from an explicit path when given, otherwise behaves like `load_or_default`
    pub fn load_from_option(path: Option<&str>) -> Result<Self, String> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::load_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.initial_depth, 1);
        assert_eq!(config.rules.seeds_per_pit, 6);
        assert!(config.evaluation.store_weight > config.evaluation.pit_weight);
    }

    #[test]
    fn test_kalaha_toml_can_be_parsed() {
        // This test ensures Kalaha.toml is valid and can be parsed
        let result = Config::from_file("Kalaha.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Kalaha.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Kalaha.toml").expect("Kalaha.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        // Timing
        assert_eq!(
            file_config.timing.move_time_budget_ms,
            hardcoded_config.timing.move_time_budget_ms
        );
        assert_eq!(
            file_config.timing.initial_depth,
            hardcoded_config.timing.initial_depth
        );
        assert_eq!(
            file_config.timing.max_search_depth,
            hardcoded_config.timing.max_search_depth
        );

        // Evaluation
        assert_eq!(
            file_config.evaluation.store_weight,
            hardcoded_config.evaluation.store_weight
        );
        assert_eq!(
            file_config.evaluation.pit_weight,
            hardcoded_config.evaluation.pit_weight
        );

        // Rules
        assert_eq!(
            file_config.rules.seeds_per_pit,
            hardcoded_config.rules.seeds_per_pit
        );

        // Opening book
        assert_eq!(file_config.opening_book.enabled, hardcoded_config.opening_book.enabled);
        assert_eq!(file_config.opening_book.path, hardcoded_config.opening_book.path);
        assert_eq!(
            file_config.opening_book.build_depth,
            hardcoded_config.opening_book.build_depth
        );

        // Debug
        assert!(!file_config.debug.log_file_path.is_empty());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}

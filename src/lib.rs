// Library exports for the Kalaha agent
// This allows the stdin front end, the book builder and the replay tools to share the core logic

pub mod board;
pub mod book;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod evaluator;
pub mod game;
pub mod replay;
pub mod search;
pub mod types;

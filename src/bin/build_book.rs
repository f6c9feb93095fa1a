//! Offline opening book generator
//!
//! Expands every legal move from the initial position to a fixed number of
//! plies and writes the tree in the book text format.
//!
//! Usage: build_book [--depth <plies>] [--output <path>] [--config <path>]

use std::env;
use std::process;
use std::time::Instant;

use kalaha_agent::board::GameState;
use kalaha_agent::book::OpeningBook;
use kalaha_agent::config::Config;

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;
    let mut depth: Option<u32> = None;
    let mut output: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match (args[i].as_str(), value) {
            ("--depth", Some(v)) => {
                depth = Some(v.parse().unwrap_or_else(|e| {
                    eprintln!("Error: invalid depth '{}': {}", v, e);
                    process::exit(1);
                }));
            }
            ("--output", Some(v)) => output = Some(v),
            ("--config", Some(v)) => config_path = Some(v),
            (flag, _) => {
                eprintln!("Usage: {} [--depth <plies>] [--output <path>] [--config <path>]", args[0]);
                if flag != "--help" {
                    process::exit(1);
                }
                return;
            }
        }
        i += 2;
    }

    let config = match Config::load_from_option(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let depth = depth.unwrap_or(config.opening_book.build_depth);
    let output = output.unwrap_or_else(|| config.opening_book.path.clone());

    println!("Building opening book to depth {}...", depth);
    let start = Instant::now();
    let book = OpeningBook::build(GameState::new(config.rules.seeds_per_pit), depth);
    println!(
        "Generated {} positions in {}ms",
        book.len(),
        start.elapsed().as_millis()
    );

    if let Err(e) = book.save(&output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    println!("Opening book written to {}", output);
}

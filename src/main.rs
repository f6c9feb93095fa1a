// Kalaha agent front end
//
// Reads one encoded position per line on stdin and answers with the chosen
// pit on stdout. The transport that produces those lines (the game server
// protocol) lives outside this program.
//
// Usage:
//   kalaha-agent [--config <path>]

use log::{error, info};
use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use kalaha_agent::board::GameState;
use kalaha_agent::bot::Bot;
use kalaha_agent::config::Config;
use kalaha_agent::types::NO_MOVE;

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) => match args.get(i + 1) {
            Some(path) => Some(path.as_str()),
            None => {
                eprintln!("Error: --config requires a path");
                process::exit(1);
            }
        },
        None => None,
    };

    let config = match Config::load_from_option(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Kalaha agent...");
    let bot = Bot::new(config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let pit = match line.parse::<GameState>() {
            Ok(state) => bot.find_best_move(&state),
            Err(e) => {
                error!("Ignoring malformed position '{}': {}", line.trim(), e);
                NO_MOVE
            }
        };

        if writeln!(out, "{}", pit).and_then(|_| out.flush()).is_err() {
            break;
        }
    }
}

//! Self-play tool for measuring the bot against a reference opponent
//!
//! Plays a series of games, alternating seats, and reports win/draw/loss
//! counts and average scores. With --log the bot's decisions are written to a
//! JSONL file that the replay tool can read.
//!
//! Usage: self_play [--games N] [--opponent random|bot] [--budget-ms MS] [--seed S] [--log PATH] [--config PATH]

use std::env;
use std::process;

use kalaha_agent::board::GameState;
use kalaha_agent::bot::Bot;
use kalaha_agent::config::Config;
use kalaha_agent::debug_logger::DebugLogger;
use kalaha_agent::game::{play_match, Agent, RandomAgent};
use kalaha_agent::types::{Outcome, Player};

#[derive(Default)]
struct Tally {
    wins: u32,
    draws: u32,
    losses: u32,
    points_for: u32,
    points_against: u32,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} [--games N] [--opponent random|bot] [--budget-ms MS] [--seed S] [--log PATH] [--config PATH]",
        program
    );
    process::exit(1);
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut games: u32 = 10;
    let mut opponent = "random".to_string();
    let mut budget_ms: Option<u64> = None;
    let mut seed: Option<u64> = None;
    let mut log_path: Option<String> = None;
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let Some(value) = args.get(i + 1).cloned() else {
            usage(&args[0]);
        };
        match args[i].as_str() {
            "--games" => games = value.parse().unwrap_or_else(|_| usage(&args[0])),
            "--opponent" => opponent = value,
            "--budget-ms" => budget_ms = Some(value.parse().unwrap_or_else(|_| usage(&args[0]))),
            "--seed" => seed = Some(value.parse().unwrap_or_else(|_| usage(&args[0]))),
            "--log" => log_path = Some(value),
            "--config" => config_path = Some(value),
            _ => usage(&args[0]),
        }
        i += 2;
    }

    let mut config = match Config::load_from_option(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Some(ms) = budget_ms {
        config.timing.move_time_budget_ms = ms;
    }

    let mut logger = match &log_path {
        Some(path) => DebugLogger::new(true, path),
        None => DebugLogger::new(config.debug.enabled, &config.debug.log_file_path),
    };

    let mut bot = Bot::new(config.clone());
    let mut opponent_agent: Box<dyn Agent> = match opponent.as_str() {
        "random" => Box::new(RandomAgent::new(seed)),
        "bot" => Box::new(Bot::new(config.clone())),
        _ => usage(&args[0]),
    };

    println!("\n═══════════════════════════════════════════════════════════");
    println!("                    KALAHA SELF-PLAY");
    println!("═══════════════════════════════════════════════════════════");
    println!("Games:        {}", games);
    println!("Opponent:     {}", opponent_agent.name());
    println!("Budget:       {}ms per move", config.timing.move_time_budget_ms);
    println!("Opening Book: {}", if bot.has_book() { "loaded" } else { "none" });
    println!("═══════════════════════════════════════════════════════════\n");

    let mut tally = Tally::default();

    for game in 0..games {
        // Alternate seats so neither side always moves first
        let bot_seat = if game % 2 == 0 { Player::One } else { Player::Two };
        let start = GameState::new(config.rules.seeds_per_pit);

        let result = match bot_seat {
            Player::One => play_match(&mut bot, opponent_agent.as_mut(), start, &mut logger),
            Player::Two => play_match(opponent_agent.as_mut(), &mut bot, start, &mut logger),
        };

        let result = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Game {} aborted: {}", game + 1, e);
                process::exit(1);
            }
        };

        let ours = result.score(bot_seat);
        let theirs = result.score(bot_seat.opponent());
        tally.points_for += ours;
        tally.points_against += theirs;
        let verdict = match result.outcome {
            Outcome::Winner(p) if p == bot_seat => {
                tally.wins += 1;
                "WIN"
            }
            Outcome::Winner(_) => {
                tally.losses += 1;
                "LOSS"
            }
            Outcome::Draw => {
                tally.draws += 1;
                "DRAW"
            }
        };

        println!(
            "Game {:>3}: bot as player {} - {:<4} {:>2} : {:<2} ({} moves)",
            game + 1,
            bot_seat,
            verdict,
            ours,
            theirs,
            result.moves
        );
    }

    if games > 0 {
        println!("\n═══════════════════════════════════════════════════════════");
        println!("Wins:           {}", tally.wins);
        println!("Draws:          {}", tally.draws);
        println!("Losses:         {}", tally.losses);
        println!(
            "Average Score:  {:.1} : {:.1}",
            tally.points_for as f64 / games as f64,
            tally.points_against as f64 / games as f64
        );
        println!("═══════════════════════════════════════════════════════════\n");
    }
}

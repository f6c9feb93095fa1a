//! Re-runs the Kalaha bot over a JSONL decision log and compares its picks
//! with the logged ones.
//!
//! Usage: replay <log_file> (--all | --turns T,.. | --validate T:P,..) [options]

use std::env;
use std::process;

use kalaha_agent::config::Config;
use kalaha_agent::replay::{LogEntry, ReplayEngine};

const USAGE: &str = "\
Kalaha Replay Tool: re-run the bot over a decision log

USAGE:
  replay <log_file> <mode> [OPTIONS]

MODES:
  --all                   every logged turn
  --turns <T1,T2,..>      only the listed turns
  --validate <T:P,..>     check logged pits against expected ones,
                          alternatives separated by '|'

OPTIONS:
  --config <path>         settings file (default: Kalaha.toml)
  --budget-ms <ms>        search budget per replayed move
  --no-book               search every move, ignoring the opening book
  --verbose               log each replayed turn
  --help                  print this text

EXAMPLES:
  replay kalaha_debug.jsonl --all --no-book
  replay kalaha_debug.jsonl --turns 5,10,15 --budget-ms 500
  replay kalaha_debug.jsonl --validate 0:3,4:2|6";

enum Mode {
    All,
    Turns(Vec<u32>),
    Validate(Vec<(u32, Vec<u8>)>),
}

struct Options {
    log_file: String,
    mode: Mode,
    config_path: String,
    budget_ms: Option<u64>,
    use_book: bool,
    verbose: bool,
}

fn parse_turns(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

/// `turn:pit[|pit..]` pairs separated by commas
fn parse_expected_moves(s: &str) -> Result<Vec<(u32, Vec<u8>)>, String> {
    s.split(',')
        .map(|pair| {
            let (turn, pits) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn:pit'", pair))?;
            let turn = turn
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;
            let pits = pits
                .split('|')
                .map(ReplayEngine::parse_pit)
                .collect::<Result<Vec<u8>, String>>()?;
            Ok((turn, pits))
        })
        .collect()
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let log_file = args.first().ok_or("Missing log file")?.clone();
    let mut mode = None;
    let mut config_path = "Kalaha.toml".to_string();
    let mut budget_ms = None;
    let mut use_book = true;
    let mut verbose = false;

    let mut rest = args[1..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{} requires an argument", flag))
        };
        match flag.as_str() {
            "--all" => mode = Some(Mode::All),
            "--turns" => mode = Some(Mode::Turns(parse_turns(&value()?)?)),
            "--validate" => mode = Some(Mode::Validate(parse_expected_moves(&value()?)?)),
            "--config" => config_path = value()?,
            "--budget-ms" => {
                let v = value()?;
                budget_ms = Some(
                    v.parse::<u64>()
                        .map_err(|e| format!("invalid budget '{}': {}", v, e))?,
                );
            }
            "--no-book" => use_book = false,
            "--verbose" => verbose = true,
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }

    let mode = mode.ok_or("Must specify --all, --turns, or --validate")?;
    Ok(Options {
        log_file,
        mode,
        config_path,
        budget_ms,
        use_book,
        verbose,
    })
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help") {
        eprintln!("{}", USAGE);
        return;
    }
    if args.is_empty() {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    let options = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}\n", e);
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let mut config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        eprintln!("Warning: {}; using built-in settings", e);
        Config::default_hardcoded()
    });
    if let Some(ms) = options.budget_ms {
        config.timing.move_time_budget_ms = ms;
    }
    config.opening_book.enabled &= options.use_book;

    let engine = ReplayEngine::new(config, options.verbose);
    let entries: Vec<LogEntry> = engine
        .load_log_file(&options.log_file)
        .unwrap_or_else(|e| fail(&format!("Error loading log file: {}", e)));
    if entries.is_empty() {
        fail("Log file is empty");
    }
    println!("Loaded {} log entries from {}", entries.len(), options.log_file);

    match options.mode {
        Mode::All => {
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Turns(turns) => {
            println!("Replaying {} specific turn(s)", turns.len());
            let results = engine
                .replay_turns(&entries, &turns)
                .unwrap_or_else(|e| fail(&e));
            engine.print_report(&results);
        }
        Mode::Validate(expected) => {
            match engine.validate_expected_moves(&entries, &expected) {
                Ok(()) => println!("All expected moves validated successfully ({} checked)", expected.len()),
                Err(e) => fail(&format!("Validation failed: {}", e)),
            }
        }
    }
}

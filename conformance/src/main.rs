mod args;

use args::{Args, Scenario};
use clap::Parser;
use conformance::{scenario, ChessPosition, ChessRules, GameResult, RandomSuite};
use log::{info, log, Level, LevelFilter};
use simplelog::{Config, SimpleLogger, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::process::ExitCode;
use uci::SearchLimit;

fn main() -> ExitCode {
    let args = match init() {
        Ok(args) => args,
        Err(e) => {
            println!("ERROR: {}", e);
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            verdict(&args, Level::Error, &format!("ERROR: {}", e));
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<bool, Box<dyn Error>> {
    let rules = ChessRules;

    let results = match &args.scenario {
        Scenario::FullGame {
            engine,
            reference,
            reference_args,
            fen,
            max_plies,
            game,
        } => vec![scenario::full_game(
            &rules,
            engine.engine_config(),
            engine.config(reference, reference_args),
            fen.as_deref(),
            game.driver_config(*max_plies),
        )?],
        Scenario::IllegalMove { engine, fen, depth } => vec![scenario::illegal_move_check(
            &rules,
            engine.engine_config(),
            fen.as_deref(),
            SearchLimit::depth(*depth),
        )?],
        Scenario::RandomPositions {
            engine,
            count,
            seed,
            walk_plies,
            plies,
            game,
        } => {
            let suite = RandomSuite {
                count: *count,
                seed: *seed,
                walk_plies: *walk_plies,
            };
            scenario::random_positions(
                &rules,
                engine.engine_config(),
                &suite,
                game.driver_config(*plies),
            )?
        }
    };

    Ok(report(args, &results))
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    match &args.log_file {
        Some(log_file) => WriteLogger::init(level, Config::default(), File::create(log_file)?)?,
        None => SimpleLogger::init(level, Config::default())?,
    }

    Ok(args)
}

// One line per checked game, then the verdict. Returns whether all passed.
fn report(args: &Args, results: &[GameResult<ChessPosition>]) -> bool {
    for (index, result) in results.iter().enumerate() {
        info!("Game {}: {}", index + 1, result);
    }

    match results.iter().find(|result| !result.is_pass()) {
        Some(failure) => {
            verdict(args, Level::Error, &format!("FAIL: {}", failure));
            false
        }
        None => {
            let line = format!("PASS: {} game(s) completed", results.len());
            verdict(args, Level::Info, &line);
            true
        }
    }
}

// The verdict goes to stdout once; a log file gets its own copy.
fn verdict(args: &Args, level: Level, line: &str) {
    if args.log_file.is_some() {
        log!(level, "{}", line);
    }
    println!("{}", line);
}

use clap::{Parser, ValueEnum};
use conformance::{ChessPosition, ChessRules, Move, RulesAuthority};
use log::{debug, LevelFilter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simplelog::{Config, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use uci::{UciConnection, UciInput, UciOutput, NULL_MOVE};

const ENGINE_NAME: &str = "Mock";
const ENGINE_AUTHOR: &str = "Jørgen Hanssen";

// Never legal: the source square is the destination.
const ILLEGAL_MOVE: &str = "a1a1";
const MALFORMED_MOVE: &str = "e2e4 now";
const SEARCH_INFO: &str = "depth 1 score cp 0";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// First legal move.
    Legal,
    /// Uniformly random legal move.
    Random,
    /// Always a well-formed move that is never legal.
    Illegal,
    /// Always the null move.
    Null,
    /// A bestmove line with trailing junk.
    Garbage,
    /// Handshakes, then never answers `go`.
    Silent,
    /// Never finishes the handshake.
    Mute,
    /// Answers `uci` but never `isready`.
    Unready,
    /// Prints search info forever instead of a bestmove.
    Spam,
    /// Exits as soon as it is asked to search.
    Exit,
    /// Ignores `quit`.
    Stubborn,
}

#[derive(Parser, Debug)]
#[command(name = "Mock engine")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = "0.1.0")]
struct Args {
    #[arg(value_enum, default_value_t = Mode::Legal)]
    mode: Mode,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;
    let rules = ChessRules;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut position = rules.initial_position();

    let mut uci = UciConnection::new();

    uci.listen(|input, output| {
        match input {
            UciInput::Uci => {
                output.send(UciOutput::IdName(format!("{} ({:?})", ENGINE_NAME, args.mode)))?;
                output.send(UciOutput::IdAuthor(ENGINE_AUTHOR.to_string()))?;
                if args.mode != Mode::Mute {
                    output.send(UciOutput::UciOk)?;
                }
            }
            UciInput::IsReady => {
                if args.mode != Mode::Unready {
                    output.send(UciOutput::ReadyOk)?;
                }
            }
            UciInput::UciNewGame => {
                position = rules.initial_position();
            }
            UciInput::Position { fen, moves } => {
                position = set_position(&rules, fen.as_deref(), moves)?;
            }
            UciInput::Go(limit) => {
                debug!("Searching {} with {:?}", position, limit);
                if args.mode == Mode::Exit {
                    std::process::exit(0);
                }
                if args.mode == Mode::Silent {
                    return Ok(());
                }
                if args.mode == Mode::Spam {
                    // Written directly so the pipe, not a queue, sets the pace.
                    let mut stdout = io::stdout().lock();
                    loop {
                        writeln!(stdout, "info {}", SEARCH_INFO)?;
                    }
                }

                output.send(UciOutput::Info(SEARCH_INFO.to_string()))?;
                output.send(answer(args.mode, &rules, &position, &mut rng))?;
            }
            UciInput::Quit if args.mode == Mode::Stubborn => {
                thread::sleep(Duration::from_secs(60));
            }
            UciInput::Stop | UciInput::Quit => {}
            UciInput::Unknown(line) => {
                debug!("Unknown command: {}", line);
            }
        }
        Ok(())
    })?;

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        WriteLogger::init(LevelFilter::Debug, Config::default(), File::create(log_file)?)?;
    }

    Ok(args)
}

fn set_position(
    rules: &ChessRules,
    fen: Option<&str>,
    moves: &[String],
) -> Result<ChessPosition, Box<dyn Error>> {
    let mut position = match fen {
        Some(fen) => rules.parse_position(fen)?,
        None => rules.initial_position(),
    };
    for mv in moves {
        position = rules.apply(&position, &mv.parse::<Move>()?)?;
    }
    Ok(position)
}

fn answer(mode: Mode, rules: &ChessRules, position: &ChessPosition, rng: &mut StdRng) -> UciOutput {
    let legal = rules.legal_moves(position);

    let best_move = match mode {
        Mode::Illegal => ILLEGAL_MOVE.to_string(),
        Mode::Null => NULL_MOVE.to_string(),
        Mode::Garbage => MALFORMED_MOVE.to_string(),
        Mode::Random if !legal.is_empty() => legal[rng.gen_range(0..legal.len())].to_string(),
        _ => legal
            .first()
            .map(Move::to_string)
            .unwrap_or_else(|| NULL_MOVE.to_string()),
    };

    UciOutput::BestMove {
        best_move,
        ponder: None,
    }
}

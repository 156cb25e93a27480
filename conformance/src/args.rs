use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use conformance::driver::DEFAULT_MAX_PLIES;
use conformance::{DriverConfig, EngineConfig, GameEndPolicy};
use uci::SearchLimit;

#[derive(Parser, Debug)]
#[command(name = "UCI Conformance")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = "0.1.0")]
pub struct Args {
    #[command(subcommand)]
    pub scenario: Scenario,

    /// Write the log here instead of the terminal.
    #[arg(short, long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Log protocol traffic.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Scenario {
    /// Engine under test plays a bounded game against a reference engine.
    FullGame {
        #[command(flatten)]
        engine: EngineArgs,

        #[arg(long)]
        reference: PathBuf,

        /// Extra argument for the reference engine only, may be repeated.
        #[arg(long = "reference-arg", allow_hyphen_values = true)]
        reference_args: Vec<String>,

        /// Start here instead of the initial position.
        #[arg(long)]
        fen: Option<String>,

        #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
        max_plies: usize,

        #[command(flatten)]
        game: GameArgs,
    },
    /// Engine under test answers once from a single position.
    IllegalMove {
        #[command(flatten)]
        engine: EngineArgs,

        /// Defaults to the built-in regression position.
        #[arg(long)]
        fen: Option<String>,

        #[arg(long, default_value_t = 1)]
        depth: u8,
    },
    /// Engine under test plays alone from randomly reached positions.
    RandomPositions {
        #[command(flatten)]
        engine: EngineArgs,

        #[arg(long, default_value_t = 10)]
        count: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Random plies played from the initial position to reach each start.
        #[arg(long, default_value_t = 16)]
        walk_plies: usize,

        /// Plies checked from each start.
        #[arg(long, default_value_t = 2)]
        plies: usize,

        #[command(flatten)]
        game: GameArgs,
    },
}

#[derive(ClapArgs, Debug)]
pub struct EngineArgs {
    /// Engine under test.
    #[arg(long)]
    pub engine: PathBuf,

    /// Extra argument for the engine under test only, may be repeated.
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    #[arg(long, default_value_t = 10_000)]
    pub handshake_timeout_ms: u64,

    /// Allowance per move on top of what the search limit implies.
    #[arg(long, default_value_t = 10_000)]
    pub move_timeout_ms: u64,
}

impl EngineArgs {
    /// Timeouts are shared; arguments belong to the engine at `path`.
    pub fn config(&self, path: &Path, args: &[String]) -> EngineConfig {
        let config = EngineConfig::new(path)
            .handshake_timeout(Duration::from_millis(self.handshake_timeout_ms))
            .move_timeout(Duration::from_millis(self.move_timeout_ms));

        args.iter().fold(config, |config, arg| config.arg(arg.as_str()))
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.config(&self.engine, &self.engine_args)
    }
}

#[derive(ClapArgs, Debug)]
pub struct GameArgs {
    #[arg(long, default_value_t = 1)]
    pub depth: u8,

    /// Keep asking for moves after checkmate, stalemate or a draw.
    #[arg(long)]
    pub ignore_game_end: bool,
}

impl GameArgs {
    pub fn driver_config(&self, max_plies: usize) -> DriverConfig {
        DriverConfig {
            max_plies,
            limit: SearchLimit::depth(self.depth),
            game_end: if self.ignore_game_end {
                GameEndPolicy::Ignore
            } else {
                GameEndPolicy::Detect
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_args_stay_with_their_engine() {
        let args = Args::try_parse_from([
            "conformance",
            "full-game",
            "--engine",
            "./under-test",
            "--engine-arg",
            "--threads=1",
            "--reference",
            "/usr/games/stockfish",
            "--reference-arg",
            "bench",
            "--move-timeout-ms",
            "250",
        ])
        .unwrap();

        let Scenario::FullGame {
            engine,
            reference,
            reference_args,
            ..
        } = &args.scenario
        else {
            panic!("Expected FullGame")
        };

        let engine_config = engine.engine_config();
        assert_eq!(engine_config.args, vec!["--threads=1"]);
        assert_eq!(engine_config.move_timeout, Duration::from_millis(250));

        let reference_config = engine.config(reference, reference_args);
        assert_eq!(reference_config.path, PathBuf::from("/usr/games/stockfish"));
        assert_eq!(reference_config.args, vec!["bench"]);
        assert_eq!(reference_config.move_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_reference_gets_no_arguments_by_default() {
        let args = Args::try_parse_from([
            "conformance",
            "full-game",
            "--engine",
            "./under-test",
            "--engine-arg",
            "uci",
            "--reference",
            "./reference",
        ])
        .unwrap();

        let Scenario::FullGame {
            engine,
            reference,
            reference_args,
            ..
        } = &args.scenario
        else {
            panic!("Expected FullGame")
        };
        assert!(engine.config(reference, reference_args).args.is_empty());
    }
}

use log::{info, warn};
use uci::SearchLimit;

use crate::driver::{DriverConfig, GameDriver, Player};
use crate::engine::{EngineConfig, EngineProcess};
use crate::error::HarnessError;
use crate::outcome::GameResult;
use crate::random::PositionSampler;
use crate::rules::RulesAuthority;

/// Black to move. A position that once drew an illegal reply from an engine.
pub const REGRESSION_FEN: &str =
    "rnbqkb1r/1p1ppppp/8/p1p1P3/6n1/2N2N1P/PPPP1PP1/R1BQKB1R b KQkq - 0 5";

/// How many positions a random-position run checks and how they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSuite {
    pub count: usize,
    pub seed: u64,
    pub walk_plies: usize,
}

impl Default for RandomSuite {
    fn default() -> Self {
        Self {
            count: 10,
            seed: 0,
            walk_plies: 16,
        }
    }
}

/// Reads the starting position, falling back to the initial position.
pub fn start_position<R: RulesAuthority>(
    rules: &R,
    fen: Option<&str>,
) -> Result<R::Position, HarnessError> {
    match fen {
        Some(fen) => Ok(rules.parse_position(fen)?),
        None => Ok(rules.initial_position()),
    }
}

/// Engine under test (white) against a reference engine (black).
pub fn full_game<R: RulesAuthority>(
    rules: &R,
    engine: EngineConfig,
    reference: EngineConfig,
    fen: Option<&str>,
    config: DriverConfig,
) -> Result<GameResult<R::Position>, HarnessError> {
    let start = start_position(rules, fen)?;

    let mut engine = EngineProcess::start(engine)?;
    let mut reference = EngineProcess::start(reference)?;

    info!(
        "Full game: {} vs {}, up to {} plies from {}",
        engine.name(),
        reference.name(),
        config.max_plies,
        start
    );

    let seats: Vec<&mut dyn Player> = vec![&mut engine, &mut reference];
    let result = GameDriver::new(rules, seats, start, config)?.run()?;

    engine.stop()?;
    reference.stop()?;

    Ok(result)
}

/// One move from a single position, defaulting to [`REGRESSION_FEN`].
pub fn illegal_move_check<R: RulesAuthority>(
    rules: &R,
    engine: EngineConfig,
    fen: Option<&str>,
    limit: SearchLimit,
) -> Result<GameResult<R::Position>, HarnessError> {
    let start = start_position(rules, Some(fen.unwrap_or(REGRESSION_FEN)))?;

    let mut engine = EngineProcess::start(engine)?;
    info!("Single-ply check of {} from {}", engine.name(), start);

    let seats: Vec<&mut dyn Player> = vec![&mut engine];
    let result = GameDriver::new(rules, seats, start, DriverConfig::single_ply(limit))?.run()?;

    engine.stop()?;

    Ok(result)
}

/// Runs the engine alone from `suite.count` random positions. The engine is
/// started once and reused; the first failing position ends the suite, so the
/// last result is the failure if there is one.
pub fn random_positions<R: RulesAuthority>(
    rules: &R,
    engine: EngineConfig,
    suite: &RandomSuite,
    config: DriverConfig,
) -> Result<Vec<GameResult<R::Position>>, HarnessError> {
    let mut sampler = PositionSampler::new(suite.seed, suite.walk_plies);
    let mut engine = EngineProcess::start(engine)?;

    info!(
        "Checking {} from {} random positions (seed {}, {} plies each)",
        engine.name(),
        suite.count,
        suite.seed,
        config.max_plies
    );

    let mut results = Vec::with_capacity(suite.count);
    for index in 0..suite.count {
        let start = sampler.sample(rules)?;
        info!("Position {}/{}: {}", index + 1, suite.count, start);

        let seats: Vec<&mut dyn Player> = vec![&mut engine];
        let result = GameDriver::new(rules, seats, start, config.clone())?.run()?;

        let failed = !result.is_pass();
        results.push(result);
        if failed {
            warn!("Stopping after failure at position {}", index + 1);
            break;
        }
    }

    engine.stop()?;

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ChessRules;

    #[test]
    fn test_start_position_defaults_to_initial() {
        let rules = ChessRules;
        assert_eq!(
            start_position(&rules, None).unwrap(),
            rules.initial_position()
        );
    }

    #[test]
    fn test_start_position_reads_fen() {
        let rules = ChessRules;
        let position = start_position(&rules, Some(REGRESSION_FEN)).unwrap();
        assert_eq!(position.to_string(), REGRESSION_FEN);
    }

    #[test]
    fn test_bad_fen_fails_before_any_engine_starts() {
        let rules = ChessRules;
        let result = illegal_move_check(
            &rules,
            EngineConfig::new("/nonexistent/engine"),
            Some("not a position"),
            SearchLimit::depth(1),
        );
        assert!(matches!(result, Err(HarnessError::Rules(_))));
    }

    #[test]
    fn test_missing_engine_is_a_harness_error() {
        let rules = ChessRules;
        let result = full_game(
            &rules,
            EngineConfig::new("/nonexistent/engine"),
            EngineConfig::new("/nonexistent/reference"),
            None,
            DriverConfig::default(),
        );
        assert!(matches!(result, Err(HarnessError::Engine(_))));
    }
}

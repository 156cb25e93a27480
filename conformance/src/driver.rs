use std::collections::HashMap;
use std::fmt;

use log::debug;
use uci::SearchLimit;

use crate::engine::EngineError;
use crate::error::HarnessError;
use crate::moves::Move;
use crate::outcome::{GameEnd, GameResult};
use crate::rules::RulesAuthority;

pub const DEFAULT_MAX_PLIES: usize = 20;
const REPETITION_LIMIT: usize = 3;

/// Something that answers "what do you play here?", normally an engine process.
pub trait Player {
    fn name(&self) -> &str;

    fn new_game(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn request_move(
        &mut self,
        position: &dyn fmt::Display,
        limit: &SearchLimit,
    ) -> Result<Move, EngineError>;
}

/// Whether the driver stops on its own when the rules say the game is over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameEndPolicy {
    #[default]
    Detect,
    // Keep asking for moves regardless; an engine answering `0000` in a lost
    // position is then judged like any other illegal move.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub max_plies: usize,
    pub limit: SearchLimit,
    pub game_end: GameEndPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_plies: DEFAULT_MAX_PLIES,
            limit: SearchLimit::depth(1),
            game_end: GameEndPolicy::Detect,
        }
    }
}

impl DriverConfig {
    /// One verified ply, the shape of an illegal-move regression check.
    pub fn single_ply(limit: SearchLimit) -> Self {
        Self {
            max_plies: 1,
            limit,
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub enum DriverState<P> {
    Running { position: P, ply: usize, turn: usize },
    Completed(GameResult<P>),
    Failed(GameResult<P>),
}

/// Plays a bounded game between one or two seats, checking every move with
/// the rules authority before it is applied.
///
/// With two seats they alternate, seat 0 moving first. With one seat the same
/// player moves on every ply.
pub struct GameDriver<'a, R: RulesAuthority> {
    rules: &'a R,
    seats: Vec<&'a mut dyn Player>,
    config: DriverConfig,
    start: R::Position,
    moves: Vec<Move>,
    seen: HashMap<u64, usize>,
}

impl<'a, R: RulesAuthority> GameDriver<'a, R> {
    pub fn new(
        rules: &'a R,
        seats: Vec<&'a mut dyn Player>,
        start: R::Position,
        config: DriverConfig,
    ) -> Result<Self, HarnessError> {
        if seats.is_empty() || seats.len() > 2 {
            return Err(HarnessError::Config(format!(
                "a game needs one or two players, got {}",
                seats.len()
            )));
        }

        Ok(Self {
            rules,
            seats,
            config,
            start,
            moves: Vec::new(),
            seen: HashMap::new(),
        })
    }

    pub fn run(mut self) -> Result<GameResult<R::Position>, HarnessError> {
        for seat in self.seats.iter_mut() {
            seat.new_game()?;
        }

        let mut state = DriverState::Running {
            position: self.start.clone(),
            ply: 0,
            turn: 0,
        };

        loop {
            state = match state {
                DriverState::Running {
                    position,
                    ply,
                    turn,
                } => self.step(position, ply, turn)?,
                DriverState::Completed(result) | DriverState::Failed(result) => {
                    return Ok(result);
                }
            };
        }
    }

    fn step(
        &mut self,
        position: R::Position,
        ply: usize,
        turn: usize,
    ) -> Result<DriverState<R::Position>, HarnessError> {
        if ply >= self.config.max_plies {
            return Ok(self.complete(position, ply, GameEnd::PlyLimit));
        }

        if self.config.game_end == GameEndPolicy::Detect {
            if let Some(end) = self.detect_end(&position) {
                debug!("Game over after {} plies: {}", ply, end);
                return Ok(self.complete(position, ply, end));
            }
        }

        let seat = &mut self.seats[turn];
        let mv = seat.request_move(&position, &self.config.limit)?;
        debug!("Ply {}: {} played {}", ply + 1, seat.name(), mv);

        if !self.rules.is_legal(&position, &mv) {
            return Ok(DriverState::Failed(GameResult::IllegalMove {
                actor: seat.name().to_string(),
                mv,
                position,
                ply,
                moves: std::mem::take(&mut self.moves),
            }));
        }

        let next = self.rules.apply(&position, &mv)?;
        self.moves.push(mv);

        let ply = ply + 1;
        if ply == self.config.max_plies {
            return Ok(self.complete(next, ply, GameEnd::PlyLimit));
        }

        Ok(DriverState::Running {
            position: next,
            ply,
            turn: (turn + 1) % self.seats.len(),
        })
    }

    fn detect_end(&mut self, position: &R::Position) -> Option<GameEnd> {
        if let Some(end) = GameEnd::from_status(self.rules.status(position)) {
            return Some(end);
        }

        let count = self.seen.entry(self.rules.position_key(position)).or_insert(0);
        *count += 1;
        (*count >= REPETITION_LIMIT).then_some(GameEnd::Repetition)
    }

    fn complete(
        &mut self,
        position: R::Position,
        plies: usize,
        end: GameEnd,
    ) -> DriverState<R::Position> {
        DriverState::Completed(GameResult::Completed {
            position,
            plies,
            moves: std::mem::take(&mut self.moves),
            end,
        })
    }
}

pub mod driver;
pub mod engine;
pub mod error;
pub mod moves;
pub mod outcome;
pub mod random;
pub mod rules;
pub mod scenario;

pub use driver::{DriverConfig, DriverState, GameDriver, GameEndPolicy, Player};
pub use engine::{EngineConfig, EngineError, EngineIdentity, EngineProcess};
pub use error::HarnessError;
pub use moves::{Move, MoveParseError};
pub use outcome::{GameEnd, GameResult};
pub use random::PositionSampler;
pub use rules::{
    ChessPosition, ChessRules, PositionStatus, RulesAuthority, RulesError, STANDARD_POSITION_FEN,
};
pub use scenario::{RandomSuite, REGRESSION_FEN};

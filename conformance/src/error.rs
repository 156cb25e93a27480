use std::error::Error;
use std::fmt;

use crate::engine::EngineError;
use crate::rules::RulesError;

/// Anything that stops a scenario before it reaches a verdict.
#[derive(Debug)]
pub enum HarnessError {
    Engine(EngineError),
    Rules(RulesError),
    Config(String),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Engine(e) => write!(f, "{}", e),
            HarnessError::Rules(e) => write!(f, "{}", e),
            HarnessError::Config(message) => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl Error for HarnessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HarnessError::Engine(e) => Some(e),
            HarnessError::Rules(e) => Some(e),
            HarnessError::Config(_) => None,
        }
    }
}

impl From<EngineError> for HarnessError {
    fn from(e: EngineError) -> Self {
        HarnessError::Engine(e)
    }
}

impl From<RulesError> for HarnessError {
    fn from(e: RulesError) -> Self {
        HarnessError::Rules(e)
    }
}

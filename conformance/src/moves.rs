use std::error::Error;
use std::fmt;
use std::str::FromStr;

use uci::{is_coordinate_move, NULL_MOVE};

/// A move as an engine reported it, in UCI coordinate notation.
///
/// Only the notation is checked here. Whether the move is legal is for the
/// rules authority to decide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move(String);

impl Move {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == NULL_MOVE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveParseError(pub String);

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a coordinate move", self.0)
    }
}

impl Error for MoveParseError {}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_coordinate_move(s) {
            Ok(Move(s.to_string()))
        } else {
            Err(MoveParseError(s.to_string()))
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate_move() {
        let mv: Move = "e2e4".parse().unwrap();
        assert_eq!(mv.as_str(), "e2e4");
        assert!(!mv.is_null());
        assert_eq!(mv, Move::from_str("e2e4").unwrap());
    }

    #[test]
    fn test_null_move() {
        let mv: Move = NULL_MOVE.parse().unwrap();
        assert!(mv.is_null());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(
            Move::from_str("(none)"),
            Err(MoveParseError("(none)".to_string()))
        );
        assert!(Move::from_str("Nf3").is_err());
    }
}

use std::fmt;

use crate::moves::Move;
use crate::rules::PositionStatus;

/// Why a game that saw no illegal move stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    PlyLimit,
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    Repetition,
}

impl GameEnd {
    pub fn from_status(status: PositionStatus) -> Option<Self> {
        match status {
            PositionStatus::Ongoing => None,
            PositionStatus::Checkmate => Some(GameEnd::Checkmate),
            PositionStatus::Stalemate => Some(GameEnd::Stalemate),
            PositionStatus::FiftyMoveRule => Some(GameEnd::FiftyMoveRule),
            PositionStatus::InsufficientMaterial => Some(GameEnd::InsufficientMaterial),
        }
    }
}

impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameEnd::PlyLimit => "ply limit reached",
            GameEnd::Checkmate => "checkmate",
            GameEnd::Stalemate => "stalemate",
            GameEnd::FiftyMoveRule => "fifty-move rule",
            GameEnd::InsufficientMaterial => "insufficient material",
            GameEnd::Repetition => "threefold repetition",
        };
        f.write_str(text)
    }
}

/// The verdict of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum GameResult<P> {
    Completed {
        position: P,
        plies: usize,
        moves: Vec<Move>,
        end: GameEnd,
    },
    IllegalMove {
        actor: String,
        mv: Move,
        // Position the move was played in, not applied to.
        position: P,
        ply: usize,
        moves: Vec<Move>,
    },
}

impl<P> GameResult<P> {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, GameResult::Completed { .. })
    }

    /// Plies that were verified and applied.
    pub fn plies(&self) -> usize {
        match self {
            GameResult::Completed { plies, .. } => *plies,
            GameResult::IllegalMove { ply, .. } => *ply,
        }
    }

    pub fn moves(&self) -> &[Move] {
        match self {
            GameResult::Completed { moves, .. } | GameResult::IllegalMove { moves, .. } => moves,
        }
    }

    pub fn position(&self) -> &P {
        match self {
            GameResult::Completed { position, .. } | GameResult::IllegalMove { position, .. } => {
                position
            }
        }
    }
}

impl<P: fmt::Display> fmt::Display for GameResult<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Completed {
                position,
                plies,
                end,
                ..
            } => write!(
                f,
                "completed {} plies ({}), final position {}",
                plies, end, position
            ),
            GameResult::IllegalMove {
                actor,
                mv,
                position,
                ply,
                moves,
            } => {
                write!(
                    f,
                    "{} played illegal move {} after {} plies in position {}",
                    actor, mv, ply, position
                )?;
                if !moves.is_empty() {
                    let played: Vec<&str> = moves.iter().map(Move::as_str).collect();
                    write!(f, " (moves played: {})", played.join(" "))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn test_illegal_move_diagnostic() {
        let fen = "rnbqkb1r/1p1ppppp/8/p1p1P3/6n1/2N2N1P/PPPP1PP1/R1BQKB1R b KQkq - 0 5";
        let result = GameResult::IllegalMove {
            actor: "ct2".to_string(),
            mv: mv("0000"),
            position: fen,
            ply: 0,
            moves: Vec::new(),
        };

        assert!(!result.is_pass());
        assert_eq!(
            result.to_string(),
            format!("ct2 played illegal move 0000 after 0 plies in position {}", fen)
        );
    }

    #[test]
    fn test_illegal_move_lists_moves_played() {
        let result = GameResult::IllegalMove {
            actor: "ct2".to_string(),
            mv: mv("e1e3"),
            position: "<fen>",
            ply: 2,
            moves: vec![mv("e2e4"), mv("e7e5")],
        };
        assert!(result
            .to_string()
            .ends_with("(moves played: e2e4 e7e5)"));
        assert_eq!(result.plies(), 2);
    }

    #[test]
    fn test_completed_summary() {
        let result = GameResult::Completed {
            position: "<fen>",
            plies: 20,
            moves: Vec::new(),
            end: GameEnd::PlyLimit,
        };
        assert!(result.is_pass());
        assert_eq!(
            result.to_string(),
            "completed 20 plies (ply limit reached), final position <fen>"
        );
    }

    #[test]
    fn test_end_from_status() {
        assert_eq!(GameEnd::from_status(PositionStatus::Ongoing), None);
        assert_eq!(
            GameEnd::from_status(PositionStatus::Checkmate),
            Some(GameEnd::Checkmate)
        );
    }
}

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, MoveGen, Piece, EMPTY};

use crate::moves::Move;

pub const STANDARD_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const LIGHT_SQUARES_MASK: u64 = 0x55AA55AA55AA55AA;
const FIFTY_MOVE_HALFMOVES: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    InvalidPositionNotation { notation: String, reason: String },
    IllegalMoveApplied { mv: Move, position: String },
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesError::InvalidPositionNotation { notation, reason } => {
                write!(f, "invalid position notation {:?}: {}", notation, reason)
            }
            RulesError::IllegalMoveApplied { mv, position } => {
                write!(f, "refusing to apply illegal move {} in {}", mv, position)
            }
        }
    }
}

impl Error for RulesError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
}

impl PositionStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != PositionStatus::Ongoing
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PositionStatus::Ongoing => "ongoing",
            PositionStatus::Checkmate => "checkmate",
            PositionStatus::Stalemate => "stalemate",
            PositionStatus::FiftyMoveRule => "fifty-move rule",
            PositionStatus::InsufficientMaterial => "insufficient material",
        };
        f.write_str(text)
    }
}

/// The only source of truth for legality and position transitions.
///
/// Positions are values: `apply` returns a new position and never touches the
/// one it was given. Their `Display` form must be a FEN an engine accepts.
pub trait RulesAuthority {
    type Position: Clone + PartialEq + fmt::Debug + fmt::Display;

    fn initial_position(&self) -> Self::Position;
    fn parse_position(&self, notation: &str) -> Result<Self::Position, RulesError>;

    fn is_legal(&self, position: &Self::Position, mv: &Move) -> bool;

    /// Requires `is_legal(position, mv)`; errors instead of guessing otherwise.
    fn apply(&self, position: &Self::Position, mv: &Move) -> Result<Self::Position, RulesError>;

    fn legal_moves(&self, position: &Self::Position) -> Vec<Move>;
    fn status(&self, position: &Self::Position) -> PositionStatus;

    /// Identifies the placement, side to move, castling and en passant rights,
    /// ignoring move counters. Equal keys mean a repeated position.
    fn position_key(&self, position: &Self::Position) -> u64;
}

/// A `chess::Board` plus the move counters the board does not track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessPosition {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl ChessPosition {
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }
}

impl fmt::Display for ChessPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The board renders its own counters as "0 1", replace them.
        let board_fen = self.board.to_string();
        let fields: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        write!(
            f,
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

/// Rules authority backed by the `chess` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl ChessRules {
    #[inline]
    fn to_chess_move(mv: &Move) -> Option<ChessMove> {
        if mv.is_null() {
            return None;
        }
        ChessMove::from_str(mv.as_str()).ok()
    }
}

impl RulesAuthority for ChessRules {
    type Position = ChessPosition;

    fn initial_position(&self) -> ChessPosition {
        ChessPosition {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    fn parse_position(&self, notation: &str) -> Result<ChessPosition, RulesError> {
        let invalid = |reason: String| RulesError::InvalidPositionNotation {
            notation: notation.to_string(),
            reason,
        };

        let fields: Vec<&str> = notation.split_whitespace().collect();
        let (halfmove_clock, fullmove_number) = match fields.len() {
            4 => (0, 1),
            6 => {
                let halfmove = fields[4]
                    .parse::<u32>()
                    .map_err(|e| invalid(format!("halfmove clock: {}", e)))?;
                let fullmove = fields[5]
                    .parse::<u32>()
                    .map_err(|e| invalid(format!("fullmove number: {}", e)))?;
                if fullmove == 0 {
                    return Err(invalid("fullmove number must be positive".to_string()));
                }
                (halfmove, fullmove)
            }
            n => return Err(invalid(format!("expected 4 or 6 fields, found {}", n))),
        };

        validate_fields(&fields[..4]).map_err(invalid)?;

        let fen = format!(
            "{} {} {} {} {} {}",
            fields[0], fields[1], fields[2], fields[3], halfmove_clock, fullmove_number
        );
        let board = Board::from_str(&fen).map_err(|e| invalid(e.to_string()))?;

        Ok(ChessPosition {
            board,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn is_legal(&self, position: &ChessPosition, mv: &Move) -> bool {
        Self::to_chess_move(mv).is_some_and(|mv| position.board.legal(mv))
    }

    fn apply(&self, position: &ChessPosition, mv: &Move) -> Result<ChessPosition, RulesError> {
        let chess_move = Self::to_chess_move(mv)
            .filter(|m| position.board.legal(*m))
            .ok_or_else(|| RulesError::IllegalMoveApplied {
                mv: mv.clone(),
                position: position.to_string(),
            })?;

        let board = &position.board;
        let resets_clock = board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
            || board.piece_on(chess_move.get_dest()).is_some();

        let halfmove_clock = if resets_clock {
            0
        } else {
            position.halfmove_clock + 1
        };
        let fullmove_number = match board.side_to_move() {
            Color::White => position.fullmove_number,
            Color::Black => position.fullmove_number + 1,
        };

        Ok(ChessPosition {
            board: board.make_move_new(chess_move),
            halfmove_clock,
            fullmove_number,
        })
    }

    fn legal_moves(&self, position: &ChessPosition) -> Vec<Move> {
        MoveGen::new_legal(&position.board)
            .filter_map(|m| Move::from_str(&m.to_string()).ok())
            .collect()
    }

    fn status(&self, position: &ChessPosition) -> PositionStatus {
        match position.board.status() {
            BoardStatus::Checkmate => PositionStatus::Checkmate,
            BoardStatus::Stalemate => PositionStatus::Stalemate,
            BoardStatus::Ongoing if position.halfmove_clock >= FIFTY_MOVE_HALFMOVES => {
                PositionStatus::FiftyMoveRule
            }
            BoardStatus::Ongoing if has_insufficient_material(&position.board) => {
                PositionStatus::InsufficientMaterial
            }
            BoardStatus::Ongoing => PositionStatus::Ongoing,
        }
    }

    #[inline]
    fn position_key(&self, position: &ChessPosition) -> u64 {
        position.board.get_hash()
    }
}

// `Board::from_str` trusts the placement to hold both kings and normalises
// fields it does not understand, so anything malformed is rejected here.
fn validate_fields(fields: &[&str]) -> Result<(), String> {
    let (placement, side, castling, en_passant) = (fields[0], fields[1], fields[2], fields[3]);

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!("expected 8 ranks, found {}", ranks.len()));
    }

    let mut kings = (0, 0);
    for (index, rank) in ranks.iter().enumerate() {
        let mut squares = 0;
        for c in rank.chars() {
            match c {
                '1'..='8' => squares += c as u32 - '0' as u32,
                'K' => {
                    kings.0 += 1;
                    squares += 1;
                }
                'k' => {
                    kings.1 += 1;
                    squares += 1;
                }
                'P' | 'N' | 'B' | 'R' | 'Q' | 'p' | 'n' | 'b' | 'r' | 'q' => squares += 1,
                _ => return Err(format!("unexpected {:?} in rank {}", c, 8 - index)),
            }
        }
        if squares != 8 {
            return Err(format!("rank {} has {} squares", 8 - index, squares));
        }
    }
    if kings != (1, 1) {
        return Err(format!(
            "expected one king per side, found {} white and {} black",
            kings.0, kings.1
        ));
    }

    if side != "w" && side != "b" {
        return Err(format!("side to move {:?}", side));
    }

    if castling != "-" {
        let mut seen = String::new();
        for c in castling.chars() {
            if !"KQkq".contains(c) || seen.contains(c) {
                return Err(format!("castling rights {:?}", castling));
            }
            seen.push(c);
        }
    }

    let valid_en_passant = match en_passant.as_bytes() {
        [b'-'] => true,
        [file, rank] => (b'a'..=b'h').contains(file) && matches!(rank, b'3' | b'6'),
        _ => false,
    };
    if !valid_en_passant {
        return Err(format!("en passant square {:?}", en_passant));
    }

    Ok(())
}

/// Dead positions: bare kings, a single minor piece against a bare king, or
/// one bishop each on squares of the same color.
fn has_insufficient_material(board: &Board) -> bool {
    let heavy =
        *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy != EMPTY {
        return false;
    }

    let white = *board.color_combined(Color::White);
    let black = *board.color_combined(Color::Black);
    let bishops = *board.pieces(Piece::Bishop);
    let minors = *board.pieces(Piece::Knight) | bishops;

    let white_minors = (white & minors).popcnt();
    let black_minors = (black & minors).popcnt();

    match (white_minors, black_minors) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => {
            let white_bishops = white & bishops;
            let black_bishops = black & bishops;
            if white_bishops == EMPTY || black_bishops == EMPTY {
                return false;
            }
            let light_squares = BitBoard(LIGHT_SQUARES_MASK);
            let white_on_light = (white_bishops & light_squares) != EMPTY;
            let black_on_light = (black_bishops & light_squares) != EMPTY;
            white_on_light == black_on_light
        }
        _ => false,
    }
}

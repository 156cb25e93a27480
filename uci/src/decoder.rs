use std::error::Error;
use std::fmt;

use super::commands::{SearchLimit, UciInput, UciOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// `bestmove` with no move token after it.
    MissingBestMove { line: String },
    /// A known command followed by tokens it cannot carry.
    UnexpectedToken { line: String, token: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingBestMove { line } => {
                write!(f, "bestmove without a move: {:?}", line)
            }
            DecodeError::UnexpectedToken { line, token } => {
                write!(f, "unexpected token {:?} in {:?}", token, line)
            }
        }
    }
}

impl Error for DecodeError {}

pub struct Decoder;

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a line received by an engine.
    pub fn decode_input(&self, input: &str) -> UciInput {
        let input = input.trim();
        match input {
            "uci" => UciInput::Uci,
            "isready" => UciInput::IsReady,
            "ucinewgame" => UciInput::UciNewGame,

            _ if input.starts_with("position") => self.decode_position(input),
            _ if input.starts_with("go") => self.decode_go(input),
            _ if input.starts_with("stop") => UciInput::Stop,
            _ if input.starts_with("quit") => UciInput::Quit,

            _ => UciInput::Unknown(input.to_string()),
        }
    }

    /// Decodes a line written by an engine.
    ///
    /// Lines the harness does not know are returned as `Unknown` rather than
    /// rejected, engines are free to print diagnostics. Only malformed
    /// `bestmove` lines are errors since they are the answer being waited on.
    pub fn decode_output(&self, output: &str) -> Result<UciOutput, DecodeError> {
        let line = output.trim();
        let mut tokens = line.split_whitespace();

        let decoded = match tokens.next() {
            Some("uciok") => UciOutput::UciOk,
            Some("readyok") => UciOutput::ReadyOk,
            Some("id") => match tokens.next() {
                Some("name") => UciOutput::IdName(rest_after(line, "name")),
                Some("author") => UciOutput::IdAuthor(rest_after(line, "author")),
                _ => UciOutput::Unknown(line.to_string()),
            },
            Some("bestmove") => self.decode_bestmove(line, tokens)?,
            Some("info") => UciOutput::Info(rest_after(line, "info")),
            Some("option") => UciOutput::Option(rest_after(line, "option")),
            _ => UciOutput::Unknown(line.to_string()),
        };

        Ok(decoded)
    }

    fn decode_bestmove<'a>(
        &self,
        line: &str,
        mut tokens: impl Iterator<Item = &'a str>,
    ) -> Result<UciOutput, DecodeError> {
        let best_move = tokens.next().ok_or_else(|| DecodeError::MissingBestMove {
            line: line.to_string(),
        })?;

        let ponder = match tokens.next() {
            None => None,
            Some("ponder") => {
                let ponder = tokens.next().ok_or_else(|| DecodeError::UnexpectedToken {
                    line: line.to_string(),
                    token: "ponder".to_string(),
                })?;
                Some(ponder.to_string())
            }
            Some(token) => {
                return Err(DecodeError::UnexpectedToken {
                    line: line.to_string(),
                    token: token.to_string(),
                })
            }
        };

        if let Some(token) = tokens.next() {
            return Err(DecodeError::UnexpectedToken {
                line: line.to_string(),
                token: token.to_string(),
            });
        }

        Ok(UciOutput::BestMove {
            best_move: best_move.to_string(),
            ponder,
        })
    }

    fn decode_position(&self, input: &str) -> UciInput {
        let (head, moves) = match input.split_once("moves") {
            Some((head, moves)) => (
                head,
                moves.split_whitespace().map(str::to_string).collect(),
            ),
            None => (input, Vec::new()),
        };

        // Everything between "fen" and "moves" (or the end) is the FEN.
        let fen = head
            .split_once("fen")
            .map(|(_, fen)| fen.trim().to_string())
            .filter(|fen| !fen.is_empty());

        UciInput::Position { fen, moves }
    }

    fn decode_go(&self, input: &str) -> UciInput {
        UciInput::Go(SearchLimit {
            depth: extract_numeric_param(input, "depth").and_then(|d| u8::try_from(d).ok()),
            nodes: extract_numeric_param(input, "nodes"),
            move_time: extract_numeric_param(input, "movetime"),
        })
    }
}

fn rest_after(line: &str, keyword: &str) -> String {
    line.split_once(keyword)
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}

fn extract_numeric_param(input: &str, param: &str) -> Option<u64> {
    input
        .split_whitespace()
        .collect::<Vec<&str>>()
        .windows(2)
        .find(|w| w[0] == param)
        .and_then(|w| w[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert!(matches!(Decoder.decode_input("uci"), UciInput::Uci));
        assert!(matches!(Decoder.decode_input("isready"), UciInput::IsReady));
        assert!(matches!(
            Decoder.decode_input("ucinewgame"),
            UciInput::UciNewGame
        ));
        assert!(matches!(Decoder.decode_input("stop"), UciInput::Stop));
        assert!(matches!(Decoder.decode_input("quit"), UciInput::Quit));
    }

    #[test]
    fn test_go_depth() {
        let UciInput::Go(limit) = Decoder.decode_input("go depth 20") else {
            panic!("Expected Go")
        };
        assert_eq!(limit.depth, Some(20));
        assert_eq!(limit.move_time, None);
    }

    #[test]
    fn test_go_movetime_and_nodes() {
        let UciInput::Go(limit) = Decoder.decode_input("go nodes 5000 movetime 100") else {
            panic!("Expected Go")
        };
        assert_eq!(limit.nodes, Some(5000));
        assert_eq!(limit.move_time, Some(100));
    }

    #[test]
    fn test_position_startpos_with_moves() {
        let UciInput::Position { fen, moves } =
            Decoder.decode_input("position startpos moves e2e4 e7e5")
        else {
            panic!("Expected Position")
        };
        assert_eq!(fen, None);
        assert_eq!(moves, vec!["e2e4", "e7e5"]);
    }

    #[test]
    fn test_position_fen() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let UciInput::Position { fen: decoded, moves } =
            Decoder.decode_input(&format!("position fen {}", fen))
        else {
            panic!("Expected Position")
        };
        assert_eq!(decoded.as_deref(), Some(fen));
        assert!(moves.is_empty());
    }

    #[test]
    fn test_handshake_lines() {
        assert_eq!(Decoder.decode_output("uciok"), Ok(UciOutput::UciOk));
        assert_eq!(Decoder.decode_output("readyok\n"), Ok(UciOutput::ReadyOk));
        assert_eq!(
            Decoder.decode_output("id name Grail 1.0"),
            Ok(UciOutput::IdName("Grail 1.0".to_string()))
        );
        assert_eq!(
            Decoder.decode_output("id author Someone Else"),
            Ok(UciOutput::IdAuthor("Someone Else".to_string()))
        );
    }

    #[test]
    fn test_bestmove() {
        assert_eq!(
            Decoder.decode_output("bestmove e2e4"),
            Ok(UciOutput::BestMove {
                best_move: "e2e4".to_string(),
                ponder: None
            })
        );
        assert_eq!(
            Decoder.decode_output("bestmove g1f3 ponder d7d5"),
            Ok(UciOutput::BestMove {
                best_move: "g1f3".to_string(),
                ponder: Some("d7d5".to_string())
            })
        );
    }

    #[test]
    fn test_bestmove_malformed() {
        assert!(matches!(
            Decoder.decode_output("bestmove"),
            Err(DecodeError::MissingBestMove { .. })
        ));
        assert!(matches!(
            Decoder.decode_output("bestmove e2e4 e7e5"),
            Err(DecodeError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Decoder.decode_output("bestmove e2e4 ponder e7e5 extra"),
            Err(DecodeError::UnexpectedToken { .. })
        ));
        assert_eq!(
            Decoder.decode_output("bestmove e2e4 ponder"),
            Err(DecodeError::UnexpectedToken {
                line: "bestmove e2e4 ponder".to_string(),
                token: "ponder".to_string(),
            })
        );
    }

    #[test]
    fn test_info_and_unknown() {
        assert_eq!(
            Decoder.decode_output("info depth 1 score cp 20 pv e2e4"),
            Ok(UciOutput::Info("depth 1 score cp 20 pv e2e4".to_string()))
        );
        assert_eq!(
            Decoder.decode_output("Stockfish 16 by the Stockfish developers"),
            Ok(UciOutput::Unknown(
                "Stockfish 16 by the Stockfish developers".to_string()
            ))
        );
        assert_eq!(
            Decoder.decode_output(""),
            Ok(UciOutput::Unknown(String::new()))
        );
    }
}

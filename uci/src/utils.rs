/// Null move in UCI format, sent as the bestmove when no legal move exists.
pub const NULL_MOVE: &str = "0000";

/// Checks that a token has the shape of a UCI coordinate move
/// (`e2e4`, `e7e8q`) or is the null move. Says nothing about legality.
pub fn is_coordinate_move(token: &str) -> bool {
    if token == NULL_MOVE {
        return true;
    }

    let bytes = token.as_bytes();
    let is_square =
        |file: u8, rank: u8| (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank);

    match bytes {
        [f1, r1, f2, r2] => is_square(*f1, *r1) && is_square(*f2, *r2),
        [f1, r1, f2, r2, promotion] => {
            is_square(*f1, *r1) && is_square(*f2, *r2) && b"nbrq".contains(promotion)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_moves() {
        assert!(is_coordinate_move("e2e4"));
        assert!(is_coordinate_move("a7a8q"));
        assert!(is_coordinate_move("h2h1n"));
        assert!(is_coordinate_move(NULL_MOVE));
    }

    #[test]
    fn test_rejects_other_notations() {
        assert!(!is_coordinate_move(""));
        assert!(!is_coordinate_move("e4"));
        assert!(!is_coordinate_move("Nf3"));
        assert!(!is_coordinate_move("e2e9"));
        assert!(!is_coordinate_move("i2i4"));
        assert!(!is_coordinate_move("e7e8k"));
        assert!(!is_coordinate_move("E2E4"));
        assert!(!is_coordinate_move("(none)"));
        assert!(!is_coordinate_move("e2e4e5"));
    }
}

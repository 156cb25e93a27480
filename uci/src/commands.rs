use std::time::Duration;

/// Commands sent from the GUI (here: the harness) to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciInput {
    Uci,
    IsReady,

    UciNewGame,
    Position {
        // None means `startpos`.
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(SearchLimit),

    Stop,
    Quit,
    Unknown(String),
}

/// Lines an engine writes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOutput {
    IdName(String),
    IdAuthor(String),
    UciOk,
    ReadyOk,
    BestMove {
        best_move: String,
        ponder: Option<String>,
    },
    // Kept verbatim, the harness never interprets search info.
    Info(String),
    Option(String),
    Unknown(String),
}

/// Bounds on how much work an engine may spend on one `go`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchLimit {
    // Search depth ply only.
    pub depth: Option<u8>,

    // Search exactly this many nodes.
    pub nodes: Option<u64>,

    // Search exactly movetime milliseconds.
    pub move_time: Option<u64>,
}

impl SearchLimit {
    pub fn depth(depth: u8) -> Self {
        Self {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn move_time(millis: u64) -> Self {
        Self {
            move_time: Some(millis),
            ..Default::default()
        }
    }

    /// Minimum wall-clock time the engine is entitled to before answering.
    /// Depth and node limits imply no fixed time.
    #[inline]
    pub fn implied_duration(&self) -> Duration {
        Duration::from_millis(self.move_time.unwrap_or(0))
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.depth.is_none() && self.nodes.is_none() && self.move_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_limit_implies_no_time() {
        let limit = SearchLimit::depth(1);
        assert_eq!(limit.implied_duration(), Duration::ZERO);
        assert!(!limit.is_unbounded());
    }

    #[test]
    fn test_move_time_implies_duration() {
        let limit = SearchLimit::move_time(250);
        assert_eq!(limit.implied_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_default_is_unbounded() {
        assert!(SearchLimit::default().is_unbounded());
    }
}

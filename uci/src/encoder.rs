use super::commands::{SearchLimit, UciInput, UciOutput};

pub struct Encoder {}

impl Encoder {
    pub fn encode_input(&self, input: &UciInput) -> String {
        match input {
            UciInput::Uci => "uci".to_string(),
            UciInput::IsReady => "isready".to_string(),
            UciInput::UciNewGame => "ucinewgame".to_string(),

            UciInput::Position { fen, moves } => {
                let mut line = match fen {
                    Some(fen) => format!("position fen {}", fen),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            UciInput::Go(limit) => encode_go(limit),

            UciInput::Stop => "stop".to_string(),
            UciInput::Quit => "quit".to_string(),
            UciInput::Unknown(raw) => raw.clone(),
        }
    }

    pub fn encode_output(&self, output: &UciOutput) -> String {
        match output {
            UciOutput::IdName(name) => format!("id name {}", name),
            UciOutput::IdAuthor(author) => format!("id author {}", author),

            UciOutput::UciOk => "uciok".to_string(),
            UciOutput::ReadyOk => "readyok".to_string(),

            UciOutput::BestMove {
                best_move,
                ponder: Some(ponder),
            } => format!("bestmove {} ponder {}", best_move, ponder),
            UciOutput::BestMove {
                best_move,
                ponder: None,
            } => format!("bestmove {}", best_move),

            UciOutput::Info(info) => format!("info {}", info),
            UciOutput::Option(option) => format!("option {}", option),
            UciOutput::Unknown(raw) => raw.clone(),
        }
    }
}

fn encode_go(limit: &SearchLimit) -> String {
    let mut line = String::from("go");
    if let Some(depth) = limit.depth {
        line.push_str(&format!(" depth {}", depth));
    }
    if let Some(nodes) = limit.nodes {
        line.push_str(&format!(" nodes {}", nodes));
    }
    if let Some(move_time) = limit.move_time {
        line.push_str(&format!(" movetime {}", move_time));
    }
    line
}

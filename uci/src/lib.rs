mod connection;
mod decoder;
mod encoder;
mod utils;

pub mod commands;

pub use commands::{SearchLimit, UciInput, UciOutput};
pub use connection::UciConnection;
pub use decoder::{DecodeError, Decoder};
pub use encoder::Encoder;
pub use utils::{is_coordinate_move, NULL_MOVE};

pub mod extract;
pub mod library;

pub use extract::{extract_game_document, GameDocument, GameEnvelope};
pub use library::GameLibrary;

pub mod pending;
pub mod turn;

pub use pending::PendingAction;
pub use turn::{GameArtifact, Turn};

pub mod conversation;
pub mod kv;
pub mod state;

pub use conversation::ConversationStore;
pub use kv::{JsonFileStore, KeyValueStore};
pub use state::UserStateStore;

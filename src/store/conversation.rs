use std::sync::Arc;

use crate::models::Turn;
use crate::store::KeyValueStore;

/// Per-user conversation history on top of the key-value seam. The key is
/// the external user id (the WhatsApp phone number).
///
/// Load and save both fail soft: a missing or unreadable entry degrades to an
/// empty history, and a failed write keeps the prior on-disk state. Either
/// way the error is logged and the caller proceeds.
#[derive(Clone)]
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Full history for a user, oldest first.
    pub fn load(&self, user: &str) -> Vec<Turn> {
        match self.store.get(user) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(turns) => turns,
                Err(e) => {
                    log::error!("Corrupt conversation for {}: {}", user, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to load conversation for {}: {}", user, e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, user: &str, turns: &[Turn]) {
        let value = match serde_json::to_value(turns) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to encode conversation for {}: {}", user, e);
                return;
            }
        };
        if let Err(e) = self.store.put(user, value) {
            log::error!("Failed to save conversation for {}: {}", user, e);
        }
    }

    /// Load, extend, save. Used where the caller does not otherwise need the
    /// history in hand.
    pub fn append(&self, user: &str, new_turns: Vec<Turn>) {
        let mut turns = self.load(user);
        turns.extend(new_turns);
        self.save(user, &turns);
    }
}

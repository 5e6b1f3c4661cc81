use std::sync::Arc;

use crate::models::PendingAction;
use crate::store::KeyValueStore;

/// Pending-action token per user, driving the two-step game command flow.
/// Missing or unreadable state reads as `PendingAction::None`.
#[derive(Clone)]
pub struct UserStateStore {
    store: Arc<dyn KeyValueStore>,
}

impl UserStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, user: &str) -> PendingAction {
        match self.store.get(user) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::error!("Corrupt pending action for {}: {}", user, e);
                PendingAction::None
            }),
            Ok(None) => PendingAction::None,
            Err(e) => {
                log::error!("Failed to load pending action for {}: {}", user, e);
                PendingAction::None
            }
        }
    }

    pub fn set(&self, user: &str, action: PendingAction) {
        let value = match serde_json::to_value(action) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to encode pending action for {}: {}", user, e);
                return;
            }
        };
        if let Err(e) = self.store.put(user, value) {
            log::error!("Failed to save pending action for {}: {}", user, e);
        }
    }

    pub fn clear(&self, user: &str) {
        if let Err(e) = self.store.remove(user) {
            log::error!("Failed to clear pending action for {}: {}", user, e);
        }
    }
}

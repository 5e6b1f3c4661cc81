use serde::{Deserialize, Serialize};

/// Per-user token marking an in-progress multi-step command.
///
/// There is no timeout: `AwaitingGameDescription` persists until the user
/// sends something that resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    #[default]
    None,
    AwaitingGameDescription,
}

impl PendingAction {
    pub fn is_none(&self) -> bool {
        matches!(self, PendingAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_serialization() {
        assert_eq!(
            serde_json::to_value(PendingAction::AwaitingGameDescription).unwrap(),
            serde_json::json!("awaiting_game_description")
        );
        assert_eq!(
            serde_json::to_value(PendingAction::None).unwrap(),
            serde_json::json!("none")
        );
    }

    #[test]
    fn test_token_parsing() {
        let parsed: PendingAction = serde_json::from_str("\"awaiting_game_description\"").unwrap();
        assert_eq!(parsed, PendingAction::AwaitingGameDescription);
        assert!(PendingAction::default().is_none());
    }
}

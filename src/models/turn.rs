//! Conversation history records.
//!
//! A conversation is an append-only list of turns per user. The role tag is
//! part of the serialized form, and only assistant turns may carry the game
//! artifact produced for that turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in a conversation history, tagged by who sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(
            rename = "gameData",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        game_data: Option<GameArtifact>,
    },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Turn::Assistant {
            text: text.into(),
            game_data: None,
        }
    }

    pub fn assistant_with_game(text: impl Into<String>, game: GameArtifact) -> Self {
        Turn::Assistant {
            text: text.into(),
            game_data: Some(game),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Turn::User { text } => text,
            Turn::Assistant { text, .. } => text,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Turn::User { .. })
    }
}

/// A generated game recorded against the assistant turn that delivered it.
/// The HTML document itself lives on disk as `<id>.html`; the artifact keeps
/// the prompt and the public link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameArtifact {
    pub id: String,
    pub prompt: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn_wire_shape() {
        let turn = Turn::user("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "text": "hello"}));
    }

    #[test]
    fn test_assistant_turn_omits_empty_game_data() {
        let turn = Turn::assistant("hi there");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "assistant", "text": "hi there"})
        );
    }

    #[test]
    fn test_assistant_turn_with_game_data() {
        let artifact = GameArtifact {
            id: "abc".to_string(),
            prompt: "a dino runner".to_string(),
            url: "http://localhost:3000/games/abc.html".to_string(),
            created_at: Utc::now(),
        };
        let turn = Turn::assistant_with_game("Your game is ready!", artifact.clone());
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["gameData"]["id"], "abc");
        assert_eq!(json["gameData"]["createdAt"], serde_json::to_value(artifact.created_at).unwrap());

        let back: Turn = serde_json::from_value(json).unwrap();
        assert_eq!(back, turn);
    }

    #[test]
    fn test_turn_roundtrip_preserves_role() {
        let turns = vec![Turn::user("q"), Turn::assistant("a")];
        let json = serde_json::to_string(&turns).unwrap();
        let back: Vec<Turn> = serde_json::from_str(&json).unwrap();
        assert!(back[0].is_user());
        assert!(!back[1].is_user());
    }
}

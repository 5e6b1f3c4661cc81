use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A webhook event normalized away from the wire format. This is what goes
/// onto the inbound queue, and what lands in the dead-letter store when
/// handling fails, so it round-trips through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform message id, used for log correlation.
    pub id: String,
    /// Sender phone number in international format without "+".
    pub from: String,
    pub kind: InboundKind,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn text(id: impl Into<String>, from: impl Into<String>, body: impl Into<String>) -> Self {
        InboundMessage {
            id: id.into(),
            from: from.into(),
            kind: InboundKind::Text { body: body.into() },
            received_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundKind {
    Text {
        body: String,
    },
    /// A tapped quick-reply button.
    Button {
        id: String,
        title: String,
    },
    Image {
        media_id: String,
        caption: Option<String>,
    },
}

/// Result of dispatching a single inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub response: Option<String>,
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn success(response: impl Into<String>) -> Self {
        DispatchResult {
            response: Some(response.into()),
            error: None,
        }
    }

    /// Nothing to do for this message; not an error.
    pub fn ignored() -> Self {
        DispatchResult {
            response: None,
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        DispatchResult {
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One quick-reply button in an interactive message.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        ReplyButton {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_roundtrips_through_serde() {
        let message = InboundMessage {
            id: "wamid.123".to_string(),
            from: "49151123456".to_string(),
            kind: InboundKind::Button {
                id: "create_game".to_string(),
                title: "🎮 Create a Game".to_string(),
            },
            received_at: Utc::now(),
        };

        let json = serde_json::to_string(&message).unwrap();
        let back: InboundMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_inbound_kind_wire_tags() {
        let text = serde_json::to_value(InboundKind::Text {
            body: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(text["type"], "text");

        let image = serde_json::to_value(InboundKind::Image {
            media_id: "m1".to_string(),
            caption: None,
        })
        .unwrap();
        assert_eq!(image["type"], "image");
    }

    #[test]
    fn test_dispatch_result_helpers() {
        assert!(!DispatchResult::success("ok").is_error());
        assert!(!DispatchResult::ignored().is_error());

        let failed = DispatchResult::error("boom");
        assert!(failed.is_error());
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert_eq!(failed.response, None);
    }
}

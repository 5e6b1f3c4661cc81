pub mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::models::Turn;

/// Input to one game generation call.
#[derive(Debug, Clone)]
pub struct GameRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
}

impl GameRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        GameRequest {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Image bytes encoded for an inline request part.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 of the raw bytes, standard alphabet with padding.
    pub data: String,
}

impl InlineImage {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        InlineImage {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }
}

/// Unified AI client used by the dispatcher.
#[derive(Clone)]
pub enum AiClient {
    Gemini(GeminiClient),
    #[cfg(test)]
    Mock(MockAiClient),
}

impl AiClient {
    pub async fn generate_reply(&self, turns: &[Turn]) -> String {
        match self {
            AiClient::Gemini(client) => client.generate_reply(turns).await,
            #[cfg(test)]
            AiClient::Mock(mock) => mock.generate_reply(turns).await,
        }
    }

    pub async fn generate_game(&self, request: &GameRequest) -> Result<String, String> {
        match self {
            AiClient::Gemini(client) => client.generate_game(request).await,
            #[cfg(test)]
            AiClient::Mock(mock) => mock.generate_game(request).await,
        }
    }
}

#[cfg(test)]
pub use mock::{MockAiClient, TraceEntry};


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_image_encodes_base64() {
        let image = InlineImage::from_bytes("image/png", b"hello");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_mock_trace_records_calls_in_order() {
        let mock = MockAiClient::new();
        mock.queue_reply("hi there");
        let client = AiClient::Mock(mock.clone());

        let reply = client.generate_reply(&[Turn::user("hi")]).await;
        assert_eq!(reply, "hi there");

        let game = client
            .generate_game(&GameRequest::from_prompt("snake"))
            .await;
        assert!(game.is_ok());

        assert_eq!(
            mock.get_trace(),
            vec![
                TraceEntry::Reply { turns: 1 },
                TraceEntry::Game {
                    prompt: "snake".to_string(),
                    with_image: false
                },
            ]
        );
    }
}

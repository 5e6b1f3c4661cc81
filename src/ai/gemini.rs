use crate::ai::prompts::{CHAT_SYSTEM_INSTRUCTION, GAME_SYSTEM_INSTRUCTION};
use crate::ai::GameRequest;
use crate::channels::whatsapp::{truncate_chars, TEXT_BODY_LIMIT};
use crate::models::Turn;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Game calls run much longer than chat; the per-request timeout overrides
/// the client default.
const GAME_TIMEOUT: Duration = Duration::from_secs(300);
const GAME_TEMPERATURE: f32 = 0.7;
const GAME_MAX_OUTPUT_TOKENS: u32 = 20000;

/// Returned when the API answers but carries no usable text part.
pub const NO_RESPONSE_FALLBACK: &str = "No response text found.";
/// Returned when the chat call fails outright.
pub const AI_ERROR_FALLBACK: &str = "Sorry, I am having trouble connecting to the AI right now.";

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    game_model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn system(text: &str) -> Self {
        Content {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        chat_model: &str,
        game_model: &str,
    ) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(GeminiClient {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            chat_model: chat_model.to_string(),
            game_model: game_model.to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    /// Chat reply over the full stored history. Never fails: transport and
    /// parse errors collapse into a fixed apology so the dispatcher always
    /// has something to send back.
    pub async fn generate_reply(&self, turns: &[Turn]) -> String {
        let request = GenerateContentRequest {
            contents: turns.iter().map(content_from_turn).collect(),
            system_instruction: Some(Content::system(CHAT_SYSTEM_INSTRUCTION)),
            generation_config: None,
        };

        match self.send_request(&self.chat_model, &request, None).await {
            Ok(response) => {
                let text = first_text(&response)
                    .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());
                truncate_chars(&text, TEXT_BODY_LIMIT)
            }
            Err(e) => {
                log::error!("Gemini chat request failed: {}", e);
                AI_ERROR_FALLBACK.to_string()
            }
        }
    }

    /// One-shot game generation. Returns the raw model text; the extraction
    /// pass decides what counts as a usable document.
    pub async fn generate_game(&self, request: &GameRequest) -> Result<String, String> {
        let mut parts = vec![Part::text(format!(
            "Create a complete HTML5 game based on this description: \"{}\"",
            request.prompt
        ))];
        if let Some(image) = &request.image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            });
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: Some(Content::system(GAME_SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: GAME_TEMPERATURE,
                max_output_tokens: GAME_MAX_OUTPUT_TOKENS,
            }),
        };

        let response = self
            .send_request(&self.game_model, &body, Some(GAME_TIMEOUT))
            .await?;
        first_text(&response).ok_or_else(|| "Gemini returned no game text".to_string())
    }

    async fn send_request(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        timeout: Option<Duration>,
    ) -> Result<GenerateContentResponse, String> {
        log::debug!("Sending Gemini request to model {}", model);

        let mut builder = self.client.post(self.endpoint(model)).json(request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| format!("Gemini API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(format!("Gemini API error: {}", error_response.error.message));
            }
            return Err(format!(
                "Gemini API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))
    }
}

fn content_from_turn(turn: &Turn) -> Content {
    let role = match turn {
        Turn::User { .. } => "user",
        Turn::Assistant { .. } => "model",
    };
    Content {
        role: Some(role.to_string()),
        parts: vec![Part::text(turn.text())],
    }
}

fn first_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping() {
        let user = content_from_turn(&Turn::user("hi"));
        assert_eq!(user.role.as_deref(), Some("user"));

        let assistant = content_from_turn(&Turn::assistant("hello"));
        assert_eq!(assistant.role.as_deref(), Some("model"));
        assert_eq!(assistant.parts[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest {
            contents: vec![content_from_turn(&Turn::user("make me a game"))],
            system_instruction: Some(Content::system("be brief")),
            generation_config: Some(GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 20000,
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "make me a game");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 20000);
        // System content carries no role field at all.
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_inline_image_part_wire_shape() {
        let part = Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "aGVsbG8=".to_string(),
            }),
        };

        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["inlineData"]["data"], "aGVsbG8=");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_first_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"role": "model", "parts": [{"text": "other"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_text(&response).as_deref(), Some("first"));
    }

    #[test]
    fn test_first_text_handles_sparse_responses() {
        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_text(&empty), None);

        let no_candidates: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(first_text(&no_candidates), None);

        let no_parts: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"role": "model"}}]}"#).unwrap();
        assert_eq!(first_text(&no_parts), None);

        let no_text: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": ""}}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_text(&no_text), None);
    }

    #[test]
    fn test_error_body_parsing() {
        let raw = r#"{"error": {"message": "API key not valid", "code": 400, "status": "INVALID_ARGUMENT"}}"#;
        let parsed: GeminiErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "API key not valid");
    }

    #[test]
    fn test_endpoint_includes_model_and_key() {
        let client = GeminiClient::new("secret", None, "chat-model", "game-model").unwrap();
        assert_eq!(
            client.endpoint("chat-model"),
            "https://generativelanguage.googleapis.com/v1beta/models/chat-model:generateContent?key=secret"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            GeminiClient::new("k", Some("http://localhost:9999/"), "c", "g").unwrap();
        assert!(client
            .endpoint("c")
            .starts_with("http://localhost:9999/v1beta/"));
    }
}

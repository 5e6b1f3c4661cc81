//! WhatsApp Business Cloud API integration: webhook payload parsing on the
//! way in, Graph API message sends on the way out.

use crate::channels::types::{InboundKind, InboundMessage, ReplyButton};
use chrono::Utc;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v20.0";

/// Character limit for a plain text message body.
pub const TEXT_BODY_LIMIT: usize = 4096;
/// Character limit for an interactive message body.
pub const MENU_BODY_LIMIT: usize = 1024;
/// Character limit for an interactive message footer.
pub const FOOTER_LIMIT: usize = 60;
/// Character limit for a quick-reply button title.
pub const BUTTON_TITLE_LIMIT: usize = 20;
/// The platform rejects interactive messages with more than three buttons.
pub const MAX_BUTTONS: usize = 3;

/// Char-exact truncation. The platform counts characters, not bytes, so
/// byte slicing would both miscount and risk splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}

// --- Webhook payload (inbound) ---
//
// Every field is defaulted: Meta adds fields over time and sends many
// notification shapes (statuses, errors) we do not care about. Parsing must
// never fail on those.

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub value: Option<WebhookValue>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    /// Delivery/read receipts. Present means this change is not a message.
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default, rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub interactive: Option<InteractiveContent>,
    #[serde(default)]
    pub image: Option<MediaContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct InteractiveContent {
    #[serde(default, rename = "type")]
    pub interactive_type: Option<String>,
    #[serde(default)]
    pub button_reply: Option<ButtonReplyContent>,
}

#[derive(Debug, Deserialize)]
pub struct ButtonReplyContent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaContent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Flattens a webhook notification into the inbound events we handle.
/// Walks every entry and change; statuses, unknown message types, and
/// senderless messages are skipped with a debug log, never an error.
pub fn normalize_webhook(payload: &WebhookPayload) -> Vec<InboundMessage> {
    if !payload.object.is_empty() && payload.object != "whatsapp_business_account" {
        log::debug!("Ignoring webhook for object '{}'", payload.object);
        return Vec::new();
    }

    let mut messages = Vec::new();

    for entry in &payload.entry {
        for change in &entry.changes {
            let value = match &change.value {
                Some(value) => value,
                None => continue,
            };

            if !value.statuses.is_empty() {
                log::debug!("Ignoring {} status update(s)", value.statuses.len());
            }

            for message in &value.messages {
                let from = message.from.trim();
                if from.is_empty() {
                    continue;
                }

                let kind = match message.msg_type.as_str() {
                    "text" => match &message.text {
                        Some(text) if !text.body.trim().is_empty() => InboundKind::Text {
                            body: text.body.trim().to_string(),
                        },
                        _ => continue,
                    },
                    "interactive" => {
                        match message.interactive.as_ref().and_then(|i| i.button_reply.as_ref()) {
                            Some(reply) => InboundKind::Button {
                                id: reply.id.clone(),
                                title: reply.title.clone(),
                            },
                            None => {
                                log::debug!(
                                    "Ignoring interactive message without button_reply from {}",
                                    from
                                );
                                continue;
                            }
                        }
                    }
                    "image" => match &message.image {
                        Some(image) if !image.id.is_empty() => InboundKind::Image {
                            media_id: image.id.clone(),
                            caption: image.caption.clone(),
                        },
                        _ => continue,
                    },
                    other => {
                        log::debug!("Ignoring unsupported message type '{}' from {}", other, from);
                        continue;
                    }
                };

                messages.push(InboundMessage {
                    id: message.id.clone(),
                    from: from.to_string(),
                    kind,
                    received_at: Utc::now(),
                });
            }
        }
    }

    messages
}

// --- Outbound requests ---

#[derive(Debug, Serialize)]
struct TextMessageRequest {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: String,
    #[serde(rename = "type")]
    msg_type: &'static str,
    text: TextBody,
}

#[derive(Debug, Serialize)]
struct TextBody {
    preview_url: bool,
    body: String,
}

#[derive(Debug, Serialize)]
struct InteractiveMessageRequest {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: String,
    #[serde(rename = "type")]
    msg_type: &'static str,
    interactive: InteractiveBody,
}

#[derive(Debug, Serialize)]
struct InteractiveBody {
    #[serde(rename = "type")]
    kind: &'static str,
    body: BodyText,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<BodyText>,
    action: ButtonAction,
}

#[derive(Debug, Serialize)]
struct BodyText {
    text: String,
}

#[derive(Debug, Serialize)]
struct ButtonAction {
    buttons: Vec<ButtonSpec>,
}

#[derive(Debug, Serialize)]
struct ButtonSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: ButtonReplySpec,
}

#[derive(Debug, Serialize)]
struct ButtonReplySpec {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MediaUrlResponse {
    url: String,
    #[serde(default)]
    mime_type: Option<String>,
}

/// Raw media fetched from the platform, ready for re-encoding.
#[derive(Debug, Clone)]
pub struct MediaDownload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

fn build_text_request(to: &str, body: &str) -> TextMessageRequest {
    TextMessageRequest {
        messaging_product: "whatsapp",
        recipient_type: "individual",
        to: to.to_string(),
        msg_type: "text",
        text: TextBody {
            preview_url: false,
            body: truncate_chars(body, TEXT_BODY_LIMIT),
        },
    }
}

fn build_menu_request(
    to: &str,
    body: &str,
    buttons: &[ReplyButton],
    footer: Option<&str>,
) -> InteractiveMessageRequest {
    let buttons = buttons
        .iter()
        .take(MAX_BUTTONS)
        .map(|button| ButtonSpec {
            kind: "reply",
            reply: ButtonReplySpec {
                id: button.id.clone(),
                title: truncate_chars(&button.title, BUTTON_TITLE_LIMIT),
            },
        })
        .collect();

    InteractiveMessageRequest {
        messaging_product: "whatsapp",
        recipient_type: "individual",
        to: to.to_string(),
        msg_type: "interactive",
        interactive: InteractiveBody {
            kind: "button",
            body: BodyText {
                text: truncate_chars(body, MENU_BODY_LIMIT),
            },
            footer: footer.map(|text| BodyText {
                text: truncate_chars(text, FOOTER_LIMIT),
            }),
            action: ButtonAction { buttons },
        },
    }
}

// --- Client ---

#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    base_url: String,
    phone_id: String,
}

impl WhatsAppClient {
    pub fn new(access_token: &str, phone_id: &str, base_url: Option<&str>) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|_| "Invalid WhatsApp access token format".to_string())?;
        headers.insert(header::AUTHORIZATION, auth_value);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(WhatsAppClient {
            client,
            base_url: base_url
                .unwrap_or(GRAPH_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            phone_id: phone_id.to_string(),
        })
    }

    fn messages_endpoint(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.phone_id)
    }

    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), String> {
        self.post_message(&build_text_request(to, body)).await
    }

    pub async fn send_button_menu(
        &self,
        to: &str,
        body: &str,
        buttons: &[ReplyButton],
        footer: Option<&str>,
    ) -> Result<(), String> {
        self.post_message(&build_menu_request(to, body, buttons, footer))
            .await
    }

    async fn post_message<T: Serialize>(&self, request: &T) -> Result<(), String> {
        let response = self
            .client
            .post(self.messages_endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| format!("WhatsApp API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(parsed) = serde_json::from_str::<GraphErrorResponse>(&error_text) {
                return Err(format!("WhatsApp API error: {}", parsed.error.message));
            }
            return Err(format!(
                "WhatsApp API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        Ok(())
    }

    /// Resolves a media id to its download URL, then pulls the bytes. Both
    /// hops need the bearer token; it rides on the default headers.
    pub async fn fetch_media(&self, media_id: &str) -> Result<MediaDownload, String> {
        let lookup = self
            .client
            .get(format!("{}/{}", self.base_url, media_id))
            .send()
            .await
            .map_err(|e| format!("Media lookup failed: {}", e))?;

        if !lookup.status().is_success() {
            return Err(format!("Media lookup returned status: {}", lookup.status()));
        }

        let media: MediaUrlResponse = lookup
            .json()
            .await
            .map_err(|e| format!("Failed to parse media lookup response: {}", e))?;

        let download = self
            .client
            .get(&media.url)
            .send()
            .await
            .map_err(|e| format!("Media download failed: {}", e))?;

        if !download.status().is_success() {
            return Err(format!(
                "Media download returned status: {}",
                download.status()
            ));
        }

        let bytes = download
            .bytes()
            .await
            .map_err(|e| format!("Failed to read media bytes: {}", e))?;

        Ok(MediaDownload {
            mime_type: media.mime_type.unwrap_or_else(|| "image/jpeg".to_string()),
            bytes: bytes.to_vec(),
        })
    }
}

/// Outbound messaging used by the dispatcher.
#[derive(Clone)]
pub enum MessagingClient {
    WhatsApp(WhatsAppClient),
    #[cfg(test)]
    Mock(MockMessagingClient),
}

impl MessagingClient {
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), String> {
        match self {
            MessagingClient::WhatsApp(client) => client.send_text(to, body).await,
            #[cfg(test)]
            MessagingClient::Mock(mock) => mock.send_text(to, body).await,
        }
    }

    pub async fn send_button_menu(
        &self,
        to: &str,
        body: &str,
        buttons: &[ReplyButton],
        footer: Option<&str>,
    ) -> Result<(), String> {
        match self {
            MessagingClient::WhatsApp(client) => {
                client.send_button_menu(to, body, buttons, footer).await
            }
            #[cfg(test)]
            MessagingClient::Mock(mock) => mock.send_button_menu(to, body, buttons, footer).await,
        }
    }

    pub async fn fetch_media(&self, media_id: &str) -> Result<MediaDownload, String> {
        match self {
            MessagingClient::WhatsApp(client) => client.fetch_media(media_id).await,
            #[cfg(test)]
            MessagingClient::Mock(mock) => mock.fetch_media(media_id).await,
        }
    }
}

#[cfg(test)]
pub use mock::{MockMessagingClient, SentMessage};

//! Pulls a playable document out of whatever the model actually returned.
//!
//! The generation instruction asks for a fenced JSON envelope, but models
//! routinely answer with bare HTML, a fenced HTML block, or an envelope
//! buried in prose. The cascade here tries the structured forms first and
//! only then falls back to treating the text as the document itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static MARKDOWN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|html)?\s*\n?(.*?)```").unwrap());
static TRIPLE_QUOTE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)'''(?:json|html)?\s*\n?(.*?)'''").unwrap());

/// The structured answer the generation instruction asks for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnvelope {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_multiplayer: bool,
    pub code: String,
}

/// Extraction outcome. `Raw` means the model ignored the envelope format
/// and the text is taken as the document itself.
#[derive(Debug, Clone, PartialEq)]
pub enum GameDocument {
    Envelope(GameEnvelope),
    Raw(String),
}

impl GameDocument {
    pub fn code(&self) -> &str {
        match self {
            GameDocument::Envelope(envelope) => &envelope.code,
            GameDocument::Raw(text) => text,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            GameDocument::Envelope(envelope) => envelope.title.as_deref(),
            GameDocument::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, GameDocument::Raw(_))
    }
}

pub fn extract_game_document(raw: &str) -> GameDocument {
    let text = raw.trim();

    for fence in [&*MARKDOWN_FENCE, &*TRIPLE_QUOTE_FENCE] {
        if let Some(caps) = fence.captures(text) {
            let inner = caps[1].trim();
            if let Ok(envelope) = serde_json::from_str::<GameEnvelope>(inner) {
                return GameDocument::Envelope(envelope);
            }
            if !inner.is_empty() {
                return GameDocument::Raw(inner.to_string());
            }
        }
    }

    // Unfenced envelope somewhere in prose. Only worth scanning when both
    // expected keys are present as quoted strings.
    if text.contains("\"code\"") && text.contains("\"title\"") {
        if let Some(candidate) = scan_balanced_object(text) {
            if let Ok(envelope) = serde_json::from_str::<GameEnvelope>(candidate) {
                return GameDocument::Envelope(envelope);
            }
        }
        // Widest brace span as a last structured attempt.
        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if start < end {
                if let Ok(envelope) = serde_json::from_str::<GameEnvelope>(&text[start..=end]) {
                    return GameDocument::Envelope(envelope);
                }
            }
        }
    }

    GameDocument::Raw(text.to_string())
}

/// First balanced top-level JSON object in `text`. Braces inside string
/// literals do not count toward nesting; backslash escapes are honored.
fn scan_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in text.as_bytes().iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    // Both ends are single-byte ASCII, so the slice is valid.
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

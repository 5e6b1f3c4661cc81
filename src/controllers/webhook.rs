use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::channels::whatsapp::WebhookPayload;
use crate::channels::{normalize_webhook, InboundMessage};
use crate::AppState;

/// Query parameters Meta sends during webhook subscription. The dotted names
/// come straight off the wire, so every field needs a rename.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/webhook")
            .route(web::get().to(verify))
            .route(web::post().to(receive)),
    );
}

/// Subscription handshake: echo the challenge when the mode and token match,
/// otherwise 403 with an empty body.
async fn verify(state: web::Data<AppState>, query: web::Query<VerifyQuery>) -> impl Responder {
    match challenge_for(&query, &state.config.verify_token) {
        Some(challenge) => {
            log::info!("Webhook verified");
            HttpResponse::Ok().content_type("text/plain").body(challenge)
        }
        None => {
            log::warn!("Webhook verification rejected (mode={:?})", query.mode);
            HttpResponse::Forbidden().finish()
        }
    }
}

/// Event delivery. The Cloud API retries any non-2xx response, so this acks
/// unconditionally and hands the real work to the inbound queue. The body is
/// read as raw bytes: a payload that does not parse is logged and dropped,
/// never bounced back to the vendor.
async fn receive(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    for message in parse_messages(&body) {
        state.inbound.enqueue(message);
    }
    HttpResponse::Ok().finish()
}

fn challenge_for(query: &VerifyQuery, expected_token: &str) -> Option<String> {
    if query.mode.as_deref() != Some("subscribe") {
        return None;
    }
    if query.verify_token.as_deref() != Some(expected_token) {
        return None;
    }
    Some(query.challenge.clone().unwrap_or_default())
}

fn parse_messages(body: &[u8]) -> Vec<InboundMessage> {
    match serde_json::from_slice::<WebhookPayload>(body) {
        Ok(payload) => normalize_webhook(&payload),
        Err(e) => {
            log::warn!("Ignoring unparseable webhook body: {}", e);
            Vec::new()
        }
    }
}

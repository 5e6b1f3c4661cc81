use actix_web::{web, HttpResponse, Responder};

const LIVENESS_TEXT: &str = "Prompt2Play bot is running!";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn index() -> &'static str {
    LIVENESS_TEXT
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(health_payload())
}

fn health_payload() -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "service": "prompt2play",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_reports_liveness() {
        assert_eq!(index().await, LIVENESS_TEXT);
    }

    #[test]
    fn test_health_payload_shape() {
        let payload = health_payload();
        assert_eq!(payload["ok"], true);
        assert_eq!(payload["service"], "prompt2play");
        assert!(payload["version"].is_string());
    }
}

use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const VERIFY_TOKEN: &str = "VERIFY_TOKEN";
    pub const WHATSAPP_TOKEN: &str = "WHATSAPP_TOKEN";
    pub const PHONE_ID: &str = "PHONE_ID";
    pub const GEMINI_KEY: &str = "GEMINI_KEY";
    pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
    pub const GEMINI_CHAT_MODEL: &str = "GEMINI_CHAT_MODEL";
    pub const GEMINI_GAME_MODEL: &str = "GEMINI_GAME_MODEL";
    pub const PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
    pub const DATA_DIR: &str = "DATA_DIR";
    pub const GAMES_DIR: &str = "GAMES_DIR";
    pub const QUEUE_CAPACITY: &str = "QUEUE_CAPACITY";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 3000;
    pub const GEMINI_CHAT_MODEL: &str = "gemini-2.5-flash";
    pub const GEMINI_GAME_MODEL: &str = "gemini-3-pro-preview";
    pub const DATA_DIR: &str = "./data";
    pub const GAMES_DIR: &str = "./games";
    pub const QUEUE_CAPACITY: usize = 64;
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Shared secret echoed back during webhook subscription.
    pub verify_token: String,
    /// Bearer token for the WhatsApp Cloud API.
    pub whatsapp_token: String,
    /// Sender phone number id on the Cloud API.
    pub phone_id: String,
    pub gemini_key: String,
    pub gemini_base_url: Option<String>,
    pub gemini_chat_model: String,
    pub gemini_game_model: String,
    /// Base URL games are linked under in outbound messages.
    pub public_base_url: String,
    pub data_dir: String,
    pub games_dir: String,
    pub queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = env::var(env_vars::PORT)
            .unwrap_or_else(|_| defaults::PORT.to_string())
            .parse()
            .expect("PORT must be a valid number");
        Self {
            port,
            verify_token: env::var(env_vars::VERIFY_TOKEN).expect("VERIFY_TOKEN must be set"),
            whatsapp_token: env::var(env_vars::WHATSAPP_TOKEN).expect("WHATSAPP_TOKEN must be set"),
            phone_id: env::var(env_vars::PHONE_ID).expect("PHONE_ID must be set"),
            gemini_key: env::var(env_vars::GEMINI_KEY).expect("GEMINI_KEY must be set"),
            gemini_base_url: env::var(env_vars::GEMINI_BASE_URL).ok(),
            gemini_chat_model: env::var(env_vars::GEMINI_CHAT_MODEL)
                .unwrap_or_else(|_| defaults::GEMINI_CHAT_MODEL.to_string()),
            gemini_game_model: env::var(env_vars::GEMINI_GAME_MODEL)
                .unwrap_or_else(|_| defaults::GEMINI_GAME_MODEL.to_string()),
            public_base_url: env::var(env_vars::PUBLIC_BASE_URL)
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            data_dir: env::var(env_vars::DATA_DIR)
                .unwrap_or_else(|_| defaults::DATA_DIR.to_string()),
            games_dir: env::var(env_vars::GAMES_DIR)
                .unwrap_or_else(|_| defaults::GAMES_DIR.to_string()),
            queue_capacity: env::var(env_vars::QUEUE_CAPACITY)
                .unwrap_or_else(|_| defaults::QUEUE_CAPACITY.to_string())
                .parse()
                .unwrap_or(defaults::QUEUE_CAPACITY),
        }
    }
}

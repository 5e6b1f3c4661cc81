use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

mod ai;
mod channels;
mod config;
mod controllers;
mod games;
mod models;
mod store;

use ai::{AiClient, GeminiClient};
use channels::{
    spawn_inbound_worker, InboundQueue, MessageDispatcher, MessagingClient, WhatsAppClient,
};
use config::Config;
use games::GameLibrary;
use store::{ConversationStore, JsonFileStore, KeyValueStore, UserStateStore};

pub struct AppState {
    pub config: Config,
    pub inbound: InboundQueue,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing stores under {}", config.data_dir);
    let data_root = PathBuf::from(&config.data_dir);
    let conversations = ConversationStore::new(Arc::new(
        JsonFileStore::new(data_root.join("conversations"))
            .expect("Failed to initialize conversation store"),
    ));
    let states = UserStateStore::new(Arc::new(
        JsonFileStore::new(data_root.join("state")).expect("Failed to initialize state store"),
    ));
    let dead_letters: Arc<dyn KeyValueStore> = Arc::new(
        JsonFileStore::new(data_root.join("dead_letter"))
            .expect("Failed to initialize dead-letter store"),
    );

    log::info!("Publishing games from {}", config.games_dir);
    let library = GameLibrary::new(&config.games_dir, &config.public_base_url)
        .expect("Failed to initialize game library");

    let gemini = GeminiClient::new(
        &config.gemini_key,
        config.gemini_base_url.as_deref(),
        &config.gemini_chat_model,
        &config.gemini_game_model,
    )
    .expect("Failed to build Gemini client");
    let whatsapp = WhatsAppClient::new(&config.whatsapp_token, &config.phone_id, None)
        .expect("Failed to build WhatsApp client");

    // Everything message-related hangs off the dispatcher; the HTTP layer
    // only ever touches the queue handle.
    log::info!("Initializing message dispatcher");
    let dispatcher = Arc::new(MessageDispatcher::new(
        conversations,
        states,
        AiClient::Gemini(gemini),
        MessagingClient::WhatsApp(whatsapp),
        library,
    ));

    let (inbound, _worker) =
        spawn_inbound_worker(dispatcher, dead_letters, config.queue_capacity);

    log::info!("Starting Prompt2Play server on port {}", port);

    let games_dir = config.games_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                config: config.clone(),
                inbound: inbound.clone(),
            }))
            .wrap(Logger::default())
            .configure(controllers::health::config)
            .configure(controllers::webhook::config)
            .service(Files::new("/games", games_dir.clone()))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

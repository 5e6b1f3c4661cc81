use crate::ai::{AiClient, GameRequest, InlineImage};
use crate::channels::types::{DispatchResult, InboundKind, InboundMessage, ReplyButton};
use crate::channels::whatsapp::MessagingClient;
use crate::games::{extract_game_document, GameLibrary};
use crate::models::{PendingAction, Turn};
use crate::store::{ConversationStore, UserStateStore};

pub const BUTTON_CREATE_GAME: &str = "create_game";
pub const BUTTON_HELP: &str = "help";

const CREATE_GAME_TITLE: &str = "🎮 Create a Game";
const HELP_TITLE: &str = "❓ How it works";

const MENU_BODY: &str =
    "Welcome to Prompt2Play! 🎮 I turn your ideas into playable HTML5 games. What would you like to do?";
const MENU_FOOTER: &str = "Prompt2Play";
const DESCRIBE_TEXT: &str = "Awesome! 🎮 Describe the game you want and I'll build it. For example: \"a space shooter with asteroids\". Send \"cancel\" to stop.";
const HELP_TEXT: &str = "I build playable HTML5 games from your ideas! Send /start, tap 🎮 Create a Game, then describe your game. A minute later you get a link you can play and share.";
const CANCELLED_TEXT: &str = "Game creation cancelled. Send /start whenever you're ready.";
const PROGRESS_TEXT: &str = "🎮 Building your game... This usually takes a minute or two.";
const GAME_FAILED_TEXT: &str = "Failed to generate game. Please try again.";
const IMAGE_PROMPT_FALLBACK: &str = "Create a game inspired by the attached image.";
const IMAGE_IDLE_HINT: &str =
    "Nice picture! 📸 Send /start and tap 🎮 Create a Game to turn it into a game.";

/// Routes inbound messages through the per-user state machine: chat by
/// default, the two-step game flow when a pending action says so.
pub struct MessageDispatcher {
    conversations: ConversationStore,
    states: UserStateStore,
    ai: AiClient,
    messenger: MessagingClient,
    library: GameLibrary,
}

impl MessageDispatcher {
    pub fn new(
        conversations: ConversationStore,
        states: UserStateStore,
        ai: AiClient,
        messenger: MessagingClient,
        library: GameLibrary,
    ) -> Self {
        Self {
            conversations,
            states,
            ai,
            messenger,
            library,
        }
    }

    pub async fn dispatch(&self, message: InboundMessage) -> DispatchResult {
        match &message.kind {
            InboundKind::Text { body } => {
                log::info!("[DISPATCH] Text from {} ({})", message.from, message.id);
                self.handle_text(&message.from, body).await
            }
            InboundKind::Button { id, title } => {
                log::info!(
                    "[DISPATCH] Button '{}' from {} ({})",
                    id,
                    message.from,
                    message.id
                );
                self.handle_button(&message.from, id, title).await
            }
            InboundKind::Image { media_id, caption } => {
                log::info!("[DISPATCH] Image from {} ({})", message.from, message.id);
                self.handle_image(&message.from, media_id, caption.as_deref())
                    .await
            }
        }
    }

    async fn handle_text(&self, from: &str, body: &str) -> DispatchResult {
        let trimmed = body.trim();

        // /start resets the flow from any state.
        if trimmed.eq_ignore_ascii_case("/start") {
            return self.handle_start(from).await;
        }

        match self.states.get(from) {
            PendingAction::AwaitingGameDescription => {
                if trimmed.eq_ignore_ascii_case("cancel") {
                    self.states.clear(from);
                    return self.send_text(from, CANCELLED_TEXT).await;
                }
                self.create_game(from, GameRequest::from_prompt(trimmed))
                    .await
            }
            PendingAction::None => self.handle_chat(from, trimmed).await,
        }
    }

    async fn handle_start(&self, from: &str) -> DispatchResult {
        self.states.clear(from);

        let buttons = [
            ReplyButton::new(BUTTON_CREATE_GAME, CREATE_GAME_TITLE),
            ReplyButton::new(BUTTON_HELP, HELP_TITLE),
        ];
        match self
            .messenger
            .send_button_menu(from, MENU_BODY, &buttons, Some(MENU_FOOTER))
            .await
        {
            Ok(()) => DispatchResult::success(MENU_BODY),
            Err(e) => {
                log::error!("[DISPATCH] Failed to send menu to {}: {}", from, e);
                DispatchResult::error(e)
            }
        }
    }

    async fn handle_button(&self, from: &str, id: &str, title: &str) -> DispatchResult {
        match id {
            BUTTON_CREATE_GAME => {
                self.states.set(from, PendingAction::AwaitingGameDescription);
                self.send_text(from, DESCRIBE_TEXT).await
            }
            BUTTON_HELP => self.send_text(from, HELP_TEXT).await,
            other => {
                log::debug!(
                    "[DISPATCH] Ignoring unknown button '{}' ({}) from {}",
                    other,
                    title,
                    from
                );
                DispatchResult::ignored()
            }
        }
    }

    /// Plain conversation: whole stored history goes to the model, both new
    /// turns are persisted before the reply goes out.
    async fn handle_chat(&self, from: &str, text: &str) -> DispatchResult {
        let mut turns = self.conversations.load(from);
        turns.push(Turn::user(text));

        let reply = self.ai.generate_reply(&turns).await;
        log::info!("[DISPATCH] Reply for {}: {} chars", from, reply.chars().count());

        turns.push(Turn::assistant(&reply));
        self.conversations.save(from, &turns);

        self.send_text(from, &reply).await
    }

    async fn handle_image(
        &self,
        from: &str,
        media_id: &str,
        caption: Option<&str>,
    ) -> DispatchResult {
        match self.states.get(from) {
            PendingAction::AwaitingGameDescription => {
                let media = match self.messenger.fetch_media(media_id).await {
                    Ok(media) => media,
                    Err(e) => {
                        let error = format!("Media fetch failed: {}", e);
                        log::error!("[DISPATCH] {} for {}", error, from);
                        self.send_apology(from).await;
                        self.states.clear(from);
                        return DispatchResult::error(error);
                    }
                };

                let prompt = caption
                    .map(str::trim)
                    .filter(|caption| !caption.is_empty())
                    .unwrap_or(IMAGE_PROMPT_FALLBACK);
                let request = GameRequest::from_prompt(prompt)
                    .with_image(InlineImage::from_bytes(&media.mime_type, &media.bytes));

                self.create_game(from, request).await
            }
            PendingAction::None => self.send_text(from, IMAGE_IDLE_HINT).await,
        }
    }

    /// One full generation pass. The pending state is cleared up front so
    /// the user lands back in chat no matter how generation goes.
    async fn create_game(&self, from: &str, request: GameRequest) -> DispatchResult {
        self.states.clear(from);

        if let Err(e) = self.messenger.send_text(from, PROGRESS_TEXT).await {
            log::warn!("[DISPATCH] Failed to send progress message to {}: {}", from, e);
        }

        let raw = match self.ai.generate_game(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                let error = format!("Game generation failed: {}", e);
                log::error!("[DISPATCH] {} (user {})", error, from);
                self.send_apology(from).await;
                return DispatchResult::error(error);
            }
        };

        let document = extract_game_document(&raw);
        if document.is_raw() {
            log::warn!(
                "[DISPATCH] No envelope in model output for {}; using raw text as document",
                from
            );
        }
        if document.code().trim().is_empty() {
            let error = "Game generation produced an empty document".to_string();
            log::error!("[DISPATCH] {} (user {})", error, from);
            self.send_apology(from).await;
            return DispatchResult::error(error);
        }

        let artifact = match self.library.publish(&request.prompt, document.code()) {
            Ok(artifact) => artifact,
            Err(e) => {
                let error = format!("Failed to publish game: {}", e);
                log::error!("[DISPATCH] {} (user {})", error, from);
                self.send_apology(from).await;
                return DispatchResult::error(error);
            }
        };

        let body = match document.title() {
            Some(title) => format!("🎮 \"{}\" is ready! Play it here: {}", title, artifact.url),
            None => format!("🎮 Your game is ready! Play it here: {}", artifact.url),
        };

        self.conversations.append(
            from,
            vec![
                Turn::user(&request.prompt),
                Turn::assistant_with_game(&body, artifact),
            ],
        );

        self.send_text(from, &body).await
    }

    async fn send_text(&self, to: &str, body: &str) -> DispatchResult {
        match self.messenger.send_text(to, body).await {
            Ok(()) => DispatchResult::success(body),
            Err(e) => {
                log::error!("[DISPATCH] Failed to send message to {}: {}", to, e);
                DispatchResult::error(e)
            }
        }
    }

    /// Failure notice to the user; the dispatch error is reported separately.
    async fn send_apology(&self, to: &str) {
        if let Err(e) = self.messenger.send_text(to, GAME_FAILED_TEXT).await {
            log::error!("[DISPATCH] Failed to send apology to {}: {}", to, e);
        }
    }
}

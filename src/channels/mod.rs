pub mod dispatcher;
pub mod types;
pub mod whatsapp;
pub mod worker;

pub use dispatcher::MessageDispatcher;
pub use types::{DispatchResult, InboundKind, InboundMessage, ReplyButton};
pub use whatsapp::{normalize_webhook, MessagingClient, WhatsAppClient};
pub use worker::{spawn_inbound_worker, InboundQueue};

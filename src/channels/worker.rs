//! Single background worker between the webhook fast-ack and the dispatcher.
//!
//! The webhook handler must answer 200 within the vendor deadline, so it only
//! normalizes and enqueues. This worker drains the queue one message at a
//! time; dispatch failures go to the dead-letter store instead of vanishing.

use crate::channels::dispatcher::MessageDispatcher;
use crate::channels::types::InboundMessage;
use crate::store::KeyValueStore;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sender half of the inbound queue, cloned into the webhook handler.
#[derive(Clone)]
pub struct InboundQueue {
    tx: mpsc::Sender<InboundMessage>,
}

impl InboundQueue {
    pub(crate) fn new(tx: mpsc::Sender<InboundMessage>) -> Self {
        Self { tx }
    }

    /// Non-blocking enqueue. The vendor already got its 200 by the time this
    /// runs, so a full queue can only drop the event; the drop is logged.
    pub fn enqueue(&self, message: InboundMessage) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(message)) => {
                log::error!(
                    "[WORKER] Inbound queue full; dropping message {} from {}",
                    message.id,
                    message.from
                );
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                log::error!(
                    "[WORKER] Inbound queue closed; dropping message {} from {}",
                    message.id,
                    message.from
                );
            }
        }
    }
}

/// Spawns the worker task. It runs until every `InboundQueue` handle is
/// dropped and the queue is drained.
pub fn spawn_inbound_worker(
    dispatcher: Arc<MessageDispatcher>,
    dead_letters: Arc<dyn KeyValueStore>,
    capacity: usize,
) -> (InboundQueue, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<InboundMessage>(capacity);

    let handle = tokio::spawn(async move {
        log::info!("[WORKER] Inbound worker started (queue capacity {})", capacity);
        while let Some(message) = rx.recv().await {
            let result = dispatcher.dispatch(message.clone()).await;
            if let Some(error) = result.error {
                record_dead_letter(dead_letters.as_ref(), &message, &error);
            }
        }
        log::info!("[WORKER] Inbound worker stopped");
    });

    (InboundQueue::new(tx), handle)
}

fn record_dead_letter(store: &dyn KeyValueStore, message: &InboundMessage, error: &str) {
    let key = format!("{}-{}", Utc::now().format("%Y%m%dT%H%M%S%3f"), message.id);
    let record = json!({
        "event": message,
        "error": error,
        "failed_at": Utc::now(),
    });
    match store.put(&key, record) {
        Ok(()) => log::warn!("[WORKER] Dead letter recorded: {} ({})", key, error),
        Err(e) => log::error!("[WORKER] Failed to record dead letter {}: {}", key, e),
    }
}

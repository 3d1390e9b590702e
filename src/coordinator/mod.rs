use crate::models::message::Message;
use crate::store::ConversationStore;
use crate::transport::MessageTransport;
use log::{debug, warn};
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The create-message request was rejected or never reached the server.
    /// The provisional entry has already been rolled back.
    #[error("failed to send message: {0}")]
    SendFailed(#[source] Box<dyn Error + Send + Sync>),

    /// Listing messages failed. The store was left unchanged.
    #[error("failed to fetch messages: {0}")]
    FetchFailed(#[source] Box<dyn Error + Send + Sync>),
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Content was empty after trimming; nothing was stored or sent.
    Skipped,
    /// The server confirmed the message; the store now holds it in place
    /// of the provisional entry.
    Confirmed(Message),
}

/// Drives optimistic message sends: a provisional entry lands in the store
/// before the request goes out, and settlement either confirms it in place
/// or rolls it back. No retries; a retry is a fresh `send`.
pub struct SendCoordinator {
    transport: Arc<dyn MessageTransport>,
    store: ConversationStore,
}

impl SendCoordinator {
    pub fn new(transport: Arc<dyn MessageTransport>, store: ConversationStore) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Send `content` to `conversation_id`. Whitespace-only content is
    /// skipped without a request or a store mutation. The request itself
    /// runs on a spawned task, so an in-flight send still settles against
    /// the store even if the caller stops awaiting the outcome.
    pub async fn send(
        &self,
        content: &str,
        conversation_id: i64,
    ) -> Result<SendOutcome, CoordinatorError> {
        let content = content.trim();
        if content.is_empty() {
            debug!("skipping empty send for conversation {}", conversation_id);
            return Ok(SendOutcome::Skipped);
        }

        let temp_id = Uuid::new_v4();
        self.store
            .append(Message::provisional(temp_id, content, conversation_id));

        let transport = Arc::clone(&self.transport);
        let store = self.store.clone();
        let content = content.to_string();
        let settlement = tokio::spawn(async move {
            match transport.create_message(&content, conversation_id).await {
                Ok(confirmed) => {
                    if !store.replace(temp_id, confirmed.clone()) {
                        debug!(
                            "confirmation for {} arrived after a refetch dropped it",
                            temp_id
                        );
                    }
                    Ok(confirmed)
                }
                Err(e) => {
                    store.remove(temp_id);
                    Err(e)
                }
            }
        });

        match settlement.await {
            Ok(Ok(confirmed)) => Ok(SendOutcome::Confirmed(confirmed)),
            Ok(Err(e)) => Err(CoordinatorError::SendFailed(e)),
            Err(join_err) => {
                // The settlement task itself died; roll back what it couldn't.
                warn!("settlement task failed: {}", join_err);
                self.store.remove(temp_id);
                Err(CoordinatorError::SendFailed(Box::new(join_err)))
            }
        }
    }

    /// Refetch every message from the server and rebuild the store from the
    /// result. On failure the store is untouched.
    pub async fn refresh(&self) -> Result<usize, CoordinatorError> {
        let messages = self
            .transport
            .list_messages()
            .await
            .map_err(CoordinatorError::FetchFailed)?;
        let count = messages.len();
        self.store.replace_all(messages);
        Ok(count)
    }
}

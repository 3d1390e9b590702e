use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of message authors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Message identity. A message is either still waiting on the server
/// (client-generated temporary id) or confirmed (server-assigned id).
/// Confirmation swaps `Temporary` for `Permanent` in one step; the
/// temporary id is never visible again afterward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageId {
    Temporary(Uuid),
    Permanent(i64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: i64,
    pub file_url: Option<String>,
}

impl Message {
    /// A locally created message awaiting server confirmation. Always
    /// authored by the user, stamped with the local clock.
    pub fn provisional(temp_id: Uuid, content: impl Into<String>, conversation_id: i64) -> Self {
        Self {
            id: MessageId::Temporary(temp_id),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            conversation_id,
            file_url: None,
        }
    }

    /// A message whose fields are authoritative, as returned by the server.
    pub fn confirmed(
        id: i64,
        content: impl Into<String>,
        sender: Sender,
        timestamp: DateTime<Utc>,
        conversation_id: i64,
        file_url: Option<String>,
    ) -> Self {
        Self {
            id: MessageId::Permanent(id),
            content: content.into(),
            sender,
            timestamp,
            conversation_id,
            file_url,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self.id, MessageId::Temporary(_))
    }
}

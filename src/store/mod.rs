use crate::models::message::{Message, MessageId, Sender};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory log of messages, keyed by conversation id. Order within a
/// conversation is insertion order. Clones share the same state; every
/// operation takes the lock for its own duration only, so mutations are
/// atomic with respect to each other and never held across an await.
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<Mutex<HashMap<i64, Vec<Message>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a message onto the owning conversation's sequence.
    pub fn append(&self, message: Message) {
        let mut inner = self.inner.lock().unwrap();
        inner.entry(message.conversation_id).or_default().push(message);
    }

    /// Swap the provisional entry carrying `temp_id` with the confirmed
    /// message, in place. Returns `false` when the id is no longer present
    /// (e.g. a refetch already replaced it) — a no-op, not an error.
    pub fn replace(&self, temp_id: Uuid, confirmed: Message) -> bool {
        let mut inner = self.inner.lock().unwrap();
        for messages in inner.values_mut() {
            if let Some(slot) = messages
                .iter_mut()
                .find(|m| m.id == MessageId::Temporary(temp_id))
            {
                *slot = confirmed;
                return true;
            }
        }
        debug!("replace: temporary id {} no longer in store", temp_id);
        false
    }

    /// Drop the provisional entry carrying `temp_id`. Same no-op rule as
    /// `replace` when the id is absent.
    pub fn remove(&self, temp_id: Uuid) -> bool {
        let mut inner = self.inner.lock().unwrap();
        for messages in inner.values_mut() {
            if let Some(pos) = messages
                .iter()
                .position(|m| m.id == MessageId::Temporary(temp_id))
            {
                messages.remove(pos);
                return true;
            }
        }
        debug!("remove: temporary id {} no longer in store", temp_id);
        false
    }

    /// Rebuild the entire store from a fetched sequence, grouping by
    /// conversation id and keeping the given order within each conversation.
    pub fn replace_all(&self, messages: Vec<Message>) {
        let mut rebuilt: HashMap<i64, Vec<Message>> = HashMap::new();
        for message in messages {
            rebuilt.entry(message.conversation_id).or_default().push(message);
        }
        let mut inner = self.inner.lock().unwrap();
        *inner = rebuilt;
    }

    /// Snapshot of the ordered sequence for one conversation.
    pub fn messages(&self, conversation_id: i64) -> Vec<Message> {
        let inner = self.inner.lock().unwrap();
        inner.get(&conversation_id).cloned().unwrap_or_default()
    }

    pub fn len(&self, conversation_id: i64) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.get(&conversation_id).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, conversation_id: i64) -> bool {
        self.len(conversation_id) == 0
    }
}

/// Render a message sequence for terminal display.
pub fn format_transcript(messages: &[Message]) -> String {
    let mut result = String::new();
    for msg in messages {
        let sender_display = match msg.sender {
            Sender::User => "User",
            Sender::Assistant => "Assistant",
        };
        result.push_str(&format!("{}: {}\n", sender_display, msg.content));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn confirmed(id: i64, content: &str, conversation_id: i64) -> Message {
        Message::confirmed(id, content, Sender::User, Utc::now(), conversation_id, None)
    }

    #[test]
    fn append_preserves_insertion_order() {
        let store = ConversationStore::new();
        store.append(confirmed(1, "first", 7));
        store.append(confirmed(2, "second", 7));
        store.append(confirmed(3, "elsewhere", 8));

        let messages = store.messages(7);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert_eq!(store.len(8), 1);
    }

    #[test]
    fn replace_swaps_in_place() {
        let store = ConversationStore::new();
        let temp_id = Uuid::new_v4();
        store.append(confirmed(1, "before", 1));
        store.append(Message::provisional(temp_id, "hi", 1));
        store.append(confirmed(2, "after", 1));

        assert!(store.replace(temp_id, confirmed(5, "hi", 1)));

        let messages = store.messages(1);
        assert_eq!(messages[1].id, MessageId::Permanent(5));
        assert_eq!(messages[1].content, "hi");
        assert_eq!(messages[0].content, "before");
        assert_eq!(messages[2].content, "after");
    }

    #[test]
    fn replace_on_absent_id_is_noop() {
        let store = ConversationStore::new();
        store.append(confirmed(1, "kept", 1));
        assert!(!store.replace(Uuid::new_v4(), confirmed(5, "dropped", 1)));
        assert_eq!(store.messages(1).len(), 1);
        assert_eq!(store.messages(1)[0].content, "kept");
    }

    #[test]
    fn remove_drops_only_the_provisional() {
        let store = ConversationStore::new();
        let temp_id = Uuid::new_v4();
        store.append(confirmed(1, "kept", 1));
        store.append(Message::provisional(temp_id, "doomed", 1));

        assert!(store.remove(temp_id));
        let messages = store.messages(1);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "kept");

        // second removal of the same id is a no-op
        assert!(!store.remove(temp_id));
    }

    #[test]
    fn remove_on_empty_store_never_panics() {
        let store = ConversationStore::new();
        assert!(!store.remove(Uuid::new_v4()));
    }

    #[test]
    fn replace_all_groups_by_conversation_in_order() {
        let store = ConversationStore::new();
        store.append(confirmed(9, "stale", 1));

        store.replace_all(vec![
            confirmed(1, "a", 1),
            confirmed(2, "x", 2),
            confirmed(3, "b", 1),
        ]);

        let one = store.messages(1);
        assert_eq!(one.len(), 2);
        assert_eq!(one[0].content, "a");
        assert_eq!(one[1].content, "b");
        assert_eq!(store.len(2), 1);
    }

    #[test]
    fn replace_all_with_empty_input_clears() {
        let store = ConversationStore::new();
        store.append(confirmed(1, "gone", 1));
        store.replace_all(Vec::new());
        assert!(store.is_empty(1));
    }

    #[test]
    fn transcript_renders_sender_labels() {
        let mut msg = confirmed(1, "hello", 1);
        msg.sender = Sender::Assistant;
        let transcript = format_transcript(&[confirmed(2, "hi", 1), msg]);
        assert_eq!(transcript, "User: hi\nAssistant: hello\n");
    }
}

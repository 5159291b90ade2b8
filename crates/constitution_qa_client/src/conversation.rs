//! Conversation store: append-only message list and the loading flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-store message id. Strictly increasing in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// One chat bubble. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    /// Set only on answered assistant messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Generation token handed out by [`ConversationStore::begin_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
    latest_request: u64,
    loading: bool,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message. Returns `None` (and changes nothing) when
    /// `text` is empty after trimming. The stored content is `text` as given.
    pub fn append_user_message(&mut self, text: &str) -> Option<&Message> {
        if text.trim().is_empty() {
            return None;
        }
        Some(self.push(text.to_string(), Author::User, None))
    }

    pub fn append_assistant_message(
        &mut self,
        content: impl Into<String>,
        sources: Option<Vec<String>>,
    ) -> &Message {
        self.push(content.into(), Author::Assistant, sources)
    }

    fn push(&mut self, content: String, author: Author, sources: Option<Vec<String>>) -> &Message {
        self.next_id += 1;
        let index = self.messages.len();
        self.messages.push(Message {
            id: MessageId(self.next_id),
            content,
            author,
            timestamp: Utc::now(),
            sources,
        });
        &self.messages[index]
    }

    /// Mark a request in flight. Supersedes any earlier token.
    pub fn begin_request(&mut self) -> RequestToken {
        self.latest_request += 1;
        self.loading = true;
        RequestToken(self.latest_request)
    }

    /// Settle a request. Only the latest token clears the loading flag;
    /// returns whether it did.
    pub fn settle(&mut self, token: RequestToken) -> bool {
        if token.0 != self.latest_request {
            tracing::debug!(
                token = token.0,
                latest = self.latest_request,
                "stale request settled; loading unchanged"
            );
            return false;
        }
        self.loading = false;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

//! Document Q&A chat client library (conversation state, document registry,
//! query protocol, HTTP client, config). Used by the `constitution-qa` binary.

pub mod client;
pub mod config;
pub mod conversation;
pub mod documents;
pub mod messages;
pub mod session;

pub use client::{Client, ClientError, QueryBackend};
pub use config::{default_config_path, ApiSection, Config, ConfigError};
pub use conversation::{Author, ConversationStore, Message, MessageId, RequestToken};
pub use documents::{AddOutcome, DocumentRegistry, RegistryError, DEFAULT_DOCUMENT_URL};
pub use messages::{QueryRequest, QueryResponse};
pub use session::{
    ChatSession, PendingQuery, QueryOutcome, SessionState, NO_ANSWER_FALLBACK,
    QUERY_ERROR_MESSAGE,
};

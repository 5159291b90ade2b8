//! Chat session: drives the conversation store and document registry through
//! one query round trip (append question, call backend, append reply, settle).
//!
//! Each submit runs as its own Tokio task. Overlapping submits are allowed; every
//! reply is appended when it resolves, but only the newest request may clear the
//! loading flag.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::QueryBackend;
use crate::conversation::{ConversationStore, Message, RequestToken};
use crate::documents::{AddOutcome, DocumentRegistry, RegistryError, DEFAULT_DOCUMENT_URL};
use crate::messages::QueryRequest;

/// Assistant reply when the server answers without any usable answer.
pub const NO_ANSWER_FALLBACK: &str = "I couldn't find an answer to your question.";

/// Assistant reply when the query fails for any reason.
pub const QUERY_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

/// Both stores, guarded together.
#[derive(Debug, Default)]
pub struct SessionState {
    pub conversation: ConversationStore,
    pub documents: DocumentRegistry,
}

/// How a submitted query settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Server responded; the message carries the answer (or the fallback) and sources.
    Answered(Message),
    /// Transport, status or decode failure; the message is [`QUERY_ERROR_MESSAGE`].
    Failed(Message),
    /// Cancelled before the server responded. Nothing was appended.
    Cancelled,
}

impl QueryOutcome {
    pub fn message(&self) -> Option<&Message> {
        match self {
            QueryOutcome::Answered(m) | QueryOutcome::Failed(m) => Some(m),
            QueryOutcome::Cancelled => None,
        }
    }
}

/// Handle to an in-flight query. Dropping it does not cancel the query.
#[derive(Debug)]
pub struct PendingQuery {
    cancel: CancellationToken,
    task: JoinHandle<QueryOutcome>,
    state: Arc<Mutex<SessionState>>,
    token: RequestToken,
}

impl PendingQuery {
    /// Abort the request. The loading flag is still settled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the query to settle. A task that died without settling
    /// (backend panic) is settled here and reported as cancelled.
    pub async fn wait(self) -> QueryOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "query task did not complete");
                lock(&self.state).conversation.settle(self.token);
                QueryOutcome::Cancelled
            }
        }
    }
}

#[derive(Clone)]
pub struct ChatSession {
    state: Arc<Mutex<SessionState>>,
    backend: Arc<dyn QueryBackend>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    pub fn new(backend: impl QueryBackend + 'static, documents: DocumentRegistry) -> Self {
        Self::with_backend(Arc::new(backend), documents)
    }

    pub fn with_backend(backend: Arc<dyn QueryBackend>, documents: DocumentRegistry) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                conversation: ConversationStore::new(),
                documents,
            })),
            backend,
        }
    }

    /// Read both stores under one lock.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn messages(&self) -> Vec<Message> {
        self.read(|s| s.conversation.messages().to_vec())
    }

    pub fn documents(&self) -> Vec<String> {
        self.read(|s| s.documents.snapshot())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|s| s.conversation.is_loading())
    }

    pub fn add_document(&self, url: &str) -> Result<AddOutcome, RegistryError> {
        lock(&self.state).documents.add(url)
    }

    pub fn remove_document(&self, url: &str) -> Result<bool, RegistryError> {
        lock(&self.state).documents.remove(url)
    }

    /// Start a query for `question`. Returns `None` without touching any state
    /// when the question is blank.
    ///
    /// Only the first registered document is sent; the reply lists every
    /// registered document as its sources. Must be called inside a Tokio runtime.
    pub fn submit(&self, question: &str) -> Option<PendingQuery> {
        let (token, document) = {
            let mut state = lock(&self.state);
            state.conversation.append_user_message(question)?;
            let token = state.conversation.begin_request();
            let document = state
                .documents
                .first()
                .unwrap_or(DEFAULT_DOCUMENT_URL)
                .to_string();
            (token, document)
        };

        tracing::info!(%document, "question submitted");
        let request = QueryRequest::new(question, document);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_query(
            Arc::clone(&self.state),
            Arc::clone(&self.backend),
            request,
            token,
            cancel.clone(),
        ));
        Some(PendingQuery {
            cancel,
            task,
            state: Arc::clone(&self.state),
            token,
        })
    }

    /// Submit and wait for the outcome.
    pub async fn ask(&self, question: &str) -> Option<QueryOutcome> {
        let pending = self.submit(question)?;
        Some(pending.wait().await)
    }
}

async fn run_query(
    state: Arc<Mutex<SessionState>>,
    backend: Arc<dyn QueryBackend>,
    request: QueryRequest,
    token: RequestToken,
    cancel: CancellationToken,
) -> QueryOutcome {
    let result = tokio::select! {
        _ = cancel.cancelled() => None,
        result = backend.query(&request) => Some(result),
    };

    let mut guard = lock(&state);
    let stores = &mut *guard;
    let outcome = match result {
        None => {
            tracing::info!("query cancelled");
            QueryOutcome::Cancelled
        }
        Some(Ok(response)) => {
            let content = response.first_answer().unwrap_or(NO_ANSWER_FALLBACK);
            let sources = stores.documents.snapshot();
            let message = stores
                .conversation
                .append_assistant_message(content, Some(sources));
            QueryOutcome::Answered(message.clone())
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "query failed");
            let message = stores
                .conversation
                .append_assistant_message(QUERY_ERROR_MESSAGE, None);
            QueryOutcome::Failed(message.clone())
        }
    };
    stores.conversation.settle(token);
    outcome
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

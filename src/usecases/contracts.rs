use anyhow::Result;

use crate::domain::{
    events::{AppEvent, FailureKind},
    inbox_state::InboxState,
    session::Credentials,
};

use super::{
    create_thread::ThreadCreator, list_threads::ThreadsSource, load_messages::MessagesSource,
    send_message::{MessageSender, SendRequest},
    view_scope::ScopeToken,
};

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

pub trait InboxOrchestrator {
    fn state(&self) -> &InboxState;
    /// Signed-in user the inbox is rendered for; empty without a session.
    fn user_id(&self) -> &str;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}

/// Errors reported by a backend source, before use-case mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    Unauthorized,
    NotFound,
    Unavailable,
    InvalidData,
}

impl From<SourceError> for FailureKind {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Unauthorized => FailureKind::Unauthorized,
            SourceError::NotFound => FailureKind::NotFound,
            SourceError::Unavailable => FailureKind::Unavailable,
            SourceError::InvalidData => FailureKind::InvalidData,
        }
    }
}

/// Everything the inbox needs from the chat backend.
pub trait ChatBackend: ThreadsSource + MessagesSource + MessageSender + ThreadCreator {}

impl<T> ChatBackend for T where T: ThreadsSource + MessagesSource + MessageSender + ThreadCreator {}

/// Starts network operations without blocking the UI loop. Results come
/// back later as [`AppEvent::Backend`] events.
pub trait BackendDispatcher {
    fn list_threads(&self, credentials: Credentials);
    fn fetch_messages(&self, credentials: Credentials, thread_id: String, scope: ScopeToken);
    fn send_message(&self, credentials: Credentials, request: SendRequest, correlation_id: String);
}

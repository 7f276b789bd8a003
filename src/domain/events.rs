use super::{message::Message, thread::Thread};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    InputKey(KeyInput),
    ViewportResized { width: u16, height: u16 },
    Backend(BackendEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }
}

/// Why a backend operation did not produce a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    NotFound,
    Unavailable,
    InvalidData,
}

impl FailureKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::NotFound => "not_found",
            FailureKind::Unavailable => "unavailable",
            FailureKind::InvalidData => "invalid_data",
        }
    }
}

/// Completed network operations, delivered back to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    ThreadsListed(Result<Vec<Thread>, FailureKind>),
    MessagesFetched {
        thread_id: String,
        scope: u64,
        result: Result<Vec<Message>, FailureKind>,
    },
    MessageSent {
        thread_id: String,
        correlation_id: String,
        /// `Ok(None)`: accepted, but no stored copy came back.
        result: Result<Option<Message>, FailureKind>,
    },
}

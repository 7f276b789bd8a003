//! Optimistic message sending.
//!
//! [`prepare_send`] validates a submission and builds the provisional record
//! the inbox shows right away; [`send_message`] performs the network call
//! whose result later confirms or fails that record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    events::FailureKind,
    message::{Attachment, AttachmentKind, Message},
    session::Credentials,
    thread_store::ThreadStore,
};

use super::contracts::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub thread_id: String,
    pub text: String,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
}

impl SendMessageCommand {
    pub fn text(thread_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            text: text.into(),
            file_url: None,
            file_type: None,
        }
    }
}

/// Body of `POST /chats/send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub thread_id: String,
    pub text: String,
    pub file_url: Option<String>,
    pub sender_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSend {
    pub provisional: Message,
    pub correlation_id: String,
    pub receiver_id: String,
    pub request: SendRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// Message text is empty after trimming whitespace.
    EmptyMessage,
    MissingCredentials,
    ThreadNotFound,
    /// The current user is not one of the thread's participants.
    NotAParticipant,
    /// The thread has no participant other than the sender.
    NoRecipient,
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

impl SendMessageError {
    pub fn code(&self) -> &'static str {
        match self {
            SendMessageError::EmptyMessage => "SEND_EMPTY_MESSAGE",
            SendMessageError::MissingCredentials => "SEND_MISSING_CREDENTIALS",
            SendMessageError::ThreadNotFound => "SEND_THREAD_NOT_FOUND",
            SendMessageError::NotAParticipant => "SEND_NOT_A_PARTICIPANT",
            SendMessageError::NoRecipient => "SEND_NO_RECIPIENT",
            SendMessageError::Unauthorized => "SEND_UNAUTHORIZED",
            SendMessageError::TemporarilyUnavailable => "SEND_UNAVAILABLE",
            SendMessageError::DataContractViolation => "SEND_INVALID_RESPONSE",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            SendMessageError::EmptyMessage => "Type a message first.",
            SendMessageError::MissingCredentials => "Not signed in: set session credentials.",
            SendMessageError::ThreadNotFound => "This conversation is no longer available.",
            SendMessageError::NotAParticipant => "You are not a participant of this conversation.",
            SendMessageError::NoRecipient => "This conversation has no recipient.",
            SendMessageError::Unauthorized => "Session expired: sign in again.",
            SendMessageError::TemporarilyUnavailable => "Message not delivered: backend unavailable.",
            SendMessageError::DataContractViolation => "Message not delivered: unexpected response.",
        }
    }
}

impl From<SendMessageError> for FailureKind {
    fn from(error: SendMessageError) -> Self {
        match error {
            SendMessageError::Unauthorized
            | SendMessageError::MissingCredentials
            | SendMessageError::NotAParticipant => {
                FailureKind::Unauthorized
            }
            SendMessageError::ThreadNotFound | SendMessageError::NoRecipient => {
                FailureKind::NotFound
            }
            SendMessageError::DataContractViolation | SendMessageError::EmptyMessage => {
                FailureKind::InvalidData
            }
            SendMessageError::TemporarilyUnavailable => FailureKind::Unavailable,
        }
    }
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends the message. `Ok(None)` means the backend accepted it but did not
    /// return a stored copy to reconcile against.
    async fn send_message(
        &self,
        request: &SendRequest,
        credentials: &Credentials,
    ) -> Result<Option<Message>, SourceError>;
}

/// Validates a submission against the store and builds the provisional
/// message plus the request that will confirm it. Nothing is mutated here;
/// on error the caller must neither touch the store nor send anything.
pub fn prepare_send(
    command: SendMessageCommand,
    credentials: Option<&Credentials>,
    store: &ThreadStore,
    sender_type: &str,
    now: DateTime<Utc>,
) -> Result<PreparedSend, SendMessageError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let credentials = credentials.ok_or(SendMessageError::MissingCredentials)?;

    let thread = store
        .get(&command.thread_id)
        .ok_or(SendMessageError::ThreadNotFound)?;

    if !thread.has_participant(credentials.user_id()) {
        return Err(SendMessageError::NotAParticipant);
    }

    let receiver_id = thread
        .counterpart_of(credentials.user_id())
        .ok_or(SendMessageError::NoRecipient)?
        .to_owned();

    let file_url = command
        .file_url
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty());

    let attachment = file_url.as_ref().map(|url| Attachment {
        url: url.clone(),
        kind: AttachmentKind::from_file_type(command.file_type.as_deref()),
    });

    let provisional = Message::provisional(credentials.user_id(), text, attachment, now);
    let correlation_id = provisional
        .id
        .correlation_id()
        .unwrap_or_default()
        .to_owned();

    Ok(PreparedSend {
        correlation_id,
        receiver_id,
        request: SendRequest {
            thread_id: thread.id.clone(),
            text: text.to_owned(),
            file_url,
            sender_type: sender_type.to_owned(),
        },
        provisional,
    })
}

pub async fn send_message(
    sender: &dyn MessageSender,
    credentials: &Credentials,
    request: &SendRequest,
) -> Result<Option<Message>, SendMessageError> {
    sender
        .send_message(request, credentials)
        .await
        .map_err(map_source_error)
}

fn map_source_error(error: SourceError) -> SendMessageError {
    match error {
        SourceError::Unauthorized => SendMessageError::Unauthorized,
        SourceError::NotFound => SendMessageError::ThreadNotFound,
        SourceError::Unavailable => SendMessageError::TemporarilyUnavailable,
        SourceError::InvalidData => SendMessageError::DataContractViolation,
    }
}

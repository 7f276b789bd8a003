use async_trait::async_trait;

use crate::domain::session::Credentials;

use super::contracts::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThreadCommand {
    pub participant_id: String,
    pub task_id: Option<String>,
}

/// Body of `POST /chats/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThreadRequest {
    pub participant_ids: Vec<String>,
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateThreadError {
    MissingCredentials,
    InvalidParticipant,
    Unauthorized,
    ParticipantNotFound,
    TemporarilyUnavailable,
    DataContractViolation,
}

#[async_trait]
pub trait ThreadCreator: Send + Sync {
    /// Returns the id of the created (or existing) thread.
    async fn create_thread(
        &self,
        request: &CreateThreadRequest,
        credentials: &Credentials,
    ) -> Result<String, SourceError>;
}

pub async fn create_thread(
    creator: &dyn ThreadCreator,
    credentials: Option<&Credentials>,
    command: CreateThreadCommand,
) -> Result<String, CreateThreadError> {
    let credentials = credentials.ok_or(CreateThreadError::MissingCredentials)?;

    let participant_id = command.participant_id.trim();
    if participant_id.is_empty() || participant_id == credentials.user_id() {
        return Err(CreateThreadError::InvalidParticipant);
    }

    let request = CreateThreadRequest {
        participant_ids: vec![
            credentials.user_id().to_owned(),
            participant_id.to_owned(),
        ],
        task_id: command
            .task_id
            .map(|task| task.trim().to_owned())
            .filter(|task| !task.is_empty()),
    };

    let thread_id = creator
        .create_thread(&request, credentials)
        .await
        .map_err(map_source_error)?;

    if thread_id.trim().is_empty() {
        return Err(CreateThreadError::DataContractViolation);
    }

    tracing::info!(thread_id = %thread_id, "thread created");
    Ok(thread_id)
}

fn map_source_error(error: SourceError) -> CreateThreadError {
    match error {
        SourceError::Unauthorized => CreateThreadError::Unauthorized,
        SourceError::NotFound => CreateThreadError::ParticipantNotFound,
        SourceError::Unavailable => CreateThreadError::TemporarilyUnavailable,
        SourceError::InvalidData => CreateThreadError::DataContractViolation,
    }
}

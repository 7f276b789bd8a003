use async_trait::async_trait;

use crate::domain::{events::FailureKind, session::Credentials, thread::Thread};

use super::contracts::SourceError;

#[async_trait]
pub trait ThreadsSource: Send + Sync {
    async fn list_threads(&self, credentials: &Credentials) -> Result<Vec<Thread>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListThreadsError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

impl From<ListThreadsError> for FailureKind {
    fn from(error: ListThreadsError) -> Self {
        match error {
            ListThreadsError::Unauthorized => FailureKind::Unauthorized,
            ListThreadsError::TemporarilyUnavailable => FailureKind::Unavailable,
            ListThreadsError::DataContractViolation => FailureKind::InvalidData,
        }
    }
}

/// Lists the user's threads. Without credentials nothing is requested and
/// `Ok(None)` is returned.
pub async fn list_threads(
    source: &dyn ThreadsSource,
    credentials: Option<&Credentials>,
) -> Result<Option<Vec<Thread>>, ListThreadsError> {
    let Some(credentials) = credentials else {
        tracing::debug!("thread list skipped: no credentials");
        return Ok(None);
    };

    let threads = source
        .list_threads(credentials)
        .await
        .map_err(map_source_error)?;

    Ok(Some(threads))
}

fn map_source_error(error: SourceError) -> ListThreadsError {
    match error {
        SourceError::Unauthorized => ListThreadsError::Unauthorized,
        SourceError::Unavailable | SourceError::NotFound => {
            ListThreadsError::TemporarilyUnavailable
        }
        SourceError::InvalidData => ListThreadsError::DataContractViolation,
    }
}

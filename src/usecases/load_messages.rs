use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::{events::FailureKind, message::Message, session::Credentials};

use super::contracts::SourceError;

#[async_trait]
pub trait MessagesSource: Send + Sync {
    async fn fetch_messages(
        &self,
        thread_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Message>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesQuery {
    pub thread_id: String,
}

impl LoadMessagesQuery {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMessagesError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
    ThreadNotFound,
}

impl From<LoadMessagesError> for FailureKind {
    fn from(error: LoadMessagesError) -> Self {
        match error {
            LoadMessagesError::Unauthorized => FailureKind::Unauthorized,
            LoadMessagesError::TemporarilyUnavailable => FailureKind::Unavailable,
            LoadMessagesError::DataContractViolation => FailureKind::InvalidData,
            LoadMessagesError::ThreadNotFound => FailureKind::NotFound,
        }
    }
}

pub async fn load_messages(
    source: &dyn MessagesSource,
    credentials: &Credentials,
    query: LoadMessagesQuery,
) -> Result<Vec<Message>, LoadMessagesError> {
    source
        .fetch_messages(&query.thread_id, credentials)
        .await
        .map_err(map_source_error)
}

fn map_source_error(error: SourceError) -> LoadMessagesError {
    match error {
        SourceError::Unauthorized => LoadMessagesError::Unauthorized,
        SourceError::Unavailable => LoadMessagesError::TemporarilyUnavailable,
        SourceError::InvalidData => LoadMessagesError::DataContractViolation,
        SourceError::NotFound => LoadMessagesError::ThreadNotFound,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingInput,
    AlreadyFetched,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    Issue,
    Skip(SkipReason),
}

/// Session-wide record of which threads already had their messages fetched.
///
/// Memoized by thread id only: a fetched thread is never fetched again in
/// the same session. Failed or abandoned fetches are forgotten so the next
/// selection can retry.
#[derive(Debug, Clone, Default)]
pub struct FetchedThreads {
    fetched: HashSet<String>,
    in_flight: HashMap<String, u64>,
}

impl FetchedThreads {
    pub fn contains(&self, thread_id: &str) -> bool {
        self.fetched.contains(thread_id)
    }

    pub fn is_in_flight(&self, thread_id: &str) -> bool {
        self.in_flight.contains_key(thread_id)
    }

    pub fn plan(&self, thread_id: &str, credentials: Option<&Credentials>) -> FetchDecision {
        if thread_id.trim().is_empty() || credentials.is_none() {
            return FetchDecision::Skip(SkipReason::MissingInput);
        }

        if self.contains(thread_id) {
            return FetchDecision::Skip(SkipReason::AlreadyFetched);
        }

        if self.is_in_flight(thread_id) {
            return FetchDecision::Skip(SkipReason::InFlight);
        }

        FetchDecision::Issue
    }

    pub fn begin(&mut self, thread_id: &str, scope: u64) {
        self.in_flight.insert(thread_id.to_owned(), scope);
    }

    /// Records a finished fetch. Returns `false` when the result belongs to
    /// a scope that is no longer current; such results must be dropped.
    pub fn complete(&mut self, thread_id: &str, scope: u64, succeeded: bool) -> bool {
        if self.in_flight.get(thread_id) != Some(&scope) {
            return false;
        }

        self.in_flight.remove(thread_id);
        if succeeded {
            self.fetched.insert(thread_id.to_owned());
        }
        true
    }

    pub fn abandon(&mut self, thread_id: &str) {
        self.in_flight.remove(thread_id);
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use thiserror::Error;

use crate::{
    domain::{message::Message, session::Credentials, thread::Thread},
    infra::{config::BackendConfig, error::AppError, secrets::redact_body},
    usecases::{
        contracts::SourceError,
        create_thread::{CreateThreadRequest, ThreadCreator},
        list_threads::ThreadsSource,
        load_messages::MessagesSource,
        send_message::{MessageSender, SendRequest},
    },
};

use super::wire::{self, WireCreateBody, WireError, WireSendBody};

const BACKEND_REQUEST_FAILED: &str = "BACKEND_REQUEST_FAILED";
const BACKEND_RESPONSE_INVALID: &str = "BACKEND_RESPONSE_INVALID";
const BACKEND_SEND_UNRECONCILED: &str = "BACKEND_SEND_UNRECONCILED";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,
    #[error("base url `{0}` cannot take path segments")]
    InvalidBaseUrl(String),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response: {0}")]
    Decode(#[from] WireError),
}

impl BackendError {
    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error)
        }
    }
}

impl From<BackendError> for SourceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Timeout
            | BackendError::Transport(_)
            | BackendError::InvalidBaseUrl(_) => SourceError::Unavailable,
            BackendError::Status { status, .. } => match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized,
                StatusCode::NOT_FOUND => SourceError::NotFound,
                status if status.is_server_error() => SourceError::Unavailable,
                StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                    SourceError::Unavailable
                }
                _ => SourceError::InvalidData,
            },
            BackendError::Decode(_) => SourceError::InvalidData,
        }
    }
}

/// Chat API client over HTTP+JSON with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::BackendInit)?;

        let base_url = Url::parse(config.base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| AppError::InvalidConfig {
                details: format!("backend.base_url `{}` is not a usable URL", config.base_url),
            })?;

        Ok(Self { client, base_url })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> Result<String, BackendError> {
        let response = request
            .bearer_auth(credentials.auth_token())
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(BackendError::from_transport)?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: redact_body(&body),
            });
        }

        tracing::debug!(operation, status = status.as_u16(), bytes = body.len(), "backend request completed");
        Ok(body)
    }

    async fn get_threads(&self, credentials: &Credentials) -> Result<Vec<Thread>, BackendError> {
        let request = self
            .client
            .get(self.url(&["chats", "threads"])?)
            .query(&[("userId", credentials.user_id())]);
        let body = self.execute("list_threads", request, credentials).await?;

        Ok(wire::decode_threads(&body)?)
    }

    async fn get_messages(
        &self,
        thread_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Message>, BackendError> {
        let request = self
            .client
            .get(self.url(&["chats", thread_id, "messages"])?);
        let body = self.execute("fetch_messages", request, credentials).await?;

        Ok(wire::decode_messages(&body)?)
    }

    async fn post_message(
        &self,
        send: &SendRequest,
        credentials: &Credentials,
    ) -> Result<Option<Message>, BackendError> {
        let request = self
            .client
            .post(self.url(&["chats", "send"])?)
            .json(&WireSendBody::from(send));
        let body = self.execute("send_message", request, credentials).await?;

        Ok(stored_copy(&body))
    }

    async fn post_thread(
        &self,
        create: &CreateThreadRequest,
        credentials: &Credentials,
    ) -> Result<String, BackendError> {
        let request = self
            .client
            .post(self.url(&["chats", "create"])?)
            .json(&WireCreateBody::from(create));
        let body = self.execute("create_thread", request, credentials).await?;

        Ok(wire::decode_created_thread_id(&body)?)
    }
}

/// A 2xx send means the backend stored the message even when the body is
/// not a message record we can reconcile against.
fn stored_copy(body: &str) -> Option<Message> {
    match wire::decode_message(body) {
        Ok(message) => Some(message),
        Err(error) => {
            tracing::warn!(code = BACKEND_SEND_UNRECONCILED, error = %error, "send accepted without a stored copy");
            None
        }
    }
}

fn report(operation: &'static str, error: BackendError) -> SourceError {
    match &error {
        BackendError::Decode(_) => {
            tracing::warn!(code = BACKEND_RESPONSE_INVALID, operation, error = %error, "backend response rejected");
        }
        _ => {
            tracing::warn!(code = BACKEND_REQUEST_FAILED, operation, error = %error, "backend request failed");
        }
    }

    error.into()
}

#[async_trait]
impl ThreadsSource for HttpBackend {
    async fn list_threads(&self, credentials: &Credentials) -> Result<Vec<Thread>, SourceError> {
        self.get_threads(credentials)
            .await
            .map_err(|error| report("list_threads", error))
    }
}

#[async_trait]
impl MessagesSource for HttpBackend {
    async fn fetch_messages(
        &self,
        thread_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Message>, SourceError> {
        self.get_messages(thread_id, credentials)
            .await
            .map_err(|error| report("fetch_messages", error))
    }
}

#[async_trait]
impl MessageSender for HttpBackend {
    async fn send_message(
        &self,
        request: &SendRequest,
        credentials: &Credentials,
    ) -> Result<Option<Message>, SourceError> {
        self.post_message(request, credentials)
            .await
            .map_err(|error| report("send_message", error))
    }
}

#[async_trait]
impl ThreadCreator for HttpBackend {
    async fn create_thread(
        &self,
        request: &CreateThreadRequest,
        credentials: &Credentials,
    ) -> Result<String, SourceError> {
        self.post_thread(request, credentials)
            .await
            .map_err(|error| report("create_thread", error))
    }
}

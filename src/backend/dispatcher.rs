use std::sync::{mpsc::Sender, Arc};

use tokio::runtime::{Handle, Runtime};

use crate::{
    domain::{
        events::{AppEvent, BackendEvent, FailureKind},
        session::Credentials,
    },
    usecases::{
        contracts::{BackendDispatcher, ChatBackend},
        list_threads::list_threads,
        load_messages::{load_messages, LoadMessagesQuery},
        send_message::{send_message, SendRequest},
        view_scope::ScopeToken,
    },
};

const DISPATCHER_EVENT_DROPPED: &str = "BACKEND_DISPATCHER_EVENT_DROPPED";

/// Runs backend calls on a tokio runtime and posts their results to the UI
/// loop as [`AppEvent::Backend`] events.
pub struct TokioDispatcher<B> {
    handle: Handle,
    backend: Arc<B>,
    events: Sender<AppEvent>,
}

impl<B> TokioDispatcher<B>
where
    B: ChatBackend + 'static,
{
    pub fn new(runtime: &Runtime, backend: Arc<B>, events: Sender<AppEvent>) -> Self {
        Self {
            handle: runtime.handle().clone(),
            backend,
            events,
        }
    }
}

fn post(events: &Sender<AppEvent>, event: BackendEvent) {
    if events.send(AppEvent::Backend(event)).is_err() {
        tracing::debug!(code = DISPATCHER_EVENT_DROPPED, "ui loop gone; backend result dropped");
    }
}

impl<B> BackendDispatcher for TokioDispatcher<B>
where
    B: ChatBackend + 'static,
{
    fn list_threads(&self, credentials: Credentials) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        self.handle.spawn(async move {
            let result = match list_threads(backend.as_ref(), Some(&credentials)).await {
                Ok(threads) => Ok(threads.unwrap_or_default()),
                Err(error) => Err(FailureKind::from(error)),
            };
            post(&events, BackendEvent::ThreadsListed(result));
        });
    }

    fn fetch_messages(&self, credentials: Credentials, thread_id: String, scope: ScopeToken) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let mut cancel = scope.clone();

        self.handle.spawn(async move {
            let query = LoadMessagesQuery::new(thread_id.clone());

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(thread_id = %thread_id, scope = scope.id(), "message fetch cancelled");
                    return;
                }
                result = load_messages(backend.as_ref(), &credentials, query) => result,
            };

            if scope.is_cancelled() {
                tracing::debug!(thread_id = %thread_id, scope = scope.id(), "message fetch finished after cancellation");
                return;
            }

            post(
                &events,
                BackendEvent::MessagesFetched {
                    thread_id,
                    scope: scope.id(),
                    result: result.map_err(FailureKind::from),
                },
            );
        });
    }

    fn send_message(&self, credentials: Credentials, request: SendRequest, correlation_id: String) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        self.handle.spawn(async move {
            let result = send_message(backend.as_ref(), &credentials, &request)
                .await
                .map_err(FailureKind::from);

            post(
                &events,
                BackendEvent::MessageSent {
                    thread_id: request.thread_id,
                    correlation_id,
                    result,
                },
            );
        });
    }
}

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;

use crate::{
    domain::{
        events::{AppEvent, BackendEvent, FailureKind, KeyInput},
        inbox_state::{ActivePane, InboxAction, InboxState, LoadStatus},
        message::Message,
        selection::SelectedThread,
        session::Credentials,
        thread::Thread,
        thread_store::StoreAction,
    },
    infra::contracts::ExternalOpener,
};

use super::{
    contracts::{BackendDispatcher, InboxOrchestrator},
    load_messages::{FetchDecision, FetchedThreads, SkipReason},
    send_message::{prepare_send, SendMessageCommand},
    view_scope::ViewScope,
};

const THREADS_LOAD_FAILED: &str = "INBOX_THREADS_LOAD_FAILED";
const MESSAGES_LOAD_FAILED: &str = "INBOX_MESSAGES_LOAD_FAILED";
const MESSAGES_REJECTED: &str = "INBOX_MESSAGES_REJECTED";
const SEND_REJECTED: &str = "INBOX_SEND_REJECTED";
const SEND_FAILED: &str = "INBOX_SEND_FAILED";
const SEND_UNRECONCILED: &str = "INBOX_SEND_UNRECONCILED";
const ATTACHMENT_OPEN_FAILED: &str = "INBOX_ATTACHMENT_OPEN_FAILED";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboxSettings {
    pub sender_type: String,
    /// Periodic thread list refresh; `None` disables it.
    pub refresh_interval: Option<Duration>,
    /// Thread to select as soon as it shows up in the list.
    pub open_thread_id: Option<String>,
}

pub struct DefaultInboxOrchestrator<D, O>
where
    D: BackendDispatcher,
    O: ExternalOpener,
{
    state: InboxState,
    dispatcher: D,
    opener: O,
    credentials: Option<Credentials>,
    settings: InboxSettings,
    fetched: FetchedThreads,
    detail_scope: Option<(String, ViewScope)>,
    next_scope_id: u64,
    last_refresh: Option<Instant>,
}

impl<D, O> DefaultInboxOrchestrator<D, O>
where
    D: BackendDispatcher,
    O: ExternalOpener,
{
    pub fn new(
        state: InboxState,
        dispatcher: D,
        opener: O,
        credentials: Option<Credentials>,
        settings: InboxSettings,
    ) -> Self {
        Self {
            state,
            dispatcher,
            opener,
            credentials,
            settings,
            fetched: FetchedThreads::default(),
            detail_scope: None,
            next_scope_id: 1,
            last_refresh: None,
        }
    }

    pub fn fetched(&self) -> &FetchedThreads {
        &self.fetched
    }

    /// Requests the thread list for the signed-in user.
    pub fn refresh_threads(&mut self) {
        self.last_refresh = Some(Instant::now());

        let Some(credentials) = self.credentials.clone() else {
            tracing::debug!("thread refresh skipped: no credentials");
            return;
        };

        self.state.set_list_status(LoadStatus::Loading);
        self.dispatcher.list_threads(credentials);
    }

    pub fn select_thread(
        &mut self,
        thread_id: &str,
        display_name: impl Into<String>,
        avatar_url: Option<String>,
    ) {
        if self
            .detail_scope
            .as_ref()
            .is_some_and(|(scoped_id, _)| scoped_id != thread_id)
        {
            self.release_detail_scope();
        }

        self.state
            .dispatch(InboxAction::SelectionChanged(Some(SelectedThread {
                thread_id: thread_id.to_owned(),
                display_name: display_name.into(),
                avatar_url,
            })));

        match self.fetched.plan(thread_id, self.credentials.as_ref()) {
            FetchDecision::Issue => self.issue_fetch(thread_id),
            FetchDecision::Skip(SkipReason::AlreadyFetched) => {
                self.state.set_detail_status(LoadStatus::Ready);
                self.mark_thread_read(thread_id);
            }
            FetchDecision::Skip(SkipReason::InFlight) => {
                self.state.set_detail_status(LoadStatus::Loading);
            }
            FetchDecision::Skip(SkipReason::MissingInput) => {
                tracing::debug!(thread_id, "message fetch skipped: no credentials");
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.release_detail_scope();
        self.state.dispatch(InboxAction::SelectionChanged(None));
    }

    pub fn mark_thread_read(&mut self, thread_id: &str) {
        self.state.dispatch(
            StoreAction::UnreadCleared {
                thread_id: thread_id.to_owned(),
            }
            .into(),
        );
    }

    /// Sends the composer text to the selected thread, optimistically.
    pub fn submit_message(&mut self) {
        let Some(thread_id) = self.state.selection().selected_thread_id().map(str::to_owned)
        else {
            return;
        };

        let command =
            SendMessageCommand::text(thread_id.clone(), self.state.message_input().text());
        let prepared = match prepare_send(
            command,
            self.credentials.as_ref(),
            self.state.store(),
            &self.settings.sender_type,
            Utc::now(),
        ) {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::warn!(
                    code = SEND_REJECTED,
                    reason = error.code(),
                    thread_id = %thread_id,
                    "message submission rejected"
                );
                self.state.set_notice(error.user_message());
                return;
            }
        };

        let Some(credentials) = self.credentials.clone() else {
            return;
        };

        self.state.message_input_mut().take();
        self.state.clear_notice();

        tracing::debug!(
            thread_id = %thread_id,
            receiver_id = %prepared.receiver_id,
            correlation_id = %prepared.correlation_id,
            "sending message optimistically"
        );

        self.state.dispatch(
            StoreAction::MessageAppended {
                thread_id,
                message: prepared.provisional,
            }
            .into(),
        );
        self.dispatcher
            .send_message(credentials, prepared.request, prepared.correlation_id);
    }

    fn issue_fetch(&mut self, thread_id: &str) {
        let Some(credentials) = self.credentials.clone() else {
            return;
        };

        let scope = ViewScope::new(self.next_scope_id);
        self.next_scope_id += 1;

        self.fetched.begin(thread_id, scope.id());
        self.state.set_detail_status(LoadStatus::Loading);
        self.dispatcher
            .fetch_messages(credentials, thread_id.to_owned(), scope.token());
        self.detail_scope = Some((thread_id.to_owned(), scope));
    }

    fn release_detail_scope(&mut self) {
        if let Some((thread_id, scope)) = self.detail_scope.take() {
            self.fetched.abandon(&thread_id);
            tracing::debug!(thread_id = %thread_id, scope = scope.id(), "detail view scope released");
        }
    }

    fn select_highlighted(&mut self) {
        let Some(thread) = self
            .state
            .highlighted_thread_id()
            .and_then(|id| self.state.store().get(id))
        else {
            return;
        };

        let (thread_id, display_name, avatar_url) = selection_details(thread, self.user_id());
        self.select_thread(&thread_id, display_name, avatar_url);
    }

    fn open_requested_thread(&mut self) {
        let Some(thread_id) = self.settings.open_thread_id.clone() else {
            return;
        };

        let Some(thread) = self.state.store().get(&thread_id) else {
            tracing::warn!(thread_id = %thread_id, "requested thread is not in the list");
            return;
        };

        self.settings.open_thread_id = None;
        let (thread_id, display_name, avatar_url) = selection_details(thread, self.user_id());
        self.select_thread(&thread_id, display_name, avatar_url);
    }

    fn open_attachment_under_cursor(&mut self) -> Result<()> {
        let Some(url) = self.attachment_under_cursor() else {
            self.state.set_notice("No attachment on this message.");
            return Ok(());
        };

        if let Err(error) = self.opener.open(&url) {
            tracing::warn!(code = ATTACHMENT_OPEN_FAILED, error = %error, "attachment open failed");
            self.state.set_notice("Could not open attachment.");
        }

        Ok(())
    }

    fn attachment_under_cursor(&self) -> Option<String> {
        let thread_id = self.state.selection().selected_thread_id()?;
        let index = self.state.message_cursor()?;
        self.state
            .store()
            .messages(thread_id)
            .get(index)
            .and_then(|message| message.attachment.as_ref())
            .map(|attachment| attachment.url.clone())
    }

    fn handle_key(&mut self, key: KeyInput) -> Result<()> {
        if key.ctrl && key.key == "c" {
            self.state.stop();
            return Ok(());
        }

        match self.state.active_pane() {
            ActivePane::ThreadList => match key.key.as_str() {
                "q" => self.state.stop(),
                "j" | "down" => self.state.highlight_next(),
                "k" | "up" => self.state.highlight_previous(),
                "enter" | "l" | "right" => self.select_highlighted(),
                "r" => self.refresh_threads(),
                _ => {}
            },
            ActivePane::Messages => match key.key.as_str() {
                "q" => self.state.stop(),
                "h" | "esc" | "left" => self.clear_selection(),
                "j" | "down" => self.state.select_next_message(),
                "k" | "up" => self.state.select_previous_message(),
                "i" => self.state.set_active_pane(ActivePane::MessageInput),
                "o" => self.open_attachment_under_cursor()?,
                "r" => self.refresh_threads(),
                _ => {}
            },
            ActivePane::MessageInput => match key.key.as_str() {
                "esc" => self.state.set_active_pane(ActivePane::Messages),
                "enter" => self.submit_message(),
                other => {
                    let input = self.state.message_input_mut();
                    match other {
                        "backspace" => input.backspace(),
                        "delete" => input.delete(),
                        "left" => input.move_left(),
                        "right" => input.move_right(),
                        "home" => input.move_home(),
                        "end" => input.move_end(),
                        _ if key.ctrl => {}
                        text => {
                            let mut chars = text.chars();
                            if let (Some(ch), None) = (chars.next(), chars.next()) {
                                input.insert_char(ch);
                            }
                        }
                    }
                }
            },
        }

        Ok(())
    }

    fn handle_backend(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::ThreadsListed(Ok(threads)) => {
                tracing::debug!(count = threads.len(), "thread list received");
                self.state
                    .dispatch(StoreAction::ThreadsReplaced(threads).into());
                if self.state.selection().selected().is_none() {
                    self.release_detail_scope();
                }
                self.state.set_list_status(LoadStatus::Ready);
                self.open_requested_thread();
            }
            BackendEvent::ThreadsListed(Err(kind)) => {
                tracing::warn!(code = THREADS_LOAD_FAILED, reason = kind.as_label(), "thread list failed");
                self.state.set_list_status(LoadStatus::Error);
            }
            BackendEvent::MessagesFetched {
                thread_id,
                scope,
                result,
            } => self.apply_fetched_messages(thread_id, scope, result),
            BackendEvent::MessageSent {
                thread_id,
                correlation_id,
                result,
            } => self.apply_send_result(thread_id, correlation_id, result),
        }
    }

    fn apply_fetched_messages(
        &mut self,
        thread_id: String,
        scope: u64,
        result: Result<Vec<Message>, FailureKind>,
    ) {
        if !self.fetched.complete(&thread_id, scope, result.is_ok()) {
            tracing::debug!(thread_id = %thread_id, scope, "dropping messages for a closed view");
            return;
        }

        if self
            .detail_scope
            .as_ref()
            .is_some_and(|(_, current)| current.id() == scope)
        {
            self.detail_scope = None;
        }

        let is_selected = self.state.selection().is_selected(&thread_id);

        match result {
            Ok(mut messages) => {
                if let Some(thread) = self.state.store().get(&thread_id) {
                    let received = messages.len();
                    messages.retain(|message| thread.has_participant(&message.sender_id));
                    if messages.len() < received {
                        tracing::warn!(
                            code = MESSAGES_REJECTED,
                            thread_id = %thread_id,
                            dropped = received - messages.len(),
                            "dropping messages from non-participants"
                        );
                    }
                }

                self.state.dispatch(
                    StoreAction::MessagesLoaded {
                        thread_id: thread_id.clone(),
                        messages,
                    }
                    .into(),
                );
                if is_selected {
                    self.state.set_detail_status(LoadStatus::Ready);
                    self.mark_thread_read(&thread_id);
                }
            }
            Err(kind) => {
                tracing::warn!(
                    code = MESSAGES_LOAD_FAILED,
                    thread_id = %thread_id,
                    reason = kind.as_label(),
                    "message fetch failed"
                );
                if is_selected {
                    self.state.set_detail_status(LoadStatus::Error);
                }
            }
        }
    }

    fn apply_send_result(
        &mut self,
        thread_id: String,
        correlation_id: String,
        result: Result<Option<Message>, FailureKind>,
    ) {
        match result {
            Ok(Some(message)) => self.state.dispatch(
                StoreAction::MessageConfirmed {
                    thread_id,
                    correlation_id,
                    message,
                }
                .into(),
            ),
            Ok(None) => {
                tracing::warn!(
                    code = SEND_UNRECONCILED,
                    thread_id = %thread_id,
                    correlation_id = %correlation_id,
                    "message accepted without a stored copy"
                );
                self.state.dispatch(
                    StoreAction::MessageAccepted {
                        thread_id,
                        correlation_id,
                    }
                    .into(),
                );
            }
            Err(kind) => {
                tracing::error!(
                    code = SEND_FAILED,
                    thread_id = %thread_id,
                    correlation_id = %correlation_id,
                    reason = kind.as_label(),
                    "message send failed"
                );
                self.state.dispatch(
                    StoreAction::MessageFailed {
                        thread_id,
                        correlation_id,
                    }
                    .into(),
                );
                self.state.set_notice("Message not delivered.");
            }
        }
    }

    fn refresh_due(&self) -> bool {
        match (self.settings.refresh_interval, self.last_refresh) {
            (Some(interval), Some(last)) => last.elapsed() >= interval,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

fn selection_details(thread: &Thread, user_id: &str) -> (String, String, Option<String>) {
    let avatar_url = thread
        .counterpart_of(user_id)
        .and_then(|id| thread.avatar_for(id))
        .map(str::to_owned);

    (thread.id.clone(), thread.title_for(user_id), avatar_url)
}

impl<D, O> InboxOrchestrator for DefaultInboxOrchestrator<D, O>
where
    D: BackendDispatcher,
    O: ExternalOpener,
{
    fn state(&self) -> &InboxState {
        &self.state
    }

    fn user_id(&self) -> &str {
        self.credentials
            .as_ref()
            .map(Credentials::user_id)
            .unwrap_or_default()
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => {
                if self.refresh_due() {
                    self.refresh_threads();
                }
            }
            AppEvent::QuitRequested => self.state.stop(),
            AppEvent::InputKey(key) => self.handle_key(key)?,
            AppEvent::ViewportResized { width, height } => self.state.resize(width, height),
            AppEvent::Backend(event) => self.handle_backend(event),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use chrono::TimeZone;

    use super::*;
    use crate::{
        domain::{
            message::{DeliveryState, MessageId},
            selection::Viewport,
            thread::ParticipantInfo,
        },
        infra::stubs::{NoopOpener, RecordingOpener},
        usecases::{send_message::SendRequest, view_scope::ScopeToken},
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        ListThreads,
        FetchMessages { thread_id: String, scope: u64 },
        Send { request: SendRequest, correlation_id: String },
    }

    #[derive(Clone, Default)]
    struct RecordingDispatcher {
        calls: Rc<RefCell<Vec<Call>>>,
        tokens: Rc<RefCell<Vec<ScopeToken>>>,
    }

    impl RecordingDispatcher {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn fetches(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, Call::FetchMessages { .. }))
                .count()
        }

        fn sends(&self) -> Vec<(SendRequest, String)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Send {
                        request,
                        correlation_id,
                    } => Some((request, correlation_id)),
                    _ => None,
                })
                .collect()
        }
    }

    impl BackendDispatcher for RecordingDispatcher {
        fn list_threads(&self, _credentials: Credentials) {
            self.calls.borrow_mut().push(Call::ListThreads);
        }

        fn fetch_messages(&self, _credentials: Credentials, thread_id: String, scope: ScopeToken) {
            self.calls.borrow_mut().push(Call::FetchMessages {
                thread_id,
                scope: scope.id(),
            });
            self.tokens.borrow_mut().push(scope);
        }

        fn send_message(
            &self,
            _credentials: Credentials,
            request: SendRequest,
            correlation_id: String,
        ) {
            self.calls.borrow_mut().push(Call::Send {
                request,
                correlation_id,
            });
        }
    }

    fn credentials() -> Option<Credentials> {
        Credentials::from_parts(Some("U1"), Some("token"))
    }

    fn thread(id: &str, unread_count: u32) -> Thread {
        let mut participant_info = std::collections::HashMap::new();
        participant_info.insert(
            "U2".to_owned(),
            ParticipantInfo {
                display_name: "Sparkle Cleaners".to_owned(),
                avatar_url: None,
            },
        );

        Thread {
            id: id.to_owned(),
            participant_ids: vec!["U1".to_owned(), "U2".to_owned()],
            participant_info,
            messages: Vec::new(),
            unread_count,
            task_id: None,
        }
    }

    fn server_message(id: &str, text: &str) -> Message {
        Message {
            id: MessageId::Durable(id.to_owned()),
            sender_id: "U2".to_owned(),
            text: text.to_owned(),
            attachment: None,
            timestamp: Utc.timestamp_millis_opt(1_000).single().expect("timestamp"),
            delivery: DeliveryState::Confirmed,
        }
    }

    fn orchestrator_with(
        credentials: Option<Credentials>,
        viewport: Viewport,
    ) -> (
        DefaultInboxOrchestrator<RecordingDispatcher, NoopOpener>,
        RecordingDispatcher,
    ) {
        let dispatcher = RecordingDispatcher::default();
        let mut orchestrator = DefaultInboxOrchestrator::new(
            InboxState::new(viewport),
            dispatcher.clone(),
            NoopOpener,
            credentials,
            InboxSettings {
                sender_type: "manager".to_owned(),
                ..InboxSettings::default()
            },
        );
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::ThreadsListed(Ok(vec![
                thread("T1", 3),
                thread("T2", 1),
            ]))))
            .expect("thread list must apply");
        (orchestrator, dispatcher)
    }

    fn orchestrator() -> (
        DefaultInboxOrchestrator<RecordingDispatcher, NoopOpener>,
        RecordingDispatcher,
    ) {
        orchestrator_with(credentials(), Viewport::new(160, 40, 100))
    }

    fn key(orchestrator: &mut DefaultInboxOrchestrator<RecordingDispatcher, NoopOpener>, key: &str) {
        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new(key, false)))
            .expect("key must be handled");
    }

    fn type_text(
        orchestrator: &mut DefaultInboxOrchestrator<RecordingDispatcher, NoopOpener>,
        text: &str,
    ) {
        key(orchestrator, "i");
        for ch in text.chars() {
            key(orchestrator, &ch.to_string());
        }
    }

    fn deliver_messages(
        orchestrator: &mut DefaultInboxOrchestrator<RecordingDispatcher, NoopOpener>,
        thread_id: &str,
        scope: u64,
        result: Result<Vec<Message>, FailureKind>,
    ) {
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::MessagesFetched {
                thread_id: thread_id.to_owned(),
                scope,
                result,
            }))
            .expect("messages must apply");
    }

    #[test]
    fn stops_on_quit_event() {
        let (mut orchestrator, _) = orchestrator();

        orchestrator
            .handle_event(AppEvent::QuitRequested)
            .expect("event must be handled");

        assert!(!orchestrator.state().is_running());
    }

    #[test]
    fn ctrl_c_quits_even_while_composing() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        key(&mut orchestrator, "i");

        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new("c", true)))
            .expect("event must be handled");

        assert!(!orchestrator.state().is_running());
    }

    #[test]
    fn first_selection_fetches_then_marks_read() {
        let (mut orchestrator, dispatcher) = orchestrator();
        assert!(!orchestrator.fetched().contains("T1"));

        key(&mut orchestrator, "enter");

        assert_eq!(
            dispatcher.calls(),
            vec![Call::FetchMessages {
                thread_id: "T1".to_owned(),
                scope: 1,
            }]
        );
        assert_eq!(orchestrator.state().detail_status(), LoadStatus::Loading);

        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![server_message("m1", "hi")]));

        assert!(orchestrator.fetched().contains("T1"));
        let thread = orchestrator.state().store().get("T1").expect("thread");
        assert_eq!(thread.unread_count, 0);
        assert_eq!(thread.messages.len(), 1);
        assert_eq!(orchestrator.state().detail_status(), LoadStatus::Ready);
    }

    #[test]
    fn repeated_selection_never_refetches() {
        let (mut orchestrator, dispatcher) = orchestrator();

        orchestrator.select_thread("T1", "Sparkle", None);
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));
        orchestrator.clear_selection();
        orchestrator.select_thread("T1", "Sparkle", None);

        assert_eq!(dispatcher.fetches(), 1);
        assert_eq!(orchestrator.state().detail_status(), LoadStatus::Ready);
    }

    #[test]
    fn reselecting_fetched_thread_clears_new_unread_count() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));
        orchestrator.clear_selection();
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::ThreadsListed(Ok(vec![
                thread("T1", 5),
            ]))))
            .expect("thread list must apply");

        orchestrator.select_thread("T1", "Sparkle", None);

        let thread = orchestrator.state().store().get("T1").expect("thread");
        assert_eq!(thread.unread_count, 0);
    }

    #[test]
    fn missing_credentials_make_fetches_silent_noops() {
        let (mut orchestrator, dispatcher) = orchestrator_with(None, Viewport::new(160, 40, 100));

        orchestrator.refresh_threads();
        orchestrator.select_thread("T1", "Sparkle", None);

        assert!(dispatcher.calls().is_empty());
        assert_eq!(
            orchestrator.state().selection().selected_thread_id(),
            Some("T1")
        );
    }

    #[test]
    fn failed_fetch_allows_retry_on_next_selection() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);

        deliver_messages(&mut orchestrator, "T1", 1, Err(FailureKind::Unavailable));
        assert_eq!(orchestrator.state().detail_status(), LoadStatus::Error);
        assert_eq!(
            orchestrator.state().store().get("T1").map(|t| t.unread_count),
            Some(3)
        );

        orchestrator.clear_selection();
        orchestrator.select_thread("T1", "Sparkle", None);
        assert_eq!(dispatcher.fetches(), 2);
    }

    #[test]
    fn switching_threads_cancels_in_flight_fetch_and_drops_late_result() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        orchestrator.select_thread("T2", "Sparkle", None);

        assert!(dispatcher.tokens.borrow()[0].is_cancelled());
        assert!(!dispatcher.tokens.borrow()[1].is_cancelled());

        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![server_message("m1", "late")]));

        assert!(!orchestrator.fetched().contains("T1"));
        assert!(orchestrator.state().store().messages("T1").is_empty());
        assert_eq!(
            orchestrator.state().store().get("T1").map(|t| t.unread_count),
            Some(3)
        );

        orchestrator.select_thread("T1", "Sparkle", None);
        assert_eq!(dispatcher.fetches(), 3);
    }

    #[test]
    fn submit_inserts_provisional_message_before_network_result() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));

        type_text(&mut orchestrator, "hello");
        key(&mut orchestrator, "enter");

        let messages = orchestrator.state().store().messages("T1");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender_id, "U1");
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[0].delivery, DeliveryState::Pending);
        assert!(orchestrator.state().message_input().is_empty());

        let sends = dispatcher.sends();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].0.thread_id, "T1");
        assert_eq!(sends[0].0.sender_type, "manager");
        assert_eq!(messages[0].id.correlation_id(), Some(sends[0].1.as_str()));
    }

    #[test]
    fn whitespace_submit_neither_mutates_store_nor_sends() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));
        let before = orchestrator.state().store().clone();

        type_text(&mut orchestrator, "   ");
        key(&mut orchestrator, "enter");

        assert_eq!(orchestrator.state().store(), &before);
        assert!(dispatcher.sends().is_empty());
        assert!(orchestrator.state().notice().is_some());
    }

    #[test]
    fn send_failure_keeps_message_marked_failed() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));
        type_text(&mut orchestrator, "hello");
        key(&mut orchestrator, "enter");
        let (_, correlation_id) = dispatcher.sends().remove(0);

        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::MessageSent {
                thread_id: "T1".to_owned(),
                correlation_id,
                result: Err(FailureKind::Unavailable),
            }))
            .expect("send result must apply");

        let messages = orchestrator.state().store().messages("T1");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[0].delivery, DeliveryState::Failed);
        assert_eq!(orchestrator.state().notice(), Some("Message not delivered."));
    }

    #[test]
    fn send_success_reconciles_provisional_message() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));
        type_text(&mut orchestrator, "hello");
        key(&mut orchestrator, "enter");
        let (_, correlation_id) = dispatcher.sends().remove(0);

        let mut confirmed = server_message("m7", "hello");
        confirmed.sender_id = "U1".to_owned();
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::MessageSent {
                thread_id: "T1".to_owned(),
                correlation_id,
                result: Ok(Some(confirmed)),
            }))
            .expect("send result must apply");

        let messages = orchestrator.state().store().messages("T1");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, MessageId::Durable("m7".to_owned()));
        assert_eq!(messages[0].delivery, DeliveryState::Confirmed);
    }

    #[test]
    fn send_accepted_without_stored_copy_is_not_reported_as_failed() {
        let (mut orchestrator, dispatcher) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T1", 1, Ok(vec![]));
        type_text(&mut orchestrator, "hello");
        key(&mut orchestrator, "enter");
        let (_, correlation_id) = dispatcher.sends().remove(0);

        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::MessageSent {
                thread_id: "T1".to_owned(),
                correlation_id: correlation_id.clone(),
                result: Ok(None),
            }))
            .expect("send result must apply");

        let messages = orchestrator.state().store().messages("T1");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[0].delivery, DeliveryState::Confirmed);
        assert_eq!(messages[0].id.correlation_id(), Some(correlation_id.as_str()));
        assert_eq!(orchestrator.state().notice(), None);
    }

    #[test]
    fn sending_to_thread_without_current_user_is_rejected() {
        let (mut orchestrator, dispatcher) = orchestrator();
        let mut foreign = thread("T3", 0);
        foreign.participant_ids = vec!["U2".to_owned(), "U3".to_owned()];
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::ThreadsListed(Ok(vec![
                thread("T1", 0),
                foreign,
            ]))))
            .expect("thread list must apply");
        orchestrator.select_thread("T3", "Sparkle", None);
        deliver_messages(&mut orchestrator, "T3", 1, Ok(vec![]));
        let before = orchestrator.state().store().clone();

        type_text(&mut orchestrator, "hello");
        key(&mut orchestrator, "enter");

        assert_eq!(orchestrator.state().store(), &before);
        assert!(dispatcher.sends().is_empty());
        assert_eq!(
            orchestrator.state().notice(),
            Some("You are not a participant of this conversation.")
        );
    }

    #[test]
    fn ctrl_modified_keys_are_not_typed_into_composer() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);
        key(&mut orchestrator, "i");

        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new("a", true)))
            .expect("event must be handled");
        key(&mut orchestrator, "b");

        assert_eq!(orchestrator.state().message_input().text(), "b");
        assert!(orchestrator.state().is_running());
    }

    #[test]
    fn narrow_viewport_toggles_between_list_and_detail() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);

        orchestrator
            .handle_event(AppEvent::ViewportResized {
                width: 60,
                height: 30,
            })
            .expect("resize must apply");

        let visibility = orchestrator.state().pane_visibility();
        assert!(!visibility.list);
        assert!(visibility.detail);

        key(&mut orchestrator, "esc");

        let visibility = orchestrator.state().pane_visibility();
        assert!(visibility.list);
        assert!(!visibility.detail);
    }

    #[test]
    fn open_thread_setting_selects_thread_once_listed() {
        let dispatcher = RecordingDispatcher::default();
        let mut orchestrator = DefaultInboxOrchestrator::new(
            InboxState::default(),
            dispatcher.clone(),
            NoopOpener,
            credentials(),
            InboxSettings {
                sender_type: "partner".to_owned(),
                refresh_interval: None,
                open_thread_id: Some("T2".to_owned()),
            },
        );

        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::ThreadsListed(Ok(vec![
                thread("T1", 0),
                thread("T2", 0),
            ]))))
            .expect("thread list must apply");

        let selected = orchestrator.state().selection().selected().expect("selection");
        assert_eq!(selected.thread_id, "T2");
        assert_eq!(selected.display_name, "Sparkle Cleaners");
        assert_eq!(dispatcher.fetches(), 1);
    }

    #[test]
    fn tick_refreshes_thread_list_when_interval_elapsed() {
        let dispatcher = RecordingDispatcher::default();
        let mut orchestrator = DefaultInboxOrchestrator::new(
            InboxState::default(),
            dispatcher.clone(),
            NoopOpener,
            credentials(),
            InboxSettings {
                sender_type: "admin".to_owned(),
                refresh_interval: Some(Duration::from_secs(3600)),
                open_thread_id: None,
            },
        );

        orchestrator.handle_event(AppEvent::Tick).expect("tick");
        orchestrator.handle_event(AppEvent::Tick).expect("tick");

        assert_eq!(dispatcher.calls(), vec![Call::ListThreads]);
        assert_eq!(orchestrator.state().list_status(), LoadStatus::Loading);
    }

    #[test]
    fn open_key_opens_attachment_under_cursor() {
        use crate::domain::message::{Attachment, AttachmentKind};

        let opener = RecordingOpener::default();
        let mut orchestrator = DefaultInboxOrchestrator::new(
            InboxState::default(),
            RecordingDispatcher::default(),
            opener.clone(),
            credentials(),
            InboxSettings::default(),
        );
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::ThreadsListed(Ok(vec![
                thread("T1", 0),
            ]))))
            .expect("thread list must apply");
        orchestrator.select_thread("T1", "Sparkle", None);

        let mut with_file = server_message("m1", "photos");
        with_file.attachment = Some(Attachment {
            url: "https://cdn.example/after.jpg".to_owned(),
            kind: AttachmentKind::Image,
        });
        orchestrator
            .handle_event(AppEvent::Backend(BackendEvent::MessagesFetched {
                thread_id: "T1".to_owned(),
                scope: 1,
                result: Ok(vec![with_file]),
            }))
            .expect("messages must apply");

        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new("o", false)))
            .expect("open must be handled");

        assert_eq!(
            opener.opened(),
            vec!["https://cdn.example/after.jpg".to_owned()]
        );
    }

    #[test]
    fn fetched_messages_from_non_participants_are_dropped() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator.select_thread("T1", "Sparkle", None);

        let mut intruder = server_message("m2", "spam");
        intruder.sender_id = "U9".to_owned();
        deliver_messages(
            &mut orchestrator,
            "T1",
            1,
            Ok(vec![server_message("m1", "hi"), intruder]),
        );

        let messages = orchestrator.state().store().messages("T1");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id.as_str(), "m1");
    }
}

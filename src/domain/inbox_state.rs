//! Whole-screen state of the inbox, mutated only through [`InboxAction`]s.

use super::{
    message_input_state::MessageInputState,
    selection::{PaneVisibility, SelectedThread, SelectionState, Viewport},
    thread_store::{StoreAction, ThreadStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    ThreadList,
    Messages,
    MessageInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxAction {
    Store(StoreAction),
    SelectionChanged(Option<SelectedThread>),
}

impl From<StoreAction> for InboxAction {
    fn from(action: StoreAction) -> Self {
        Self::Store(action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxState {
    running: bool,
    store: ThreadStore,
    selection: SelectionState,
    viewport: Viewport,
    list_status: LoadStatus,
    detail_status: LoadStatus,
    list_cursor: Option<usize>,
    message_cursor: Option<usize>,
    active_pane: ActivePane,
    message_input: MessageInputState,
    notice: Option<String>,
}

impl Default for InboxState {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl InboxState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            running: true,
            store: ThreadStore::default(),
            selection: SelectionState::default(),
            viewport,
            list_status: LoadStatus::Idle,
            detail_status: LoadStatus::Idle,
            list_cursor: None,
            message_cursor: None,
            active_pane: ActivePane::ThreadList,
            message_input: MessageInputState::default(),
            notice: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn store(&self) -> &ThreadStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.resize(width, height);
    }

    pub fn pane_visibility(&self) -> PaneVisibility {
        self.viewport.pane_visibility(&self.selection)
    }

    pub fn list_status(&self) -> LoadStatus {
        self.list_status
    }

    pub fn set_list_status(&mut self, status: LoadStatus) {
        self.list_status = status;
    }

    pub fn detail_status(&self) -> LoadStatus {
        self.detail_status
    }

    pub fn set_detail_status(&mut self, status: LoadStatus) {
        self.detail_status = status;
    }

    pub fn active_pane(&self) -> ActivePane {
        self.active_pane
    }

    pub fn set_active_pane(&mut self, pane: ActivePane) {
        self.active_pane = pane;
    }

    pub fn message_input(&self) -> &MessageInputState {
        &self.message_input
    }

    pub fn message_input_mut(&mut self) -> &mut MessageInputState {
        &mut self.message_input
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Single entry point for inbox mutations.
    pub fn dispatch(&mut self, action: InboxAction) {
        match action {
            InboxAction::Store(action) => {
                let follows_tail = self.message_cursor_at_tail();
                let replaces_threads = matches!(action, StoreAction::ThreadsReplaced(_));
                let highlighted = self.highlighted_thread_id().map(str::to_owned);

                self.store.apply(action);

                if replaces_threads {
                    self.list_cursor = self.resolve_list_cursor(highlighted.as_deref());
                    self.drop_vanished_selection();
                }
                self.clamp_message_cursor(follows_tail);
            }
            InboxAction::SelectionChanged(Some(selected)) => {
                self.list_cursor = self.store.position(&selected.thread_id).or(self.list_cursor);
                self.selection.select(
                    selected.thread_id,
                    selected.display_name,
                    selected.avatar_url,
                );
                self.detail_status = LoadStatus::Idle;
                self.message_cursor = None;
                self.clamp_message_cursor(true);
                self.active_pane = ActivePane::Messages;
            }
            InboxAction::SelectionChanged(None) => {
                self.selection.clear();
                self.detail_status = LoadStatus::Idle;
                self.message_cursor = None;
                self.active_pane = ActivePane::ThreadList;
            }
        }
    }

    pub fn list_cursor(&self) -> Option<usize> {
        self.list_cursor
    }

    pub fn highlighted_thread_id(&self) -> Option<&str> {
        self.list_cursor
            .and_then(|index| self.store.thread_at(index))
            .map(|thread| thread.id.as_str())
    }

    pub fn highlight_next(&mut self) {
        let Some(index) = self.list_cursor else {
            return;
        };

        let last_index = self.store.len().saturating_sub(1);
        self.list_cursor = Some(std::cmp::min(index.saturating_add(1), last_index));
    }

    pub fn highlight_previous(&mut self) {
        let Some(index) = self.list_cursor else {
            return;
        };

        self.list_cursor = Some(index.saturating_sub(1));
    }

    pub fn message_cursor(&self) -> Option<usize> {
        self.message_cursor
    }

    pub fn select_next_message(&mut self) {
        let count = self.selected_messages_len();
        if count == 0 {
            return;
        }

        self.message_cursor = match self.message_cursor {
            None => Some(0),
            Some(index) if index + 1 < count => Some(index + 1),
            Some(index) => Some(index),
        };
    }

    pub fn select_previous_message(&mut self) {
        let count = self.selected_messages_len();
        if count == 0 {
            return;
        }

        self.message_cursor = match self.message_cursor {
            None => Some(count - 1),
            Some(index) => Some(index.saturating_sub(1)),
        };
    }

    fn selected_messages_len(&self) -> usize {
        self.selection
            .selected_thread_id()
            .map(|id| self.store.messages(id).len())
            .unwrap_or(0)
    }

    fn message_cursor_at_tail(&self) -> bool {
        let count = self.selected_messages_len();
        match self.message_cursor {
            None => true,
            Some(index) => index + 1 >= count,
        }
    }

    fn clamp_message_cursor(&mut self, follow_tail: bool) {
        let count = self.selected_messages_len();
        self.message_cursor = match (count, self.message_cursor) {
            (0, _) => None,
            (count, _) if follow_tail => Some(count - 1),
            (count, Some(index)) => Some(index.min(count - 1)),
            (_, None) => None,
        };
    }

    fn resolve_list_cursor(&self, previous_thread_id: Option<&str>) -> Option<usize> {
        if self.store.is_empty() {
            return None;
        }

        previous_thread_id
            .and_then(|id| self.store.position(id))
            .or(Some(0))
    }

    fn drop_vanished_selection(&mut self) {
        let vanished = self
            .selection
            .selected_thread_id()
            .is_some_and(|id| !self.store.contains(id));

        if vanished {
            self.dispatch(InboxAction::SelectionChanged(None));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::thread::Thread;

    fn thread(id: &str) -> Thread {
        Thread {
            id: id.to_owned(),
            participant_ids: vec!["U1".to_owned(), "U2".to_owned()],
            participant_info: Default::default(),
            messages: Vec::new(),
            unread_count: 0,
            task_id: None,
        }
    }

    fn selected(id: &str) -> SelectedThread {
        SelectedThread {
            thread_id: id.to_owned(),
            display_name: "Sparkle".to_owned(),
            avatar_url: None,
        }
    }

    fn state_with(ids: &[&str]) -> InboxState {
        let mut state = InboxState::default();
        state.dispatch(StoreAction::ThreadsReplaced(ids.iter().map(|id| thread(id)).collect()).into());
        state
    }

    #[test]
    fn default_state_is_running_with_empty_list() {
        let state = InboxState::default();

        assert!(state.is_running());
        assert_eq!(state.list_status(), LoadStatus::Idle);
        assert_eq!(state.list_cursor(), None);
        assert_eq!(state.active_pane(), ActivePane::ThreadList);
    }

    #[test]
    fn threads_replaced_highlights_first_thread() {
        let state = state_with(&["T1", "T2"]);

        assert_eq!(state.list_cursor(), Some(0));
        assert_eq!(state.highlighted_thread_id(), Some("T1"));
    }

    #[test]
    fn threads_replaced_preserves_highlight_by_id() {
        let mut state = state_with(&["T1", "T2", "T3"]);
        state.highlight_next();

        state.dispatch(
            StoreAction::ThreadsReplaced(vec![thread("T8"), thread("T9"), thread("T2")]).into(),
        );

        assert_eq!(state.highlighted_thread_id(), Some("T2"));
    }

    #[test]
    fn highlight_moves_within_bounds() {
        let mut state = state_with(&["T1", "T2"]);

        state.highlight_next();
        state.highlight_next();
        assert_eq!(state.list_cursor(), Some(1));

        state.highlight_previous();
        state.highlight_previous();
        assert_eq!(state.list_cursor(), Some(0));
    }

    #[test]
    fn selection_changed_focuses_messages_and_clear_returns_to_list() {
        let mut state = state_with(&["T1", "T2"]);

        state.dispatch(InboxAction::SelectionChanged(Some(selected("T2"))));
        assert_eq!(state.selection().selected_thread_id(), Some("T2"));
        assert_eq!(state.list_cursor(), Some(1));
        assert_eq!(state.active_pane(), ActivePane::Messages);

        state.dispatch(InboxAction::SelectionChanged(None));
        assert!(state.selection().selected().is_none());
        assert_eq!(state.active_pane(), ActivePane::ThreadList);
    }

    #[test]
    fn selection_is_dropped_when_thread_disappears_from_list() {
        let mut state = state_with(&["T1", "T2"]);
        state.dispatch(InboxAction::SelectionChanged(Some(selected("T2"))));

        state.dispatch(StoreAction::ThreadsReplaced(vec![thread("T1")]).into());

        assert!(state.selection().selected().is_none());
    }

    #[test]
    fn message_cursor_follows_new_messages_at_tail() {
        use crate::domain::message::Message;
        use chrono::Utc;

        let mut state = state_with(&["T1"]);
        state.dispatch(InboxAction::SelectionChanged(Some(selected("T1"))));
        assert_eq!(state.message_cursor(), None);

        for text in ["a", "b"] {
            state.dispatch(
                StoreAction::MessageAppended {
                    thread_id: "T1".to_owned(),
                    message: Message::provisional("U1", text, None, Utc::now()),
                }
                .into(),
            );
        }
        assert_eq!(state.message_cursor(), Some(1));

        state.select_previous_message();
        assert_eq!(state.message_cursor(), Some(0));
        state.select_next_message();
        state.select_next_message();
        assert_eq!(state.message_cursor(), Some(1));
    }
}

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::domain::{
    inbox_state::{ActivePane, InboxState, LoadStatus},
    selection::LayoutMode,
    thread::Thread,
};

use super::message_input::render_message_input;
use super::message_rendering::{
    build_message_list_elements, element_to_list_item, message_index_to_element_index,
};
use super::styles;

const LIST_PERCENT_WIDE: u16 = 35;
const EMPTY_TIMESTAMP: &str = "     ";

pub fn render(frame: &mut Frame<'_>, state: &InboxState, user_id: &str) {
    let [content_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(frame.area());

    let visibility = state.pane_visibility();
    let (list_area, detail_area) = match (visibility.list, visibility.detail) {
        (true, true) => {
            let [list_area, detail_area] = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(LIST_PERCENT_WIDE),
                    Constraint::Percentage(100 - LIST_PERCENT_WIDE),
                ])
                .areas(content_area);
            (Some(list_area), Some(detail_area))
        }
        (true, false) => (Some(content_area), None),
        (false, _) => (None, Some(content_area)),
    };

    if let Some(area) = list_area {
        render_thread_list_panel(frame, area, state, user_id);
    }

    if let Some(area) = detail_area {
        // 3 lines for input: 1 border + 1 text + 1 border
        let [messages_area, input_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .areas(area);

        render_messages_panel(frame, messages_area, state, user_id);
        if let Some(selected) = state.selection().selected() {
            render_message_input(
                frame,
                input_area,
                state.message_input(),
                state.active_pane(),
                &selected.display_name,
            );
        }
    }

    frame.render_widget(Paragraph::new(status_line(state)), status_area);
}

fn border_style(is_active: bool) -> Style {
    if is_active {
        styles::active_panel_border_style()
    } else {
        styles::inactive_panel_border_style()
    }
}

fn panel_block(title: String, is_active: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active))
}

fn render_thread_list_panel(frame: &mut Frame<'_>, area: Rect, state: &InboxState, user_id: &str) {
    let is_active = state.active_pane() == ActivePane::ThreadList;
    let store = state.store();

    if store.is_empty() {
        let message = match state.list_status() {
            LoadStatus::Idle => "Not signed in. Set session.user_id and an auth token.",
            LoadStatus::Loading => "Loading conversations...",
            LoadStatus::Error => "Failed to load conversations. Press r to retry.",
            LoadStatus::Ready => "No conversations yet.",
        };
        let panel = Paragraph::new(message).block(panel_block("Inbox".to_owned(), is_active));
        frame.render_widget(panel, area);
        return;
    }

    // Inner width = area width - 2 (borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem<'static>> = store
        .threads()
        .map(|thread| ListItem::new(thread_list_item_line(thread, user_id, inner_width)))
        .collect();

    let title = match state.list_status() {
        LoadStatus::Loading => format!("Inbox ({}) refreshing...", store.len()),
        LoadStatus::Error => format!("Inbox ({}) refresh failed", store.len()),
        _ => format!("Inbox ({})", store.len()),
    };

    let list = List::new(items)
        .block(panel_block(title, is_active))
        .highlight_style(styles::highlight_style());

    let mut list_state = ListState::default();
    list_state.select(state.list_cursor());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn thread_list_item_line(thread: &Thread, user_id: &str, width: usize) -> Line<'static> {
    let last_message = thread.last_message();

    let timestamp = last_message
        .map(|message| format_thread_timestamp(message.timestamp))
        .unwrap_or_else(|| EMPTY_TIMESTAMP.to_owned());

    let raw_preview = last_message
        .map(|message| normalize_preview(&message.display_content()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "No messages yet".to_owned());

    let title = thread.title_for(user_id);

    let task_tag = thread
        .task_id
        .as_deref()
        .map(|task| format!(" #{task}"))
        .unwrap_or_default();

    let unread_badge = if thread.unread_count > 0 {
        format!(" [{}]", thread.unread_count)
    } else {
        String::new()
    };

    // timestamp (5) + " | " (3) + name + " "
    let content_width = 5 + 3 + title.width() + 1;
    let suffix_width = task_tag.width() + unread_badge.width();
    let available = width.saturating_sub(content_width + suffix_width);

    let (display_preview, padding) = fit_to_width(&raw_preview, available);

    let mut spans = vec![
        Span::styled(format!("{timestamp:>5}"), styles::timestamp_style()),
        Span::styled(" | ", styles::separator_style()),
        Span::styled(title, styles::thread_name_style()),
        Span::raw(" "),
        Span::styled(display_preview, styles::thread_preview_style()),
    ];

    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }

    if !task_tag.is_empty() {
        spans.push(Span::styled(task_tag, styles::task_tag_style()));
    }

    if !unread_badge.is_empty() {
        spans.push(Span::styled(unread_badge, styles::unread_count_style()));
    }

    Line::from(spans)
}

/// Truncates `text` with an ellipsis to fit `available` display cells and
/// returns it with the padding needed to fill the rest.
fn fit_to_width(text: &str, available: usize) -> (String, usize) {
    let text_width = text.width();
    if text_width <= available {
        return (text.to_owned(), available - text_width);
    }

    let budget = available.saturating_sub(3);
    let mut used = 0;
    let mut truncated = String::new();
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        truncated.push(ch);
    }

    (format!("{truncated}..."), 0)
}

fn format_thread_timestamp(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.with_timezone(&Local);
    let today = Local::now().date_naive();

    if local.date_naive() == today {
        local.format("%H:%M").to_string()
    } else {
        local.format("%d.%m").to_string()
    }
}

fn normalize_preview(preview: &str) -> String {
    preview.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_messages_panel(frame: &mut Frame<'_>, area: Rect, state: &InboxState, user_id: &str) {
    let is_active = state.active_pane() == ActivePane::Messages;
    let title = detail_title(state);

    let Some(thread) = state
        .selection()
        .selected_thread_id()
        .and_then(|thread_id| state.store().get(thread_id))
    else {
        let panel = Paragraph::new("Select a conversation to view messages")
            .block(panel_block(title, is_active));
        frame.render_widget(panel, area);
        return;
    };

    let placeholder = match state.detail_status() {
        LoadStatus::Loading if thread.messages.is_empty() => Some("Loading messages..."),
        LoadStatus::Error if thread.messages.is_empty() => {
            Some("Failed to load messages. Go back and reopen the conversation to retry.")
        }
        _ if thread.messages.is_empty() => Some("No messages in this conversation"),
        _ => None,
    };

    if let Some(text) = placeholder {
        let panel = Paragraph::new(text).block(panel_block(title, is_active));
        frame.render_widget(panel, area);
        return;
    }

    let elements = build_message_list_elements(thread, user_id);
    let items: Vec<ListItem<'static>> = elements.iter().map(element_to_list_item).collect();

    let element_index = state
        .message_cursor()
        .and_then(|message_index| message_index_to_element_index(&elements, message_index));

    let list = List::new(items)
        .block(panel_block(title, is_active))
        .highlight_style(styles::highlight_style());

    let mut list_state = ListState::default();
    list_state.select(element_index);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn detail_title(state: &InboxState) -> String {
    let Some(selected) = state.selection().selected() else {
        return "Messages".to_owned();
    };

    let task = state
        .store()
        .get(&selected.thread_id)
        .and_then(|thread| thread.task_id.as_deref())
        .map(|task| format!(" (#{task})"))
        .unwrap_or_default();

    format!("Messages — {}{}", selected.display_name, task)
}

fn status_line(state: &InboxState) -> Line<'static> {
    let layout = state.viewport().layout_mode();
    let nav_hint = match (state.active_pane(), layout) {
        (ActivePane::ThreadList, _) => "j/k: navigate | l/Enter: open | r: refresh | q: quit",
        (ActivePane::Messages, LayoutMode::Narrow) => {
            "j/k: navigate | i: reply | o: open file | h/Esc: back to inbox | q: quit"
        }
        (ActivePane::Messages, LayoutMode::Wide) => {
            "j/k: navigate | i: reply | o: open file | h/Esc: close | q: quit"
        }
        (ActivePane::MessageInput, _) => "Enter: send | Esc: cancel",
    };

    let mut spans = vec![Span::raw(format!("{} | {nav_hint}", layout.as_label()))];
    if let Some(notice) = state.notice() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.to_owned(), styles::notice_style()));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::domain::{
        inbox_state::InboxAction,
        message::{DeliveryState, Message, MessageId},
        selection::{SelectedThread, Viewport},
        thread::ParticipantInfo,
        thread_store::StoreAction,
    };

    const TEST_WIDTH: usize = 60;

    fn thread(id: &str, unread_count: u32, last_text: Option<&str>) -> Thread {
        let mut participant_info = HashMap::new();
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
            messages: last_text
                .map(|text| {
                    vec![Message {
                        id: MessageId::Durable("m1".to_owned()),
                        sender_id: "U2".to_owned(),
                        text: text.to_owned(),
                        attachment: None,
                        timestamp: Utc
                            .timestamp_millis_opt(1_577_880_000_000)
                            .single()
                            .expect("timestamp"),
                        delivery: DeliveryState::Confirmed,
                    }]
                })
                .unwrap_or_default(),
            unread_count,
            task_id: None,
        }
    }

    fn line_to_string(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn screen_text(state: &InboxState) -> String {
        let viewport = state.viewport();
        let backend = TestBackend::new(viewport.width(), viewport.height());
        let mut terminal = Terminal::new(backend).expect("test terminal");
        terminal
            .draw(|frame| render(frame, state, "U1"))
            .expect("render must succeed");

        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn state_with_threads(width: u16) -> InboxState {
        let mut state = InboxState::new(Viewport::new(width, 20, 100));
        state.dispatch(
            StoreAction::ThreadsReplaced(vec![
                thread("T1", 2, Some("Keys are under the mat")),
                thread("T2", 0, None),
            ])
            .into(),
        );
        state
    }

    fn select(state: &mut InboxState, thread_id: &str) {
        state.dispatch(InboxAction::SelectionChanged(Some(SelectedThread {
            thread_id: thread_id.to_owned(),
            display_name: "Sparkle Cleaners".to_owned(),
            avatar_url: None,
        })));
    }

    #[test]
    fn thread_row_includes_name_preview_and_unread_badge() {
        let line = thread_list_item_line(&thread("T1", 3, Some("Hello")), "U1", TEST_WIDTH);
        let text = line_to_string(&line);

        assert!(text.contains("Sparkle Cleaners"));
        assert!(text.contains("Hello"));
        assert!(text.contains("[3]"));
    }

    #[test]
    fn thread_row_omits_badge_when_read() {
        let text = line_to_string(&thread_list_item_line(
            &thread("T1", 0, Some("Hello")),
            "U1",
            TEST_WIDTH,
        ));

        assert!(!text.contains("[0]"));
    }

    #[test]
    fn thread_row_shows_task_tag_and_placeholder_preview() {
        let mut with_task = thread("T1", 0, None);
        with_task.task_id = Some("booking-9".to_owned());

        let text = line_to_string(&thread_list_item_line(&with_task, "U1", 80));

        assert!(text.contains("No messages yet"));
        assert!(text.contains("#booking-9"));
    }

    #[test]
    fn thread_row_normalizes_whitespace() {
        let text = line_to_string(&thread_list_item_line(
            &thread("T1", 0, Some("  Hello\n\n  from\t\tthe crew   ")),
            "U1",
            TEST_WIDTH,
        ));

        assert!(text.contains("Hello from the crew"));
    }

    #[test]
    fn fit_to_width_truncates_by_display_width() {
        assert_eq!(fit_to_width("hello", 8), ("hello".to_owned(), 3));
        assert_eq!(fit_to_width("hello world", 8), ("hello...".to_owned(), 0));
        assert_eq!(fit_to_width("日本語テキスト", 7), ("日本...".to_owned(), 0));
    }

    #[test]
    fn format_thread_timestamp_shows_date_for_past_days() {
        let past = Utc.timestamp_millis_opt(1_577_836_800_000).single().expect("ts");

        let formatted = format_thread_timestamp(past);

        assert_eq!(formatted.len(), 5);
        assert!(formatted.contains('.'));
    }

    #[test]
    fn detail_title_includes_selected_name() {
        let mut state = state_with_threads(160);
        assert_eq!(detail_title(&state), "Messages");

        select(&mut state, "T1");

        assert_eq!(detail_title(&state), "Messages — Sparkle Cleaners");
    }

    #[test]
    fn status_line_shows_notice() {
        let mut state = state_with_threads(160);
        state.set_notice("Type a message first.");

        let text = line_to_string(&status_line(&state));

        assert!(text.starts_with("wide"));
        assert!(text.contains("Type a message first."));
    }

    #[test]
    fn wide_layout_renders_list_and_detail_together() {
        let mut state = state_with_threads(120);
        select(&mut state, "T1");

        let screen = screen_text(&state);

        assert!(screen.contains("Inbox (2)"));
        assert!(screen.contains("Messages"));
        assert!(screen.contains("Keys are under the mat"));
    }

    #[test]
    fn narrow_layout_shows_only_one_pane() {
        let mut state = state_with_threads(60);

        let list_screen = screen_text(&state);
        assert!(list_screen.contains("Inbox (2)"));
        assert!(!list_screen.contains("Select a conversation"));

        select(&mut state, "T2");
        let detail_screen = screen_text(&state);
        assert!(!detail_screen.contains("Inbox (2)"));
        assert!(detail_screen.contains("No messages in this conversation"));
    }
}

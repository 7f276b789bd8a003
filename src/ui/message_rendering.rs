//! Message list rendering logic.
//!
//! Handles visual formatting of a thread's messages:
//! - Time + sender header, text on the following lines
//! - Sender grouping (consecutive messages from the same sender show the name once)
//! - Date separators between messages from different days
//! - Attachment labels and delivery markers for optimistic sends

use chrono::{DateTime, Local, NaiveDate, Utc};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::ListItem,
};

use crate::domain::{message::DeliveryState, thread::Thread};

use super::styles;

const OWN_SENDER_LABEL: &str = "You";
const INDENT: &str = "      ";

/// Represents a visual element in the messages list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    /// Date separator line (e.g., "——— 14 Feb 2026 ———").
    DateSeparator(String),
    Message {
        time: String,
        sender: Option<String>,
        content: String,
        delivery: DeliveryState,
    },
}

/// Builds the visual elements for a thread as seen by `user_id`.
pub fn build_message_list_elements(thread: &Thread, user_id: &str) -> Vec<MessageListElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;
    let mut prev_sender: Option<&str> = None;

    for message in &thread.messages {
        let local = to_local(message.timestamp);
        let msg_date = local.date_naive();

        if prev_date != Some(msg_date) {
            elements.push(MessageListElement::DateSeparator(format_date(msg_date)));
            prev_sender = None;
        }

        let show_sender = prev_sender != Some(message.sender_id.as_str());
        let sender = show_sender.then(|| sender_label(thread, &message.sender_id, user_id));

        elements.push(MessageListElement::Message {
            time: local.format("%H:%M").to_string(),
            sender,
            content: message.display_content(),
            delivery: message.delivery,
        });

        prev_date = Some(msg_date);
        prev_sender = Some(message.sender_id.as_str());
    }

    elements
}

/// Maps a message index to its element index, skipping date separators.
pub fn message_index_to_element_index(
    elements: &[MessageListElement],
    message_index: usize,
) -> Option<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, element)| matches!(element, MessageListElement::Message { .. }))
        .nth(message_index)
        .map(|(element_index, _)| element_index)
}

pub fn element_to_list_item(element: &MessageListElement) -> ListItem<'static> {
    match element {
        MessageListElement::DateSeparator(date) => date_separator_item(date),
        MessageListElement::Message {
            time,
            sender,
            content,
            delivery,
        } => message_item(time, sender.as_deref(), content, *delivery),
    }
}

fn sender_label(thread: &Thread, sender_id: &str, user_id: &str) -> String {
    if sender_id == user_id {
        OWN_SENDER_LABEL.to_owned()
    } else {
        thread.display_name_for(sender_id)
    }
}

fn date_separator_item(date: &str) -> ListItem<'static> {
    let line = Line::from(vec![Span::styled(
        format!("——— {date} ———"),
        styles::date_separator_style(),
    )])
    .alignment(Alignment::Center);
    ListItem::new(vec![Line::default(), line, Line::default()])
}

fn message_item(
    time: &str,
    sender: Option<&str>,
    content: &str,
    delivery: DeliveryState,
) -> ListItem<'static> {
    let mut lines = Vec::new();
    let time_span = Span::styled(format!("{time:>5} "), styles::message_time_style());
    let mut content_lines = content.lines();

    match sender {
        Some(name) => {
            lines.push(Line::from(vec![
                time_span,
                Span::styled(format!("{name}:"), styles::message_sender_style()),
            ]));
            for text_line in content_lines {
                lines.push(indented(build_content_line_spans(text_line)));
            }
            if content.is_empty() {
                lines.push(indented(vec![empty_message_span()]));
            }
        }
        None => {
            let mut spans = vec![time_span];
            match content_lines.next() {
                Some(first_line) => spans.extend(build_content_line_spans(first_line)),
                None => spans.push(empty_message_span()),
            }
            lines.push(Line::from(spans));

            for text_line in content_lines {
                lines.push(indented(build_content_line_spans(text_line)));
            }
        }
    }

    if let Some(marker) = delivery_marker(delivery) {
        match lines.last_mut() {
            Some(last) => last.spans.push(marker),
            None => lines.push(Line::from(vec![marker])),
        }
    }

    ListItem::new(lines)
}

fn indented(spans: Vec<Span<'static>>) -> Line<'static> {
    let mut line_spans = vec![Span::raw(INDENT)];
    line_spans.extend(spans);
    Line::from(line_spans)
}

fn empty_message_span() -> Span<'static> {
    Span::styled("[Empty message]", styles::message_media_style())
}

fn delivery_marker(delivery: DeliveryState) -> Option<Span<'static>> {
    match delivery {
        DeliveryState::Confirmed => None,
        DeliveryState::Pending => Some(Span::styled(" (sending)", styles::pending_message_style())),
        DeliveryState::Failed => Some(Span::styled(
            " (not delivered)",
            styles::failed_message_style(),
        )),
    }
}

/// Highlights a leading attachment label like `[Image]`.
fn build_content_line_spans(text: &str) -> Vec<Span<'static>> {
    if text.starts_with('[') {
        if let Some(end_bracket) = text.find(']') {
            let label = &text[..=end_bracket];
            let rest = text[end_bracket + 1..].trim_start();

            if rest.is_empty() {
                return vec![Span::styled(label.to_owned(), styles::message_media_style())];
            }

            return vec![
                Span::styled(label.to_owned(), styles::message_media_style()),
                Span::raw(" "),
                Span::styled(rest.to_owned(), styles::message_text_style()),
            ];
        }
    }

    vec![Span::styled(text.to_owned(), styles::message_text_style())]
}

fn to_local(timestamp: DateTime<Utc>) -> DateTime<Local> {
    timestamp.with_timezone(&Local)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

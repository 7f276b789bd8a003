//! Style definitions for the UI components.

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// Panel styles
// =============================================================================

pub fn active_panel_border_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn inactive_panel_border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn highlight_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
}

// =============================================================================
// Thread list styles
// =============================================================================

/// Style for the counterpart name (bold, bright).
pub fn thread_name_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for last message preview text (dimmed).
pub fn thread_preview_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for unread count badge (green).
pub fn unread_count_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Style for the booking/task tag.
pub fn task_tag_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub fn timestamp_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

// =============================================================================
// Message list styles
// =============================================================================

pub fn message_sender_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn message_time_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn message_text_style() -> Style {
    Style::default().fg(Color::White)
}

/// Style for attachment labels like [Image], [Document].
pub fn message_media_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn date_separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Marker for messages still waiting for the backend.
pub fn pending_message_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

/// Marker for messages the backend rejected.
pub fn failed_message_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

// =============================================================================
// Input and status line
// =============================================================================

pub fn input_prompt_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn input_text_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn input_placeholder_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn notice_style() -> Style {
    Style::default().fg(Color::Yellow)
}

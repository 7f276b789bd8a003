//! Reply composer rendering.
//!
//! The composer is a single bordered line. Long drafts scroll horizontally so
//! the cursor always stays inside the box.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{inbox_state::ActivePane, message_input_state::MessageInputState};

use super::styles;

const PLACEHOLDER_TEXT: &str = "Press 'i' to reply...";
const PROMPT_SYMBOL: &str = "> ";

pub fn render_message_input(
    frame: &mut Frame<'_>,
    area: Rect,
    input_state: &MessageInputState,
    active_pane: ActivePane,
    recipient: &str,
) {
    let is_focused = active_pane == ActivePane::MessageInput;

    let mut block = Block::default().borders(Borders::ALL);
    block = if is_focused {
        block
            .title(format!("Reply to {recipient}"))
            .border_style(styles::active_panel_border_style())
    } else {
        block.border_style(styles::inactive_panel_border_style())
    };

    // borders (2) + prompt
    let text_width = area
        .width
        .saturating_sub(2)
        .saturating_sub(PROMPT_SYMBOL.width() as u16) as usize;
    let (visible, cursor_offset) = visible_draft(input_state, text_width);

    frame.render_widget(
        Paragraph::new(build_input_line(&visible, is_focused)).block(block),
        area,
    );

    if is_focused {
        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(PROMPT_SYMBOL.width() as u16)
            .saturating_add(cursor_offset);
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

/// The slice of the draft that fits in `width` cells while keeping the
/// cursor visible, plus the cursor's column inside that slice.
fn visible_draft(input_state: &MessageInputState, width: usize) -> (String, u16) {
    let chars: Vec<char> = input_state.text().chars().collect();
    let cursor = input_state.cursor_position().min(chars.len());

    // Reserve one cell for the cursor when it sits after the last char.
    let budget = width.saturating_sub(1).max(1);

    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(|ch| char_width(*ch)).sum();
    while cursor_col > budget && start < cursor {
        cursor_col -= char_width(chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for ch in &chars[start..] {
        let w = char_width(*ch);
        if used + w > width {
            break;
        }
        used += w;
        visible.push(*ch);
    }

    (visible, u16::try_from(cursor_col).unwrap_or(u16::MAX))
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

fn build_input_line(visible: &str, is_focused: bool) -> Line<'static> {
    let prompt = Span::styled(PROMPT_SYMBOL, styles::input_prompt_style());

    let body = if visible.is_empty() && !is_focused {
        Span::styled(PLACEHOLDER_TEXT, styles::input_placeholder_style())
    } else {
        Span::styled(visible.to_owned(), styles::input_text_style())
    };

    Line::from(vec![prompt, body])
}

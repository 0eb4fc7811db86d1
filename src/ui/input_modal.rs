use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::{theme, util};
use crate::app::InputPrompt;

/// Single-line text prompt used for names, descriptions and file paths.
pub fn draw_input_modal(f: &mut Frame, area: Rect, prompt: &InputPrompt) {
    let popup_area = util::centered(area, 70, 7);
    f.render_widget(Clear, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + hint
            Constraint::Length(3), // editor
            Constraint::Min(2),    // keys
        ])
        .split(popup_area);

    let title_block = Block::default()
        .title(format!(" {} ", prompt.title))
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .border_style(theme::MODAL_BORDER);
    let hint = Paragraph::new(Line::from(Span::styled(
        format!(" {}", prompt.hint),
        theme::LIST_DIM,
    )))
    .block(title_block);
    f.render_widget(hint, chunks[0]);

    let mut editor = prompt.editor.clone();
    editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::BORDER_INACTIVE),
    );
    editor.set_cursor_line_style(theme::MODAL_CURSOR_LINE);
    editor.set_style(theme::MODAL_TEXT);
    f.render_widget(&editor, chunks[1]);

    let keys = Line::from(vec![
        Span::styled(" Enter", theme::HELP_KEY),
        Span::styled(": Save  ", theme::HELP_DESC),
        Span::styled("Esc", theme::HELP_KEY),
        Span::styled(": Cancel ", theme::HELP_DESC),
    ]);
    let key_block = Block::default()
        .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
        .border_style(theme::MODAL_BORDER);
    f.render_widget(Paragraph::new(keys).block(key_block), chunks[2]);
}

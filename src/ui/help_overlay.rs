use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::{theme, util};

const BINDINGS: [(&str, &str); 22] = [
    ("Course list", ""),
    ("j/k or Up/Down", "Move"),
    ("Enter", "Open course"),
    ("n", "New course"),
    ("r", "Reload list"),
    ("Course", ""),
    ("1-9", "Jump to tab by number"),
    ("Tab / Shift+Tab", "Cycle tabs"),
    ("j/k or Up/Down", "Move in sidebar / scroll content"),
    ("h/l or Left/Right", "Collapse, parent / switch panes"),
    ("Enter", "Expand or collapse folder"),
    ("g / G", "Jump to top / bottom"),
    ("a", "Add subfolder to selection"),
    ("c", "Add module (course) / lesson (module)"),
    ("T", "Add tab"),
    ("e / E", "Rename / edit description"),
    ("u", "Upload .srt/.vtt transcript"),
    ("d / Del", "Delete with descendants"),
    ("r", "Refresh tree"),
    ("b / Esc", "Back to course list"),
    ("? / Ctrl-H", "Toggle this help"),
    ("q / Ctrl+C", "Quit"),
];

pub fn draw_help(f: &mut Frame, area: Rect) {
    let popup_area = util::centered(area, 62, BINDINGS.len() as u16 + 5);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(" Keybindings", theme::HELP_TITLE)),
        Line::from(""),
    ];

    for (key, desc) in &BINDINGS {
        if desc.is_empty() {
            lines.push(Line::from(Span::styled(format!(" {}", key), theme::HELP_TITLE)));
            continue;
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {:20}", key), theme::HELP_KEY),
            Span::styled(*desc, theme::HELP_DESC),
        ]));
    }

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(theme::BORDER_ACTIVE);

    f.render_widget(Paragraph::new(lines).block(block), popup_area);
}

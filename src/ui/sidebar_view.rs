use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::theme;
use crate::app::{App, CoursePane};
use crate::model::tree::NodeKind;

pub fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let is_active = app.pane == CoursePane::Sidebar;
    let border_style = if is_active {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };

    let block = Block::default()
        .title(" Folders ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.sidebar.is_empty() {
        let msg = if app.reconciler.pending().is_some() {
            "Loading..."
        } else {
            "No course loaded"
        };
        let p = Paragraph::new(msg).style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .sidebar
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let arrow = match (row.has_children, row.expanded) {
                (true, true) => "v ",
                (true, false) => "> ",
                (false, _) => "  ",
            };
            let style = match row.kind {
                NodeKind::Course => theme::KIND_COURSE,
                NodeKind::Module => theme::KIND_MODULE,
                _ => theme::KIND_LESSON,
            };
            let mut spans = vec![
                Span::raw(indent),
                Span::styled(arrow, style),
                Span::styled(row.name.clone(), style),
            ];
            if row.segment_count > 0 {
                spans.push(Span::styled(
                    format!(" [{}]", row.segment_count),
                    theme::SEGMENT_BADGE,
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.sidebar_index));

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);

    f.render_stateful_widget(list, area, &mut state);
}

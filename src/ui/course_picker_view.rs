use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use unicode_width::UnicodeWidthStr;

use super::{theme, util};
use crate::app::App;

pub fn draw_course_picker(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    draw_course_list(f, chunks[0], app);
    draw_course_summary(f, chunks[1], app);
}

fn draw_course_list(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" Courses ({}) ", app.courses.len()))
        .borders(Borders::ALL)
        .border_style(theme::BORDER_ACTIVE);

    if app.courses.is_empty() {
        let msg = if app.courses_loading {
            "Loading courses..."
        } else {
            "No courses. Press n to create one."
        };
        let p = Paragraph::new(msg).style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .courses
        .iter()
        .map(|c| {
            let date = c.created_label().unwrap_or_default();
            let name_room = width.saturating_sub(date.len() + 1);
            let name = util::ellipsize(c.display_name(), name_room);
            let pad = width.saturating_sub(name.width() + date.len());
            ListItem::new(Line::from(vec![
                Span::styled(name, theme::LIST_NORMAL),
                Span::raw(" ".repeat(pad)),
                Span::styled(date, theme::LIST_DIM),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.course_index.min(app.courses.len() - 1)));

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_course_summary(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(theme::BORDER_INACTIVE);

    let Some(course) = app.courses.get(app.course_index) else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(course.display_name().to_string(), theme::DETAIL_HEADING)),
        Line::from(vec![
            Span::styled("ID          ", theme::DETAIL_LABEL),
            Span::styled(course.id.clone(), theme::DETAIL_VALUE),
        ]),
    ];
    if let Some(thumb) = &course.thumbnail_url {
        lines.push(Line::from(vec![
            Span::styled("Thumbnail   ", theme::DETAIL_LABEL),
            Span::styled(thumb.clone(), theme::DETAIL_VALUE),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(desc) = course.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(Span::styled(desc.to_string(), theme::LIST_NORMAL)));
    }

    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

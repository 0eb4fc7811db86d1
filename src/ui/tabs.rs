use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::{theme, util};
use crate::app::{App, Screen};

/// Top bar: one tab per top-level folder of the open course.
pub fn draw_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    match app.screen {
        Screen::CoursePicker => {
            spans.push(Span::styled(" Courses ", theme::TAB_ACTIVE));
        }
        Screen::Course => {
            let active = app.active_tab();
            let tabs = app.tabs();
            if tabs.is_empty() {
                spans.push(Span::styled(" no tabs yet (T to add) ", theme::TAB_INACTIVE));
            }
            for (i, (_, name)) in tabs.iter().enumerate() {
                let label = if i < 9 {
                    format!("{}:{}", i + 1, util::ellipsize(name, 20))
                } else {
                    util::ellipsize(name, 20)
                };
                let style = if active == Some(i) {
                    theme::TAB_ACTIVE
                } else {
                    theme::TAB_INACTIVE
                };
                spans.push(Span::styled(format!(" {} ", label), style));
                spans.push(Span::raw(" "));
            }
        }
    }

    // Course name and version on the right
    let course = app.tree().map(|t| t.name.as_str()).unwrap_or("");
    let right = if course.is_empty() {
        format!("kbadmin v{}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("{} | kbadmin v{}", util::ellipsize(course, 30), env!("CARGO_PKG_VERSION"))
    };
    let tabs_width: usize = spans.iter().map(|s| s.width()).sum();
    let pad = (area.width as usize).saturating_sub(tabs_width + right.width());
    if pad > 0 {
        spans.push(Span::raw(" ".repeat(pad)));
    }
    spans.push(Span::styled(right, theme::STATUS_BAR));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

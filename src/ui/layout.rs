use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::{
    course_picker_view, detail_view, help_overlay, input_modal, sidebar_view, tabs, theme, util,
};
use crate::app::{App, CoursePane, DeleteTarget, Screen};

pub fn draw_layout(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(3),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    tabs::draw_tab_bar(f, chunks[0], app);
    draw_content(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    if let Some(ref target) = app.confirm_delete {
        draw_delete_confirm(f, f.area(), target);
    }

    if let Some(ref prompt) = app.input {
        input_modal::draw_input_modal(f, f.area(), prompt);
    }

    // Help overlay (on top of everything)
    if app.show_help {
        help_overlay::draw_help(f, f.area());
    }
}

fn draw_content(f: &mut Frame, area: Rect, app: &App) {
    match app.screen {
        Screen::CoursePicker => course_picker_view::draw_course_picker(f, area, app),
        Screen::Course => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(area);
            sidebar_view::draw_sidebar(f, chunks[0], app);
            detail_view::draw_detail(f, chunks[1], app);
        }
    }
}

/// Lines of the delete dialog; the cascade warning appears only when something hangs below.
pub fn delete_confirm_lines(target: &DeleteTarget) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Delete {} \"{}\"?", target.kind, util::ellipsize(&target.name, 32)),
            theme::DANGER,
        )),
    ];
    if target.descendants > 0 {
        lines.push(Line::from(Span::styled(
            format!(
                "  This also deletes {} item{} below it.",
                target.descendants,
                if target.descendants == 1 { "" } else { "s" }
            ),
            theme::HELP_DESC,
        )));
    }
    lines.push(Line::from(Span::styled(
        "  This cannot be undone.",
        theme::HELP_DESC,
    )));
    lines.push(Line::from(vec![
        Span::styled("  y", theme::HELP_KEY),
        Span::raw(" yes  "),
        Span::styled("n", theme::HELP_KEY),
        Span::raw(" no"),
    ]));
    lines
}

fn draw_delete_confirm(f: &mut Frame, area: Rect, target: &DeleteTarget) {
    let lines = delete_confirm_lines(target);
    let popup_area = util::centered(area, 56, lines.len() as u16 + 2);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Confirm Delete ")
        .borders(Borders::ALL)
        .border_style(theme::DANGER);

    f.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn hint_text(app: &App) -> Vec<(&'static str, &'static str)> {
    let can_upload = app.selected_node().is_some_and(|n| n.shows_upload_area());
    let mut hints: Vec<(&str, &str)> = match app.screen {
        Screen::CoursePicker => vec![("j/k", "nav"), ("Enter", "open"), ("n", "new"), ("r", "reload")],
        Screen::Course => match app.pane {
            CoursePane::Sidebar => vec![
                ("j/k", "nav"),
                ("Enter", "expand"),
                ("a", "subfolder"),
                ("c", "content"),
            ],
            CoursePane::Detail => vec![("j/k", "scroll"), ("h", "sidebar")],
        },
    };
    if app.screen == Screen::Course {
        if can_upload {
            hints.push(("u", "upload"));
        }
        if app.pane == CoursePane::Sidebar {
            hints.extend([("d", "delete"), ("b", "back")]);
        }
    }
    hints.push(("^H", "help"));
    hints
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut left_spans: Vec<Span> = Vec::new();

    if let Some(label) = app.pending_label() {
        left_spans.push(Span::styled(format!(" {} ", label), theme::STATUS_PENDING));
    }

    if let Some(ref err) = app.last_error {
        left_spans.push(Span::styled(format!(" ERR: {} ", err), theme::STATUS_ERROR));
    } else if let Some((ref msg, _)) = app.status {
        left_spans.push(Span::styled(format!(" {} ", msg), theme::STATUS_INFO));
    }

    let hints = hint_text(app);
    let mut hint_spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            hint_spans.push(Span::styled("  ", theme::STATUS_BAR));
        }
        hint_spans.push(Span::styled(*key, theme::HINT_KEY));
        hint_spans.push(Span::styled(":", theme::HINT_DESC));
        hint_spans.push(Span::styled(*desc, theme::HINT_DESC));
    }
    hint_spans.push(Span::styled(" ", theme::STATUS_BAR));

    let left_width: usize = left_spans.iter().map(|s| s.width()).sum();
    let hint_width: usize = hint_spans.iter().map(|s| s.width()).sum();
    let total = area.width as usize;
    let gap = total.saturating_sub(left_width + hint_width);

    let mut spans = left_spans;
    spans.push(Span::styled(" ".repeat(gap), theme::STATUS_BAR));
    spans.extend(hint_spans);

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ProjectConfig;
    use crate::data::memory_store::MemoryStore;
    use crate::model::tree::fixtures::sample_course;
    use crate::model::tree::NodeKind;

    fn rendered(target: &DeleteTarget) -> String {
        delete_confirm_lines(target)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn delete_dialog_warns_about_descendants() {
        let target = DeleteTarget {
            id: "m".into(),
            name: "Getting Started".into(),
            kind: NodeKind::Module,
            descendants: 3,
        };
        let text = rendered(&target);
        assert!(text.contains("Delete module \"Getting Started\"?"));
        assert!(text.contains("also deletes 3 items"));
    }

    #[test]
    fn leaf_folder_delete_has_no_cascade_line() {
        let target = DeleteTarget {
            id: "l".into(),
            name: "Intro".into(),
            kind: NodeKind::Lesson,
            descendants: 0,
        };
        let text = rendered(&target);
        assert!(!text.contains("also deletes"));
        assert!(text.contains("This cannot be undone."));
    }

    #[test]
    fn upload_hint_follows_the_upload_area() {
        let store = Arc::new(MemoryStore::with_course(sample_course()));
        let mut app = App::new(store, ProjectConfig::default());
        app.open_course("c");
        app.switch_to_tab(0);
        app.select_item();
        let has_upload = |app: &App| hint_text(app).iter().any(|(k, _)| *k == "u");
        assert!(has_upload(&app));

        app.navigate_down();
        assert_eq!(app.selected_node().map(|n| n.id.as_str()), Some("l1"));
        assert!(!has_upload(&app));

        app.navigate_down();
        assert_eq!(app.selected_node().map(|n| n.id.as_str()), Some("l2"));
        assert!(has_upload(&app));
    }
}

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::{theme, util};
use crate::app::{App, CoursePane};
use crate::model::tree::Node;
use crate::model::view_state::{DetailView, FolderDetail};

pub const PLACEHOLDER: &str = "Select a tab or folder to see its content";

pub fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let is_active = app.pane == CoursePane::Detail;
    let border_style = if is_active {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };

    let detail = app.reconciler.view.detail(app.tree());
    let title = match &detail {
        DetailView::Folder(d) => format!(" {} ", util::ellipsize(&d.node.name, 40)),
        DetailView::Placeholder => " Content ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let DetailView::Folder(detail) = detail else {
        let p = Paragraph::new(PLACEHOLDER)
            .style(theme::EMPTY_STATE)
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = folder_lines(&detail, inner.width as usize);
    let inner_height = inner.height as usize;
    let total = lines.len();
    let scroll_offset = app.detail_scroll.min(total.saturating_sub(inner_height));
    let visible: Vec<Line> = lines.into_iter().skip(scroll_offset).take(inner_height).collect();

    f.render_widget(Paragraph::new(visible), inner);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), theme::DETAIL_LABEL),
        Span::styled(value, theme::DETAIL_VALUE),
    ])
}

fn segment_line(seg: &Node, width: usize) -> Line<'static> {
    let time = seg.duration_label().unwrap_or_else(|| "--:--".to_string());
    let mut spans = vec![
        Span::raw("  "),
        Span::styled(format!("{:<15}", time), theme::TIMECODE),
    ];
    let text = if seg.description.is_empty() {
        &seg.name
    } else {
        &seg.description
    };
    let room = width.saturating_sub(18 + 6);
    spans.push(Span::styled(util::ellipsize(text, room), theme::LIST_NORMAL));
    if let Some(conf) = seg.metadata.extraction_confidence {
        spans.push(Span::styled(format!(" {:.0}%", conf * 100.0), theme::LIST_DIM));
    }
    Line::from(spans)
}

/// Everything the detail pane shows for one folder, before scrolling.
pub fn folder_lines(detail: &FolderDetail<'_>, width: usize) -> Vec<Line<'static>> {
    let node = detail.node;
    let mut lines = vec![
        Line::from(Span::styled(node.name.clone(), theme::DETAIL_HEADING)),
        field("Type", node.kind.to_string()),
        field("Level", node.hierarchy_level.to_string()),
    ];
    if !node.description.is_empty() {
        field_wrapped(&mut lines, "Description", &node.description, width);
    }
    if let Some(url) = &node.metadata.media_url {
        lines.push(field("Video", url.clone()));
    }
    if let Some(secs) = node.metadata.video_duration_seconds {
        lines.push(field(
            "Duration",
            crate::model::tree::format_timecode(secs as f64),
        ));
    }
    if let Some(lang) = &node.metadata.transcript_language {
        lines.push(field("Language", lang.clone()));
    }
    lines.push(Line::from(""));

    if !detail.folders.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Subfolders ({})", detail.folders.len()),
            theme::DETAIL_HEADING,
        )));
        for child in &detail.folders {
            let count = child.content_children().len();
            let mut spans = vec![Span::styled(format!("  {}", child.name), theme::LIST_NORMAL)];
            if count > 0 {
                spans.push(Span::styled(format!(" [{}]", count), theme::SEGMENT_BADGE));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
    }

    if detail.show_upload {
        lines.push(Line::from(Span::styled(
            "No transcript yet. Press u to upload a .srt or .vtt file.",
            theme::UPLOAD_AREA,
        )));
    } else if !detail.segments.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Segments ({})", detail.segments.len()),
            theme::DETAIL_HEADING,
        )));
        for seg in &detail.segments {
            lines.push(segment_line(seg, width));
        }
    }

    if !detail.can_add_subfolder {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Maximum depth reached; no further subfolders.",
            theme::LIST_DIM,
        )));
    }
    lines
}

fn field_wrapped(lines: &mut Vec<Line<'static>>, label: &str, text: &str, width: usize) {
    let room = width.saturating_sub(12).max(10);
    let mut first = true;
    let mut current = String::new();
    let mut flush = |current: &mut String, first: &mut bool| {
        let label = if *first { label } else { "" };
        lines.push(field(label, std::mem::take(current)));
        *first = false;
    };
    for word in text.split_whitespace() {
        if !current.is_empty() && current.width() + 1 + word.width() > room {
            flush(&mut current, &mut first);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        flush(&mut current, &mut first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::fixtures::sample_course;
    use crate::model::view_state::ViewState;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    fn lines_for(id: &str) -> Vec<String> {
        let tree = sample_course();
        let mut view = ViewState::new();
        view.select(id);
        match view.detail(Some(&tree)) {
            DetailView::Folder(d) => text(&folder_lines(&d, 80)),
            DetailView::Placeholder => panic!("{} should resolve", id),
        }
    }

    #[test]
    fn lesson_with_segments_lists_them_instead_of_upload_area() {
        let lines = lines_for("l1");
        assert!(lines.iter().any(|l| l == "Segments (2)"));
        assert!(lines.iter().any(|l| l.contains("0:30 - 1:00")));
        assert!(!lines.iter().any(|l| l.contains("upload")));
    }

    #[test]
    fn empty_lesson_offers_upload() {
        let lines = lines_for("l2");
        assert!(lines.iter().any(|l| l.contains("Press u to upload")));
    }

    #[test]
    fn module_lists_subfolders_with_segment_badges() {
        let lines = lines_for("m1");
        assert!(lines.iter().any(|l| l == "Subfolders (2)"));
        assert!(lines.iter().any(|l| l == "  Intro [2]"));
    }

    #[test]
    fn long_description_wraps() {
        let mut lines = Vec::new();
        field_wrapped(&mut lines, "Description", "one two three four five six", 24);
        let t = text(&lines);
        assert!(t.len() > 1);
        assert!(t[0].starts_with("Description"));
        assert!(t[1].starts_with("            "));
    }
}

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Longest prefix of `s` that fits in `max_width` terminal columns.
/// Borrowed; no allocation.
pub fn truncate_width(s: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > max_width {
            return &s[..idx];
        }
    }
    s
}

/// Truncate with a trailing `...` when the text is wider than `max_width` columns.
pub fn ellipsize(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        s.to_string()
    } else {
        format!("{}...", truncate_width(s, max_width.saturating_sub(3)))
    }
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));

    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1]);

    horiz[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_columns() {
        assert_eq!(truncate_width("héllo", 2), "hé");
        assert_eq!(truncate_width("abc", 10), "abc");
        assert_eq!(truncate_width("日本語", 5), "日本");
        assert_eq!(ellipsize("日本語のコース", 7), "日本...");
        assert_eq!(ellipsize("Introduction to niches", 10), "Introdu...");
        assert_eq!(ellipsize("short", 10), "short");
    }

    #[test]
    fn centered_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let popup = centered(area, 50, 7);
        assert_eq!(popup.width, 50);
        assert_eq!(popup.height, 7);
        assert_eq!(popup.x, 15);
        let tiny = centered(Rect::new(0, 0, 20, 5), 50, 7);
        assert!(tiny.width <= 16 && tiny.height <= 3);
    }
}
